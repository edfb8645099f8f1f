//! Fuel-flow and thermodynamics approximations.
//!
//! All curves are functions of the gas-generator speed N1; they are tuned
//! for plausible gauge behavior rather than derived from engine data.

use crate::constants::*;

/// Base fuel flow in L/hr for a given N1, before fault/mode scaling.
///
/// Three segments: dead below 1 RPM, a quadratic startup ramp up to the
/// idle ratio, then a non-linear idle-to-max curve.
pub fn base_fuel_flow(n1_rpm: f64) -> f64 {
    let n1_ratio = n1_rpm / MAX_N1_RPM;
    let idle_ratio = IDLE_RPM_N1 / MAX_N1_RPM; // ~0.65

    if n1_rpm < 1.0 {
        0.0
    } else if n1_ratio < idle_ratio {
        // Startup ramp, 35 -> 95 L/hr.
        let startup_progress = n1_ratio / idle_ratio;
        35.0 + 60.0 * startup_progress.powi(2)
    } else {
        // Idle (95) to max (380), non-linear response.
        let throttle_effect = (n1_ratio - idle_ratio) / (1.0 - idle_ratio);
        95.0 + 285.0 * throttle_effect.powf(1.2)
    }
}

/// High-pressure pump output in MPa (power law).
pub fn base_pressure(n1_rpm: f64) -> f64 {
    MAX_PRESSURE_MPA * (n1_rpm / MAX_N1_RPM).powf(1.8)
}

/// Exhaust gas temperature in Kelvin (linear idle-to-max).
pub fn base_egt(n1_rpm: f64) -> f64 {
    IDLE_TEMP + (n1_rpm / MAX_N1_RPM) * (MAX_TEMP - IDLE_TEMP)
}

/// Air-fuel ratio. Throttle transients richen the mixture; the AFR-enhanced
/// law runs leaner and suppresses half of the transient effect. A fault may
/// scale the stoichiometric base (the enhanced law overrides it outright).
pub fn base_afr(afr_enhanced: bool, throttle_diff: f64, fault_scale: f64) -> f64 {
    if afr_enhanced {
        16.0 - throttle_diff.abs() * 0.05
    } else {
        14.7 * fault_scale - throttle_diff.abs() * 0.1
    }
}

/// One step of fuel temperature, Celsius: heated by the previous tick's
/// EGT, cooled at a constant rate, clamped to the ambient..max band.
pub fn fuel_temp_step(prev_temp_fuel: f64, prev_egt: f64) -> f64 {
    let temp_diff = prev_egt - IDLE_TEMP;
    let heating = if temp_diff > 0.0 { temp_diff * 0.0005 } else { 0.0 };
    let cooling = 0.1;
    (prev_temp_fuel + heating - cooling).clamp(AMBIENT_FUEL_TEMP, MAX_FUEL_TEMP)
}

/// Four-plunger cam model: plunger extensions follow a sinusoid driven by
/// a phase angle advancing with N1, and an injector fires a fixed 8.4 flow
/// only when its plunger extends past 9.8 while the engine is turning.
pub fn pump_kinematics(tick: u64, n1_rpm: f64) -> ([f64; 4], [f64; 4]) {
    let cam_angle = (tick as f64 * (n1_rpm / 100.0)) % 360.0;
    let phase = |offset: f64| (cam_angle + offset).to_radians();

    let extensions = [
        5.0 * (1.0 + phase(0.0).sin()),
        5.0 * (1.0 + phase(270.0).sin()),
        5.0 * (1.0 + phase(90.0).sin()),
        5.0 * (1.0 + phase(180.0).sin()),
    ];
    let mut flows = [0.0; 4];
    for (flow, ext) in flows.iter_mut().zip(extensions) {
        if ext > 9.8 && n1_rpm > 1.0 {
            *flow = 8.4;
        }
    }
    (extensions, flows)
}
