//! Engine spool and rotor-speed governor.
//!
//! Two regimes: `SPOOLING_UP` (rotor not yet at speed) and `AT_SPEED`.
//! While at speed a proportional governor trims the throttle demand to hold
//! the main rotor on its 100% target against collective-pitch load changes.

use crate::constants::*;
use crate::events;
use crate::types::{HealthStatus, LogEntry};

/// Engine-side slice of the aggregate the governor owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineBlock {
    pub n1_rpm: f64,
    pub n2_rpm: f64,
    pub nr_rpm: f64,
    pub nt_rpm: f64,
    pub is_rotor_ready: bool,
}

/// Control inputs sampled at the start of the tick.
#[derive(Debug, Clone, Copy)]
pub struct SpoolInputs {
    /// Pilot throttle, 0..100.
    pub throttle: f64,
    /// Collective pitch delta since the previous tick, degrees.
    pub pitch_change: f64,
    /// Ground-truth fuel remaining at the start of the tick, liters.
    pub fuel_remaining: f64,
    /// AFR-enhanced law raises the N1/N2 lag coefficient.
    pub afr_enhanced: bool,
}

/// One governor step: the new engine block plus the N1/N2 targets the rest
/// of the tick needs (a zero target distinguishes shutdown from idle).
#[derive(Debug, Clone)]
pub struct SpoolStep {
    pub engine: EngineBlock,
    pub target_n1: f64,
    pub target_n2: f64,
    pub events: Vec<LogEntry>,
}

pub fn advance(prev: &EngineBlock, inputs: &SpoolInputs, tick: u64) -> SpoolStep {
    let mut events = Vec::new();
    let fueled = inputs.fuel_remaining > 0.0;

    // Rotor dynamics while governed: sudden collective changes perturb the
    // rotor before the governor and rotor inertia pull it back.
    let mut nr = prev.nr_rpm;
    let mut correction = 0.0;
    if prev.is_rotor_ready && fueled {
        if inputs.pitch_change.abs() > 0.05 {
            nr -= inputs.pitch_change * PITCH_DRAG_SENSITIVITY;
            // Advisories rate-limited to once per four ticks.
            if tick % 4 == 1 {
                let msg = if inputs.pitch_change > 0.0 {
                    "Collective up, rotor droop detected. Compensating."
                } else {
                    "Collective down, rotor overspeed detected. Compensating."
                };
                events.push(events::entry(tick, msg, HealthStatus::Ok));
            }
        }
        correction = (TARGET_NR_RPM - nr) * GOVERNOR_GAIN;
        nr += (TARGET_NR_RPM - nr) * ROTOR_INERTIA_FACTOR;
    }

    let mut next = *prev;
    let target_n1;
    let target_n2;

    if !prev.is_rotor_ready && fueled {
        // Spool-up: hold idle targets, ramp the rotors once the gas
        // generator is turning.
        target_n1 = IDLE_RPM_N1;
        target_n2 = IDLE_RPM_N2;

        if prev.n1_rpm > IDLE_RPM_N1 * 0.1 {
            next.nr_rpm = prev.nr_rpm + (TARGET_NR_RPM - prev.nr_rpm) * ROTOR_RAMP_FACTOR;
            next.nt_rpm = prev.nt_rpm + (TARGET_NT_RPM - prev.nt_rpm) * ROTOR_RAMP_FACTOR;
        }

        if next.nr_rpm >= TARGET_NR_RPM - 1.0 {
            next.is_rotor_ready = true;
            next.nr_rpm = TARGET_NR_RPM;
            next.nt_rpm = TARGET_NT_RPM;
            events.push(events::entry(
                tick,
                "Main and tail rotors at speed. System ready.",
                HealthStatus::Ok,
            ));
        }
    } else if prev.is_rotor_ready && fueled {
        // Governed flight: the correction rides on top of the pilot demand.
        let demanded = (inputs.throttle + correction).clamp(0.0, 110.0);
        target_n1 = IDLE_RPM_N1 + (demanded / 100.0) * (MAX_N1_RPM - IDLE_RPM_N1);
        target_n2 = IDLE_RPM_N2 + (demanded / 100.0) * (MAX_N2_RPM - IDLE_RPM_N2);

        next.nr_rpm = nr;
        // Tail rotor is geared to the main rotor.
        next.nt_rpm = nr * (TARGET_NT_RPM / TARGET_NR_RPM);
    } else {
        // Fuel exhausted or engine stopped: everything winds down.
        target_n1 = 0.0;
        target_n2 = 0.0;
        next.nr_rpm = (prev.nr_rpm * ROTOR_DECAY_FACTOR).max(0.0);
        next.nt_rpm = (prev.nt_rpm * ROTOR_DECAY_FACTOR).max(0.0);
        next.is_rotor_ready = false;
    }

    // First-order lag toward target; the AFR-enhanced law is snappier.
    let responsiveness = if inputs.afr_enhanced {
        RESPONSIVENESS_AFR
    } else {
        RESPONSIVENESS_STD
    };
    next.n1_rpm = prev.n1_rpm + (target_n1 - prev.n1_rpm) * responsiveness;
    if next.n1_rpm < 0.1 {
        next.n1_rpm = 0.0;
    }
    next.n2_rpm = prev.n2_rpm + (target_n2 - prev.n2_rpm) * responsiveness;
    if next.n2_rpm < 0.1 {
        next.n2_rpm = 0.0;
    }

    SpoolStep {
        engine: next,
        target_n1,
        target_n2,
        events,
    }
}
