//! The tick pipeline: one deterministic update of the whole aggregate.
//!
//! `step` is a pure function of the previous state, the tick period and the
//! caller-supplied RNG. Random draws happen in a fixed order every tick
//! (N1 jitter, N2 jitter, AFR jitter, then the conditional slosh noise), so
//! two runs with the same seed and input schedule produce identical traces.

use rand::Rng;

use crate::constants::*;
use crate::events;
use crate::fuel;
use crate::governor::{self, SpoolInputs};
use crate::health;
use crate::state::SimulationState;
use crate::thermo;
use crate::types::{ComponentId, HealthStatus, HistoryPoint, LogEntry};

/// Advance the simulation by one tick of `tick_ms` milliseconds.
///
/// A paused aggregate is returned unchanged.
pub fn step<R: Rng>(state: &SimulationState, tick_ms: u64, rng: &mut R) -> SimulationState {
    if !state.is_running {
        return state.clone();
    }

    let mut next = state.clone();
    next.tick += 1;
    let tick = next.tick;
    let mut fresh: Vec<LogEntry> = Vec::new();

    // Collective delta is consumed once per tick.
    let pitch_change = state.collective_pitch - state.last_collective_pitch;
    next.last_collective_pitch = state.collective_pitch;

    // 1. Health baseline from last tick's gas-generator speed.
    health::reset_baseline(&mut next.components, state.n1_rpm);

    // 2. Governor, rotor dynamics and N1/N2 lag.
    let spool = governor::advance(
        &state.engine_block(),
        &SpoolInputs {
            throttle: state.throttle,
            pitch_change,
            fuel_remaining: state.totalizer.calculated_fuel,
            afr_enhanced: state.is_afr_enhanced,
        },
        tick,
    );
    fresh.extend(spool.events);
    next.nr_rpm = spool.engine.nr_rpm;
    next.nt_rpm = spool.engine.nt_rpm;
    next.is_rotor_ready = spool.engine.is_rotor_ready;

    // 3. Base curves from the unbiased lagged N1. The sensor-bias fault
    //    shifts only the displayed speed further down.
    let lagged_n1 = spool.engine.n1_rpm;
    let mut fuel_flow = thermo::base_fuel_flow(lagged_n1);
    let mut pressure = thermo::base_pressure(lagged_n1);
    let mut egt = thermo::base_egt(lagged_n1);

    // 4. Fault effects: health overrides, periodic advisories, modifiers.
    let fx = state.active_fault.effects(tick);
    health::apply_overrides(&mut next.components, fx.health);
    if let Some(log) = fx.periodic_log {
        if log.due(tick) {
            fresh.push(events::entry(tick, log.message, log.level));
        }
    }

    let throttle_diff = (state.throttle - state.last_throttle).abs();
    let afr = thermo::base_afr(state.is_afr_enhanced, throttle_diff, fx.afr);
    let mut efficiency = 0.35 * fx.efficiency;
    let mut performance = fx.performance;
    pressure *= fx.pressure;
    egt *= fx.egt;

    let mut n1 = lagged_n1 * (1.0 + fx.n1_bias);
    let mut n2 = spool.engine.n2_rpm;

    // 5. Vibration jitter. Draws happen every tick, even at zero amplitude,
    //    so the random stream stays aligned across fault changes.
    n1 *= 1.0 + fx.vibration * (rng.gen::<f64>() - 0.5);
    n2 *= 1.0 + fx.vibration * (rng.gen::<f64>() - 0.5);
    let afr_jitter = 1.0 + fx.vibration * (rng.gen::<f64>() - 0.1);

    // 6. The AFR-enhanced law burns leaner and responds crisper.
    if state.is_afr_enhanced {
        fuel_flow *= 0.92;
        performance *= 1.05;
        efficiency = 0.38;
    }

    next.n1_rpm = n1 * performance;
    next.n2_rpm = n2 * performance;
    next.fuel_flow = fuel_flow * performance;
    next.exhaust_temp = egt * performance;
    next.pressure_hp = pressure * performance;
    next.afr = afr * afr_jitter;
    next.efficiency = (efficiency - fx.vibration).max(0.0);

    // 7. Pump and injector kinematics off the displayed N1, with wiring
    //    faults cutting individual injectors after the fact.
    let (extensions, mut flows) = thermo::pump_kinematics(tick, next.n1_rpm);
    if let Some(i) = fx.cut_injector {
        flows[i] = 0.0;
    }
    next.pump_extensions = extensions;
    next.injector_flows = flows;

    // 8. Fuel temperature trails last tick's EGT.
    next.temp_fuel = thermo::fuel_temp_step(state.temp_fuel, state.exhaust_temp);

    // 9. Ground truth: totalizer integrates the new flow over the tick.
    next.totalizer.calculated_fuel =
        fuel::totalize(state.totalizer.calculated_fuel, next.fuel_flow, tick_ms);
    health::check_fuel_tank(&mut next.components, n1, next.totalizer.calculated_fuel);

    // 10. Probe reading and the Kalman estimate fusing it.
    let (reading, r) = fuel::sensor_reading(
        next.totalizer.calculated_fuel,
        state.active_fault,
        state.slosh_intensity,
        rng,
    );
    next.fuel_quantity = reading;
    next.kalman = fuel::kalman_update(state.kalman, reading, r);

    // 11. Depletion edge: the tick the truth hits zero kills the throttle.
    if next.totalizer.calculated_fuel <= 0.0 && state.totalizer.calculated_fuel > 0.0 {
        next.throttle = 0.0;
        fresh.push(events::entry(
            tick,
            "Fuel depleted. Engine shutting down.",
            HealthStatus::Fault,
        ));
    }

    // 12. Engine-off edge: N1 decayed through 1 RPM with a zero target.
    if next.n1_rpm < 1.0 && state.n1_rpm > 0.0 && spool.target_n1 == 0.0 {
        if state.n1_rpm >= 1.0 {
            fresh.push(events::entry(tick, "Engine Off.", HealthStatus::Ok));
        }
        next.n1_rpm = 0.0;
        next.n2_rpm = 0.0;
        next.nr_rpm = 0.0;
        next.nt_rpm = 0.0;
        next.fuel_flow = 0.0;
        next.pressure_hp = 0.0;
        next.afr = 14.7;
        next.efficiency = 0.0;
        next.injector_flows = [0.0; 4];
        health::force_all_off(&mut next.components);
    }

    // 13. Thermal decay while nothing burns.
    if next.fuel_flow == 0.0 {
        next.exhaust_temp = (state.exhaust_temp - 10.0).max(IDLE_TEMP);
        next.temp_fuel = (state.temp_fuel - 0.5).max(AMBIENT_FUEL_TEMP);
    }

    // 14. Over-temperature advisory fires every tick while exceeded.
    if next.exhaust_temp > MAX_TEMP * 0.95 {
        health::set_status(&mut next.components, ComponentId::Fadec, HealthStatus::Warn);
        fresh.push(events::entry(
            tick,
            "Exhaust temperature nearing critical limit!",
            HealthStatus::Warn,
        ));
    }

    events::merge(&mut next.logs, fresh);

    events::record_history(
        &mut next.history,
        HistoryPoint {
            tick,
            throttle: next.throttle,
            afr: next.afr,
            efficiency: next.efficiency * 100.0,
            injector1_flow: next.injector_flows[0],
            pressure_hp: next.pressure_hp,
            fuel_flow: next.fuel_flow,
            exhaust_temp: next.exhaust_temp,
            kalman_gain: next.kalman.k,
            kalman_filter_qty: next.kalman.x,
        },
    );

    next
}
