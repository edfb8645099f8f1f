//! Per-tick component health derivation.
//!
//! Statuses are rebuilt from the engine state every tick, then fault
//! overrides latch on top: once a component shows FAULT it is never talked
//! back down to OK/WARN by a later override in the same pass.

use crate::constants::MAX_FUEL;
use crate::types::{ComponentId, HealthStatus, SystemComponent};

pub fn initial_components() -> Vec<SystemComponent> {
    ComponentId::ALL
        .iter()
        .map(|&id| SystemComponent {
            id,
            status: HealthStatus::Off,
        })
        .collect()
}

/// Baseline for the tick: everything OFF, or OK while the gas generator
/// turns.
pub fn reset_baseline(components: &mut [SystemComponent], n1_rpm: f64) {
    let status = if n1_rpm > 1.0 {
        HealthStatus::Ok
    } else {
        HealthStatus::Off
    };
    for c in components.iter_mut() {
        c.status = status;
    }
}

/// Set a status without downgrading a latched FAULT.
pub fn set_status(components: &mut [SystemComponent], id: ComponentId, status: HealthStatus) {
    if let Some(c) = components.iter_mut().find(|c| c.id == id) {
        if c.status != HealthStatus::Fault {
            c.status = status;
        }
    }
}

pub fn apply_overrides(
    components: &mut [SystemComponent],
    overrides: &[(ComponentId, HealthStatus)],
) {
    for &(id, status) in overrides {
        set_status(components, id, status);
    }
}

/// Fuel-tank override independent of the active fault: while the engine is
/// turning, an empty tank is a FAULT and a low tank a WARN.
pub fn check_fuel_tank(components: &mut [SystemComponent], n1_rpm: f64, truth_fuel: f64) {
    if n1_rpm <= 1.0 {
        return;
    }
    let fuel_ratio = truth_fuel / MAX_FUEL;
    if fuel_ratio <= 0.0 {
        // Forced even over a latch: an empty tank is always a fault.
        if let Some(tank) = components.iter_mut().find(|c| c.id == ComponentId::FuelTank) {
            tank.status = HealthStatus::Fault;
        }
    } else if fuel_ratio <= 0.15 {
        set_status(components, ComponentId::FuelTank, HealthStatus::Warn);
    }
}

/// Full engine stop powers every component back down.
pub fn force_all_off(components: &mut [SystemComponent]) {
    for c in components.iter_mut() {
        c.status = HealthStatus::Off;
    }
}

pub fn status_of(components: &[SystemComponent], id: ComponentId) -> HealthStatus {
    components
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.status)
        .unwrap_or(HealthStatus::Off)
}
