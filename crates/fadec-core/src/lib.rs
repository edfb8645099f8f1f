//! # FADEC Core
//!
//! Deterministic simulation core of a helicopter fuel-injection digital
//! twin. The whole model advances in fixed ticks:
//! - Engine spool governor and rotor dynamics
//! - Fuel-flow / thermodynamic curves and pump kinematics
//! - Injectable fault-effect table
//! - Dual fuel-quantity estimation (totalizer truth + scalar Kalman filter)
//! - Component health registry and bounded event log
//!
//! Randomness is injected: every tick draws from a caller-supplied RNG in a
//! fixed order, so seeded runs reproduce exactly.

pub mod analysis;
pub mod constants;
pub mod events;
pub mod fault;
pub mod fuel;
pub mod governor;
pub mod health;
pub mod state;
pub mod step;
pub mod thermo;
pub mod types;

// Re-export the main surface
pub use analysis::{AnalysisBlock, AnalysisStatus, ComponentPrognosis, MaintenanceReport};
pub use constants::SIMULATION_TICK_RATE_MS;
pub use fault::FaultKind;
pub use state::SimulationState;
pub use step::step;
pub use types::{
    ComponentId, HealthStatus, HistoryPoint, KalmanState, LogEntry, SloshIntensity,
    SystemComponent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
