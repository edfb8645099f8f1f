//! Reference configuration for the simulated engine and fuel system.
//!
//! These values are tuned for plausible dashboard behavior, not taken from
//! certification data.

/// External tick cadence in the reference configuration (2 Hz).
pub const SIMULATION_TICK_RATE_MS: u64 = 500;

// ---------------------------------------------------------------------------
// Engine / rotor limits
// ---------------------------------------------------------------------------
pub const MAX_N1_RPM: f64 = 52_000.0;
pub const MAX_N2_RPM: f64 = 21_000.0;
/// Main rotor at 100%.
pub const TARGET_NR_RPM: f64 = 273.0;
/// Tail rotor at 100%.
pub const TARGET_NT_RPM: f64 = 1_303.0;
pub const IDLE_RPM_N1: f64 = 33_800.0; // 65% of MAX_N1_RPM
pub const IDLE_RPM_N2: f64 = 14_700.0; // 70% of MAX_N2_RPM

// ---------------------------------------------------------------------------
// Fuel & thermal limits
// ---------------------------------------------------------------------------
/// Tank capacity, liters.
pub const MAX_FUEL: f64 = 1_400.0;
/// Kelvin (20 C).
pub const IDLE_TEMP: f64 = 293.0;
/// Kelvin.
pub const MAX_TEMP: f64 = 950.0;
pub const MAX_PRESSURE_MPA: f64 = 8.0;
/// Celsius.
pub const MAX_FUEL_TEMP: f64 = 80.0;
/// Celsius.
pub const AMBIENT_FUEL_TEMP: f64 = 20.0;

// ---------------------------------------------------------------------------
// Governor tuning
// ---------------------------------------------------------------------------
// Tuned constants with no physical derivation; preserved verbatim from the
// plant model this twin was calibrated against.

/// Proportional gain of the rotor-speed governor.
pub const GOVERNOR_GAIN: f64 = 0.1;
/// First-order ramp factor for rotor spool-up.
pub const ROTOR_RAMP_FACTOR: f64 = 0.08;
/// Instantaneous rotor RPM drop per degree of sudden collective change.
pub const PITCH_DRAG_SENSITIVITY: f64 = 4.0;
/// Inertial pull of the rotor toward target RPM.
pub const ROTOR_INERTIA_FACTOR: f64 = 0.1;
/// Geometric rotor decay per tick once fuel or the engine is gone.
pub const ROTOR_DECAY_FACTOR: f64 = 0.98;
/// N1/N2 lag coefficient, standard FADEC law.
pub const RESPONSIVENESS_STD: f64 = 0.25;
/// N1/N2 lag coefficient, AFR-enhanced FADEC law.
pub const RESPONSIVENESS_AFR: f64 = 0.4;

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------
/// Process-noise covariance of the fuel-quantity filter.
pub const KALMAN_Q: f64 = 1.0;
/// Measurement-noise covariance when the tank is not sloshing.
pub const KALMAN_R_DEFAULT: f64 = 35.0;
/// Erroneous constant reported by a failed fuel probe, liters.
pub const FAILED_PROBE_READING: f64 = 735.5;

/// Bounded-ring capacity shared by the history and log buffers.
pub const RING_CAPACITY: usize = 100;
