//! Shared value types of the simulation aggregate.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Per-component status, also reused as the severity level of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Off,
    Ok,
    Warn,
    Fault,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Fault => "FAULT",
        }
    }
}

/// Every monitored component of the fuel-injection system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentId {
    FuelTank,
    Fadec,
    StartPurgeValve,
    FuelPressureTransmitter,
    FuelFilter,
    HpFuelPump,
    FuelPumpUnits,
    CombustionApValve,
    FulvalveAssembly,
    ManualPurgeValve,
    PressurizingValve,
    StopPurgeValve,
    StartElectroValve,
    PreferenceInjectors,
    MainInjectors,
    StartMainInjectors,
    P3Injectors,
}

impl ComponentId {
    pub const ALL: [ComponentId; 17] = [
        Self::FuelTank,
        Self::Fadec,
        Self::StartPurgeValve,
        Self::FuelPressureTransmitter,
        Self::FuelFilter,
        Self::HpFuelPump,
        Self::FuelPumpUnits,
        Self::CombustionApValve,
        Self::FulvalveAssembly,
        Self::ManualPurgeValve,
        Self::PressurizingValve,
        Self::StopPurgeValve,
        Self::StartElectroValve,
        Self::PreferenceInjectors,
        Self::MainInjectors,
        Self::StartMainInjectors,
        Self::P3Injectors,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::FuelTank => "Fuel Tank",
            Self::Fadec => "FADEC / FCU",
            Self::StartPurgeValve => "Start Purge Valve",
            Self::FuelPressureTransmitter => "Fuel Pressure Transmitter",
            Self::FuelFilter => "Fuel Filter",
            Self::HpFuelPump => "HP Fuel Pump",
            Self::FuelPumpUnits => "Fuel Pump Units",
            Self::CombustionApValve => "Combustion AP Valve",
            Self::FulvalveAssembly => "Fulvalve Assembly",
            Self::ManualPurgeValve => "Manual Purge Valve",
            Self::PressurizingValve => "Pressurizing Valve",
            Self::StopPurgeValve => "Stop Purge Valve",
            Self::StartElectroValve => "Start Electro Valve",
            Self::PreferenceInjectors => "Preference Injectors",
            Self::MainInjectors => "Main Injectors",
            Self::StartMainInjectors => "Start/Main Injectors",
            Self::P3Injectors => "P3 Injectors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemComponent {
    pub id: ComponentId,
    pub status: HealthStatus,
}

// ---------------------------------------------------------------------------
// Slosh intensity
// ---------------------------------------------------------------------------

/// Noise level of the fuel-quantity probe while the tank is sloshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SloshIntensity {
    None,
    Low,
    Medium,
    High,
}

impl SloshIntensity {
    /// Peak-to-peak amplitude of the sensor fluctuation, liters.
    pub fn amplitude(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 30.0,
            Self::Medium => 80.0,
            Self::High => 150.0,
        }
    }

    /// Measurement-noise covariance matching the amplitude (A^2 / 12).
    pub fn measurement_noise(self) -> f64 {
        match self {
            Self::None => crate::constants::KALMAN_R_DEFAULT,
            Self::Low => 75.0,
            Self::Medium => 533.0,
            Self::High => 1_875.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW (Forward Flight)",
            Self::Medium => "MEDIUM (Banking Turn)",
            Self::High => "HIGH (Aggressive Maneuver)",
        }
    }
}

// ---------------------------------------------------------------------------
// Bookkeeping records
// ---------------------------------------------------------------------------

/// Human-readable event, stamped with the tick it was emitted on.
///
/// The core never reads the wall clock; presentation layers may translate
/// ticks into timestamps using the tick period they drive the engine with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tick: u64,
    pub message: String,
    pub level: HealthStatus,
}

/// One chart sample per tick (ring-capped).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub tick: u64,
    pub throttle: f64,
    pub afr: f64,
    /// Stored as a percentage.
    pub efficiency: f64,
    pub injector1_flow: f64,
    pub pressure_hp: f64,
    pub fuel_flow: f64,
    pub exhaust_temp: f64,
    pub kalman_gain: f64,
    pub kalman_filter_qty: f64,
}

/// Scalar Kalman filter state for the fuel-quantity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanState {
    /// Estimated fuel quantity, liters.
    pub x: f64,
    /// Estimate covariance.
    pub p: f64,
    /// Last Kalman gain.
    pub k: f64,
}

/// Fuel-remaining integrator treated as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelFlowTotalizer {
    pub calculated_fuel: f64,
}

/// Baseline for the externally-computed manual flow-rate estimate, armed
/// while the fuel-flow sensor system is failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualCalcState {
    pub is_active: bool,
    pub start_tick: u64,
    pub start_fuel: f64,
}

impl ManualCalcState {
    pub const INACTIVE: ManualCalcState = ManualCalcState {
        is_active: false,
        start_tick: 0,
        start_fuel: 0.0,
    };
}
