//! Fault-effect lookup: maps the active fault/mode variant to the bundle of
//! physical modifiers, health overrides and periodic log messages the
//! physics components consume.
//!
//! Keeping every effect in one exhaustive match makes the fault model
//! centrally auditable; adding a variant fails to compile until its effects
//! are spelled out.

use serde::{Deserialize, Serialize};

use crate::types::{ComponentId, HealthStatus};

/// Every injectable fault, plus the AFR-enhanced FADEC law which occupies
/// the same slot (mutually exclusive with any fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    None,
    SensorBiasN1,
    BlockageFuelLine,
    FailFuelProbe,
    IntermittentWiringInjector1,
    ConnectorFailureInjector2,
    TotalFuelFlowSensorFailure,
    SloshingFuelTank,
    FadecAfrEnhanced,
}

impl FaultKind {
    pub fn description(self) -> &'static str {
        match self {
            Self::None => "No active faults. System nominal.",
            Self::SensorBiasN1 => "N1 RPM sensor reporting biased values.",
            Self::BlockageFuelLine => "Partial blockage in main fuel line.",
            Self::FailFuelProbe => "Fuel quantity probe has failed.",
            Self::IntermittentWiringInjector1 => {
                "Preference injector has an intermittent connection."
            }
            Self::ConnectorFailureInjector2 => "Main injectors have a connector failure.",
            Self::TotalFuelFlowSensorFailure => "Total failure of fuel flow sensor system.",
            Self::SloshingFuelTank => "Fuel sloshing causing erratic quantity readings.",
            Self::FadecAfrEnhanced => "Switch to AFR-Enhanced FADEC logic.",
        }
    }

    /// The mode variant is not a failure; it swaps the control law.
    pub fn is_afr_enhanced(self) -> bool {
        matches!(self, Self::FadecAfrEnhanced)
    }

    /// Resolve the variant to its effect bundle for the given tick.
    ///
    /// Tick-dependence covers the N1 bias sinusoid and the intermittent
    /// wiring duty cycle; everything else is constant per variant.
    pub fn effects(self, tick: u64) -> FaultModifiers {
        let mut fx = FaultModifiers::neutral();
        match self {
            Self::None | Self::FadecAfrEnhanced => {
                if self.is_afr_enhanced() {
                    fx.periodic_log = Some(PeriodicLog {
                        cadence: 30,
                        message: "AFR+ FADEC optimizing fuel mixture.",
                        level: HealthStatus::Ok,
                    });
                }
            }
            Self::SensorBiasN1 => {
                fx.n1_bias = 0.15 * (tick as f64 * 0.5).sin();
                fx.health = &[(ComponentId::Fadec, HealthStatus::Warn)];
                fx.periodic_log = Some(PeriodicLog {
                    cadence: 20,
                    message: "N1 sensor reading fluctuates.",
                    level: HealthStatus::Warn,
                });
            }
            Self::BlockageFuelLine => {
                fx.performance = 0.6;
                fx.pressure = 0.5;
                fx.egt = 1.1;
                fx.afr = 1.2;
                fx.efficiency = 0.75;
                fx.health = &[
                    (ComponentId::FuelFilter, HealthStatus::Fault),
                    (ComponentId::HpFuelPump, HealthStatus::Warn),
                ];
                fx.periodic_log = Some(PeriodicLog {
                    cadence: 10,
                    message: "Low fuel pressure. Possible blockage in filter.",
                    level: HealthStatus::Fault,
                });
            }
            Self::FailFuelProbe => {
                fx.health = &[(ComponentId::Fadec, HealthStatus::Fault)];
                fx.periodic_log = Some(PeriodicLog {
                    cadence: 20,
                    message: "Fuel probe signal lost. Reading unreliable.",
                    level: HealthStatus::Fault,
                });
            }
            Self::IntermittentWiringInjector1 => {
                // Connection drops out on half of a four-tick cycle.
                if tick % 4 < 2 {
                    fx.performance = 0.9;
                    fx.vibration = 0.1;
                    fx.pressure = 1.05;
                    fx.cut_injector = Some(0);
                    fx.health = &[(ComponentId::PreferenceInjectors, HealthStatus::Warn)];
                    fx.periodic_log = Some(PeriodicLog {
                        cadence: 4,
                        message: "Intermittent fault on Preference Injector.",
                        level: HealthStatus::Warn,
                    });
                }
            }
            Self::ConnectorFailureInjector2 => {
                fx.performance = 0.8;
                fx.vibration = 0.25;
                fx.pressure = 1.1;
                fx.cut_injector = Some(1);
                fx.health = &[(ComponentId::MainInjectors, HealthStatus::Fault)];
                fx.periodic_log = Some(PeriodicLog {
                    cadence: 10,
                    message: "Permanent fault on Main Injectors.",
                    level: HealthStatus::Fault,
                });
            }
            Self::TotalFuelFlowSensorFailure => {
                fx.health = &[(ComponentId::Fadec, HealthStatus::Fault)];
                fx.periodic_log = Some(PeriodicLog {
                    cadence: 10,
                    message: "Primary fuel flow sensor system has failed.",
                    level: HealthStatus::Fault,
                });
            }
            Self::SloshingFuelTank => {
                fx.health = &[(ComponentId::Fadec, HealthStatus::Warn)];
                fx.periodic_log = Some(PeriodicLog {
                    cadence: 15,
                    message: "Fuel quantity sensor erratic due to sloshing.",
                    level: HealthStatus::Warn,
                });
            }
        }
        fx
    }
}

/// Rate-limited advisory tied to a fault variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicLog {
    /// Emit when `tick % cadence == 1`.
    pub cadence: u64,
    pub message: &'static str,
    pub level: HealthStatus,
}

impl PeriodicLog {
    pub fn due(&self, tick: u64) -> bool {
        tick % self.cadence == 1
    }
}

/// Effect bundle consumed by the spool governor, thermo model and health
/// registry each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultModifiers {
    /// Multiplies N1/N2, fuel flow, EGT and HP pressure.
    pub performance: f64,
    pub pressure: f64,
    pub egt: f64,
    pub afr: f64,
    pub efficiency: f64,
    /// Jitter amplitude applied to N1/N2/AFR; also degrades efficiency.
    pub vibration: f64,
    /// Additive fraction on the displayed N1 (sensor bias, not a real
    /// speed change; downstream curves use the unbiased value).
    pub n1_bias: f64,
    /// Index of an injector whose flow is forced to zero.
    pub cut_injector: Option<usize>,
    pub health: &'static [(ComponentId, HealthStatus)],
    pub periodic_log: Option<PeriodicLog>,
}

impl FaultModifiers {
    pub fn neutral() -> Self {
        Self {
            performance: 1.0,
            pressure: 1.0,
            egt: 1.0,
            afr: 1.0,
            efficiency: 1.0,
            vibration: 0.0,
            n1_bias: 0.0,
            cut_injector: None,
            health: &[],
            periodic_log: None,
        }
    }
}
