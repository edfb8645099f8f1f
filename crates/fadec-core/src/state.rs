//! The simulation aggregate and its control operations.
//!
//! The aggregate is a value type: the tick path clones it and returns a new
//! one, and control operations mutate only between ticks. Gated inputs are
//! silently ignored rather than raised as errors.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisBlock, AnalysisStatus, MaintenanceReport};
use crate::constants::*;
use crate::events;
use crate::fault::FaultKind;
use crate::fuel;
use crate::governor::EngineBlock;
use crate::health;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub is_running: bool,

    // Control inputs.
    /// 0..100.
    pub throttle: f64,
    pub last_throttle: f64,
    /// -2..15 degrees.
    pub collective_pitch: f64,
    pub last_collective_pitch: f64,

    // Engine.
    pub n1_rpm: f64,
    pub n2_rpm: f64,
    pub nr_rpm: f64,
    pub nt_rpm: f64,
    pub is_rotor_ready: bool,

    // Fuel.
    /// Probe reading, liters.
    pub fuel_quantity: f64,
    /// L/hr.
    pub fuel_flow: f64,
    pub totalizer: FuelFlowTotalizer,
    pub kalman: KalmanState,

    // Thermal.
    /// Kelvin.
    pub exhaust_temp: f64,
    /// MPa.
    pub pressure_hp: f64,
    /// Celsius.
    pub temp_fuel: f64,

    // Derived.
    pub afr: f64,
    /// 0..1.
    pub efficiency: f64,
    pub pump_extensions: [f64; 4],
    pub injector_flows: [f64; 4],

    // Fault / mode.
    pub active_fault: FaultKind,
    pub is_afr_enhanced: bool,
    pub slosh_intensity: SloshIntensity,
    pub manual_calc: ManualCalcState,

    // Health & bookkeeping.
    pub components: Vec<SystemComponent>,
    pub logs: Vec<LogEntry>,
    pub history: Vec<HistoryPoint>,
    pub analysis: AnalysisBlock,
    pub tick: u64,
}

impl SimulationState {
    /// Canonical cold-and-dark state with a single "initialized" entry.
    pub fn initial() -> Self {
        let mut state = Self::blank();
        events::push(
            &mut state.logs,
            0,
            "Digital Twin Initialized. Ready to start.",
            HealthStatus::Ok,
        );
        state
    }

    fn blank() -> Self {
        Self {
            is_running: false,
            throttle: 0.0,
            last_throttle: 0.0,
            collective_pitch: 0.0,
            last_collective_pitch: 0.0,
            n1_rpm: 0.0,
            n2_rpm: 0.0,
            nr_rpm: 0.0,
            nt_rpm: 0.0,
            is_rotor_ready: false,
            fuel_quantity: MAX_FUEL,
            fuel_flow: 0.0,
            totalizer: FuelFlowTotalizer {
                calculated_fuel: MAX_FUEL,
            },
            kalman: KalmanState {
                x: MAX_FUEL,
                p: 50.0,
                k: 0.0,
            },
            exhaust_temp: IDLE_TEMP,
            pressure_hp: 0.0,
            temp_fuel: AMBIENT_FUEL_TEMP,
            afr: 14.7,
            efficiency: 0.0,
            pump_extensions: [0.0; 4],
            injector_flows: [0.0; 4],
            active_fault: FaultKind::None,
            is_afr_enhanced: false,
            slosh_intensity: SloshIntensity::None,
            manual_calc: ManualCalcState::INACTIVE,
            components: health::initial_components(),
            logs: Vec::new(),
            history: Vec::new(),
            analysis: AnalysisBlock::idle(),
            tick: 0,
        }
    }

    /// Full reinitialization to canonical defaults.
    pub fn reset() -> Self {
        let mut state = Self::blank();
        events::push(
            &mut state.logs,
            0,
            "Digital Twin Reset. Ready to start.",
            HealthStatus::Ok,
        );
        state
    }

    // -----------------------------------------------------------------------
    // Control operations (gated, never fallible)
    // -----------------------------------------------------------------------

    pub fn toggle_running(&mut self) {
        self.is_running = !self.is_running;
        let msg = if self.is_running {
            "Simulation Started. Engine spooling up."
        } else {
            "Simulation Paused."
        };
        events::push(&mut self.logs, self.tick, msg, HealthStatus::Ok);
    }

    /// Throttle changes are dropped unless running and rotor-ready.
    pub fn set_throttle(&mut self, value: f64) {
        if !self.is_running || !self.is_rotor_ready {
            return;
        }
        self.last_throttle = self.throttle;
        self.throttle = value.clamp(0.0, 100.0);
    }

    /// Collective changes are dropped unless running and rotor-ready.
    /// `last_collective_pitch` is advanced by the tick path, not here, so
    /// the drag model sees the full per-tick delta.
    pub fn set_collective_pitch(&mut self, value: f64) {
        if !self.is_running || !self.is_rotor_ready {
            return;
        }
        self.collective_pitch = value.clamp(-2.0, 15.0);
    }

    /// Switch the active fault/mode. Effective only while running.
    ///
    /// Handles the two activation edges: the fuel-flow sensor failure arms
    /// the manual flow-rate baseline, and newly entering the sloshing fault
    /// re-anchors the Kalman filter and defaults the intensity to LOW.
    pub fn inject_fault(&mut self, fault: FaultKind) {
        if !self.is_running {
            return;
        }

        let entering_slosh = fault == FaultKind::SloshingFuelTank
            && self.active_fault != FaultKind::SloshingFuelTank;

        if fault == FaultKind::TotalFuelFlowSensorFailure {
            self.manual_calc = ManualCalcState {
                is_active: true,
                start_tick: self.tick,
                start_fuel: self.fuel_quantity,
            };
        } else if self.manual_calc.is_active {
            self.manual_calc = ManualCalcState::INACTIVE;
        }

        if entering_slosh {
            self.kalman = fuel::kalman_slosh_reset(self.totalizer.calculated_fuel);
            self.slosh_intensity = SloshIntensity::Low;
        }
        if fault != FaultKind::SloshingFuelTank {
            self.slosh_intensity = SloshIntensity::None;
        }

        self.is_afr_enhanced = fault.is_afr_enhanced();
        self.active_fault = fault;

        let (message, level) = if fault.is_afr_enhanced() {
            ("Switched to AFR-Enhanced FADEC.".to_string(), HealthStatus::Ok)
        } else {
            (
                format!("Injecting Fault: {}", fault.description()),
                HealthStatus::Warn,
            )
        };
        events::push(&mut self.logs, self.tick, &message, level);
    }

    /// Settable only while the sloshing fault is active and running.
    pub fn set_slosh_intensity(&mut self, intensity: SloshIntensity) {
        if !self.is_running || self.active_fault != FaultKind::SloshingFuelTank {
            return;
        }
        self.slosh_intensity = intensity;
        let message = format!("Sloshing intensity set to: {}", intensity.label());
        events::push(&mut self.logs, self.tick, &message, HealthStatus::Ok);
    }

    // -----------------------------------------------------------------------
    // Analysis status merges
    // -----------------------------------------------------------------------

    /// Mark an analysis in flight. No-op while one is already pending or
    /// before the first tick.
    pub fn begin_analysis(&mut self) {
        if self.analysis.status == AnalysisStatus::Pending || self.tick == 0 {
            return;
        }
        self.analysis = AnalysisBlock {
            status: AnalysisStatus::Pending,
            summary: None,
            results: Vec::new(),
            last_run_tick: self.tick,
        };
        events::push(
            &mut self.logs,
            self.tick,
            "Starting prognostic analysis of run history...",
            HealthStatus::Ok,
        );
    }

    pub fn complete_analysis(&mut self, report: MaintenanceReport) {
        let message = format!(
            "Prognostic analysis at tick {} complete.",
            self.analysis.last_run_tick
        );
        self.analysis.status = AnalysisStatus::Success;
        self.analysis.summary = Some(report.summary);
        self.analysis.results = report.results;
        events::push(&mut self.logs, self.tick, &message, HealthStatus::Ok);
    }

    /// A failed call only flips the status block; physics is untouched.
    pub fn fail_analysis(&mut self, message: &str) {
        self.analysis.status = AnalysisStatus::Error;
        self.analysis.summary = Some("Analysis failed to complete.".to_string());
        self.analysis.results = Vec::new();
        events::push(&mut self.logs, self.tick, message, HealthStatus::Fault);
    }

    // -----------------------------------------------------------------------
    // Derived readouts
    // -----------------------------------------------------------------------

    /// Manual flow-rate estimate from the armed baseline, L/hr. None while
    /// inactive or still warming up (needs more than five elapsed ticks).
    pub fn manual_flow_rate(&self, tick_ms: u64) -> Option<f64> {
        if !self.manual_calc.is_active {
            return None;
        }
        let delta_ticks = self.tick.saturating_sub(self.manual_calc.start_tick);
        if delta_ticks <= 5 {
            return None;
        }
        let delta_fuel = self.manual_calc.start_fuel - self.fuel_quantity;
        let delta_hours = delta_ticks as f64 * (tick_ms as f64 / 3_600_000.0);
        Some(delta_fuel / delta_hours)
    }

    /// Endurance in hours from ground truth. None when a fuel-sensor fault
    /// makes the readout meaningless or nothing is burning.
    pub fn endurance_hours(&self) -> Option<f64> {
        match self.active_fault {
            FaultKind::FailFuelProbe | FaultKind::TotalFuelFlowSensorFailure => None,
            _ if self.fuel_flow > 0.0 => Some(self.totalizer.calculated_fuel / self.fuel_flow),
            _ => None,
        }
    }

    pub(crate) fn engine_block(&self) -> EngineBlock {
        EngineBlock {
            n1_rpm: self.n1_rpm,
            n2_rpm: self.n2_rpm,
            nr_rpm: self.nr_rpm,
            nt_rpm: self.nt_rpm,
            is_rotor_ready: self.is_rotor_ready,
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_at_speed() -> SimulationState {
        let mut state = SimulationState::initial();
        state.is_running = true;
        state.is_rotor_ready = true;
        state.n1_rpm = IDLE_RPM_N1;
        state.n2_rpm = IDLE_RPM_N2;
        state.nr_rpm = TARGET_NR_RPM;
        state.nt_rpm = TARGET_NT_RPM;
        state.tick = 10;
        state
    }

    #[test]
    fn reset_matches_initial_except_log_text() {
        let mut initial = SimulationState::initial();
        let mut reset = SimulationState::reset();
        assert_eq!(initial.logs.len(), 1);
        assert_eq!(reset.logs[0].message, "Digital Twin Reset. Ready to start.");

        initial.logs.clear();
        reset.logs.clear();
        assert_eq!(initial, reset);
    }

    #[test]
    fn controls_gated_until_rotor_ready() {
        let mut state = SimulationState::initial();
        state.is_running = true;
        state.set_throttle(50.0);
        state.set_collective_pitch(5.0);
        assert_eq!(state.throttle, 0.0);
        assert_eq!(state.collective_pitch, 0.0);

        state.is_rotor_ready = true;
        state.set_throttle(50.0);
        state.set_collective_pitch(5.0);
        assert_eq!(state.throttle, 50.0);
        assert_eq!(state.last_throttle, 0.0);
        assert_eq!(state.collective_pitch, 5.0);
    }

    #[test]
    fn throttle_and_pitch_clamped() {
        let mut state = running_at_speed();
        state.set_throttle(140.0);
        assert_eq!(state.throttle, 100.0);
        state.set_collective_pitch(-9.0);
        assert_eq!(state.collective_pitch, -2.0);
    }

    #[test]
    fn fault_injection_requires_running() {
        let mut state = SimulationState::initial();
        state.inject_fault(FaultKind::BlockageFuelLine);
        assert_eq!(state.active_fault, FaultKind::None);

        state.is_running = true;
        state.inject_fault(FaultKind::BlockageFuelLine);
        assert_eq!(state.active_fault, FaultKind::BlockageFuelLine);
        assert_eq!(state.logs[0].level, HealthStatus::Warn);
    }

    #[test]
    fn manual_calc_arms_and_disarms_on_fault_edges() {
        let mut state = running_at_speed();
        state.fuel_quantity = 1_234.5;
        state.inject_fault(FaultKind::TotalFuelFlowSensorFailure);
        assert!(state.manual_calc.is_active);
        assert_eq!(state.manual_calc.start_tick, 10);
        assert_eq!(state.manual_calc.start_fuel, 1_234.5);

        state.inject_fault(FaultKind::None);
        assert_eq!(state.manual_calc, ManualCalcState::INACTIVE);
    }

    #[test]
    fn slosh_entry_resets_kalman_only_on_the_edge() {
        let mut state = running_at_speed();
        state.totalizer.calculated_fuel = 1_000.0;
        state.kalman = KalmanState { x: 700.0, p: 3.0, k: 0.4 };

        state.inject_fault(FaultKind::SloshingFuelTank);
        assert_eq!(state.kalman.x, 1_000.0);
        assert_eq!(state.kalman.p, 50.0);
        assert_eq!(state.kalman.k, 0.0);
        assert_eq!(state.slosh_intensity, SloshIntensity::Low);

        // Re-injecting the same fault must not re-anchor the filter.
        state.kalman.x = 900.0;
        state.inject_fault(FaultKind::SloshingFuelTank);
        assert_eq!(state.kalman.x, 900.0);

        // Leaving the fault clears the intensity.
        state.inject_fault(FaultKind::None);
        assert_eq!(state.slosh_intensity, SloshIntensity::None);
    }

    #[test]
    fn slosh_intensity_gated_on_active_fault() {
        let mut state = running_at_speed();
        state.set_slosh_intensity(SloshIntensity::High);
        assert_eq!(state.slosh_intensity, SloshIntensity::None);

        state.inject_fault(FaultKind::SloshingFuelTank);
        state.set_slosh_intensity(SloshIntensity::High);
        assert_eq!(state.slosh_intensity, SloshIntensity::High);
    }

    #[test]
    fn afr_mode_logs_ok_not_warn() {
        let mut state = running_at_speed();
        state.inject_fault(FaultKind::FadecAfrEnhanced);
        assert!(state.is_afr_enhanced);
        assert_eq!(state.logs[0].level, HealthStatus::Ok);
    }

    #[test]
    fn manual_flow_rate_warms_up_then_reports() {
        let mut state = running_at_speed();
        state.fuel_quantity = 1_000.0;
        state.inject_fault(FaultKind::TotalFuelFlowSensorFailure);
        assert_eq!(state.manual_flow_rate(500), None);

        // Ten ticks later, 2 liters burned: 2 L over 5 s -> 1440 L/hr.
        state.tick += 10;
        state.fuel_quantity = 998.0;
        let rate = state.manual_flow_rate(500).unwrap();
        assert!((rate - 1_440.0).abs() < 1e-6);
    }

    #[test]
    fn endurance_unavailable_under_sensor_faults() {
        let mut state = running_at_speed();
        state.fuel_flow = 100.0;
        state.totalizer.calculated_fuel = 200.0;
        assert!((state.endurance_hours().unwrap() - 2.0).abs() < 1e-9);

        state.inject_fault(FaultKind::FailFuelProbe);
        assert_eq!(state.endurance_hours(), None);
    }

    #[test]
    fn analysis_merge_never_touches_physics() {
        let mut state = running_at_speed();
        state.tick = 40;
        let before_n1 = state.n1_rpm;
        state.begin_analysis();
        assert_eq!(state.analysis.status, AnalysisStatus::Pending);
        state.fail_analysis("Prognostic analysis failed: empty response.");
        assert_eq!(state.analysis.status, AnalysisStatus::Error);
        assert_eq!(state.n1_rpm, before_n1);
        assert_eq!(state.logs[0].level, HealthStatus::Fault);
    }

    #[test]
    fn begin_analysis_refuses_reentry_and_fresh_state() {
        let mut state = SimulationState::initial();
        state.begin_analysis();
        assert_eq!(state.analysis.status, AnalysisStatus::Idle);

        state.tick = 5;
        state.begin_analysis();
        state.begin_analysis();
        assert_eq!(state.analysis.status, AnalysisStatus::Pending);
        assert_eq!(state.analysis.last_run_tick, 5);
    }
}
