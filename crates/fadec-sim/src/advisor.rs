//! Predictive-maintenance collaborator seam.
//!
//! The twin hands a frozen snapshot of the run to an external prognostic
//! model and merges the parsed report back through the aggregate's analysis
//! operations. The model is behind a trait so tests (and offline runs) can
//! script it; nothing here ever blocks the tick loop.

use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use fadec_core::constants::MAX_TEMP;
use fadec_core::{ComponentPrognosis, HealthStatus, MaintenanceReport, SimulationState};

/// The fallible external call. Takes the rendered prompt, returns the raw
/// response body (expected to be the report JSON).
pub trait PrognosisModel {
    fn analyze(&self, prompt: &str) -> Result<String>;
}

/// Wire shape of the model's response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReport {
    overall_summary: String,
    predictions: Vec<ComponentPrognosis>,
}

// ---------------------------------------------------------------------------
// Prompt building
// ---------------------------------------------------------------------------

/// Stress metrics distilled from the run history.
struct RunMetrics {
    stress_cycles: usize,
    thermal_events: usize,
    trend_summary: String,
}

fn run_metrics(state: &SimulationState) -> RunMetrics {
    let history = &state.history;

    let stress_cycles = history
        .windows(2)
        .filter(|w| (w[1].throttle - w[0].throttle).abs() > 20.0)
        .count();
    let thermal_events = history
        .iter()
        .filter(|p| p.exhaust_temp > MAX_TEMP * 0.95)
        .count();

    let mut trend_summary = String::from("Nominal.");
    if history.len() > 10 {
        let mean_eff =
            history.iter().map(|p| p.efficiency).sum::<f64>() / history.len() as f64;
        let final_eff = history.last().map(|p| p.efficiency).unwrap_or(0.0);
        if final_eff < mean_eff * 0.9 {
            trend_summary = String::from("Efficiency degradation detected over the run.");
        }

        let mean_afr = history.iter().map(|p| p.afr).sum::<f64>() / history.len() as f64;
        let afr_var = history
            .iter()
            .map(|p| (p.afr - mean_afr).powi(2))
            .sum::<f64>()
            / history.len() as f64;
        if afr_var.sqrt() > 0.8 {
            trend_summary.push_str(" Significant Air-Fuel Ratio instability observed.");
        }
    }

    RunMetrics {
        stress_cycles,
        thermal_events,
        trend_summary,
    }
}

/// Render the post-run analysis prompt from a frozen snapshot.
pub fn build_prompt(state: &SimulationState, tick_ms: u64) -> String {
    let metrics = run_metrics(state);
    let operating_hours = state.tick as f64 * tick_ms as f64 / 3_600_000.0;

    let stressed: Vec<String> = state
        .components
        .iter()
        .filter(|c| matches!(c.status, HealthStatus::Warn | HealthStatus::Fault))
        .map(|c| format!("{} ({})", c.id.label(), c.status.label()))
        .collect();
    let stressed = if stressed.is_empty() {
        String::from("None")
    } else {
        stressed.join(", ")
    };

    format!(
        "You are a Prognostic Reasoning Module for a helicopter engine's digital twin. \
You are performing a post-run analysis based on the complete operational history since \
the last system reset. Your task is to synthesize this information to provide realistic, \
actionable predictive maintenance advice.\n\
\n\
**Post-Run Analysis Input:**\n\
\n\
1.  **Trend Analysis (from run history):**\n\
    *   **Performance Trend:** {trend}\n\
    *   **Mechanical Stress Cycles (High d-Throttle):** {cycles} cycles over the entire run.\n\
    *   **Thermal Stress Events (EGT > {egt_limit:.0}K):** {thermal} events over the entire run.\n\
\n\
2.  **Final System State (at pause):**\n\
    *   **Total Operating Time:** {hours:.2} hours\n\
    *   **Active Fault:** {fault}\n\
    *   **Engine Speed (N1):** {n1:.0} RPM\n\
    *   **Exhaust Gas Temp (EGT):** {egt:.0} K\n\
    *   **HP Fuel Pressure:** {pressure:.2} MPa\n\
    *   **Components with Active Alerts at end of run:** {stressed}\n\
\n\
**Your Task:**\n\
\n\
Based on the full operational history and final state, generate a comprehensive analysis.\n\
1.  First, create a high-level **overallSummary** (one or two sentences) of the entire run's health.\n\
2.  Then, identify the 2-3 components most likely to require future maintenance. For each \
component, provide a specific prediction, confidence, and recommendation.\n\
\n\
Return your complete analysis as a single JSON object with the fields `overallSummary` and \
`predictions`. Be concise and professional.\n",
        trend = metrics.trend_summary,
        cycles = metrics.stress_cycles,
        egt_limit = MAX_TEMP * 0.95,
        thermal = metrics.thermal_events,
        hours = operating_hours,
        fault = state.active_fault.description(),
        n1 = state.n1_rpm,
        egt = state.exhaust_temp,
        pressure = state.pressure_hp,
        stressed = stressed,
    )
}

// ---------------------------------------------------------------------------
// Report parsing
// ---------------------------------------------------------------------------

/// Parse and validate the model's raw response.
pub fn parse_report(raw: &str) -> Result<MaintenanceReport> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("received an empty response from the prognostic model");
    }
    let wire: WireReport = serde_json::from_str(trimmed)
        .context("could not interpret the prognostic model response")?;
    for p in &wire.predictions {
        if !(0.0..=1.0).contains(&p.confidence) {
            bail!(
                "prognosis for '{}' carries an out-of-range confidence {}",
                p.component_name,
                p.confidence
            );
        }
    }
    Ok(MaintenanceReport {
        summary: wire.overall_summary,
        results: wire.predictions,
    })
}

// ---------------------------------------------------------------------------
// Background invocation
// ---------------------------------------------------------------------------

/// A single analysis call running on a background thread.
///
/// The snapshot is rendered to the prompt up front; the job owns nothing of
/// the live aggregate. Poll once per tick and merge the outcome through
/// `complete_analysis`/`fail_analysis`.
pub struct AnalysisJob {
    rx: mpsc::Receiver<Result<MaintenanceReport>>,
}

impl AnalysisJob {
    pub fn spawn<M>(model: M, state: &SimulationState, tick_ms: u64) -> Self
    where
        M: PrognosisModel + Send + 'static,
    {
        let prompt = build_prompt(state, tick_ms);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let outcome = model.analyze(&prompt).and_then(|raw| parse_report(&raw));
            // The receiver may be gone if the run ended; nothing to do then.
            let _ = tx.send(outcome);
        });
        Self { rx }
    }

    /// Non-blocking check for completion.
    pub fn poll(&self) -> Option<Result<MaintenanceReport>> {
        self.rx.try_recv().ok()
    }

    /// Block until the model answers, then merge into the aggregate.
    pub fn finish_into(self, state: &mut SimulationState) {
        match self.rx.recv() {
            Ok(Ok(report)) => {
                info!(results = report.results.len(), "prognostic analysis complete");
                state.complete_analysis(report);
            }
            Ok(Err(err)) => state.fail_analysis(&format!("Prognostic analysis failed: {err:#}")),
            Err(_) => state.fail_analysis("Prognostic analysis worker disappeared."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{run, Command, Scenario};
    use fadec_core::{AnalysisStatus, FaultKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Scripted(&'static str);

    impl PrognosisModel for Scripted {
        fn analyze(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Unreachable;

    impl PrognosisModel for Unreachable {
        fn analyze(&self, _prompt: &str) -> Result<String> {
            bail!("connection refused")
        }
    }

    const GOOD_REPORT: &str = r#"{
        "overallSummary": "Stressful run with sustained thermal load.",
        "predictions": [{
            "componentName": "Fuel Filter",
            "prediction": "Progressive clogging leading to pressure drop.",
            "confidence": 0.9,
            "recommendation": "Schedule filter replacement within next 10 operating hours.",
            "estimatedTimeToFailureHours": 8.0
        }]
    }"#;

    fn stressed_state() -> SimulationState {
        // Both throttle swings land inside the capped history window.
        let scenario = Scenario::new(220, 500)
            .at(130, Command::SetThrottle(90.0))
            .at(170, Command::SetThrottle(10.0))
            .at(190, Command::InjectFault(FaultKind::BlockageFuelLine))
            .at(219, Command::Pause);
        run(&scenario, &mut StdRng::seed_from_u64(11)).state
    }

    #[test]
    fn prompt_reflects_run_metrics_and_final_state() {
        let state = stressed_state();
        let prompt = build_prompt(&state, 500);
        // Two >20% throttle swings happened mid-run.
        assert!(prompt.contains("2 cycles over the entire run"));
        assert!(prompt.contains("Partial blockage in main fuel line."));
        assert!(prompt.contains("Fuel Filter (FAULT)"));
        assert!(prompt.contains("Total Operating Time:** 0.03 hours"));
    }

    #[test]
    fn quiet_history_reads_nominal() {
        let outcome = run(&Scenario::new(30, 500), &mut StdRng::seed_from_u64(4));
        let prompt = build_prompt(&outcome.state, 500);
        assert!(prompt.contains("Performance Trend:** Nominal."));
        assert!(prompt.contains("Components with Active Alerts at end of run:** None"));
    }

    #[test]
    fn valid_report_round_trips() {
        let report = parse_report(GOOD_REPORT).unwrap();
        assert_eq!(report.summary, "Stressful run with sustained thermal load.");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].estimated_time_to_failure_hours, Some(8.0));
    }

    #[test]
    fn empty_and_malformed_payloads_are_errors() {
        assert!(parse_report("   ").is_err());
        assert!(parse_report("not json").is_err());
        // Structurally valid JSON missing the required fields.
        assert!(parse_report(r#"{"predictions": []}"#).is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let raw = r#"{
            "overallSummary": "ok",
            "predictions": [{
                "componentName": "FADEC / FCU",
                "prediction": "n/a",
                "confidence": 1.4,
                "recommendation": "n/a"
            }]
        }"#;
        assert!(parse_report(raw).is_err());
    }

    #[test]
    fn background_job_merges_success_without_touching_physics() {
        let mut state = stressed_state();
        state.begin_analysis();
        let fuel_before = state.totalizer.calculated_fuel;

        let job = AnalysisJob::spawn(Scripted(GOOD_REPORT), &state, 500);
        job.finish_into(&mut state);

        assert_eq!(state.analysis.status, AnalysisStatus::Success);
        assert_eq!(state.analysis.results.len(), 1);
        assert_eq!(state.totalizer.calculated_fuel, fuel_before);
    }

    #[test]
    fn background_job_merges_failure_as_error_status() {
        let mut state = stressed_state();
        state.begin_analysis();

        let job = AnalysisJob::spawn(Unreachable, &state, 500);
        job.finish_into(&mut state);

        assert_eq!(state.analysis.status, AnalysisStatus::Error);
        assert_eq!(
            state.analysis.summary.as_deref(),
            Some("Analysis failed to complete.")
        );
    }
}
