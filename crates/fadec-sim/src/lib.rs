//! FADEC Simulation Orchestration
//!
//! Scripted scenarios over the tick engine plus the predictive-maintenance
//! collaborator seam.

pub mod advisor;
pub mod scenario;

// Re-export main types
pub use advisor::{build_prompt, parse_report, AnalysisJob, PrognosisModel};
pub use scenario::{run, Command, Scenario, ScenarioOutcome};
