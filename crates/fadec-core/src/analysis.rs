//! Predictive-maintenance analysis: the status block merged into the
//! aggregate and the report shape the external collaborator returns.
//!
//! The analysis never feeds back into the physical model; a failed call
//! only flips the status block to `Error`.

use serde::{Deserialize, Serialize};

/// Where the last analysis request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// One component's prognosis. Wire field names follow the collaborator's
/// JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPrognosis {
    pub component_name: String,
    pub prediction: String,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub recommendation: String,
    /// Populated only when the collaborator's confidence is high.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_to_failure_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub summary: String,
    pub results: Vec<ComponentPrognosis>,
}

/// Analysis state carried in the simulation aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBlock {
    pub status: AnalysisStatus,
    pub summary: Option<String>,
    pub results: Vec<ComponentPrognosis>,
    pub last_run_tick: u64,
}

impl AnalysisBlock {
    pub fn idle() -> Self {
        Self {
            status: AnalysisStatus::Idle,
            summary: None,
            results: Vec::new(),
            last_run_tick: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prognosis_wire_field_names_are_camel_case() {
        let raw = r#"{
            "componentName": "Fuel Filter",
            "prediction": "Progressive clogging under sustained load.",
            "confidence": 0.82,
            "recommendation": "Inspect and replace filter element.",
            "estimatedTimeToFailureHours": 12.5
        }"#;
        let p: ComponentPrognosis = serde_json::from_str(raw).unwrap();
        assert_eq!(p.component_name, "Fuel Filter");
        assert_eq!(p.estimated_time_to_failure_hours, Some(12.5));
    }

    #[test]
    fn time_to_failure_is_optional_on_the_wire() {
        let raw = r#"{
            "componentName": "FADEC / FCU",
            "prediction": "Nominal.",
            "confidence": 0.4,
            "recommendation": "No action."
        }"#;
        let p: ComponentPrognosis = serde_json::from_str(raw).unwrap();
        assert_eq!(p.estimated_time_to_failure_hours, None);
        // And an absent estimate is not re-emitted when serializing.
        let out = serde_json::to_string(&p).unwrap();
        assert!(!out.contains("estimatedTimeToFailureHours"));
    }
}
