//! JSON report format for machine parsing
//!
//! serde_json refuses non-finite floats, so any estimate still non-finite
//! after repair is mapped to `null` before serialization; the per-phoneme
//! detail keeps enough context to see why.

use crate::analysis::{AnalysisReport, GroupReport};
use crate::comparison::PhaseComparison;
use crate::model::{Condition, ItemType};
use crate::smd::SubunitEstimate;
use serde::{Deserialize, Serialize};

/// Per-phoneme detail inside a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSubunit {
    pub phoneme: String,
    /// d_BR estimate; null when undefined or still degenerate
    pub estimate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_mean: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_sd: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_mean: Option<f32>,
    pub imputed: bool,
}

/// One reported group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonGroup {
    pub participant: String,
    pub condition: Condition,
    pub item_type: ItemType,
    /// Group d_BR; null when every phoneme stayed degenerate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smd: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_sd: Option<f32>,
    pub imputed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmg: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tau: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<PhaseComparison>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subunits: Vec<JsonSubunit>,
}

/// Top-level JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub n_observations: usize,
    pub n_groups: usize,
    pub groups: Vec<JsonGroup>,
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

fn json_subunit(phoneme: &str, estimate: &Option<SubunitEstimate>) -> JsonSubunit {
    match estimate {
        Some(est) => JsonSubunit {
            phoneme: phoneme.to_string(),
            estimate: finite(est.estimate),
            baseline_mean: Some(est.baseline_mean),
            baseline_sd: Some(est.baseline_sd),
            treatment_mean: Some(est.treatment_mean),
            imputed: est.imputed,
        },
        None => JsonSubunit {
            phoneme: phoneme.to_string(),
            estimate: None,
            baseline_mean: None,
            baseline_sd: None,
            treatment_mean: None,
            imputed: false,
        },
    }
}

fn json_group(row: &GroupReport) -> JsonGroup {
    let (smd, baseline_sd, imputed, subunits) = match &row.smd {
        Some(est) => (
            est.estimate.and_then(finite),
            est.baseline_sd.and_then(finite),
            est.imputed,
            est.subunits
                .iter()
                .map(|(phoneme, slot)| json_subunit(phoneme, slot))
                .collect(),
        ),
        None => (None, None, false, Vec::new()),
    };
    JsonGroup {
        participant: row.group.participant.clone(),
        condition: row.group.condition,
        item_type: row.group.item_type,
        smd,
        baseline_sd,
        imputed,
        pmg: row.pmg.and_then(finite),
        tau: row.tau.and_then(finite),
        comparison: row.comparison.clone(),
        subunits,
    }
}

/// Build the JSON report from an analysis result
pub fn json_report(report: &AnalysisReport) -> JsonReport {
    JsonReport {
        n_observations: report.n_observations,
        n_groups: report.n_groups,
        groups: report.groups.iter().map(json_group).collect(),
    }
}

/// Serialize the analysis result as pretty JSON
pub fn to_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json_report(report))
}
