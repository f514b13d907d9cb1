//! Batch analysis orchestration
//!
//! Runs the two-stage pipeline over an observation table: session tally,
//! per-phoneme d_BR batch, donor repair, group aggregation, then the
//! supplementary families (PMG, Tau) and optional Welch diagnostics. Groups
//! are independent throughout; the only ordering constraint is that repair
//! sees all of a group's phonemes before choosing a donor.

use crate::comparison::{compare_phases, PhaseComparison};
use crate::counts::{tally, SessionCount};
use crate::model::{GroupKey, Observation, PhaseLabels, SubunitKey};
use crate::pmg::{group_pmg, PmgVariant};
use crate::repair::{repair_and_aggregate, GroupEstimate};
use crate::smd::{batch, phase_split};
use crate::tau::{group_tau, TauVariant};
use std::collections::HashMap;
use tracing::info;

/// Which statistics a run computes
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub labels: PhaseLabels,
    pub smd: bool,
    pub pmg: bool,
    pub tau: bool,
    pub pmg_variant: PmgVariant,
    pub tau_variant: TauVariant,
    pub compare: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            labels: PhaseLabels::default(),
            smd: true,
            pmg: true,
            tau: true,
            pmg_variant: PmgVariant::AllSessions,
            tau_variant: TauVariant::Plain,
            compare: false,
        }
    }
}

/// One reported row: a group and every statistic computed for it
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: GroupKey,
    pub smd: Option<GroupEstimate>,
    pub pmg: Option<f32>,
    pub tau: Option<f32>,
    pub comparison: Option<PhaseComparison>,
}

/// Full analysis result
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub options: AnalysisOptions,
    pub n_observations: usize,
    pub n_groups: usize,
    pub groups: Vec<GroupReport>,
}

/// Run the batch pipeline over an observation table
pub fn analyze(observations: &[Observation], options: &AnalysisOptions) -> AnalysisReport {
    let series = tally(observations);

    let smd_by_group: HashMap<GroupKey, GroupEstimate> = if options.smd {
        repair_and_aggregate(batch(&series, &options.labels))
            .into_iter()
            .map(|est| (est.group.clone(), est))
            .collect()
    } else {
        HashMap::new()
    };

    let pmg_by_group = if options.pmg {
        group_pmg(&series, &options.labels, options.pmg_variant)
    } else {
        HashMap::new()
    };

    let tau_by_group = if options.tau {
        group_tau(&series, &options.labels, options.tau_variant)
    } else {
        HashMap::new()
    };

    let comparison_by_group = if options.compare {
        phase_comparisons(&series, &options.labels)
    } else {
        HashMap::new()
    };

    let mut keys: Vec<GroupKey> = series.keys().map(|k| k.group.clone()).collect();
    keys.sort();
    keys.dedup();

    let groups: Vec<GroupReport> = keys
        .into_iter()
        .map(|group| GroupReport {
            smd: smd_by_group.get(&group).cloned(),
            pmg: pmg_by_group.get(&group).copied().flatten(),
            tau: tau_by_group.get(&group).copied().flatten(),
            comparison: comparison_by_group.get(&group).cloned(),
            group,
        })
        .collect();

    let imputed = groups
        .iter()
        .filter(|g| g.smd.as_ref().is_some_and(|s| s.imputed))
        .count();
    info!(
        observations = observations.len(),
        groups = groups.len(),
        imputed_groups = imputed,
        "analysis complete"
    );

    AnalysisReport {
        options: options.clone(),
        n_observations: observations.len(),
        n_groups: groups.len(),
        groups,
    }
}

/// Welch comparison per group over counts pooled across its phonemes
fn phase_comparisons(
    series: &HashMap<SubunitKey, Vec<SessionCount>>,
    labels: &PhaseLabels,
) -> HashMap<GroupKey, PhaseComparison> {
    let mut pooled: HashMap<GroupKey, (Vec<f32>, Vec<f32>)> = HashMap::new();
    for (key, counts) in series {
        let (baseline, treatment) = phase_split(counts, labels);
        let entry = pooled.entry(key.group.clone()).or_default();
        entry.0.extend(baseline);
        entry.1.extend(treatment);
    }
    pooled
        .into_iter()
        .filter_map(|(group, (baseline, treatment))| {
            compare_phases(&baseline, &treatment).map(|cmp| (group, cmp))
        })
        .collect()
}
