//! Baseline-referenced standardized mean difference (d_BR)
//!
//! For each phoneme series: partition session counts into baseline and
//! treatment phases, then estimate = (treatment mean - baseline mean) /
//! baseline SD. The SD is the sample standard deviation (n-1 divisor); a
//! single baseline session yields SD = 0 by convention, not a missing value.
//! Division by a zero SD produces an IEEE non-finite estimate, which is kept:
//! it is the trigger for the donor repair pass, not a value to discard.

use crate::counts::SessionCount;
use crate::model::{GroupKey, PhaseLabels, SubunitKey};
use std::collections::HashMap;
use tracing::debug;
use trueno::Vector;

/// Effect-size estimate for one phoneme series
#[derive(Debug, Clone, PartialEq)]
pub struct SubunitEstimate {
    pub phoneme: String,
    pub baseline_mean: f32,
    /// Sample SD of baseline session counts; 0 for a constant or singleton baseline
    pub baseline_sd: f32,
    pub treatment_mean: f32,
    /// (treatment mean - baseline mean) / baseline SD; non-finite when SD = 0
    pub estimate: f32,
    /// Set by the repair pass when the SD was borrowed from a sibling
    pub imputed: bool,
}

impl SubunitEstimate {
    /// Whether the estimate survived as a usable number
    pub fn is_finite(&self) -> bool {
        self.estimate.is_finite()
    }
}

/// Mean of a count series via trueno
pub(crate) fn mean(values: &[f32]) -> f32 {
    Vector::from_slice(values).mean().unwrap_or(0.0)
}

/// Sample standard deviation (n-1 divisor)
///
/// trueno's variance() divides by n (population variance), so the sample
/// statistic is computed here. Fewer than two values yield 0 by convention.
pub(crate) fn sample_sd(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f32 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() as f32 - 1.0)).sqrt()
}

/// Split a session series into (baseline, treatment) correct-count vectors
pub(crate) fn phase_split(series: &[SessionCount], labels: &PhaseLabels) -> (Vec<f32>, Vec<f32>) {
    let mut baseline = Vec::new();
    let mut treatment = Vec::new();
    for count in series {
        if count.phase == labels.baseline {
            baseline.push(count.correct as f32);
        } else if count.phase == labels.treatment {
            treatment.push(count.correct as f32);
        }
        // other phases (maintenance, follow-up) do not feed this statistic
    }
    (baseline, treatment)
}

/// Compute the d_BR estimate for one phoneme series
///
/// Returns `None` when a phase has no sessions at all: the estimate is
/// undefined and reported missing, never fatal.
pub fn subunit_estimate(
    phoneme: &str,
    series: &[SessionCount],
    labels: &PhaseLabels,
) -> Option<SubunitEstimate> {
    let (baseline, treatment) = phase_split(series, labels);
    if baseline.is_empty() || treatment.is_empty() {
        debug!(
            phoneme,
            baseline_sessions = baseline.len(),
            treatment_sessions = treatment.len(),
            "effect size undefined: empty phase"
        );
        return None;
    }

    let baseline_mean = mean(&baseline);
    let baseline_sd = sample_sd(&baseline);
    let treatment_mean = mean(&treatment);

    Some(SubunitEstimate {
        phoneme: phoneme.to_string(),
        baseline_mean,
        baseline_sd,
        treatment_mean,
        // IEEE semantics wanted here: +/-inf or NaN when the SD is zero
        estimate: (treatment_mean - baseline_mean) / baseline_sd,
        imputed: false,
    })
}

/// Batch pass: one estimate slot per phoneme, grouped by reporting unit
///
/// Undefined series keep a `None` slot so the group still accounts for them
/// during aggregation. Slots are ordered by phoneme for deterministic output.
pub fn batch(
    series: &HashMap<SubunitKey, Vec<SessionCount>>,
    labels: &PhaseLabels,
) -> HashMap<GroupKey, Vec<(String, Option<SubunitEstimate>)>> {
    let mut groups: HashMap<GroupKey, Vec<(String, Option<SubunitEstimate>)>> = HashMap::new();
    for (key, counts) in series {
        let estimate = subunit_estimate(&key.phoneme, counts, labels);
        groups
            .entry(key.group.clone())
            .or_default()
            .push((key.phoneme.clone(), estimate));
    }
    for slots in groups.values_mut() {
        slots.sort_by(|a, b| a.0.cmp(&b.0));
    }
    groups
}
