//! Proportion of potential maximal gain (PMG)
//!
//! PMG rescales the treatment gain by the room left above baseline:
//! (treatment mean - baseline mean) / (maximum score - baseline mean).
//! The maximum score is the trial-list size of the series. A baseline
//! already at ceiling leaves a zero denominator and the estimate is
//! reported missing.
//!
//! The restricted variant keeps only sessions tagged `pre` on the baseline
//! side and `post` on the treatment side; untagged sessions do not count.

use crate::counts::SessionCount;
use crate::model::{GroupKey, PhaseLabels, PrePost, SubunitKey};
use crate::smd::mean;
use std::collections::{HashMap, HashSet};

/// Session filter for the two PMG variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmgVariant {
    /// All baseline and treatment sessions
    AllSessions,
    /// Only sessions carrying the pre/post tag
    PrePost,
}

/// PMG for one phoneme series; `None` when undefined
pub fn subunit_pmg(
    series: &[SessionCount],
    labels: &PhaseLabels,
    variant: PmgVariant,
) -> Option<f32> {
    let mut baseline = Vec::new();
    let mut treatment = Vec::new();
    let mut max_score = 0u32;

    for count in series {
        max_score = max_score.max(count.list_size);
        let tagged = |tag| count.prepost == Some(tag);
        if count.phase == labels.baseline
            && (variant == PmgVariant::AllSessions || tagged(PrePost::Pre))
        {
            baseline.push(count.correct as f32);
        } else if count.phase == labels.treatment
            && (variant == PmgVariant::AllSessions || tagged(PrePost::Post))
        {
            treatment.push(count.correct as f32);
        }
    }

    if baseline.is_empty() || treatment.is_empty() {
        return None;
    }

    let baseline_mean = mean(&baseline);
    let gain_ceiling = max_score as f32 - baseline_mean;
    if gain_ceiling == 0.0 {
        return None; // baseline at ceiling: no gain is measurable
    }
    Some((mean(&treatment) - baseline_mean) / gain_ceiling)
}

/// Group-level PMG: mean over the group's finite phoneme values
///
/// No SD borrowing here; repair is a d_BR-only policy.
pub fn group_pmg(
    series: &HashMap<SubunitKey, Vec<SessionCount>>,
    labels: &PhaseLabels,
    variant: PmgVariant,
) -> HashMap<GroupKey, Option<f32>> {
    let mut values: HashMap<GroupKey, Vec<f32>> = HashMap::new();
    let mut seen: HashSet<GroupKey> = HashSet::new();
    for (key, counts) in series {
        seen.insert(key.group.clone());
        if let Some(pmg) = subunit_pmg(counts, labels, variant) {
            if pmg.is_finite() {
                values.entry(key.group.clone()).or_default().push(pmg);
            }
        }
    }
    seen.into_iter()
        .map(|group| {
            let estimate = values
                .get(&group)
                .filter(|v| !v.is_empty())
                .map(|v| v.iter().sum::<f32>() / v.len() as f32);
            (group, estimate)
        })
        .collect()
}
