//! Tau-U non-overlap effect size
//!
//! Pairwise dominance between phases: every (baseline, treatment) session
//! pair contributes +1 when the treatment count is higher, -1 when lower,
//! 0 on a tie. Tau_AB divides the pair sum S by the number of pairs. The
//! trend-corrected variant (Tau-U) additionally subtracts the baseline's
//! own Kendall S, discounting improvement already underway before
//! treatment; its magnitude can legitimately exceed 1.

use crate::counts::SessionCount;
use crate::model::{GroupKey, PhaseLabels, SubunitKey};
use crate::smd::phase_split;
use std::collections::{HashMap, HashSet};

fn sign(delta: f32) -> i64 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

/// Pair sum between phases: S_AB
fn pair_sum(baseline: &[f32], treatment: &[f32]) -> i64 {
    let mut s = 0i64;
    for a in baseline {
        for b in treatment {
            s += sign(b - a);
        }
    }
    s
}

/// Kendall S within one phase (session order)
fn trend_sum(values: &[f32]) -> i64 {
    let mut s = 0i64;
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            s += sign(values[j] - values[i]);
        }
    }
    s
}

/// Plain phase non-overlap: Tau_AB = S_AB / (n_A * n_B)
pub fn tau_ab(baseline: &[f32], treatment: &[f32]) -> Option<f32> {
    if baseline.is_empty() || treatment.is_empty() {
        return None;
    }
    let pairs = (baseline.len() * treatment.len()) as f32;
    Some(pair_sum(baseline, treatment) as f32 / pairs)
}

/// Trend-corrected Tau-U = (S_AB - S_A) / (n_A * n_B)
pub fn tau_u(baseline: &[f32], treatment: &[f32]) -> Option<f32> {
    if baseline.is_empty() || treatment.is_empty() {
        return None;
    }
    let pairs = (baseline.len() * treatment.len()) as f32;
    let s = pair_sum(baseline, treatment) - trend_sum(baseline);
    Some(s as f32 / pairs)
}

/// Which Tau statistic to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TauVariant {
    /// Plain phase non-overlap
    Plain,
    /// Baseline-trend corrected
    TrendCorrected,
}

/// Tau for one phoneme series
pub fn subunit_tau(
    series: &[SessionCount],
    labels: &PhaseLabels,
    variant: TauVariant,
) -> Option<f32> {
    let (baseline, treatment) = phase_split(series, labels);
    match variant {
        TauVariant::Plain => tau_ab(&baseline, &treatment),
        TauVariant::TrendCorrected => tau_u(&baseline, &treatment),
    }
}

/// Group-level Tau: mean over the group's defined phoneme values
pub fn group_tau(
    series: &HashMap<SubunitKey, Vec<SessionCount>>,
    labels: &PhaseLabels,
    variant: TauVariant,
) -> HashMap<GroupKey, Option<f32>> {
    let mut values: HashMap<GroupKey, Vec<f32>> = HashMap::new();
    let mut seen: HashSet<GroupKey> = HashSet::new();
    for (key, counts) in series {
        seen.insert(key.group.clone());
        if let Some(tau) = subunit_tau(counts, labels, variant) {
            values.entry(key.group.clone()).or_default().push(tau);
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
