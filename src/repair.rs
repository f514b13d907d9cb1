//! Degenerate-variance repair and group aggregation
//!
//! A phoneme series with a constant baseline has SD = 0 and therefore a
//! non-finite d_BR. Rather than dropping the series, the repair pass borrows
//! a standard deviation from a sibling phoneme in the same reporting group
//! and rescales the raw mean difference by it. Donor selection takes the
//! maximum finite sibling SD, matching the reference analysis; the larger
//! denominator biases the substituted estimate toward a smaller magnitude.
//!
//! Borrowing never crosses group boundaries. A group whose phonemes are all
//! degenerate has no donor and aggregates to a missing value.

use crate::model::GroupKey;
use crate::smd::SubunitEstimate;
use std::collections::HashMap;
use tracing::debug;

/// Reported effect size for one participant x condition x item-type group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEstimate {
    pub group: GroupKey,
    /// Mean of the finite (possibly repaired) phoneme estimates; None when
    /// no phoneme survived
    pub estimate: Option<f32>,
    /// Mean baseline SD over the same phonemes
    pub baseline_sd: Option<f32>,
    /// Whether any contributing phoneme needed a borrowed SD
    pub imputed: bool,
    /// Per-phoneme detail, ordered by phoneme label
    pub subunits: Vec<(String, Option<SubunitEstimate>)>,
}

/// Repair one group's estimates in place; returns true if anything changed
///
/// Only zero-SD estimates are repairable: their phase means exist, so a
/// borrowed denominator makes them finite. Undefined slots (a phase had no
/// sessions) carry no means to rescale and are left missing. Running the
/// pass on an all-finite group is a no-op, so repair is idempotent.
pub fn repair_group(slots: &mut [(String, Option<SubunitEstimate>)]) -> bool {
    let donor_sd = slots
        .iter()
        .filter_map(|(_, slot)| slot.as_ref())
        .filter(|est| est.is_finite())
        .map(|est| est.baseline_sd)
        .fold(None, |best: Option<f32>, sd| {
            Some(best.map_or(sd, |b| b.max(sd)))
        });

    let Some(donor_sd) = donor_sd else {
        return false; // no finite sibling, nothing to borrow
    };

    let mut changed = false;
    for (phoneme, slot) in slots.iter_mut() {
        if let Some(est) = slot {
            if !est.is_finite() {
                debug!(
                    phoneme = phoneme.as_str(),
                    donor_sd, "borrowing sibling SD for degenerate baseline"
                );
                est.baseline_sd = donor_sd;
                est.estimate = (est.treatment_mean - est.baseline_mean) / donor_sd;
                est.imputed = true;
                changed = true;
            }
        }
    }
    changed
}

/// Average a group's surviving phoneme estimates into one reported value
///
/// Still-missing phonemes are excluded from the mean rather than poisoning
/// it; a group with zero finite phonemes reports a missing estimate with
/// `imputed = false` (nothing was imputed).
pub fn aggregate(group: GroupKey, slots: Vec<(String, Option<SubunitEstimate>)>) -> GroupEstimate {
    let finite: Vec<&SubunitEstimate> = slots
        .iter()
        .filter_map(|(_, slot)| slot.as_ref())
        .filter(|est| est.is_finite())
        .collect();

    let (estimate, baseline_sd, imputed) = if finite.is_empty() {
        (None, None, false)
    } else {
        let n = finite.len() as f32;
        let est = finite.iter().map(|e| e.estimate).sum::<f32>() / n;
        let sd = finite.iter().map(|e| e.baseline_sd).sum::<f32>() / n;
        let imputed = finite.iter().any(|e| e.imputed);
        (Some(est), Some(sd), imputed)
    };

    GroupEstimate {
        group,
        estimate,
        baseline_sd,
        imputed,
        subunits: slots,
    }
}

/// Full second stage: repair every group, then aggregate, sorted by key
pub fn repair_and_aggregate(
    batch: HashMap<GroupKey, Vec<(String, Option<SubunitEstimate>)>>,
) -> Vec<GroupEstimate> {
    let mut estimates: Vec<GroupEstimate> = batch
        .into_iter()
        .map(|(group, mut slots)| {
            repair_group(&mut slots);
            aggregate(group, slots)
        })
        .collect();
    estimates.sort_by(|a, b| a.group.cmp(&b.group));
    estimates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, ItemType};

    fn group() -> GroupKey {
        GroupKey {
            participant: "P01".to_string(),
            condition: Condition::Blocked,
            item_type: ItemType::Treated,
        }
    }

    fn est(baseline_mean: f32, baseline_sd: f32, treatment_mean: f32) -> SubunitEstimate {
        SubunitEstimate {
            phoneme: "x".to_string(),
            baseline_mean,
            baseline_sd,
            treatment_mean,
            estimate: (treatment_mean - baseline_mean) / baseline_sd,
            imputed: false,
        }
    }

    #[test]
    fn test_repair_noop_on_finite_group() {
        let mut slots = vec![
            ("k".to_string(), Some(est(3.0, 1.0, 8.0))),
            ("s".to_string(), Some(est(2.0, 2.0, 9.0))),
        ];
        let before = slots.clone();
        assert!(!repair_group(&mut slots));
        assert_eq!(slots, before);
    }

    #[test]
    fn test_repair_borrows_max_sibling_sd() {
        // siblings with SDs {2.0, 5.0}; the degenerate one must take 5.0
        let mut slots = vec![
            ("k".to_string(), Some(est(4.0, 0.0, 8.0))),
            ("r".to_string(), Some(est(3.0, 2.0, 8.0))),
            ("s".to_string(), Some(est(2.0, 5.0, 9.0))),
        ];
        assert!(repair_group(&mut slots));
        let repaired = slots[0].1.as_ref().unwrap();
        assert_eq!(repaired.baseline_sd, 5.0);
        assert!((repaired.estimate - (8.0 - 4.0) / 5.0).abs() < 1e-6);
        assert!(repaired.imputed);
        // donors untouched
        assert!(!slots[1].1.as_ref().unwrap().imputed);
        assert!(!slots[2].1.as_ref().unwrap().imputed);
    }

    #[test]
    fn test_repair_all_degenerate_leaves_group_alone() {
        let mut slots = vec![
            ("k".to_string(), Some(est(4.0, 0.0, 8.0))),
            ("s".to_string(), Some(est(5.0, 0.0, 9.0))),
        ];
        assert!(!repair_group(&mut slots));
        assert!(!slots[0].1.as_ref().unwrap().is_finite());
        assert!(!slots[1].1.as_ref().unwrap().is_finite());
    }

    #[test]
    fn test_repair_skips_undefined_slots() {
        let mut slots = vec![
            ("k".to_string(), None),
            ("s".to_string(), Some(est(2.0, 1.5, 7.0))),
        ];
        assert!(!repair_group(&mut slots));
        assert!(slots[0].1.is_none());
    }

    #[test]
    fn test_repair_nan_numerator_becomes_zero() {
        // constant baseline equal to treatment mean: 0/0 = NaN before repair
        let mut slots = vec![
            ("k".to_string(), Some(est(5.0, 0.0, 5.0))),
            ("s".to_string(), Some(est(2.0, 1.0, 7.0))),
        ];
        assert!(slots[0].1.as_ref().unwrap().estimate.is_nan());
        assert!(repair_group(&mut slots));
        let repaired = slots[0].1.as_ref().unwrap();
        assert_eq!(repaired.estimate, 0.0);
        assert!(repaired.imputed);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut slots = vec![
            ("k".to_string(), Some(est(4.0, 0.0, 8.0))),
            ("s".to_string(), Some(est(2.0, 1.0, 9.0))),
        ];
        repair_group(&mut slots);
        let after_once = slots.clone();
        assert!(!repair_group(&mut slots));
        assert_eq!(slots, after_once);
    }

    #[test]
    fn test_aggregate_means_over_finite() {
        let slots = vec![
            ("k".to_string(), Some(est(3.0, 1.0, 8.0))), // estimate 5.0
            ("s".to_string(), Some(est(2.0, 3.0, 8.0))), // estimate 2.0
        ];
        let agg = aggregate(group(), slots);
        assert!((agg.estimate.unwrap() - 3.5).abs() < 1e-6);
        assert!((agg.baseline_sd.unwrap() - 2.0).abs() < 1e-6);
        assert!(!agg.imputed);
    }

    #[test]
    fn test_aggregate_excludes_missing_from_mean() {
        let slots = vec![
            ("k".to_string(), None),
            ("s".to_string(), Some(est(2.0, 2.0, 8.0))), // estimate 3.0
        ];
        let agg = aggregate(group(), slots);
        assert!((agg.estimate.unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_excludes_unrepaired_nonfinite() {
        let slots = vec![
            ("k".to_string(), Some(est(4.0, 0.0, 8.0))), // +inf, no donor applied
            ("s".to_string(), Some(est(2.0, 2.0, 8.0))),
        ];
        let agg = aggregate(group(), slots);
        assert!(agg.estimate.unwrap().is_finite());
        assert!((agg.estimate.unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_all_missing_reports_na_not_default() {
        let slots = vec![
            ("k".to_string(), Some(est(4.0, 0.0, 8.0))),
            ("s".to_string(), Some(est(5.0, 0.0, 9.0))),
        ];
        let agg = aggregate(group(), slots);
        assert_eq!(agg.estimate, None);
        assert_eq!(agg.baseline_sd, None);
        assert!(!agg.imputed);
    }

    #[test]
    fn test_imputed_flag_propagates_to_group() {
        let mut slots = vec![
            ("k".to_string(), Some(est(4.0, 0.0, 8.0))),
            ("s".to_string(), Some(est(2.0, 1.0, 9.0))),
        ];
        repair_group(&mut slots);
        let agg = aggregate(group(), slots);
        assert!(agg.imputed);
        assert!(agg.estimate.is_some());
    }

    #[test]
    fn test_end_to_end_example_from_reference_data() {
        // A: baseline [4,4,4], treatment 8/10 -> SD 0, raw estimate +inf
        // B: baseline [2,3,4], treatment 9/10 -> SD 1, estimate 6
        let a = est(4.0, 0.0, 8.0);
        let b = est(3.0, 1.0, 9.0);
        let mut slots = vec![("a".to_string(), Some(a)), ("b".to_string(), Some(b))];
        repair_group(&mut slots);

        let a_repaired = slots[0].1.as_ref().unwrap();
        assert_eq!(a_repaired.baseline_sd, 1.0);
        assert!((a_repaired.estimate - 4.0).abs() < 1e-6);

        let agg = aggregate(group(), slots);
        assert!((agg.estimate.unwrap() - 5.0).abs() < 1e-6);
        assert!(agg.imputed);
    }

    #[test]
    fn test_repair_and_aggregate_sorts_groups() {
        let mut batch = HashMap::new();
        for participant in ["P02", "P01"] {
            batch.insert(
                GroupKey {
                    participant: participant.to_string(),
                    condition: Condition::Blocked,
                    item_type: ItemType::Treated,
                },
                vec![("k".to_string(), Some(est(2.0, 1.0, 7.0)))],
            );
        }
        let estimates = repair_and_aggregate(batch);
        assert_eq!(estimates[0].group.participant, "P01");
        assert_eq!(estimates[1].group.participant, "P02");
    }
}
