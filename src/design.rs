//! Design-matrix export for the external hierarchical model fitter
//!
//! The hierarchical GLM itself is fit outside this crate; the pipeline's job
//! ends at emitting the per-trial design matrix it consumes:
//! response ~ baseline_slope + level_change + slope_change, grouped by
//! participant and item. Session indices are centred at each participant's
//! final baseline session so `level_change` reads as the immediate level
//! shift at treatment onset and `slope_change` counts sessions since onset.

use crate::model::{Observation, PhaseLabels};
use serde::Serialize;

/// One per-trial row of the fitter's design matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignRow {
    pub participant: String,
    pub item: String,
    pub session: u32,
    pub response: u8,
    /// Session index centred at the last baseline session
    pub baseline_slope: f32,
    /// Treatment-phase indicator
    pub level_change: u8,
    /// Sessions since treatment onset; 0 throughout baseline
    pub slope_change: f32,
}

/// Build the design matrix from baseline- and treatment-phase trials
///
/// Trials in other phases (maintenance, follow-up) are outside the
/// interrupted-time-series model and are skipped.
pub fn design_matrix(observations: &[Observation], labels: &PhaseLabels) -> Vec<DesignRow> {
    observations
        .iter()
        .filter(|obs| obs.phase == labels.baseline || obs.phase == labels.treatment)
        .map(|obs| {
            let onset = obs.baseline_sessions;
            let post = obs.session > onset;
            DesignRow {
                participant: obs.participant.clone(),
                item: obs.item.clone(),
                session: obs.session,
                response: obs.response,
                baseline_slope: obs.session as f32 - onset as f32,
                level_change: u8::from(post),
                slope_change: if post {
                    (obs.session - onset) as f32
                } else {
                    0.0
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, ItemType};

    fn obs(session: u32, phase: &str, baseline_sessions: u32) -> Observation {
        Observation {
            participant: "P01".to_string(),
            condition: Condition::Blocked,
            phoneme: "r".to_string(),
            item_type: ItemType::Treated,
            phase: phase.to_string(),
            session,
            item: "rake".to_string(),
            list_size: 10,
            prepost: None,
            response: 1,
            baseline_sessions,
        }
    }

    #[test]
    fn test_baseline_rows_have_no_level_or_slope_change() {
        let rows = design_matrix(&[obs(2, "baseline", 3)], &PhaseLabels::default());
        assert_eq!(rows[0].baseline_slope, -1.0);
        assert_eq!(rows[0].level_change, 0);
        assert_eq!(rows[0].slope_change, 0.0);
    }

    #[test]
    fn test_last_baseline_session_is_centre() {
        let rows = design_matrix(&[obs(3, "baseline", 3)], &PhaseLabels::default());
        assert_eq!(rows[0].baseline_slope, 0.0);
        assert_eq!(rows[0].level_change, 0);
    }

    #[test]
    fn test_treatment_rows_carry_level_and_slope_change() {
        let rows = design_matrix(&[obs(5, "treatment", 3)], &PhaseLabels::default());
        assert_eq!(rows[0].baseline_slope, 2.0);
        assert_eq!(rows[0].level_change, 1);
        assert_eq!(rows[0].slope_change, 2.0);
    }

    #[test]
    fn test_other_phases_excluded() {
        let rows = design_matrix(&[obs(9, "maintenance", 3)], &PhaseLabels::default());
        assert!(rows.is_empty());
    }
}
