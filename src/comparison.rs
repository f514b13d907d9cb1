//! Phase comparison diagnostics
//!
//! Supplements the effect-size table with a Welch independent t-test per
//! group, comparing baseline vs treatment session counts pooled across the
//! group's phonemes. Welch's variant tolerates the unequal variances typical
//! of baseline-vs-treatment probe data. Diagnostic only: these numbers never
//! feed donor repair.

use anyhow::{Context, Result};
use aprender::stats::DescriptiveStats;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trueno::Vector;

/// Welch comparison between a group's baseline and treatment counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseComparison {
    /// t-statistic
    pub statistic: f32,
    /// Two-tailed p-value
    pub pvalue: f32,
    /// Degrees of freedom
    pub df: f32,
    pub baseline_median: f32,
    pub treatment_median: f32,
    pub baseline_variance: f32,
    pub treatment_variance: f32,
}

/// Run the Welch comparison; `None` when a phase has fewer than two sessions
pub fn compare_phases(baseline: &[f32], treatment: &[f32]) -> Option<PhaseComparison> {
    if baseline.len() < 2 || treatment.len() < 2 {
        debug!(
            baseline_sessions = baseline.len(),
            treatment_sessions = treatment.len(),
            "phase comparison skipped: need at least 2 sessions per phase"
        );
        return None;
    }
    match welch(baseline, treatment) {
        Ok(cmp) => Some(cmp),
        Err(err) => {
            debug!(error = %err, "phase comparison failed");
            None
        }
    }
}

fn welch(baseline: &[f32], treatment: &[f32]) -> Result<PhaseComparison> {
    // Welch's variant: unequal variances between phases
    let ttest = aprender::stats::hypothesis::ttest_ind(baseline, treatment, false)
        .context("failed to compute t-test")?;

    let baseline_vec = Vector::from_slice(baseline);
    let treatment_vec = Vector::from_slice(treatment);

    let baseline_median = median(&baseline_vec)?;
    let treatment_median = median(&treatment_vec)?;

    let baseline_variance = baseline_vec
        .variance()
        .context("failed to compute baseline variance")?;
    let treatment_variance = treatment_vec
        .variance()
        .context("failed to compute treatment variance")?;

    Ok(PhaseComparison {
        statistic: ttest.statistic,
        pvalue: ttest.pvalue,
        df: ttest.df,
        baseline_median,
        treatment_median,
        baseline_variance,
        treatment_variance,
    })
}

/// Median via aprender's quantile (robust to single-session spikes)
fn median(vector: &Vector<f32>) -> Result<f32> {
    let stats = DescriptiveStats::new(vector);
    stats
        .quantile(0.5)
        .map_err(|e| anyhow::anyhow!("failed to compute median: {}", e))
}
