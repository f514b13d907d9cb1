//! Session-level aggregation of trial responses
//!
//! Collapses per-trial observations into one count per (participant, session,
//! phase, condition, item-type, phoneme) key: the number of correct responses
//! plus the number of trials seen. Aggregation is a commutative sum, so the
//! result does not depend on input row order, and re-running it over the same
//! observations reproduces the same table.

use crate::model::{Observation, PrePost, SubunitKey};
use std::collections::HashMap;

/// Aggregate of all trials sharing a session within one phoneme series
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCount {
    pub session: u32,
    pub phase: String,
    /// Sum of correct responses in the session
    pub correct: u32,
    /// Number of trials scored in the session
    pub trials: u32,
    /// Trial-list size: the maximum attainable correct count
    pub list_size: u32,
    /// Session tag for the pre/post-restricted variant, if any
    pub prepost: Option<PrePost>,
}

/// Accumulates per-session counts keyed by phoneme series
#[derive(Debug, Default)]
pub struct SessionTally {
    counts: HashMap<SubunitKey, HashMap<(u32, String), SessionCount>>,
}

impl SessionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into its session count
    pub fn record(&mut self, obs: &Observation) {
        let series = self.counts.entry(SubunitKey::of(obs)).or_default();
        let entry = series
            .entry((obs.session, obs.phase.clone()))
            .or_insert_with(|| SessionCount {
                session: obs.session,
                phase: obs.phase.clone(),
                correct: 0,
                trials: 0,
                list_size: obs.list_size,
                prepost: None,
            });
        entry.correct += u32::from(obs.response);
        entry.trials += 1;
        entry.list_size = entry.list_size.max(obs.list_size);
        if entry.prepost.is_none() {
            entry.prepost = obs.prepost;
        }
    }

    /// Finish aggregation: one session-ordered series per phoneme
    pub fn into_series(self) -> HashMap<SubunitKey, Vec<SessionCount>> {
        self.counts
            .into_iter()
            .map(|(key, sessions)| {
                let mut series: Vec<SessionCount> = sessions.into_values().collect();
                series.sort_by_key(|c| c.session);
                (key, series)
            })
            .collect()
    }
}

/// Aggregate a full observation table into session series
pub fn tally(observations: &[Observation]) -> HashMap<SubunitKey, Vec<SessionCount>> {
    let mut tally = SessionTally::new();
    for obs in observations {
        tally.record(obs);
    }
    tally.into_series()
}
