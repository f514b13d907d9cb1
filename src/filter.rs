//! Row selection for -e select= expressions
//!
//! Supports comma-separated key=value pairs:
//! - `participant=P01` (value is a regex, anchored)
//! - `condition=blocked`, `item_type=tx` (exact enum labels)
//! - `phoneme=[rs]` (regex, anchored)

use crate::model::{Condition, ItemType, Observation};
use anyhow::{bail, Result};
use regex::Regex;

/// Observation filter built from a selection expression
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    participant: Option<Regex>,
    phoneme: Option<Regex>,
    condition: Option<Condition>,
    item_type: Option<ItemType>,
}

impl RowFilter {
    /// A filter that keeps every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse an expression like "participant=P0.,condition=blocked"
    pub fn from_expr(expr: &str) -> Result<Self> {
        let mut filter = Self::all();
        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((key, value)) = part.split_once('=') else {
                bail!("invalid selection '{}'. Expected format: key=value", part);
            };
            match key.trim() {
                "participant" => filter.participant = Some(anchored(value.trim())?),
                "phoneme" => filter.phoneme = Some(anchored(value.trim())?),
                "condition" => match Condition::parse(value.trim()) {
                    Some(c) => filter.condition = Some(c),
                    None => bail!("unknown condition '{}'", value.trim()),
                },
                "item_type" => match ItemType::parse(value.trim()) {
                    Some(t) => filter.item_type = Some(t),
                    None => bail!("unknown item_type '{}'", value.trim()),
                },
                other => bail!(
                    "unknown selection key '{}'. Expected participant, phoneme, condition, or item_type",
                    other
                ),
            }
        }
        Ok(filter)
    }

    /// Whether an observation passes all active criteria
    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some(re) = &self.participant {
            if !re.is_match(&obs.participant) {
                return false;
            }
        }
        if let Some(re) = &self.phoneme {
            if !re.is_match(&obs.phoneme) {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if obs.condition != condition {
                return false;
            }
        }
        if let Some(item_type) = self.item_type {
            if obs.item_type != item_type {
                return false;
            }
        }
        true
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| anyhow::anyhow!("invalid pattern '{}': {}", pattern, e))
}
