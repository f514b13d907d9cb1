//! Core data model for probe observations
//!
//! One `Observation` is one scored trial from a treatment-research probe:
//! a participant's correct/incorrect response to one item, tagged with the
//! session, phase, probe condition, item type, and target phoneme it belongs
//! to. Everything downstream (session counts, effect sizes) is derived from
//! immutable collections of these records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probe-schedule condition under which an item was trained/probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Items probed on a blocked schedule
    Blocked,
    /// Items probed on a random schedule
    Random,
}

impl Condition {
    /// Parse the condition label used in the input data
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "blocked" => Some(Condition::Blocked),
            "random" => Some(Condition::Random),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Blocked => "blocked",
            Condition::Random => "random",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an item was directly treated or probes generalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemType {
    /// Treated items ("tx" in the source data)
    #[serde(rename = "tx")]
    Treated,
    /// Generalization items ("gx" in the source data)
    #[serde(rename = "gx")]
    Generalization,
}

impl ItemType {
    /// Parse the item-type label used in the input data
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "tx" => Some(ItemType::Treated),
            "gx" => Some(ItemType::Generalization),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Treated => "tx",
            ItemType::Generalization => "gx",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre/post tag restricting which sessions feed the restricted PMG variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrePost {
    Pre,
    Post,
}

impl PrePost {
    /// Parse the tag; empty and "NA" cells mean untagged
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "pre" => Some(PrePost::Pre),
            "post" => Some(PrePost::Post),
            _ => None,
        }
    }
}

/// One scored trial response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Participant identifier (e.g., "P01")
    pub participant: String,
    /// Probe-schedule condition
    pub condition: Condition,
    /// Target phoneme, the sub-unit of effect-size reporting
    pub phoneme: String,
    /// Treated vs generalization item
    pub item_type: ItemType,
    /// Phase label as given in the data ("baseline", "treatment", ...)
    pub phase: String,
    /// Session index within the participant's probe schedule
    pub session: u32,
    /// Item identifier
    pub item: String,
    /// Trial-list size: maximum attainable correct count per session
    pub list_size: u32,
    /// Session tag for the pre/post-restricted effect-size variant
    pub prepost: Option<PrePost>,
    /// Binary response: 1 correct, 0 incorrect
    pub response: u8,
    /// Number of baseline sessions this participant received
    pub baseline_sessions: u32,
}

/// Unit of effect-size reporting: participant x condition x item-type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub participant: String,
    pub condition: Condition,
    pub item_type: ItemType,
}

impl GroupKey {
    pub fn of(obs: &Observation) -> Self {
        GroupKey {
            participant: obs.participant.clone(),
            condition: obs.condition,
            item_type: obs.item_type,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.participant, self.condition, self.item_type
        )
    }
}

/// A group plus the phoneme series inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubunitKey {
    pub group: GroupKey,
    pub phoneme: String,
}

impl SubunitKey {
    pub fn of(obs: &Observation) -> Self {
        SubunitKey {
            group: GroupKey::of(obs),
            phoneme: obs.phoneme.clone(),
        }
    }
}

/// Phase labels that designate the reference and treatment periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLabels {
    pub baseline: String,
    pub treatment: String,
}

impl Default for PhaseLabels {
    fn default() -> Self {
        PhaseLabels {
            baseline: "baseline".to_string(),
            treatment: "treatment".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs() -> Observation {
        Observation {
            participant: "P01".to_string(),
            condition: Condition::Blocked,
            phoneme: "r".to_string(),
            item_type: ItemType::Treated,
            phase: "baseline".to_string(),
            session: 1,
            item: "rake".to_string(),
            list_size: 10,
            prepost: None,
            response: 1,
            baseline_sessions: 3,
        }
    }

    #[test]
    fn test_condition_parse_roundtrip() {
        assert_eq!(Condition::parse("blocked"), Some(Condition::Blocked));
        assert_eq!(Condition::parse("random"), Some(Condition::Random));
        assert_eq!(Condition::parse("interleaved"), None);
        assert_eq!(Condition::Blocked.as_str(), "blocked");
    }

    #[test]
    fn test_item_type_parse() {
        assert_eq!(ItemType::parse("tx"), Some(ItemType::Treated));
        assert_eq!(ItemType::parse("gx"), Some(ItemType::Generalization));
        assert_eq!(ItemType::parse("zz"), None);
    }

    #[test]
    fn test_prepost_parse_untagged() {
        assert_eq!(PrePost::parse("pre"), Some(PrePost::Pre));
        assert_eq!(PrePost::parse("post"), Some(PrePost::Post));
        assert_eq!(PrePost::parse(""), None);
        assert_eq!(PrePost::parse("NA"), None);
    }

    #[test]
    fn test_group_key_of_observation() {
        let key = GroupKey::of(&obs());
        assert_eq!(key.participant, "P01");
        assert_eq!(key.condition, Condition::Blocked);
        assert_eq!(key.item_type, ItemType::Treated);
        assert_eq!(key.to_string(), "P01/blocked/tx");
    }

    #[test]
    fn test_subunit_key_orders_by_group_then_phoneme() {
        let a = SubunitKey {
            group: GroupKey::of(&obs()),
            phoneme: "l".to_string(),
        };
        let b = SubunitKey {
            group: GroupKey::of(&obs()),
            phoneme: "r".to_string(),
        };
        assert!(a < b);
    }

    #[test]
    fn test_condition_serializes_lowercase() {
        let json = serde_json::to_string(&Condition::Blocked).unwrap();
        assert_eq!(json, "\"blocked\"");
        let json = serde_json::to_string(&ItemType::Generalization).unwrap();
        assert_eq!(json, "\"gx\"");
    }

    #[test]
    fn test_phase_labels_default() {
        let labels = PhaseLabels::default();
        assert_eq!(labels.baseline, "baseline");
        assert_eq!(labels.treatment, "treatment");
    }
}
