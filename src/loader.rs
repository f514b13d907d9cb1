//! CSV ingest for per-trial probe data
//!
//! Reads the de-identified trial table exported by the data-collection side.
//! Expected columns (order-free, matched by header name): participant,
//! condition, phoneme, item_type, phase, session, item, n_items, prepost,
//! response, n_baselines.
//!
//! Shape problems are precondition violations and abort the run with a
//! descriptive error; they are never masked into missing estimates.

use crate::error::{AnalysisError, Result};
use crate::model::{Condition, ItemType, Observation, PrePost};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 11] = [
    "participant",
    "condition",
    "phoneme",
    "item_type",
    "phase",
    "session",
    "item",
    "n_items",
    "prepost",
    "response",
    "n_baselines",
];

/// Load and validate a probe-data CSV file
pub fn load_csv(path: &Path) -> Result<Vec<Observation>> {
    let content = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let observations = parse_csv(&content)?;
    debug!(
        rows = observations.len(),
        path = %path.display(),
        "loaded probe data"
    );
    Ok(observations)
}

/// Parse probe-data CSV content
///
/// Fields are comma-separated without quoting; identifiers in this corpus
/// never contain commas. The header row is mandatory and column order is
/// free.
pub fn parse_csv(content: &str) -> Result<Vec<Observation>> {
    let mut lines = content.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) if !line.trim().is_empty() => line,
        _ => return Err(AnalysisError::EmptyInput),
    };

    let columns = column_index(header)?;
    let mut observations = Vec::new();

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let lineno = idx + 1; // 1-based, header is line 1
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.width {
            return Err(AnalysisError::RaggedRow {
                line: lineno,
                expected: columns.width,
                actual: fields.len(),
            });
        }
        observations.push(parse_row(&fields, &columns, lineno)?);
    }

    if observations.is_empty() {
        return Err(AnalysisError::NoObservations);
    }
    Ok(observations)
}

/// Header-name to field-position mapping
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
    width: usize,
}

impl ColumnIndex {
    fn get(&self, column: &'static str) -> usize {
        // Presence is validated in column_index before any row is parsed
        self.positions[column]
    }
}

fn column_index(header: &str) -> Result<ColumnIndex> {
    let names: Vec<&str> = header.split(',').map(str::trim).collect();
    let mut positions = HashMap::new();
    for required in REQUIRED_COLUMNS {
        match names.iter().position(|n| *n == required) {
            Some(pos) => {
                positions.insert(required, pos);
            }
            None => return Err(AnalysisError::MissingColumn(required)),
        }
    }
    Ok(ColumnIndex {
        positions,
        width: names.len(),
    })
}

fn parse_row(fields: &[&str], columns: &ColumnIndex, line: usize) -> Result<Observation> {
    let participant = fields[columns.get("participant")].to_string();
    let condition_raw = fields[columns.get("condition")];
    let condition = Condition::parse(condition_raw).ok_or_else(|| AnalysisError::InvalidField {
        line,
        column: "condition",
        value: condition_raw.to_string(),
        reason: "expected 'blocked' or 'random'".to_string(),
    })?;
    let item_type_raw = fields[columns.get("item_type")];
    let item_type = ItemType::parse(item_type_raw).ok_or_else(|| AnalysisError::InvalidField {
        line,
        column: "item_type",
        value: item_type_raw.to_string(),
        reason: "expected 'tx' or 'gx'".to_string(),
    })?;

    let session = parse_u32(fields[columns.get("session")], "session", line)?;
    let list_size = parse_u32(fields[columns.get("n_items")], "n_items", line)?;
    let baseline_sessions = parse_u32(fields[columns.get("n_baselines")], "n_baselines", line)?;

    let response_raw = fields[columns.get("response")];
    let response = match response_raw {
        "0" => 0,
        "1" => 1,
        _ => {
            return Err(AnalysisError::InvalidField {
                line,
                column: "response",
                value: response_raw.to_string(),
                reason: "expected 0 or 1".to_string(),
            })
        }
    };

    // Empty or NA prepost cells mean the session is untagged
    let prepost = PrePost::parse(fields[columns.get("prepost")]);

    Ok(Observation {
        participant,
        condition,
        phoneme: fields[columns.get("phoneme")].to_string(),
        item_type,
        phase: fields[columns.get("phase")].to_string(),
        session,
        item: fields[columns.get("item")].to_string(),
        list_size,
        prepost,
        response,
        baseline_sessions,
    })
}

fn parse_u32(raw: &str, column: &'static str, line: usize) -> Result<u32> {
    raw.parse::<u32>().map_err(|_| AnalysisError::InvalidField {
        line,
        column,
        value: raw.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}
