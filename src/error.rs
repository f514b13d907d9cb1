//! Error taxonomy for the analysis pipeline
//!
//! Data-shape problems (missing columns, unparseable fields) are precondition
//! violations from the data-loading side and abort the run. Statistical
//! degeneracy (too few sessions, zero baseline variance) is never an error:
//! it propagates as a missing estimate through aggregation.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while ingesting or validating probe data
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to read {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input has no header row")]
    EmptyInput,

    #[error("missing required column '{0}' in input header")]
    MissingColumn(&'static str),

    #[error("line {line}: row has {actual} fields, header has {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("line {line}: invalid {column} '{value}': {reason}")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("input contains no observation rows")]
    NoObservations,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
