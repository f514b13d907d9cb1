//! Analysis configuration from sanar.toml
//!
//! Optional file-based defaults for runs that are re-executed many times
//! while drafting a manuscript:
//!
//! ```toml
//! [phases]
//! baseline = "baseline"
//! treatment = "treatment"
//!
//! [output]
//! format = "json"
//! ```

use crate::model::PhaseLabels;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Root configuration for sanar.toml
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub phases: PhaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Phase labels used in the input data
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhaseConfig {
    #[serde(default = "default_baseline")]
    pub baseline: String,
    #[serde(default = "default_treatment")]
    pub treatment: String,
}

fn default_baseline() -> String {
    "baseline".to_string()
}

fn default_treatment() -> String {
    "treatment".to_string()
}

impl Default for PhaseConfig {
    fn default() -> Self {
        PhaseConfig {
            baseline: default_baseline(),
            treatment: default_treatment(),
        }
    }
}

/// Output defaults, overridable on the command line
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// "text", "json", or "csv"
    pub format: Option<String>,
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse TOML")
    }

    /// Phase labels as the calculator consumes them
    pub fn phase_labels(&self) -> PhaseLabels {
        PhaseLabels {
            baseline: self.phases.baseline.clone(),
            treatment: self.phases.treatment.clone(),
        }
    }
}
