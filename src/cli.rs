//! CLI argument parsing for sanar

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the effect-size table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text table (default)
    Text,
    /// JSON report for machine parsing
    Json,
    /// CSV for spreadsheet analysis
    Csv,
}

/// Effect-size families to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EffectFamily {
    /// Baseline-referenced standardized mean difference only
    Smd,
    /// Proportion of potential maximal gain only
    Pmg,
    /// Tau non-overlap only
    Tau,
    /// All families
    All,
}

#[derive(Parser, Debug)]
#[command(name = "sanar")]
#[command(version)]
#[command(about = "Effect-size calculator for single-case treatment research probe data", long_about = None)]
pub struct Cli {
    /// Input CSV of per-trial probe observations
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Row selection (e.g., -e participant=P01,condition=blocked)
    #[arg(short = 'e', long = "select", value_name = "EXPR")]
    pub select: Option<String>,

    /// Effect-size families to compute
    #[arg(long = "effect", value_enum, default_value = "all")]
    pub effect: EffectFamily,

    /// Restrict PMG to sessions tagged pre/post
    #[arg(long = "prepost")]
    pub prepost: bool,

    /// Apply baseline-trend correction to Tau (Tau-U)
    #[arg(long = "trend")]
    pub trend: bool,

    /// Add Welch phase-comparison diagnostics per group
    #[arg(short = 'c', long = "compare")]
    pub compare: bool,

    /// Export the hierarchical-model design matrix to a CSV file
    #[arg(long = "design-matrix", value_name = "FILE")]
    pub design_matrix: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Analysis configuration file (default: ./sanar.toml when present)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_input() {
        let cli = Cli::parse_from(["sanar", "--input", "trials.csv"]);
        assert_eq!(cli.input, PathBuf::from("trials.csv"));
        assert_eq!(cli.effect, EffectFamily::All);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["sanar"]).is_err());
    }

    #[test]
    fn test_cli_select_expression() {
        let cli = Cli::parse_from(["sanar", "-i", "t.csv", "-e", "participant=P01"]);
        assert_eq!(cli.select.as_deref(), Some("participant=P01"));
    }

    #[test]
    fn test_cli_effect_family() {
        let cli = Cli::parse_from(["sanar", "-i", "t.csv", "--effect", "smd"]);
        assert_eq!(cli.effect, EffectFamily::Smd);
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["sanar", "-i", "t.csv", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_flags_default_false() {
        let cli = Cli::parse_from(["sanar", "-i", "t.csv"]);
        assert!(!cli.prepost);
        assert!(!cli.trend);
        assert!(!cli.compare);
        assert!(!cli.verbose);
        assert!(cli.design_matrix.is_none());
    }

    #[test]
    fn test_cli_compare_short_flag() {
        let cli = Cli::parse_from(["sanar", "-i", "t.csv", "-c"]);
        assert!(cli.compare);
    }

    #[test]
    fn test_cli_design_matrix_path() {
        let cli = Cli::parse_from(["sanar", "-i", "t.csv", "--design-matrix", "design.csv"]);
        assert_eq!(cli.design_matrix, Some(PathBuf::from("design.csv")));
    }
}
