use anyhow::{Context, Result};
use clap::Parser;
use sanar::analysis::{analyze, AnalysisOptions};
use sanar::cli::{Cli, EffectFamily, OutputFormat};
use sanar::config::AnalysisConfig;
use sanar::csv_output;
use sanar::design::design_matrix;
use sanar::filter::RowFilter;
use sanar::json_output;
use sanar::loader;
use sanar::model::Observation;
use sanar::pmg::PmgVariant;
use sanar::report;
use sanar::tau::TauVariant;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load sanar.toml: the explicit --config path, or ./sanar.toml when present
fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    if let Some(path) = &cli.config {
        return AnalysisConfig::from_file(path);
    }
    let default = Path::new("sanar.toml");
    if default.exists() {
        return AnalysisConfig::from_file(default);
    }
    Ok(AnalysisConfig::default())
}

fn analysis_options(cli: &Cli, config: &AnalysisConfig) -> AnalysisOptions {
    let (smd, pmg, tau) = match cli.effect {
        EffectFamily::Smd => (true, false, false),
        EffectFamily::Pmg => (false, true, false),
        EffectFamily::Tau => (false, false, true),
        EffectFamily::All => (true, true, true),
    };
    AnalysisOptions {
        labels: config.phase_labels(),
        smd,
        pmg,
        tau,
        pmg_variant: if cli.prepost {
            PmgVariant::PrePost
        } else {
            PmgVariant::AllSessions
        },
        tau_variant: if cli.trend {
            TauVariant::TrendCorrected
        } else {
            TauVariant::Plain
        },
        compare: cli.compare,
    }
}

/// CLI format flag wins over the config file; text is the fallback
fn output_format(cli: &Cli, config: &AnalysisConfig) -> Result<OutputFormat> {
    if let Some(format) = cli.format {
        return Ok(format);
    }
    match config.output.format.as_deref() {
        None => Ok(OutputFormat::Text),
        Some("text") => Ok(OutputFormat::Text),
        Some("json") => Ok(OutputFormat::Json),
        Some("csv") => Ok(OutputFormat::Csv),
        Some(other) => anyhow::bail!("unknown output format in config: '{}'", other),
    }
}

fn select_rows(cli: &Cli, observations: Vec<Observation>) -> Result<Vec<Observation>> {
    let filter = match &cli.select {
        Some(expr) => RowFilter::from_expr(expr)?,
        None => RowFilter::all(),
    };
    Ok(observations
        .into_iter()
        .filter(|obs| filter.matches(obs))
        .collect())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let options = analysis_options(&cli, &config);
    let format = output_format(&cli, &config)?;

    let observations = loader::load_csv(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    let observations = select_rows(&cli, observations)?;
    if observations.is_empty() {
        anyhow::bail!("selection matched no observations");
    }

    if let Some(path) = &cli.design_matrix {
        let rows = design_matrix(&observations, &options.labels);
        fs::write(path, csv_output::design_to_csv(&rows))
            .with_context(|| format!("failed to write design matrix to {}", path.display()))?;
    }

    let result = analyze(&observations, &options);

    let rendered = match format {
        OutputFormat::Text => report::render_text(&result),
        OutputFormat::Json => {
            let mut json = json_output::to_json(&result).context("failed to serialize report")?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => csv_output::to_csv(&result),
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
