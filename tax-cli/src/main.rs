use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tax_core::{FilingStatus, TaxCalculator};
use tracing::debug;

use tax_cli::logging::init_logging;
use tax_cli::report::Report;
use tax_cli::{load_inputs, load_parameters};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Federal and state income tax estimator.
///
/// Reads a TOML input document, computes the federal return and the
/// flat-rate state return, and prints line-by-line guidance.
#[derive(Debug, Parser)]
struct Cli {
    /// Input document (TOML).
    #[arg(long)]
    input: PathBuf,

    /// Parameter file (TOML). Defaults to the shipped set for `--year`.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Tax year of the shipped parameter set.
    #[arg(long, default_value = "2025")]
    year: i32,

    /// Overrides the filing status in the input document (S or HOH).
    #[arg(long, value_parser = FilingStatus::parse)]
    status: Option<FilingStatus>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Line-by-line report.
    Text,
    /// Every computed figure as TOML.
    Toml,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    let params = load_parameters(cli.params.as_deref(), cli.year)?;
    let calculator = TaxCalculator::new(&params).context("invalid tax parameters")?;
    let inputs = load_inputs(&cli.input, cli.status)?;

    debug!(status = inputs.filing_status.as_str(), "Computing return");
    let result = calculator.compute(&inputs);

    match cli.format {
        Format::Text => print!("{}", Report::from_result(&result)),
        Format::Toml => {
            let text = toml::to_string_pretty(&result).context("cannot serialize result")?;
            print!("{text}");
        }
    }

    Ok(())
}
