use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::FilingStatus;
use tax_data::{ParameterLoader, TaxBracketLoader};
use tracing_subscriber::EnvFilter;

/// Validate a tax parameter set and print it as normalized TOML.
///
/// Starts from the shipped parameters for `--year`, or from `--params` when
/// given. Ordinary bracket tables can be replaced from a CSV file with the
/// following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X or Z)
/// - min_income: The minimum income for this bracket
/// - max_income: The maximum income (empty for unlimited)
/// - base_tax: The tax owed at min_income
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML parameter set
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Tax year of the shipped parameter set used when --params is absent
    #[arg(short, long, default_value_t = 2025)]
    year: i32,

    /// Path to a CSV file of ordinary bracket schedules
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Only replace the bracket table for this filing status (S or HOH)
    #[arg(short, long, requires = "brackets", value_parser = FilingStatus::parse)]
    status: Option<FilingStatus>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            ParameterLoader::parse(file)
                .with_context(|| format!("Failed to load parameters: {}", path.display()))?
        }
        None => ParameterLoader::shipped(args.year)
            .with_context(|| format!("Failed to load shipped parameters for {}", args.year))?,
    };

    if let Some(path) = &args.brackets {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = TaxBracketLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        tracing::info!(count = records.len(), "Parsed records from CSV");

        TaxBracketLoader::apply(&mut params, &records, args.status)
            .with_context(|| format!("Failed to apply brackets from: {}", path.display()))?;
        params
            .validate()
            .context("Parameter set is invalid after replacing brackets")?;
    }

    let text = ParameterLoader::to_toml(&params).context("Failed to render parameters")?;
    print!("{text}");

    Ok(())
}
