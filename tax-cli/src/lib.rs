//! Command-line front end for the tax engine: input loading, logging
//! setup and the line-by-line report.

pub mod logging;
pub mod report;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tax_core::{FilingStatus, TaxInputs, TaxParameters};
use tax_data::ParameterLoader;
use tracing::{debug, info};

/// Parses an input document. Unknown fields are ignored and unparseable
/// amounts read as zero.
pub fn parse_inputs(text: &str) -> Result<TaxInputs, toml::de::Error> {
    toml::from_str(text)
}

/// Reads the input document at `path`, applying a filing status override
/// when one is given.
pub fn load_inputs(
    path: &Path,
    status: Option<FilingStatus>,
) -> Result<TaxInputs> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read input file '{}'", path.display()))?;
    let mut inputs =
        parse_inputs(&text).with_context(|| format!("invalid input file '{}'", path.display()))?;

    if let Some(status) = status {
        debug!(
            from = inputs.filing_status.as_str(),
            to = status.as_str(),
            "Filing status overridden"
        );
        inputs.filing_status = status;
    }

    Ok(inputs)
}

/// Loads parameters from `path`, or the shipped set for `year` when no
/// path is given.
pub fn load_parameters(
    path: Option<&Path>,
    year: i32,
) -> Result<TaxParameters> {
    let params = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read parameter file '{}'", path.display()))?;
            ParameterLoader::parse_str(&text)
                .with_context(|| format!("invalid parameter file '{}'", path.display()))?
        }
        None => ParameterLoader::shipped(year)
            .with_context(|| format!("no shipped parameters for tax year {year}"))?,
    };

    info!(tax_year = params.tax_year, "Loaded tax parameters");
    Ok(params)
}
