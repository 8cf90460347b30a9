use std::io::Read;

use tax_core::{TaxParameters, TaxParametersError};
use thiserror::Error;
use tracing::debug;

/// The shipped 2025 parameter set.
pub const TAX_PARAMETERS_2025: &str = include_str!("../data/tax_parameters_2025.toml");

/// The shipped 2025 ordinary bracket schedules, in IRS "base tax" form.
pub const TAX_BRACKETS_2025: &str = include_str!("../data/tax_brackets_2025.csv");

/// Errors that can occur when loading a parameter set.
#[derive(Debug, Error)]
pub enum ParameterLoaderError {
    #[error("Failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid parameter set: {0}")]
    Invalid(#[from] TaxParametersError),

    #[error("No shipped parameter set for tax year {0}")]
    UnsupportedYear(i32),
}

/// Loader for versioned parameter sets stored as TOML.
///
/// Every set that leaves the loader has passed
/// [`TaxParameters::validate`].
pub struct ParameterLoader;

impl ParameterLoader {
    /// Parse and validate a parameter set from TOML text.
    pub fn parse_str(text: &str) -> Result<TaxParameters, ParameterLoaderError> {
        let params: TaxParameters = toml::from_str(text)?;
        params.validate()?;
        debug!(tax_year = params.tax_year, "Loaded parameter set");
        Ok(params)
    }

    /// Parse and validate a parameter set from any reader.
    pub fn parse<R: Read>(mut reader: R) -> Result<TaxParameters, ParameterLoaderError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_str(&text)
    }

    /// The parameter set shipped for `tax_year`.
    pub fn shipped(tax_year: i32) -> Result<TaxParameters, ParameterLoaderError> {
        match tax_year {
            2025 => Self::parse_str(TAX_PARAMETERS_2025),
            other => Err(ParameterLoaderError::UnsupportedYear(other)),
        }
    }

    /// Renders a parameter set as normalized TOML.
    pub fn to_toml(params: &TaxParameters) -> Result<String, ParameterLoaderError> {
        Ok(toml::to_string_pretty(params)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_shipped_2025_parses() {
        let params = ParameterLoader::shipped(2025).expect("Failed to load 2025 parameters");

        assert_eq!(params.tax_year, 2025);
        assert_eq!(params.standard_deduction.single, dec!(15750));
        assert_eq!(params.state.name, "Colorado");
    }

    #[test]
    fn test_shipped_rejects_unknown_year() {
        let result = ParameterLoader::shipped(2019);

        assert!(matches!(result, Err(ParameterLoaderError::UnsupportedYear(2019))));
    }

    #[test]
    fn test_parse_reads_from_bytes() {
        let params = ParameterLoader::parse(TAX_PARAMETERS_2025.as_bytes())
            .expect("Failed to parse parameters");

        assert_eq!(params.capital_loss_limit, dec!(3000));
    }

    #[test]
    fn test_parse_reports_malformed_toml() {
        let result = ParameterLoader::parse_str("tax_year = ");

        assert!(matches!(result, Err(ParameterLoaderError::TomlParse(_))));
    }

    #[test]
    fn test_parse_reports_missing_sections() {
        let result = ParameterLoader::parse_str("tax_year = 2025");

        assert!(matches!(result, Err(ParameterLoaderError::TomlParse(_))));
    }

    #[test]
    fn test_parse_rejects_invalid_parameter_set() {
        let text = TAX_PARAMETERS_2025.replace(
            "phase_out = { start = \"85000\", end = \"100000\" }",
            "phase_out = { start = \"85000\", end = \"85000\" }",
        );

        let result = ParameterLoader::parse_str(&text);

        assert!(matches!(
            result,
            Err(ParameterLoaderError::Invalid(
                TaxParametersError::InvalidPhaseOut { .. }
            ))
        ));
    }

    #[test]
    fn test_normalized_toml_loads_back() {
        let params = ParameterLoader::shipped(2025).expect("Failed to load 2025 parameters");

        let text = ParameterLoader::to_toml(&params).expect("Failed to render TOML");
        let reloaded = ParameterLoader::parse_str(&text).expect("Failed to reload TOML");

        assert_eq!(reloaded, params);
    }
}
