//! Parameter-set loading for the tax engine.
//!
//! Parameter sets are stored as TOML, one file per tax year. Ordinary
//! bracket tables can also be loaded from the IRS "base tax" CSV layout and
//! swapped into a set.

mod loader;
mod parameters;

pub use loader::{
    TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord, schedule_to_filing_status,
};
pub use parameters::{
    ParameterLoader, ParameterLoaderError, TAX_BRACKETS_2025, TAX_PARAMETERS_2025,
};
