use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filing statuses the engine supports.
///
/// The status selects the standard deduction, the ordinary and preferential
/// bracket tables, and the surtax thresholds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FilingStatus {
    #[default]
    #[serde(alias = "S", alias = "single")]
    Single,
    #[serde(alias = "HOH", alias = "head_of_household")]
    HeadOfHousehold,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unrecognised filing status '{0}' (expected S or HOH)")]
    InvalidFilingStatus(String),
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::HeadOfHousehold => "HOH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::HeadOfHousehold => "Head of household",
        }
    }

    /// Parses a status code or name, ignoring case.
    pub fn parse(s: &str) -> Result<Self, InputError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" | "SINGLE" => Ok(Self::Single),
            "HOH" | "HEADOFHOUSEHOLD" | "HEAD_OF_HOUSEHOLD" => Ok(Self::HeadOfHousehold),
            _ => Err(InputError::InvalidFilingStatus(s.to_string())),
        }
    }
}

/// One value per supported filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub head_of_household: T,
}

impl<T> ByFilingStatus<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        [
            (FilingStatus::Single, &self.single),
            (FilingStatus::HeadOfHousehold, &self.head_of_household),
        ]
        .into_iter()
    }
}
