use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{FilingStatus, TaxBracket, TaxParameters};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0} (supported: X, Z)")]
    InvalidSchedule(String),

    #[error("Bracket rows are for tax year {found}, parameter set is for {expected}")]
    TaxYearMismatch { expected: i32, found: i32 },

    #[error("No bracket rows found for {0:?}")]
    MissingSchedule(FilingStatus),
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps an IRS schedule code to the filing status it applies to.
///
/// - Schedule X → Single (S)
/// - Schedule Z → Head of Household (HOH)
pub fn schedule_to_filing_status(schedule: &str) -> Result<FilingStatus, TaxBracketLoaderError> {
    match schedule.trim() {
        "X" => Ok(FilingStatus::Single),
        "Z" => Ok(FilingStatus::HeadOfHousehold),
        other => Err(TaxBracketLoaderError::InvalidSchedule(other.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X or Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: The tax owed at `min_income`
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

impl TaxBracketRecord {
    /// Converts the "base tax" row into a quick-calc bracket.
    pub fn to_bracket(&self) -> TaxBracket {
        TaxBracket::from_base_tax(self.min_income, self.max_income, self.rate, self.base_tax)
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for ordinary-income bracket tables from CSV files.
///
/// The CSV carries the IRS "base tax" form of each schedule row; the loader
/// converts every row to the subtraction-constant form the engine uses and
/// swaps the resulting tables into a parameter set.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "Parsed tax bracket records");
        Ok(records)
    }

    /// Groups records by filing status, converting each row to a
    /// [`TaxBracket`] in ascending order of `min_income`.
    pub fn into_brackets(
        records: &[TaxBracketRecord],
    ) -> Result<BTreeMap<FilingStatus, Vec<TaxBracket>>, TaxBracketLoaderError> {
        let mut tables: BTreeMap<FilingStatus, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            let status = schedule_to_filing_status(&record.schedule)?;
            tables.entry(status).or_default().push(record.to_bracket());
        }
        for brackets in tables.values_mut() {
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
        }

        Ok(tables)
    }

    /// Replaces the ordinary bracket tables of `params` with those found in
    /// `records`, optionally only for one filing status.
    ///
    /// Every record must be for the parameter set's tax year. Statuses with
    /// no rows keep their existing table. Returns the number of tables
    /// replaced. The caller is expected to re-validate `params`.
    pub fn apply(
        params: &mut TaxParameters,
        records: &[TaxBracketRecord],
        only: Option<FilingStatus>,
    ) -> Result<usize, TaxBracketLoaderError> {
        if let Some(record) = records.iter().find(|r| r.tax_year != params.tax_year) {
            return Err(TaxBracketLoaderError::TaxYearMismatch {
                expected: params.tax_year,
                found: record.tax_year,
            });
        }

        let mut tables = Self::into_brackets(records)?;
        if let Some(status) = only {
            let Some(brackets) = tables.remove(&status) else {
                return Err(TaxBracketLoaderError::MissingSchedule(status));
            };
            tables = BTreeMap::from([(status, brackets)]);
        }

        let mut replaced = 0;
        for (status, brackets) in tables {
            info!(?status, count = brackets.len(), "Replacing ordinary bracket table");
            match status {
                FilingStatus::Single => params.brackets.single = brackets,
                FilingStatus::HeadOfHousehold => params.brackets.head_of_household = brackets,
            }
            replaced += 1;
        }

        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = include_str!("../data/tax_brackets_2025.csv");

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,0,11925,0,0.10";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            TaxBracketRecord {
                tax_year: 2025,
                schedule: "X".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(11925)),
                base_tax: dec!(0),
                rate: dec!(0.10),
            }
        );
    }

    #[test]
    fn test_parse_csv_unlimited_max_income() {
        let csv =
            "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,626350,,188769.75,0.37";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].base_tax, dec!(188769.75));
    }

    #[test]
    fn test_parse_shipped_schedules() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 14);
        for schedule in ["X", "Z"] {
            let count = records.iter().filter(|r| r.schedule == schedule).count();
            assert_eq!(count, 7, "Expected 7 brackets for schedule {}", schedule);
        }
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,schedule,min_income\n2025,X,0";

        let result = TaxBracketLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let TaxBracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,abc,11925,0,0.10";

        let result = TaxBracketLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(TaxBracketLoaderError::CsvParse(_))));
    }

    // =========================================================================
    // conversion tests
    // =========================================================================

    #[test]
    fn test_schedule_mapping() {
        assert_eq!(schedule_to_filing_status("X").ok(), Some(FilingStatus::Single));
        assert_eq!(
            schedule_to_filing_status("Z").ok(),
            Some(FilingStatus::HeadOfHousehold)
        );
        assert!(matches!(
            schedule_to_filing_status("Y-1"),
            Err(TaxBracketLoaderError::InvalidSchedule(s)) if s == "Y-1"
        ));
    }

    #[test]
    fn test_into_brackets_derives_subtraction_constants() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let tables = TaxBracketLoader::into_brackets(&records).expect("Failed to convert");

        let single = &tables[&FilingStatus::Single];
        assert_eq!(single.len(), 7);
        assert_eq!(single[2].subtraction, dec!(5086.00));
        assert_eq!(single[6].max_income, None);

        let hoh = &tables[&FilingStatus::HeadOfHousehold];
        assert_eq!(hoh[3].subtraction, dec!(8892.00));
    }

    #[test]
    fn test_into_brackets_sorts_rows() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n\
                   2025,X,11925,,1192.50,0.12\n\
                   2025,X,0,11925,0,0.10";
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let tables = TaxBracketLoader::into_brackets(&records).expect("Failed to convert");

        let single = &tables[&FilingStatus::Single];
        assert_eq!(single[0].min_income, dec!(0));
        assert_eq!(single[1].min_income, dec!(11925));
    }

    // =========================================================================
    // apply tests
    // =========================================================================

    #[test]
    fn test_apply_replaces_both_tables() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
        let mut params = TaxParameters::tax_year_2025();
        params.brackets.single.clear();
        params.brackets.head_of_household.clear();

        let replaced =
            TaxBracketLoader::apply(&mut params, &records, None).expect("Failed to apply");

        assert_eq!(replaced, 2);
        assert_eq!(params, TaxParameters::tax_year_2025());
    }

    #[test]
    fn test_apply_single_status_only() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
        let mut params = TaxParameters::tax_year_2025();
        params.brackets.head_of_household.clear();

        let replaced = TaxBracketLoader::apply(&mut params, &records, Some(FilingStatus::Single))
            .expect("Failed to apply");

        assert_eq!(replaced, 1);
        assert!(params.brackets.head_of_household.is_empty());
    }

    #[test]
    fn test_apply_rejects_other_tax_year() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2024,X,0,,0,0.10";
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");
        let mut params = TaxParameters::tax_year_2025();

        let result = TaxBracketLoader::apply(&mut params, &records, None);

        assert!(matches!(
            result,
            Err(TaxBracketLoaderError::TaxYearMismatch {
                expected: 2025,
                found: 2024
            })
        ));
    }

    #[test]
    fn test_apply_reports_missing_schedule() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,0,,0,0.10";
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");
        let mut params = TaxParameters::tax_year_2025();

        let result =
            TaxBracketLoader::apply(&mut params, &records, Some(FilingStatus::HeadOfHousehold));

        assert!(matches!(
            result,
            Err(TaxBracketLoaderError::MissingSchedule(FilingStatus::HeadOfHousehold))
        ));
    }
}
