//! Itemized deductions versus the standard deduction.
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Medical expenses − (AGI × floor rate), minimum 0 |
//! | 2    | State and local tax, capped |
//! | 3    | Charitable gifts, cash plus non-cash |
//! | 4    | Itemized total (Lines 1 through 3) |
//! | 5    | Standard deduction for the filing status |
//! | 6    | Deduction used (larger of Line 4 or Line 5) |

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{DeductionInputs, DeductionSummary, ItemizedRules};

/// Calculator for the deduction taken against AGI.
#[derive(Debug, Clone)]
pub struct DeductionsWorksheet<'a> {
    rules: &'a ItemizedRules,
}

impl<'a> DeductionsWorksheet<'a> {
    pub fn new(rules: &'a ItemizedRules) -> Self {
        Self { rules }
    }

    pub fn calculate(
        &self,
        inputs: &DeductionInputs,
        adjusted_gross_income: Decimal,
        standard_deduction: Decimal,
    ) -> DeductionSummary {
        let medical = self.medical(inputs.medical_expenses, adjusted_gross_income);
        let state_local_tax = self.state_local_tax(inputs.state_local_tax);
        let charitable = round_half_up(
            non_negative(inputs.charitable_cash) + non_negative(inputs.charitable_noncash),
        );
        let itemized_total = medical + state_local_tax + charitable;

        // Ties go to the standard deduction.
        let used_itemized = itemized_total > standard_deduction;
        let deduction_used = if used_itemized {
            itemized_total
        } else {
            standard_deduction
        };

        debug!(
            itemized_total = %itemized_total,
            standard_deduction = %standard_deduction,
            used_itemized,
            "Deduction selected"
        );

        DeductionSummary {
            medical,
            state_local_tax,
            charitable,
            itemized_total,
            standard_deduction,
            deduction_used,
            used_itemized,
        }
    }

    /// Medical expenses above the AGI floor.
    fn medical(
        &self,
        expenses: Decimal,
        adjusted_gross_income: Decimal,
    ) -> Decimal {
        let floor = non_negative(adjusted_gross_income) * self.rules.medical_agi_floor_rate;
        round_half_up(non_negative(non_negative(expenses) - floor))
    }

    fn state_local_tax(
        &self,
        paid: Decimal,
    ) -> Decimal {
        round_half_up(non_negative(paid).min(self.rules.state_local_tax_cap))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxParameters;

    fn rules() -> ItemizedRules {
        TaxParameters::tax_year_2025().itemized
    }

    #[test]
    fn standard_deduction_used_without_itemizable_amounts() {
        let rules = rules();
        let worksheet = DeductionsWorksheet::new(&rules);

        let result = worksheet.calculate(&DeductionInputs::default(), dec!(100000), dec!(15750));

        assert_eq!(result.itemized_total, dec!(0));
        assert_eq!(result.deduction_used, dec!(15750));
        assert!(!result.used_itemized);
    }

    #[test]
    fn medical_expenses_reduced_by_agi_floor() {
        let rules = rules();
        let worksheet = DeductionsWorksheet::new(&rules);
        let inputs = DeductionInputs {
            medical_expenses: dec!(10000),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(80000), dec!(15750));

        // 10000 − 80000 × 0.075
        assert_eq!(result.medical, dec!(4000.00));
    }

    #[test]
    fn medical_expenses_below_floor_are_zero() {
        let rules = rules();
        let worksheet = DeductionsWorksheet::new(&rules);
        let inputs = DeductionInputs {
            medical_expenses: dec!(3000),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(80000), dec!(15750));

        assert_eq!(result.medical, dec!(0));
    }

    #[test]
    fn state_local_tax_is_capped() {
        let rules = rules();
        let worksheet = DeductionsWorksheet::new(&rules);
        let inputs = DeductionInputs {
            state_local_tax: dec!(55000),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(300000), dec!(15750));

        assert_eq!(result.state_local_tax, dec!(40000.00));
    }

    #[test]
    fn itemized_deduction_used_when_larger() {
        let rules = rules();
        let worksheet = DeductionsWorksheet::new(&rules);
        let inputs = DeductionInputs {
            state_local_tax: dec!(12000),
            charitable_cash: dec!(5000),
            charitable_noncash: dec!(1500),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(150000), dec!(15750));

        assert_eq!(result.charitable, dec!(6500.00));
        assert_eq!(result.itemized_total, dec!(18500.00));
        assert_eq!(result.deduction_used, dec!(18500.00));
        assert!(result.used_itemized);
    }

    #[test]
    fn tie_takes_standard_deduction() {
        let rules = rules();
        let worksheet = DeductionsWorksheet::new(&rules);
        let inputs = DeductionInputs {
            charitable_cash: dec!(15750),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(90000), dec!(15750));

        assert_eq!(result.deduction_used, dec!(15750));
        assert!(!result.used_itemized);
    }
}
