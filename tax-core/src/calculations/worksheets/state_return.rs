//! Flat-rate state return.
//!
//! State taxable income starts from federal taxable income, applies the
//! state additions and subtractions, and is taxed at a single rate.

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{Balance, StateInputs, StateResult, StateRules};

/// Calculator for the state return.
#[derive(Debug, Clone)]
pub struct StateReturnWorksheet<'a> {
    rules: &'a StateRules,
}

impl<'a> StateReturnWorksheet<'a> {
    pub fn new(rules: &'a StateRules) -> Self {
        Self { rules }
    }

    pub fn calculate(
        &self,
        inputs: &StateInputs,
        federal_taxable_income: Decimal,
    ) -> StateResult {
        let taxable_income = round_half_up(non_negative(
            federal_taxable_income + inputs.additions - inputs.subtractions,
        ));
        let tax = round_half_up(taxable_income * self.rules.rate);
        let payments = round_half_up(
            non_negative(inputs.withholding)
                + non_negative(inputs.estimated_payments)
                + non_negative(inputs.other_credits),
        );

        StateResult {
            name: self.rules.name.clone(),
            rate: self.rules.rate,
            taxable_income,
            tax,
            payments,
            balance: Balance::from_net(payments - tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxParameters;

    fn rules() -> StateRules {
        TaxParameters::tax_year_2025().state
    }

    #[test]
    fn taxes_federal_taxable_income_at_flat_rate() {
        let rules = rules();
        let worksheet = StateReturnWorksheet::new(&rules);
        let inputs = StateInputs {
            withholding: dec!(3000),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(84250));

        assert_eq!(result.taxable_income, dec!(84250.00));
        // 84250 × 0.044
        assert_eq!(result.tax, dec!(3707.00));
        assert_eq!(result.balance.owed, dec!(707.00));
        assert_eq!(result.balance.refund, dec!(0));
    }

    #[test]
    fn applies_additions_and_subtractions() {
        let rules = rules();
        let worksheet = StateReturnWorksheet::new(&rules);
        let inputs = StateInputs {
            additions: dec!(1000),
            subtractions: dec!(6000),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(50000));

        assert_eq!(result.taxable_income, dec!(45000.00));
        assert_eq!(result.tax, dec!(1980.00));
    }

    #[test]
    fn floors_taxable_income_at_zero() {
        let rules = rules();
        let worksheet = StateReturnWorksheet::new(&rules);
        let inputs = StateInputs {
            subtractions: dec!(20000),
            withholding: dec!(150),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(5000));

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax, dec!(0));
        assert_eq!(result.balance.refund, dec!(150.00));
    }

    #[test]
    fn other_credits_count_as_payments() {
        let rules = rules();
        let worksheet = StateReturnWorksheet::new(&rules);
        let inputs = StateInputs {
            withholding: dec!(1000),
            estimated_payments: dec!(500),
            other_credits: dec!(250),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(40000));

        assert_eq!(result.payments, dec!(1750.00));
        // 1750 − 1760
        assert_eq!(result.balance.owed, dec!(10.00));
    }
}
