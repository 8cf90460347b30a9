use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of an ordinary-income rate schedule.
///
/// `subtraction` is the quick-calc constant: for any taxable income inside
/// the bracket, `income × tax_rate − subtraction` equals the progressive tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    pub subtraction: Decimal,
}

impl TaxBracket {
    /// Builds a bracket from the IRS "base tax" form of a schedule row
    /// (tax = base_tax + (income − min_income) × rate).
    pub fn from_base_tax(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
        base_tax: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
            subtraction: tax_rate * min_income - base_tax,
        }
    }

    /// Cumulative tax owed at the bracket's lower bound.
    pub fn base_tax(&self) -> Decimal {
        self.min_income * self.tax_rate - self.subtraction
    }
}

/// One row of the qualified dividend / long-term gain schedule.
/// The last row has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferentialBracket {
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn from_base_tax_derives_subtraction_constant() {
        let bracket = TaxBracket::from_base_tax(
            dec!(48475),
            Some(dec!(103350)),
            dec!(0.22),
            dec!(5578.50),
        );

        assert_eq!(bracket.subtraction, dec!(5086.00));
        assert_eq!(bracket.base_tax(), dec!(5578.50));
    }
}
