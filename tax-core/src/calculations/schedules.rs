//! Rate schedule lookups.
//!
//! Ordinary income is taxed with the quick-calc method: the bracket holding
//! the income supplies a rate and a subtraction constant, and
//! `income × rate − subtraction` is the progressive tax without walking the
//! lower brackets. Preferential income (qualified dividends and net
//! long-term gains) is stacked on top of ordinary taxable income and taxed
//! across its own schedule.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::models::{PreferentialBracket, TaxBracket};

/// Returns the bracket whose lower bound is the greatest one strictly below
/// `taxable_income`, searching from the top of the table.
pub fn bracket_for(
    taxable_income: Decimal,
    brackets: &[TaxBracket],
) -> Option<&TaxBracket> {
    brackets
        .iter()
        .rev()
        .find(|b| taxable_income > b.min_income)
}

/// Progressive tax on ordinary taxable income, rounded to cents.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::TaxParameters;
/// use tax_core::calculations::schedules::bracket_tax;
///
/// let params = TaxParameters::tax_year_2025();
///
/// // 84,250 falls in the 22% bracket: 84,250 × 0.22 − 5,086
/// assert_eq!(bracket_tax(dec!(84250), &params.brackets.single), dec!(13449.00));
/// ```
pub fn bracket_tax(
    taxable_income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    bracket_for(taxable_income, brackets).map_or(Decimal::ZERO, |bracket| {
        round_half_up(taxable_income * bracket.tax_rate - bracket.subtraction)
    })
}

/// Rate that applies to the next dollar of ordinary income.
pub fn marginal_rate(
    taxable_income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    brackets
        .iter()
        .rev()
        .find(|b| taxable_income >= b.min_income)
        .map_or(Decimal::ZERO, |b| b.tax_rate)
}

/// Tax on preferential income stacked above `ordinary_taxable_income`.
///
/// Each schedule row taxes the part of the remaining preferential income
/// that fits between the running cursor and the row's upper bound. Rows that
/// ordinary income already fills contribute nothing.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::TaxParameters;
/// use tax_core::calculations::schedules::stacked_rate_tax;
///
/// let params = TaxParameters::tax_year_2025();
/// let brackets = &params.preferential_brackets.single;
///
/// // 8,350 fits in the 0% row, the remaining 1,650 is taxed at 15%.
/// assert_eq!(stacked_rate_tax(dec!(10000), dec!(40000), brackets), dec!(247.50));
/// ```
pub fn stacked_rate_tax(
    preferential_amount: Decimal,
    ordinary_taxable_income: Decimal,
    brackets: &[PreferentialBracket],
) -> Decimal {
    if preferential_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut cursor = ordinary_taxable_income.max(Decimal::ZERO);
    let mut remaining = preferential_amount;
    let mut tax = Decimal::ZERO;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let room = match bracket.max_income {
            Some(max) => (max - cursor).max(Decimal::ZERO),
            None => remaining,
        };
        let portion = remaining.min(room);

        tax += portion * bracket.tax_rate;
        cursor += portion;
        remaining -= portion;
    }

    round_half_up(tax)
}
