//! Nonrefundable credits: dependent care and education.

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{CreditRules, CreditTier};

/// Calculator for the nonrefundable credits.
#[derive(Debug, Clone)]
pub struct CreditsWorksheet<'a> {
    rules: &'a CreditRules,
}

impl<'a> CreditsWorksheet<'a> {
    pub fn new(rules: &'a CreditRules) -> Self {
        Self { rules }
    }

    /// Dependent care credit: capped expenses times the AGI-tiered rate.
    pub fn dependent_care(
        &self,
        expenses: Decimal,
        adjusted_gross_income: Decimal,
    ) -> Decimal {
        let rules = &self.rules.dependent_care;
        let qualified = non_negative(expenses).min(rules.expense_limit);
        if qualified.is_zero() {
            return Decimal::ZERO;
        }
        round_half_up(qualified * tier_rate(&rules.tiers, adjusted_gross_income))
    }

    /// Education credit: a share of expenses up to a fixed ceiling.
    pub fn education(
        &self,
        expenses: Decimal,
    ) -> Decimal {
        let rules = &self.rules.education;
        round_half_up((non_negative(expenses) * rules.rate).min(rules.max_credit))
    }
}

/// Rate of the first tier whose ceiling is at or above `agi`.
fn tier_rate(
    tiers: &[CreditTier],
    agi: Decimal,
) -> Decimal {
    tiers
        .iter()
        .find(|tier| tier.max_agi.is_none_or(|max| agi <= max))
        .map_or(Decimal::ZERO, |tier| tier.rate)
}
