//! Input records for one tax computation.
//!
//! Every record derives `Deserialize` with `#[serde(default)]`, and every
//! numeric field goes through [`lenient_decimal`]: a missing, blank or
//! non-numeric value becomes zero instead of failing the whole document.
//! Amounts are bounded to ±[`MAX_INPUT_AMOUNT`] so that no sum or product
//! in the calculator can overflow.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::filing_status::FilingStatus;

/// Largest magnitude accepted for any input amount (one trillion).
pub const MAX_INPUT_AMOUNT: Decimal = dec!(1000000000000);

/// Bounds an amount to ±[`MAX_INPUT_AMOUNT`].
pub fn clamp_amount(value: Decimal) -> Decimal {
    value.clamp(-MAX_INPUT_AMOUNT, MAX_INPUT_AMOUNT)
}

/// Deserializes a decimal from a number or from text, treating anything
/// unparseable as zero.
///
/// Text may carry a leading `$`, thousands separators and surrounding
/// whitespace (`" $1,250.50 "` parses as `1250.50`).
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer
        .deserialize_any(LenientDecimalVisitor)
        .map(clamp_amount)
}

struct LenientDecimalVisitor;

impl<'de> Visitor<'de> for LenientDecimalVisitor {
    type Value = Decimal;

    fn expecting(
        &self,
        formatter: &mut fmt::Formatter,
    ) -> fmt::Result {
        formatter.write_str("a number or numeric text")
    }

    fn visit_i64<E: de::Error>(
        self,
        v: i64,
    ) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(
        self,
        v: u64,
    ) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(
        self,
        v: f64,
    ) -> Result<Decimal, E> {
        Ok(Decimal::from_f64(v).unwrap_or_default())
    }

    fn visit_str<E: de::Error>(
        self,
        v: &str,
    ) -> Result<Decimal, E> {
        Ok(parse_amount(v))
    }

    fn visit_bool<E: de::Error>(
        self,
        _v: bool,
    ) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_some<D>(
        self,
        deserializer: D,
    ) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(
        self,
        mut seq: A,
    ) -> Result<Decimal, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }

    fn visit_map<A>(
        self,
        mut map: A,
    ) -> Result<Decimal, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }
}

/// Parses user-entered money text; blank or invalid text is zero.
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();
    clamp_amount(cleaned.parse::<Decimal>().unwrap_or_default())
}

/// A simplified pass-through entity profit and loss statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityReturn {
    #[serde(deserialize_with = "lenient_decimal")]
    pub gross_receipts: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub returns_and_allowances: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub cost_of_goods_sold: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub other_income: Decimal,
    pub deductions: EntityDeductions,
    /// Owner's share in percent; clamped into (0, 100] by the calculator.
    #[serde(deserialize_with = "lenient_decimal")]
    pub ownership_percent: Decimal,
}

impl Default for EntityReturn {
    fn default() -> Self {
        Self {
            gross_receipts: Decimal::ZERO,
            returns_and_allowances: Decimal::ZERO,
            cost_of_goods_sold: Decimal::ZERO,
            other_income: Decimal::ZERO,
            deductions: EntityDeductions::default(),
            ownership_percent: dec!(100),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDeductions {
    #[serde(deserialize_with = "lenient_decimal")]
    pub officer_compensation: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub wages: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub repairs: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub rents: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub taxes: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub interest: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub depreciation: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub advertising: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub benefits: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub other: Decimal,
}

impl EntityDeductions {
    pub fn total(&self) -> Decimal {
        self.officer_compensation
            + self.wages
            + self.repairs
            + self.rents
            + self.taxes
            + self.interest
            + self.depreciation
            + self.advertising
            + self.benefits
            + self.other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeInputs {
    #[serde(deserialize_with = "lenient_decimal")]
    pub wages: Decimal,
    pub entity: Option<EntityReturn>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub taxable_interest: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_exempt_interest: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub ordinary_dividends: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub qualified_dividends: Decimal,
    /// Net short-term gain; negative for a loss.
    #[serde(deserialize_with = "lenient_decimal")]
    pub short_term_capital_gain: Decimal,
    /// Net long-term gain; negative for a loss.
    #[serde(deserialize_with = "lenient_decimal")]
    pub long_term_capital_gain: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub unemployment_compensation: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub taxable_refunds: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub other_income: Decimal,
}

/// A flag-gated amount: ignored unless `claimed` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimedAmount {
    pub claimed: bool,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
}

impl ClaimedAmount {
    pub fn claimed(amount: Decimal) -> Self {
        Self {
            claimed: true,
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentInputs {
    pub student_loan_interest: ClaimedAmount,
    pub retirement_contribution: ClaimedAmount,
    pub health_savings_contribution: ClaimedAmount,
    pub tips: ClaimedAmount,
    pub overtime: ClaimedAmount,
    pub vehicle_loan_interest: ClaimedAmount,
    pub senior_bonus: ClaimedAmount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionInputs {
    #[serde(deserialize_with = "lenient_decimal")]
    pub state_local_tax: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub charitable_cash: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub charitable_noncash: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub medical_expenses: Decimal,
}

/// Marketplace coverage figures for premium credit reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumCreditInputs {
    #[serde(deserialize_with = "lenient_decimal")]
    pub family_size: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub enrollment_premium: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub benchmark_premium: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub advance_payments: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditInputs {
    #[serde(deserialize_with = "lenient_decimal")]
    pub dependent_care_expenses: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub education_expenses: Decimal,
    pub premium_credit: PremiumCreditInputs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentInputs {
    #[serde(deserialize_with = "lenient_decimal")]
    pub federal_withholding: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub estimated_payments: Decimal,
    /// Social Security tax shown as withheld on wage statements.
    #[serde(deserialize_with = "lenient_decimal")]
    pub social_security_withheld: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateInputs {
    #[serde(deserialize_with = "lenient_decimal")]
    pub withholding: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub estimated_payments: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub additions: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub subtractions: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub other_credits: Decimal,
}

/// Everything one computation reads from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInputs {
    pub filing_status: FilingStatus,
    pub income: IncomeInputs,
    pub adjustments: AdjustmentInputs,
    pub deductions: DeductionInputs,
    pub credits: CreditInputs,
    pub payments: PaymentInputs,
    pub state: StateInputs,
}

impl TaxInputs {
    /// Returns a copy with every amount bounded to ±[`MAX_INPUT_AMOUNT`].
    ///
    /// Deserialized inputs are already bounded; this covers records built
    /// directly in code.
    pub fn clamped(&self) -> Self {
        let mut inputs = self.clone();
        let mut clamped_fields = 0usize;
        for amount in inputs.amounts_mut() {
            let bounded = clamp_amount(*amount);
            if bounded != *amount {
                *amount = bounded;
                clamped_fields += 1;
            }
        }
        if clamped_fields > 0 {
            warn!(
                clamped_fields,
                limit = %MAX_INPUT_AMOUNT,
                "Input amounts exceed the supported magnitude; clamped"
            );
        }
        inputs
    }

    fn amounts_mut(&mut self) -> Vec<&mut Decimal> {
        let income = &mut self.income;
        let mut amounts = vec![
            &mut income.wages,
            &mut income.taxable_interest,
            &mut income.tax_exempt_interest,
            &mut income.ordinary_dividends,
            &mut income.qualified_dividends,
            &mut income.short_term_capital_gain,
            &mut income.long_term_capital_gain,
            &mut income.unemployment_compensation,
            &mut income.taxable_refunds,
            &mut income.other_income,
        ];
        if let Some(entity) = income.entity.as_mut() {
            let deductions = &mut entity.deductions;
            amounts.extend([
                &mut entity.gross_receipts,
                &mut entity.returns_and_allowances,
                &mut entity.cost_of_goods_sold,
                &mut entity.other_income,
                &mut entity.ownership_percent,
                &mut deductions.officer_compensation,
                &mut deductions.wages,
                &mut deductions.repairs,
                &mut deductions.rents,
                &mut deductions.taxes,
                &mut deductions.interest,
                &mut deductions.depreciation,
                &mut deductions.advertising,
                &mut deductions.benefits,
                &mut deductions.other,
            ]);
        }

        let adjustments = &mut self.adjustments;
        amounts.extend([
            &mut adjustments.student_loan_interest.amount,
            &mut adjustments.retirement_contribution.amount,
            &mut adjustments.health_savings_contribution.amount,
            &mut adjustments.tips.amount,
            &mut adjustments.overtime.amount,
            &mut adjustments.vehicle_loan_interest.amount,
            &mut adjustments.senior_bonus.amount,
        ]);

        let deductions = &mut self.deductions;
        amounts.extend([
            &mut deductions.state_local_tax,
            &mut deductions.charitable_cash,
            &mut deductions.charitable_noncash,
            &mut deductions.medical_expenses,
        ]);

        let credits = &mut self.credits;
        let premium = &mut credits.premium_credit;
        amounts.extend([
            &mut credits.dependent_care_expenses,
            &mut credits.education_expenses,
            &mut premium.family_size,
            &mut premium.enrollment_premium,
            &mut premium.benchmark_premium,
            &mut premium.advance_payments,
        ]);

        let payments = &mut self.payments;
        amounts.extend([
            &mut payments.federal_withholding,
            &mut payments.estimated_payments,
            &mut payments.social_security_withheld,
        ]);

        let state = &mut self.state;
        amounts.extend([
            &mut state.withholding,
            &mut state.estimated_payments,
            &mut state.additions,
            &mut state.subtractions,
            &mut state.other_credits,
        ]);

        amounts
    }
}
