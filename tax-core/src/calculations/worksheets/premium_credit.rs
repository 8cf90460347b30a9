//! Premium tax credit reconciliation.
//!
//! Compares the advance premium subsidy paid during the year with the credit
//! earned on final household income.
//!
//! # Worksheet Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Family size (rounded, at least 1) |
//! | 2    | Poverty line for the family size |
//! | 3    | Household income as a percentage of the poverty line |
//! | 4    | Applicable contribution rate, interpolated within its band |
//! | 5    | Annual contribution (household income × Step 4) |
//! | 6    | Maximum credit (benchmark premium − Step 5, minimum 0) |
//! | 7    | Allowed credit (smaller of enrollment premium or Step 6) |
//! | 8    | Net credit (Step 7 − advance payments) |
//!
//! A positive net credit is refundable to the filer. A negative one is
//! excess advance payment that is added to tax.
//!
//! Below 100% of the poverty line the contribution rate is zero. The last
//! band is open-ended and flat, so from 300% of the poverty line upward the
//! rate holds at its ceiling; there is no eligibility cliff.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::TaxParameters;
//! use tax_core::calculations::worksheets::PremiumCreditWorksheet;
//!
//! let params = TaxParameters::tax_year_2025();
//! let worksheet = PremiumCreditWorksheet::new(&params.premium_credit);
//!
//! let result = worksheet.reconcile(
//!     dec!(40000),  // household income
//!     dec!(1),      // family size
//!     dec!(9000),   // enrollment premium
//!     dec!(9500),   // benchmark premium
//!     dec!(7000),   // advance payments
//! );
//!
//! assert_eq!(result.poverty_line, dec!(15650));
//! assert_eq!(result.annual_contribution, dec!(1689.46));
//! assert_eq!(result.net_credit, dec!(810.54));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::calculations::common::{max, round_half_up};
use crate::models::{PremiumCreditReconciliation, PremiumCreditRules};

const ONE_HUNDRED: Decimal = dec!(100);

/// Calculator for premium tax credit reconciliation.
#[derive(Debug, Clone)]
pub struct PremiumCreditWorksheet<'a> {
    rules: &'a PremiumCreditRules,
}

impl<'a> PremiumCreditWorksheet<'a> {
    pub fn new(rules: &'a PremiumCreditRules) -> Self {
        Self { rules }
    }

    /// Runs the full reconciliation.
    pub fn reconcile(
        &self,
        household_income: Decimal,
        family_size: Decimal,
        enrollment_premium: Decimal,
        benchmark_premium: Decimal,
        advance_payments: Decimal,
    ) -> PremiumCreditReconciliation {
        let family_size = self.family_size(family_size);
        let poverty_line = self.poverty_line(family_size);

        let raw_percent = self.poverty_line_percent(household_income, poverty_line);
        let applicable_contribution_rate = self.applicable_contribution_rate(raw_percent);

        let annual_contribution = max(
            round_half_up(household_income * applicable_contribution_rate),
            Decimal::ZERO,
        );
        let max_credit = max(
            round_half_up(benchmark_premium - annual_contribution),
            Decimal::ZERO,
        );
        let allowed_credit = round_half_up(enrollment_premium.min(max_credit));
        let net_credit = round_half_up(allowed_credit - advance_payments);

        if net_credit < Decimal::ZERO {
            warn!(
                allowed_credit = %allowed_credit,
                advance_payments = %advance_payments,
                repayment = %(-net_credit),
                "Advance premium credit exceeds allowed credit; excess must be repaid"
            );
        } else {
            debug!(
                allowed_credit = %allowed_credit,
                net_credit = %net_credit,
                "Premium credit reconciled"
            );
        }

        PremiumCreditReconciliation {
            household_income,
            family_size,
            poverty_line,
            poverty_line_percent: round_half_up(raw_percent),
            applicable_contribution_rate: applicable_contribution_rate
                .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero),
            annual_contribution,
            max_credit,
            allowed_credit,
            advance_payments,
            net_credit,
        }
    }

    /// Rounds the family size to the nearest whole person, minimum one.
    fn family_size(
        &self,
        family_size: Decimal,
    ) -> u32 {
        let rounded = family_size.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        if rounded < Decimal::ONE {
            return 1;
        }
        rounded.to_u32().unwrap_or(u32::MAX)
    }

    /// Poverty guideline for the household size; sizes past the table add a
    /// fixed amount per person.
    fn poverty_line(
        &self,
        family_size: u32,
    ) -> Decimal {
        let table = &self.rules.poverty_guidelines;
        let Some(largest) = table.last() else {
            return Decimal::ZERO;
        };

        let index = family_size.saturating_sub(1) as usize;
        match table.get(index) {
            Some(amount) => *amount,
            None => {
                let extra_people = Decimal::from(family_size) - Decimal::from(table.len());
                *largest + extra_people * self.rules.additional_person
            }
        }
    }

    fn poverty_line_percent(
        &self,
        household_income: Decimal,
        poverty_line: Decimal,
    ) -> Decimal {
        if poverty_line.is_zero() {
            return Decimal::ZERO;
        }
        household_income / poverty_line * ONE_HUNDRED
    }

    /// Interpolates the contribution rate inside the band holding `percent`.
    fn applicable_contribution_rate(
        &self,
        percent: Decimal,
    ) -> Decimal {
        let bands = &self.rules.contribution_bands;
        let (Some(first), Some(last)) = (bands.first(), bands.last()) else {
            return Decimal::ZERO;
        };

        if percent < first.lower_percent {
            return Decimal::ZERO;
        }

        let band = bands
            .iter()
            .find(|band| {
                percent >= band.lower_percent
                    && band.upper_percent.is_none_or(|upper| percent < upper)
            })
            .unwrap_or(last);

        match band.upper_percent {
            Some(upper) => {
                let position = ((percent - band.lower_percent) / (upper - band.lower_percent))
                    .min(Decimal::ONE);
                band.start_rate + position * (band.end_rate - band.start_rate)
            }
            None => band.end_rate,
        }
    }
}
