//! Above-the-line adjustments to income.
//!
//! Each category is gated by its own claim flag. A claimed amount is floored
//! at zero, capped at the category maximum and any statutory contribution
//! limit, and then reduced across the category's phase-out band using total
//! income as the preliminary income measure.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::{non_negative, phase_out, round_half_up};
use crate::models::{
    AdjustmentInputs, AdjustmentRules, AdjustmentSummary, ClaimedAmount, DeductionLimit,
};

/// Calculator for the adjustments to income.
#[derive(Debug, Clone)]
pub struct AdjustmentsWorksheet<'a> {
    rules: &'a AdjustmentRules,
}

impl<'a> AdjustmentsWorksheet<'a> {
    pub fn new(rules: &'a AdjustmentRules) -> Self {
        Self { rules }
    }

    /// Computes every adjustment and their total.
    ///
    /// `income_measure` is the preliminary income used for phase-outs
    /// (total income).
    pub fn calculate(
        &self,
        inputs: &AdjustmentInputs,
        income_measure: Decimal,
    ) -> AdjustmentSummary {
        let rules = self.rules;
        let student_loan_interest = self.deduction(
            "student_loan_interest",
            &inputs.student_loan_interest,
            &rules.student_loan_interest,
            income_measure,
        );
        let retirement_contribution = self.deduction(
            "retirement_contribution",
            &inputs.retirement_contribution,
            &rules.retirement_contribution,
            income_measure,
        );
        let health_savings_contribution = self.deduction(
            "health_savings_contribution",
            &inputs.health_savings_contribution,
            &rules.health_savings_contribution,
            income_measure,
        );
        let tips = self.deduction("tips", &inputs.tips, &rules.tips, income_measure);
        let overtime = self.deduction(
            "overtime",
            &inputs.overtime,
            &rules.overtime,
            income_measure,
        );
        let vehicle_loan_interest = self.deduction(
            "vehicle_loan_interest",
            &inputs.vehicle_loan_interest,
            &rules.vehicle_loan_interest,
            income_measure,
        );
        let senior_bonus = self.deduction(
            "senior_bonus",
            &inputs.senior_bonus,
            &rules.senior_bonus,
            income_measure,
        );

        let total = student_loan_interest
            + retirement_contribution
            + health_savings_contribution
            + tips
            + overtime
            + vehicle_loan_interest
            + senior_bonus;

        AdjustmentSummary {
            student_loan_interest,
            retirement_contribution,
            health_savings_contribution,
            tips,
            overtime,
            vehicle_loan_interest,
            senior_bonus,
            total,
        }
    }

    /// Applies the claim flag, caps and phase-out for one category.
    fn deduction(
        &self,
        category: &'static str,
        claim: &ClaimedAmount,
        limit: &DeductionLimit,
        income_measure: Decimal,
    ) -> Decimal {
        if !claim.claimed {
            return Decimal::ZERO;
        }
        if claim.amount < Decimal::ZERO {
            warn!(
                category,
                amount = %claim.amount,
                "Claimed adjustment is negative; treating as zero"
            );
        }

        let mut capped = non_negative(claim.amount).min(limit.max_amount);
        if let Some(contribution_limit) = limit.contribution_limit {
            capped = capped.min(contribution_limit);
        }

        let allowed = match &limit.phase_out {
            Some(range) => phase_out(capped, income_measure, range.start, range.end),
            None => capped,
        };

        round_half_up(allowed)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxParameters;

    fn rules() -> AdjustmentRules {
        TaxParameters::tax_year_2025().adjustments
    }

    #[test]
    fn unclaimed_categories_are_zero() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            tips: ClaimedAmount {
                claimed: false,
                amount: dec!(5000),
            },
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(60000));

        assert_eq!(result, AdjustmentSummary::default());
    }

    #[test]
    fn student_loan_interest_phases_out_inside_band() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            student_loan_interest: ClaimedAmount::claimed(dec!(2500)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(90000));

        assert_eq!(result.student_loan_interest, dec!(1666.67));
        assert_eq!(result.total, dec!(1666.67));
    }

    #[test]
    fn student_loan_interest_is_capped_before_phase_out() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            student_loan_interest: ClaimedAmount::claimed(dec!(4000)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(50000));

        assert_eq!(result.student_loan_interest, dec!(2500.00));
    }

    #[test]
    fn retirement_contribution_capped_at_contribution_limit() {
        let rules = AdjustmentRules {
            retirement_contribution: DeductionLimit {
                max_amount: dec!(10000),
                contribution_limit: Some(dec!(7000)),
                phase_out: None,
            },
            ..rules()
        };
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            retirement_contribution: ClaimedAmount::claimed(dec!(9000)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(50000));

        assert_eq!(result.retirement_contribution, dec!(7000.00));
    }

    #[test]
    fn health_savings_contribution_has_no_phase_out() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            health_savings_contribution: ClaimedAmount::claimed(dec!(5000)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(900000));

        assert_eq!(result.health_savings_contribution, dec!(4300.00));
    }

    #[test]
    fn new_law_categories_phase_out_independently() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            tips: ClaimedAmount::claimed(dec!(10000)),
            overtime: ClaimedAmount::claimed(dec!(12500)),
            vehicle_loan_interest: ClaimedAmount::claimed(dec!(4000)),
            senior_bonus: ClaimedAmount::claimed(dec!(6000)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(125000));

        // tips and overtime start phasing out at 150000
        assert_eq!(result.tips, dec!(10000.00));
        assert_eq!(result.overtime, dec!(12500.00));
        // vehicle interest: 4000 × (1 − 25000 / 50000)
        assert_eq!(result.vehicle_loan_interest, dec!(2000.00));
        // senior bonus: 6000 × (1 − 50000 / 100000)
        assert_eq!(result.senior_bonus, dec!(3000.00));
        assert_eq!(result.total, dec!(27500.00));
    }

    #[test]
    fn negative_claim_is_treated_as_zero() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            overtime: ClaimedAmount::claimed(dec!(-500)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(50000));

        assert_eq!(result.overtime, dec!(0));
    }

    #[test]
    fn fully_phased_out_above_band() {
        let rules = rules();
        let worksheet = AdjustmentsWorksheet::new(&rules);
        let inputs = AdjustmentInputs {
            student_loan_interest: ClaimedAmount::claimed(dec!(2500)),
            retirement_contribution: ClaimedAmount::claimed(dec!(7000)),
            ..Default::default()
        };

        let result = worksheet.calculate(&inputs, dec!(100000));

        assert_eq!(result.student_loan_interest, dec!(0));
        assert_eq!(result.retirement_contribution, dec!(0));
    }
}
