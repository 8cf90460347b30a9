//! The master orchestrator.
//!
//! [`TaxCalculator::compute`] runs every stage in a fixed order, each stage
//! consuming the results of the ones before it:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Total income (wages, entity share, interest, dividends, capital gain, other) |
//! | 2    | Adjustments, phased out against total income |
//! | 3    | Adjusted gross income (Step 1 − Step 2) |
//! | 4    | Deduction used (larger of itemized or standard) |
//! | 5    | Taxable income (Step 3 − Step 4, minimum 0) |
//! | 6    | Split into ordinary and preferential portions |
//! | 7    | Base tax (ordinary schedule plus stacked preferential rates) |
//! | 8    | Net investment income surtax and additional Medicare surtax |
//! | 9    | Credits and premium credit reconciliation |
//! | 10   | Tax after credits, then total tax |
//! | 11   | Payments, including excess Social Security and refundable credit |
//! | 12   | Federal refund or amount owed |
//! | 13   | State return |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{TaxCalculator, TaxInputs, TaxParameters};
//!
//! let params = TaxParameters::tax_year_2025();
//! let calculator = TaxCalculator::new(&params).expect("built-in parameters are valid");
//!
//! let mut inputs = TaxInputs::default();
//! inputs.income.wages = dec!(100000);
//!
//! let result = calculator.compute(&inputs);
//!
//! assert_eq!(result.taxable_income, dec!(84250.00));
//! assert_eq!(result.tax.base_tax, dec!(13449.00));
//! assert_eq!(result.balance.owed, dec!(13449.00));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::calculations::common::{max, non_negative, round_half_up};
use crate::calculations::schedules::{bracket_tax, marginal_rate, stacked_rate_tax};
use crate::calculations::worksheets::{
    AdjustmentsWorksheet, CreditsWorksheet, DeductionsWorksheet, PremiumCreditWorksheet,
    StateReturnWorksheet, compute_entity_income,
};
use crate::models::{
    Balance, CreditSummary, EntityIncome, FederalTax, FilingStatus, IncomeInputs,
    IncomeSummary, PaymentInputs, PaymentSummary, PremiumCreditInputs,
    PremiumCreditReconciliation, TaxInputs, TaxParameters, TaxParametersError, TaxResult,
};

/// Decimal places carried by the marginal and effective rates.
const RATE_PRECISION: u32 = 4;

/// Computes a complete tax picture from one set of inputs.
///
/// The calculator only borrows its parameter set, so one validated set can
/// back any number of calculators and concurrent `compute` calls.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    params: &'a TaxParameters,
}

impl<'a> TaxCalculator<'a> {
    /// Validates `params` and builds a calculator over it.
    ///
    /// # Errors
    ///
    /// Returns the first problem found in the parameter set.
    pub fn new(params: &'a TaxParameters) -> Result<Self, TaxParametersError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &'a TaxParameters {
        self.params
    }

    /// Runs every stage for `inputs`.
    ///
    /// Never fails: missing or out-of-range business data is floored or
    /// clamped (amounts beyond ±[`MAX_INPUT_AMOUNT`] included), and the same
    /// inputs always produce the same result.
    ///
    /// [`MAX_INPUT_AMOUNT`]: crate::models::MAX_INPUT_AMOUNT
    pub fn compute(
        &self,
        inputs: &TaxInputs,
    ) -> TaxResult {
        let params = self.params;
        let inputs = &inputs.clamped();
        let status = inputs.filing_status;

        // Steps 1–3
        let income = self.income(&inputs.income);
        let adjustments = AdjustmentsWorksheet::new(&params.adjustments)
            .calculate(&inputs.adjustments, income.total_income);
        let adjusted_gross_income = income.total_income - adjustments.total;
        debug!(
            total_income = %income.total_income,
            adjustments = %adjustments.total,
            adjusted_gross_income = %adjusted_gross_income,
            "Income computed"
        );

        // Steps 4–6
        let deductions = DeductionsWorksheet::new(&params.itemized).calculate(
            &inputs.deductions,
            adjusted_gross_income,
            *params.standard_deduction.get(status),
        );
        let taxable_income = non_negative(adjusted_gross_income - deductions.deduction_used);
        let preferential_income = self
            .preferential_income(&inputs.income)
            .min(taxable_income);
        let ordinary_taxable_income = non_negative(taxable_income - preferential_income);
        debug!(
            taxable_income = %taxable_income,
            ordinary = %ordinary_taxable_income,
            preferential = %preferential_income,
            "Taxable income split"
        );

        // Step 7
        let brackets = params.brackets.get(status);
        let ordinary_tax = bracket_tax(ordinary_taxable_income, brackets);
        let preferential_tax = stacked_rate_tax(
            preferential_income,
            ordinary_taxable_income,
            params.preferential_brackets.get(status),
        );
        let base_tax = non_negative(ordinary_tax + preferential_tax);

        // Step 8
        let net_investment_income_tax =
            self.net_investment_income_tax(&income, adjusted_gross_income, status);
        let additional_medicare_tax = self.additional_medicare_tax(income.wages, status);

        // Step 9
        let credits = self.credits(inputs, adjusted_gross_income, income.tax_exempt_interest);

        // Step 10
        let premium_credit_repayment = credits.premium_credit.repayment();
        let tax_before_credits = base_tax + net_investment_income_tax + premium_credit_repayment;
        let tax_after_credits = non_negative(tax_before_credits - credits.nonrefundable_total);
        let total_tax = tax_after_credits + additional_medicare_tax;
        debug!(
            base_tax = %base_tax,
            tax_before_credits = %tax_before_credits,
            credits = %credits.nonrefundable_total,
            total_tax = %total_tax,
            "Federal tax computed"
        );

        let tax = FederalTax {
            ordinary_tax,
            preferential_tax,
            base_tax,
            net_investment_income_tax,
            additional_medicare_tax,
            premium_credit_repayment,
            tax_before_credits,
            tax_after_credits,
            total_tax,
            marginal_rate: marginal_rate(ordinary_taxable_income, brackets),
            effective_rate: effective_rate(total_tax, income.total_income),
        };

        // Steps 11–12
        let payments = self.payments(
            &inputs.payments,
            income.wages,
            credits.premium_credit.refundable_credit(),
        );
        let balance = Balance::from_net(payments.total - total_tax);
        debug!(
            payments = %payments.total,
            refund = %balance.refund,
            owed = %balance.owed,
            "Federal balance computed"
        );

        // Step 13
        let state =
            StateReturnWorksheet::new(&params.state).calculate(&inputs.state, taxable_income);
        debug!(
            state = %state.name,
            tax = %state.tax,
            refund = %state.balance.refund,
            owed = %state.balance.owed,
            "State balance computed"
        );

        TaxResult {
            tax_year: params.tax_year,
            filing_status: status,
            income,
            adjustments,
            adjusted_gross_income,
            deductions,
            taxable_income,
            ordinary_taxable_income,
            preferential_income,
            tax,
            credits,
            payments,
            balance,
            state,
        }
    }

    /// Step 1: every income line and their total.
    fn income(
        &self,
        inputs: &IncomeInputs,
    ) -> IncomeSummary {
        let entity = inputs
            .entity
            .as_ref()
            .map_or_else(EntityIncome::default, compute_entity_income);

        let wages = non_negative(inputs.wages);
        let taxable_interest = non_negative(inputs.taxable_interest);
        let tax_exempt_interest = non_negative(inputs.tax_exempt_interest);
        let ordinary_dividends = non_negative(inputs.ordinary_dividends);
        let qualified_dividends = non_negative(inputs.qualified_dividends);
        let capital_gain_or_loss = self.capital_gain_or_loss(inputs);
        let unemployment_compensation = non_negative(inputs.unemployment_compensation);
        let taxable_refunds = non_negative(inputs.taxable_refunds);
        let other_income = non_negative(inputs.other_income);

        let total_income = round_half_up(
            wages
                + entity.allocated_income
                + taxable_interest
                + ordinary_dividends
                + capital_gain_or_loss
                + unemployment_compensation
                + taxable_refunds
                + other_income,
        );

        IncomeSummary {
            wages,
            entity,
            taxable_interest,
            tax_exempt_interest,
            ordinary_dividends,
            qualified_dividends,
            capital_gain_or_loss,
            unemployment_compensation,
            taxable_refunds,
            other_income,
            total_income,
        }
    }

    /// Net capital gain, or net loss limited to the deductible maximum.
    fn capital_gain_or_loss(
        &self,
        inputs: &IncomeInputs,
    ) -> Decimal {
        let net = inputs.short_term_capital_gain + inputs.long_term_capital_gain;
        let floor = -self.params.capital_loss_limit;
        if net < floor {
            warn!(
                net_capital_loss = %net,
                allowed = %floor,
                "Net capital loss exceeds the deductible limit; excess is not used"
            );
            return floor;
        }
        round_half_up(net)
    }

    /// Qualified dividends plus net long-term gain, before capping at
    /// taxable income.
    fn preferential_income(
        &self,
        inputs: &IncomeInputs,
    ) -> Decimal {
        let net_capital_gain = inputs.short_term_capital_gain + inputs.long_term_capital_gain;
        let net_long_term_gain = non_negative(inputs.long_term_capital_gain.min(net_capital_gain));
        non_negative(inputs.qualified_dividends) + net_long_term_gain
    }

    fn net_investment_income_tax(
        &self,
        income: &IncomeSummary,
        adjusted_gross_income: Decimal,
        status: FilingStatus,
    ) -> Decimal {
        let surtaxes = &self.params.surtaxes;
        let net_investment_income = income.taxable_interest
            + income.ordinary_dividends
            + non_negative(income.capital_gain_or_loss);
        let excess_income = non_negative(
            adjusted_gross_income - *surtaxes.net_investment_income_threshold.get(status),
        );
        round_half_up(
            net_investment_income.min(excess_income) * surtaxes.net_investment_income_rate,
        )
    }

    fn additional_medicare_tax(
        &self,
        wages: Decimal,
        status: FilingStatus,
    ) -> Decimal {
        let surtaxes = &self.params.surtaxes;
        let excess_wages =
            non_negative(wages - *surtaxes.additional_medicare_threshold.get(status));
        round_half_up(excess_wages * surtaxes.additional_medicare_rate)
    }

    /// Step 9: nonrefundable credits and the premium credit reconciliation.
    fn credits(
        &self,
        inputs: &TaxInputs,
        adjusted_gross_income: Decimal,
        tax_exempt_interest: Decimal,
    ) -> CreditSummary {
        let worksheet = CreditsWorksheet::new(&self.params.credits);
        let dependent_care = worksheet.dependent_care(
            inputs.credits.dependent_care_expenses,
            adjusted_gross_income,
        );
        let education = worksheet.education(inputs.credits.education_expenses);

        let premium_credit = self.premium_credit(
            &inputs.credits.premium_credit,
            adjusted_gross_income + tax_exempt_interest,
        );

        CreditSummary {
            dependent_care,
            education,
            nonrefundable_total: dependent_care + education,
            premium_credit,
        }
    }

    /// Reconciles marketplace coverage; without any coverage figures there is
    /// nothing to reconcile.
    fn premium_credit(
        &self,
        inputs: &PremiumCreditInputs,
        household_income: Decimal,
    ) -> PremiumCreditReconciliation {
        let enrollment_premium = non_negative(inputs.enrollment_premium);
        let benchmark_premium = non_negative(inputs.benchmark_premium);
        let advance_payments = non_negative(inputs.advance_payments);
        if enrollment_premium.is_zero() && benchmark_premium.is_zero() && advance_payments.is_zero()
        {
            return PremiumCreditReconciliation::default();
        }

        PremiumCreditWorksheet::new(&self.params.premium_credit).reconcile(
            household_income,
            inputs.family_size,
            enrollment_premium,
            benchmark_premium,
            advance_payments,
        )
    }

    /// Step 11: everything paid toward the federal tax.
    fn payments(
        &self,
        inputs: &PaymentInputs,
        wages: Decimal,
        refundable_premium_credit: Decimal,
    ) -> PaymentSummary {
        let social_security = &self.params.social_security;
        let expected_social_security =
            round_half_up(wages.min(social_security.wage_base) * social_security.employee_rate);
        let excess_social_security = max(
            non_negative(inputs.social_security_withheld) - expected_social_security,
            Decimal::ZERO,
        );

        let withholding = non_negative(inputs.federal_withholding);
        let estimated_payments = non_negative(inputs.estimated_payments);
        let total = round_half_up(
            withholding + estimated_payments + excess_social_security + refundable_premium_credit,
        );

        PaymentSummary {
            withholding,
            estimated_payments,
            excess_social_security,
            refundable_premium_credit,
            total,
        }
    }
}

/// Total tax as a share of total income; zero when there is no income.
fn effective_rate(
    total_tax: Decimal,
    total_income: Decimal,
) -> Decimal {
    if total_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (total_tax / total_income)
        .round_dp_with_strategy(RATE_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}
