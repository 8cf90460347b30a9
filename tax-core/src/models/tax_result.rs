use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filing_status::FilingStatus;

/// Refund or amount owed for one jurisdiction. At most one side is nonzero
/// and neither is ever negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub refund: Decimal,
    pub owed: Decimal,
}

impl Balance {
    /// Splits `payments − tax` into a refund (when non-negative) or an
    /// amount owed.
    pub fn from_net(net: Decimal) -> Self {
        if net >= Decimal::ZERO {
            Self {
                refund: net,
                owed: Decimal::ZERO,
            }
        } else {
            Self {
                refund: Decimal::ZERO,
                owed: -net,
            }
        }
    }
}

/// Roll-up of a pass-through entity's profit and loss statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIncome {
    pub total_income: Decimal,
    pub total_deductions: Decimal,
    pub ordinary_income: Decimal,
    /// Ownership percent after clamping into (0, 100].
    pub ownership_percent: Decimal,
    pub allocated_income: Decimal,
}

/// Premium tax credit reconciliation figures.
///
/// A positive `net_credit` is additional credit owed to the filer; a
/// negative one is excess advance payment that must be repaid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumCreditReconciliation {
    pub household_income: Decimal,
    pub family_size: u32,
    pub poverty_line: Decimal,
    pub poverty_line_percent: Decimal,
    /// Share of household income expected as the filer's contribution (0.04 = 4%).
    pub applicable_contribution_rate: Decimal,
    pub annual_contribution: Decimal,
    pub max_credit: Decimal,
    pub allowed_credit: Decimal,
    pub advance_payments: Decimal,
    pub net_credit: Decimal,
}

impl PremiumCreditReconciliation {
    /// Portion of the net credit that is refundable to the filer.
    pub fn refundable_credit(&self) -> Decimal {
        self.net_credit.max(Decimal::ZERO)
    }

    /// Portion of the advance payments that must be repaid.
    pub fn repayment(&self) -> Decimal {
        (-self.net_credit).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub wages: Decimal,
    pub entity: EntityIncome,
    pub taxable_interest: Decimal,
    pub tax_exempt_interest: Decimal,
    pub ordinary_dividends: Decimal,
    pub qualified_dividends: Decimal,
    /// Net capital gain, or net loss limited to the deductible maximum.
    pub capital_gain_or_loss: Decimal,
    pub unemployment_compensation: Decimal,
    pub taxable_refunds: Decimal,
    pub other_income: Decimal,
    pub total_income: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    pub student_loan_interest: Decimal,
    pub retirement_contribution: Decimal,
    pub health_savings_contribution: Decimal,
    pub tips: Decimal,
    pub overtime: Decimal,
    pub vehicle_loan_interest: Decimal,
    pub senior_bonus: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSummary {
    pub medical: Decimal,
    pub state_local_tax: Decimal,
    pub charitable: Decimal,
    pub itemized_total: Decimal,
    pub standard_deduction: Decimal,
    pub deduction_used: Decimal,
    pub used_itemized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSummary {
    pub dependent_care: Decimal,
    pub education: Decimal,
    pub nonrefundable_total: Decimal,
    pub premium_credit: PremiumCreditReconciliation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTax {
    pub ordinary_tax: Decimal,
    pub preferential_tax: Decimal,
    pub base_tax: Decimal,
    pub net_investment_income_tax: Decimal,
    pub additional_medicare_tax: Decimal,
    pub premium_credit_repayment: Decimal,
    /// Base tax plus the investment surtax and any credit repayment.
    pub tax_before_credits: Decimal,
    pub tax_after_credits: Decimal,
    pub total_tax: Decimal,
    pub marginal_rate: Decimal,
    pub effective_rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub withholding: Decimal,
    pub estimated_payments: Decimal,
    pub excess_social_security: Decimal,
    pub refundable_premium_credit: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResult {
    pub name: String,
    pub rate: Decimal,
    pub taxable_income: Decimal,
    pub tax: Decimal,
    pub payments: Decimal,
    pub balance: Balance,
}

/// Every line figure produced by one computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub income: IncomeSummary,
    pub adjustments: AdjustmentSummary,
    pub adjusted_gross_income: Decimal,
    pub deductions: DeductionSummary,
    pub taxable_income: Decimal,
    pub ordinary_taxable_income: Decimal,
    pub preferential_income: Decimal,
    pub tax: FederalTax,
    pub credits: CreditSummary,
    pub payments: PaymentSummary,
    pub balance: Balance,
    pub state: StateResult,
}
