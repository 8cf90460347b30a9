mod filing_status;
mod inputs;
mod tax_bracket;
mod tax_parameters;
mod tax_result;

pub use filing_status::{ByFilingStatus, FilingStatus, InputError};
pub use inputs::{
    AdjustmentInputs, ClaimedAmount, CreditInputs, DeductionInputs, EntityDeductions,
    EntityReturn, IncomeInputs, MAX_INPUT_AMOUNT, PaymentInputs, PremiumCreditInputs,
    StateInputs, TaxInputs, clamp_amount, lenient_decimal, parse_amount,
};
pub use tax_bracket::{PreferentialBracket, TaxBracket};
pub use tax_parameters::{
    AdjustmentRules, ContributionBand, CreditRules, CreditTier, DeductionLimit,
    DependentCareRules, EducationRules, ItemizedRules, POVERTY_TABLE_SIZE, PhaseOutRange,
    PremiumCreditRules, SocialSecurityRules, StateRules, SurtaxRules, TaxParameters,
    TaxParametersError,
};
pub use tax_result::{
    AdjustmentSummary, Balance, CreditSummary, DeductionSummary, EntityIncome, FederalTax,
    IncomeSummary, PaymentSummary, PremiumCreditReconciliation, StateResult, TaxResult,
};
