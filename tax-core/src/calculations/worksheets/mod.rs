//! Per-stage calculators.
//!
//! Each worksheet borrows the slice of [`TaxParameters`](crate::TaxParameters)
//! it reads and turns one group of inputs into its result lines.

pub mod adjustments;
pub mod credits;
pub mod deductions;
pub mod entity_income;
pub mod premium_credit;
pub mod state_return;

pub use adjustments::AdjustmentsWorksheet;
pub use credits::CreditsWorksheet;
pub use deductions::DeductionsWorksheet;
pub use entity_income::compute_entity_income;
pub use premium_credit::PremiumCreditWorksheet;
pub use state_return::StateReturnWorksheet;
