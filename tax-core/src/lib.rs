//! Personal income tax engine: U.S. federal plus a flat-rate state.
//!
//! [`TaxCalculator::compute`] maps one [`TaxInputs`] record to a complete
//! [`TaxResult`] using a validated, versioned [`TaxParameters`] set.

pub mod calculations;
pub mod models;

pub use calculations::TaxCalculator;
pub use models::*;
