//! Tax calculation modules.
//!
//! The primitives live in [`common`] and [`schedules`], the per-stage
//! worksheets in [`worksheets`], and [`TaxCalculator`] runs them in order.

mod calculator;
pub mod common;
pub mod schedules;
pub mod worksheets;

pub use calculator::TaxCalculator;
