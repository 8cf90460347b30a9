//! Pass-through entity income.
//!
//! Rolls a simplified entity profit and loss statement up to the single
//! figure that flows to the owner's return.
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Gross receipts − returns and allowances |
//! | 2    | Cost of goods sold |
//! | 3    | Other income |
//! | 4    | Total income (Line 1 − Line 2 + Line 3) |
//! | 5    | Total deductions (compensation through other) |
//! | 6    | Ordinary business income or loss (Line 4 − Line 5) |
//! | 7    | Owner's share (Line 6 × ownership percent) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::worksheets::compute_entity_income;
//! use tax_core::{EntityDeductions, EntityReturn};
//!
//! let entity = EntityReturn {
//!     gross_receipts: dec!(500000),
//!     cost_of_goods_sold: dec!(200000),
//!     deductions: EntityDeductions {
//!         officer_compensation: dec!(80000),
//!         wages: dec!(50000),
//!         depreciation: dec!(20000),
//!         ..Default::default()
//!     },
//!     ownership_percent: dec!(100),
//!     ..Default::default()
//! };
//!
//! let income = compute_entity_income(&entity);
//!
//! assert_eq!(income.ordinary_income, dec!(150000));
//! assert_eq!(income.allocated_income, dec!(150000));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::calculations::common::round_half_up;
use crate::models::{EntityIncome, EntityReturn};

/// Smallest ownership share accepted; anything at or below zero is raised
/// to this value.
pub const MIN_OWNERSHIP_PERCENT: Decimal = dec!(0.01);

pub const MAX_OWNERSHIP_PERCENT: Decimal = dec!(100);

/// Computes the entity's income and the owner's allocated share.
pub fn compute_entity_income(entity: &EntityReturn) -> EntityIncome {
    let total_income = round_half_up(
        entity.gross_receipts - entity.returns_and_allowances - entity.cost_of_goods_sold
            + entity.other_income,
    );
    let total_deductions = round_half_up(entity.deductions.total());
    let ordinary_income = total_income - total_deductions;

    let ownership_percent = clamp_ownership(entity.ownership_percent);
    let allocated_income =
        round_half_up(ordinary_income * ownership_percent / MAX_OWNERSHIP_PERCENT);

    EntityIncome {
        total_income,
        total_deductions,
        ordinary_income,
        ownership_percent,
        allocated_income,
    }
}

/// Clamps an ownership percentage into (0, 100].
fn clamp_ownership(percent: Decimal) -> Decimal {
    if percent <= Decimal::ZERO {
        warn!(
            ownership_percent = %percent,
            minimum = %MIN_OWNERSHIP_PERCENT,
            "Ownership percent is zero or negative; using minimum share"
        );
        return MIN_OWNERSHIP_PERCENT;
    }
    if percent > MAX_OWNERSHIP_PERCENT {
        warn!(
            ownership_percent = %percent,
            "Ownership percent exceeds 100; using full share"
        );
        return MAX_OWNERSHIP_PERCENT;
    }
    percent
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::EntityDeductions;

    fn sample_entity() -> EntityReturn {
        EntityReturn {
            gross_receipts: dec!(500000),
            returns_and_allowances: dec!(0),
            cost_of_goods_sold: dec!(200000),
            other_income: dec!(0),
            deductions: EntityDeductions {
                officer_compensation: dec!(80000),
                wages: dec!(50000),
                depreciation: dec!(20000),
                ..Default::default()
            },
            ownership_percent: dec!(100),
        }
    }

    #[test]
    fn computes_full_ownership_roll_up() {
        let income = compute_entity_income(&sample_entity());

        assert_eq!(
            income,
            EntityIncome {
                total_income: dec!(300000),
                total_deductions: dec!(150000),
                ordinary_income: dec!(150000),
                ownership_percent: dec!(100),
                allocated_income: dec!(150000),
            }
        );
    }

    #[test]
    fn allocates_partial_ownership() {
        let entity = EntityReturn {
            ownership_percent: dec!(40),
            ..sample_entity()
        };

        let income = compute_entity_income(&entity);

        assert_eq!(income.allocated_income, dec!(60000));
    }

    #[test]
    fn subtracts_returns_and_adds_other_income() {
        let entity = EntityReturn {
            returns_and_allowances: dec!(10000),
            other_income: dec!(2500),
            ..sample_entity()
        };

        let income = compute_entity_income(&entity);

        assert_eq!(income.total_income, dec!(292500));
    }

    #[test]
    fn sums_every_deduction_category() {
        let entity = EntityReturn {
            deductions: EntityDeductions {
                officer_compensation: dec!(1),
                wages: dec!(2),
                repairs: dec!(3),
                rents: dec!(4),
                taxes: dec!(5),
                interest: dec!(6),
                depreciation: dec!(7),
                advertising: dec!(8),
                benefits: dec!(9),
                other: dec!(10),
            },
            ..sample_entity()
        };

        let income = compute_entity_income(&entity);

        assert_eq!(income.total_deductions, dec!(55));
    }

    #[test]
    fn passes_losses_through() {
        let entity = EntityReturn {
            gross_receipts: dec!(100000),
            cost_of_goods_sold: dec!(90000),
            ownership_percent: dec!(50),
            ..sample_entity()
        };

        let income = compute_entity_income(&entity);

        assert_eq!(income.ordinary_income, dec!(-140000));
        assert_eq!(income.allocated_income, dec!(-70000));
    }

    #[test]
    fn clamps_zero_ownership_to_minimum() {
        let entity = EntityReturn {
            ownership_percent: dec!(0),
            ..sample_entity()
        };

        let income = compute_entity_income(&entity);

        assert_eq!(income.ownership_percent, MIN_OWNERSHIP_PERCENT);
        assert_eq!(income.allocated_income, dec!(15.00));
    }

    #[test]
    fn clamps_ownership_above_one_hundred() {
        let entity = EntityReturn {
            ownership_percent: dec!(150),
            ..sample_entity()
        };

        let income = compute_entity_income(&entity);

        assert_eq!(income.ownership_percent, dec!(100));
        assert_eq!(income.allocated_income, dec!(150000));
    }
}
