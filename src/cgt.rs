// 📈 Capital Gains Calculator
// Gain/loss on asset disposal with the holding-period discount.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fy::RateTable;

// ============================================================================
// ASSESSMENT
// ============================================================================

/// Result of a capital gains assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CgtAssessment {
    pub cost_base: f64,
    pub sale_price: f64,

    /// sale_price - cost_base. Negative for a loss.
    pub capital_gain: f64,

    /// True when the disposal produced a loss. The loss amount is carried
    /// forward; no tax figure is computed for it.
    pub is_loss: bool,

    /// Loss available to carry forward (zero for a gain).
    pub carried_forward_loss: f64,

    /// Full calendar months between acquisition and sale.
    pub months_held: i64,

    pub discount_applied: bool,

    /// Gain added to taxable income after any discount (zero for a loss).
    pub taxable_gain: f64,
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Full calendar months from `from` to `to`, day-of-month aware:
/// 15 Mar 2024 - 14 Mar 2025 is 11 months, - 15 Mar 2025 is 12.
/// Clamped at zero when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months =
        (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64);

    if to.day() < from.day() {
        months -= 1;
    }

    months.max(0)
}

/// Assess a disposal against the discount rule in `table`.
pub fn calculate_cgt(
    cost_base: f64,
    sale_price: f64,
    acquisition_date: NaiveDate,
    sale_date: NaiveDate,
    table: &RateTable,
) -> CgtAssessment {
    let gain = sale_price - cost_base;
    let months = months_between(acquisition_date, sale_date);

    if gain <= 0.0 {
        return CgtAssessment {
            cost_base,
            sale_price,
            capital_gain: gain,
            is_loss: gain < 0.0,
            carried_forward_loss: -gain.min(0.0),
            months_held: months,
            discount_applied: false,
            taxable_gain: 0.0,
        };
    }

    let discount_applied = months >= table.cgt_discount_months as i64;
    let taxable_gain = if discount_applied {
        gain * (1.0 - table.cgt_discount)
    } else {
        gain
    };

    CgtAssessment {
        cost_base,
        sale_price,
        capital_gain: gain,
        is_loss: false,
        carried_forward_loss: 0.0,
        months_held: months,
        discount_applied,
        taxable_gain,
    }
}

// ============================================================================
// TESTS
// ============================================================================
