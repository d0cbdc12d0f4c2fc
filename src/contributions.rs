// 🏦 SMSF Contribution Cap Tracker
// Per-member cap usage for a financial year, with carry-forward of
// unused concessional cap.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::fy::{FinancialYear, RateTable};

// ============================================================================
// WARNINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningLevel {
    /// Usage at or past 80% of the cap.
    Approaching,
    /// Usage at or past 100% of the cap.
    Exceeded,
}

impl WarningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::Approaching => "Approaching",
            WarningLevel::Exceeded => "Exceeded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapWarning {
    pub level: WarningLevel,
    pub message: String,
}

// ============================================================================
// CAP USAGE
// ============================================================================

/// Usage of a single cap (concessional or non-concessional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapUsage {
    pub cap: f64,
    pub contributed: f64,

    /// Headroom left under the cap, floored at zero.
    pub remaining: f64,

    /// contributed / cap as a percentage. Can exceed 100.
    pub percent_used: f64,

    pub exceeded: bool,

    pub warning: Option<CapWarning>,
}

impl CapUsage {
    fn assess(label: &str, contributed: f64, cap: f64) -> CapUsage {
        let contributed = contributed.max(0.0);
        let percent_used = if cap > 0.0 {
            contributed / cap * 100.0
        } else {
            0.0
        };
        let exceeded = contributed >= cap;

        let warning = if exceeded {
            Some(CapWarning {
                level: WarningLevel::Exceeded,
                message: format!(
                    "{} contributions of ${:.0} have reached the ${:.0} cap",
                    label, contributed, cap
                ),
            })
        } else if percent_used >= 80.0 {
            Some(CapWarning {
                level: WarningLevel::Approaching,
                message: format!(
                    "{} contributions at {:.1}% of the ${:.0} cap",
                    label, percent_used, cap
                ),
            })
        } else {
            None
        };

        CapUsage {
            cap,
            contributed,
            remaining: (cap - contributed).max(0.0),
            percent_used,
            exceeded,
            warning,
        }
    }

    /// Unused cap this year (zero when exceeded).
    pub fn unused(&self) -> f64 {
        self.remaining
    }
}

// ============================================================================
// CARRY-FORWARD
// ============================================================================

/// Carry-forward position for unused concessional cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryForward {
    /// Available only while total super balance is under the limit.
    pub eligible: bool,

    pub total_super_balance: f64,
    pub balance_limit: f64,

    /// Sum of unused cap from up to five prior years (zero when ineligible).
    pub available: f64,

    /// This year's cap plus any carried-forward amount.
    pub effective_concessional_cap: f64,
}

// ============================================================================
// ASSESSMENT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapAssessment {
    pub financial_year: String,
    pub concessional: CapUsage,
    pub non_concessional: CapUsage,
    pub carry_forward: CarryForward,
}

impl CapAssessment {
    /// Warnings across both caps, for display or the notifications table.
    pub fn warnings(&self) -> Vec<&CapWarning> {
        [&self.concessional.warning, &self.non_concessional.warning]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Assess a member's contributions for the year against the caps.
///
/// `unused_prior_years` holds unused concessional cap per prior year, most
/// recent first; entries beyond the carry-forward window are ignored.
pub fn assess_caps(
    concessional_contributed: f64,
    non_concessional_contributed: f64,
    total_super_balance: f64,
    unused_prior_years: &[f64],
    year: FinancialYear,
) -> Result<CapAssessment> {
    let table = RateTable::for_year(year)?;

    let concessional =
        CapUsage::assess("Concessional", concessional_contributed, table.concessional_cap);
    let non_concessional = CapUsage::assess(
        "Non-concessional",
        non_concessional_contributed,
        table.non_concessional_cap,
    );

    let eligible = total_super_balance < table.carry_forward_balance_limit;
    let available = if eligible {
        unused_prior_years
            .iter()
            .take(table.carry_forward_years)
            .map(|amount| amount.max(0.0))
            .sum()
    } else {
        0.0
    };

    let carry_forward = CarryForward {
        eligible,
        total_super_balance,
        balance_limit: table.carry_forward_balance_limit,
        available,
        effective_concessional_cap: table.concessional_cap + available,
    };

    Ok(CapAssessment {
        financial_year: year.label(),
        concessional,
        non_concessional,
        carry_forward,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fy() -> FinancialYear {
        FinancialYear::new(2024)
    }

    #[test]
    fn test_cap_exceeded() {
        let a = assess_caps(35_000.0, 0.0, 400_000.0, &[], fy()).unwrap();

        assert_eq!(a.concessional.remaining, 0.0);
        assert!(a.concessional.exceeded);
        assert!((a.concessional.percent_used - 116.66666).abs() < 0.001);

        let warning = a.concessional.warning.as_ref().unwrap();
        assert_eq!(warning.level, WarningLevel::Exceeded);
    }

    #[test]
    fn test_headroom_remaining() {
        let a = assess_caps(10_000.0, 50_000.0, 400_000.0, &[], fy()).unwrap();

        assert_eq!(a.concessional.remaining, 20_000.0);
        assert!(!a.concessional.exceeded);
        assert!(a.concessional.warning.is_none());

        assert_eq!(a.non_concessional.remaining, 70_000.0);
        assert!((a.non_concessional.percent_used - 41.66666).abs() < 0.001);
    }

    #[test]
    fn test_approaching_warning_at_eighty_percent() {
        let a = assess_caps(24_000.0, 0.0, 400_000.0, &[], fy()).unwrap();

        let warning = a.concessional.warning.as_ref().unwrap();
        assert_eq!(warning.level, WarningLevel::Approaching);
        assert_eq!(a.concessional.percent_used, 80.0);
    }

    #[test]
    fn test_exact_cap_is_exceeded_flag() {
        let a = assess_caps(30_000.0, 0.0, 400_000.0, &[], fy()).unwrap();

        assert!(a.concessional.exceeded);
        assert_eq!(a.concessional.remaining, 0.0);
        assert_eq!(a.concessional.percent_used, 100.0);
    }

    #[test]
    fn test_carry_forward_under_balance_limit() {
        let prior = [5_000.0, 10_000.0, 2_500.0];
        let a = assess_caps(0.0, 0.0, 450_000.0, &prior, fy()).unwrap();

        assert!(a.carry_forward.eligible);
        assert_eq!(a.carry_forward.available, 17_500.0);
        assert_eq!(a.carry_forward.effective_concessional_cap, 47_500.0);
    }

    #[test]
    fn test_carry_forward_blocked_over_balance_limit() {
        let prior = [5_000.0, 10_000.0];
        let a = assess_caps(0.0, 0.0, 500_000.0, &prior, fy()).unwrap();

        assert!(!a.carry_forward.eligible);
        assert_eq!(a.carry_forward.available, 0.0);
        assert_eq!(a.carry_forward.effective_concessional_cap, 30_000.0);
    }

    #[test]
    fn test_carry_forward_window_is_five_years() {
        // Six entries: the sixth is outside the window
        let prior = [1_000.0, 1_000.0, 1_000.0, 1_000.0, 1_000.0, 99_000.0];
        let a = assess_caps(0.0, 0.0, 100_000.0, &prior, fy()).unwrap();

        assert_eq!(a.carry_forward.available, 5_000.0);
    }

    #[test]
    fn test_negative_inputs_clamped() {
        let a = assess_caps(-1_000.0, -1.0, 100_000.0, &[-500.0], fy()).unwrap();

        assert_eq!(a.concessional.contributed, 0.0);
        assert_eq!(a.non_concessional.contributed, 0.0);
        assert_eq!(a.carry_forward.available, 0.0);
    }

    #[test]
    fn test_warnings_collected() {
        let a = assess_caps(31_000.0, 100_000.0, 400_000.0, &[], fy()).unwrap();
        let warnings = a.warnings();

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].level, WarningLevel::Exceeded);
        assert_eq!(warnings[1].level, WarningLevel::Approaching);
    }
}
