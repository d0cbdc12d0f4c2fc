// 📅 Financial Years - Versioned Rate Tables
// Australian financial year (1 July - 30 June) plus the legislated
// rates and caps for each year, kept in one table per year.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// FINANCIAL YEAR
// ============================================================================

/// An Australian financial year, identified by its starting calendar year.
/// `FinancialYear::new(2024)` is FY 2024-25: 1 Jul 2024 - 30 Jun 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FinancialYear(pub i32);

impl FinancialYear {
    pub fn new(start_year: i32) -> Self {
        FinancialYear(start_year)
    }

    /// Parse a label like "2024-25".
    pub fn from_label(label: &str) -> Result<Self> {
        let (start, end) = label
            .split_once('-')
            .ok_or_else(|| anyhow!("Invalid financial year label: {}", label))?;

        let start_year: i32 = start
            .parse()
            .map_err(|_| anyhow!("Invalid financial year label: {}", label))?;

        // Suffix must be the two-digit end year
        let expected = format!("{:02}", (start_year + 1) % 100);
        if end != expected {
            return Err(anyhow!("Invalid financial year label: {}", label));
        }

        Ok(FinancialYear(start_year))
    }

    /// Financial year containing a calendar date (FY rolls over on 1 July).
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 7 {
            FinancialYear(date.year())
        } else {
            FinancialYear(date.year() - 1)
        }
    }

    /// Display label, e.g. "2024-25".
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1) % 100)
    }

    /// First day of the year: 1 July.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 7, 1).unwrap()
    }

    /// Last day of the year: 30 June (EOFY, the trust resolution deadline).
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 + 1, 6, 30).unwrap()
    }

    pub fn prev(&self) -> Self {
        FinancialYear(self.0 - 1)
    }

    pub fn next(&self) -> Self {
        FinancialYear(self.0 + 1)
    }
}

impl std::fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// RATE TABLE
// ============================================================================

/// One marginal tax bracket: `rate` applies to income above `floor`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxBracket {
    pub floor: f64,
    pub rate: f64,
}

/// One Medicare levy surcharge tier: `rate` applies when income exceeds
/// `threshold` and the person has no private health insurance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurchargeTier {
    pub threshold: f64,
    pub rate: f64,
}

/// All legislated figures for one financial year.
///
/// Rates live here rather than inline in the calculators so a new year is a
/// new table entry, and an unknown year is an explicit error instead of a
/// silently stale number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub year: FinancialYear,

    /// Progressive brackets, ascending by floor. First floor is always 0.
    pub brackets: Vec<TaxBracket>,

    /// Flat Medicare levy rate.
    pub medicare_levy_rate: f64,

    /// Surcharge tiers, ascending by threshold.
    pub surcharge_tiers: Vec<SurchargeTier>,

    /// Concessional (pre-tax) contribution cap.
    pub concessional_cap: f64,

    /// Non-concessional (after-tax) contribution cap.
    pub non_concessional_cap: f64,

    /// Total super balance above which carry-forward is unavailable.
    pub carry_forward_balance_limit: f64,

    /// How many prior years of unused concessional cap can be carried forward.
    pub carry_forward_years: usize,

    /// CGT discount for assets held past the threshold (0.5 = 50%).
    pub cgt_discount: f64,

    /// Minimum holding period in calendar months for the CGT discount.
    pub cgt_discount_months: i32,
}

impl RateTable {
    /// Look up the table for a financial year.
    ///
    /// Returns an error for years with no legislated table so callers never
    /// compute against the wrong year's figures.
    pub fn for_year(year: FinancialYear) -> Result<RateTable> {
        match year.0 {
            2024 => Ok(Self::fy_2024_25()),
            _ => Err(anyhow!(
                "No rate table for financial year {} (known years: 2024-25)",
                year
            )),
        }
    }

    /// FY 2024-25 figures.
    pub fn fy_2024_25() -> RateTable {
        RateTable {
            year: FinancialYear(2024),
            brackets: vec![
                TaxBracket { floor: 0.0, rate: 0.0 },
                TaxBracket { floor: 18_200.0, rate: 0.16 },
                TaxBracket { floor: 45_000.0, rate: 0.30 },
                TaxBracket { floor: 135_000.0, rate: 0.37 },
                TaxBracket { floor: 190_000.0, rate: 0.45 },
            ],
            medicare_levy_rate: 0.02,
            surcharge_tiers: vec![
                SurchargeTier { threshold: 93_000.0, rate: 0.01 },
                SurchargeTier { threshold: 108_000.0, rate: 0.0125 },
                SurchargeTier { threshold: 144_000.0, rate: 0.015 },
            ],
            concessional_cap: 30_000.0,
            non_concessional_cap: 120_000.0,
            carry_forward_balance_limit: 500_000.0,
            carry_forward_years: 5,
            cgt_discount: 0.5,
            cgt_discount_months: 12,
        }
    }

    /// Labels of all years with a table.
    pub fn known_years() -> Vec<String> {
        vec![FinancialYear(2024).label()]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        let fy = FinancialYear::new(2024);
        assert_eq!(fy.label(), "2024-25");
        assert_eq!(FinancialYear::from_label("2024-25").unwrap(), fy);
    }

    #[test]
    fn test_label_century_boundary() {
        assert_eq!(FinancialYear::new(1999).label(), "1999-00");
        assert_eq!(FinancialYear::from_label("1999-00").unwrap(), FinancialYear(1999));
    }

    #[test]
    fn test_invalid_labels() {
        assert!(FinancialYear::from_label("2024").is_err());
        assert!(FinancialYear::from_label("2024-26").is_err());
        assert!(FinancialYear::from_label("abcd-ef").is_err());
    }

    #[test]
    fn test_from_date_rollover() {
        let june = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let july = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        assert_eq!(FinancialYear::from_date(june), FinancialYear(2024));
        assert_eq!(FinancialYear::from_date(july), FinancialYear(2025));
    }

    #[test]
    fn test_year_bounds() {
        let fy = FinancialYear::new(2024);
        assert_eq!(fy.start_date(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(fy.end_date(), NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_rate_table_lookup() {
        let table = RateTable::for_year(FinancialYear(2024)).unwrap();
        assert_eq!(table.brackets.len(), 5);
        assert_eq!(table.concessional_cap, 30_000.0);

        // Unknown year must be an explicit error
        assert!(RateTable::for_year(FinancialYear(2019)).is_err());
    }

    #[test]
    fn test_brackets_ascending() {
        let table = RateTable::fy_2024_25();
        for pair in table.brackets.windows(2) {
            assert!(pair[0].floor < pair[1].floor);
            assert!(pair[0].rate <= pair[1].rate);
        }
    }
}
