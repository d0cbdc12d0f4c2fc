// 💰 Income Tax Calculator
// Progressive bracket tax, Medicare levy, and Medicare levy surcharge
// for a single resident taxpayer.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::fy::{FinancialYear, RateTable};

// ============================================================================
// ASSESSMENT
// ============================================================================

/// Result of a tax assessment. All amounts in dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxAssessment {
    pub financial_year: String,
    pub taxable_income: f64,

    /// Tax from the progressive brackets alone.
    pub base_tax: f64,

    /// Flat Medicare levy (zero when excluded).
    pub medicare_levy: f64,

    /// Medicare levy surcharge (zero with private health insurance
    /// or below the first tier).
    pub medicare_levy_surcharge: f64,

    pub total_tax: f64,

    /// Rate of the bracket the last dollar falls in.
    pub marginal_rate: f64,

    /// total_tax / taxable_income (zero for zero income).
    pub effective_rate: f64,

    pub take_home: f64,
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Tax from the progressive brackets only.
///
/// Negative income is treated as zero, matching the permissive input
/// handling used throughout the ledger.
pub fn base_tax(taxable_income: f64, table: &RateTable) -> f64 {
    let income = taxable_income.max(0.0);
    let mut tax = 0.0;

    for (i, bracket) in table.brackets.iter().enumerate() {
        if income <= bracket.floor {
            break;
        }
        let ceiling = table
            .brackets
            .get(i + 1)
            .map(|next| next.floor)
            .unwrap_or(f64::INFINITY);

        tax += bracket.rate * (income.min(ceiling) - bracket.floor);
    }

    tax
}

/// Rate of the bracket containing the last dollar of income.
pub fn marginal_rate(taxable_income: f64, table: &RateTable) -> f64 {
    let income = taxable_income.max(0.0);

    table
        .brackets
        .iter()
        .rev()
        .find(|b| income > b.floor)
        .map(|b| b.rate)
        .unwrap_or(0.0)
}

/// Medicare levy surcharge for someone without private health insurance.
fn surcharge(taxable_income: f64, table: &RateTable) -> f64 {
    table
        .surcharge_tiers
        .iter()
        .rev()
        .find(|t| taxable_income > t.threshold)
        .map(|t| t.rate * taxable_income)
        .unwrap_or(0.0)
}

/// Full assessment: brackets, Medicare levy, surcharge, derived rates.
pub fn calculate_tax(
    taxable_income: f64,
    year: FinancialYear,
    include_medicare_levy: bool,
    has_private_health_insurance: bool,
) -> Result<TaxAssessment> {
    let table = RateTable::for_year(year)?;
    let income = taxable_income.max(0.0);

    let base = base_tax(income, &table);

    let levy = if include_medicare_levy && income > 0.0 {
        table.medicare_levy_rate * income
    } else {
        0.0
    };

    let mls = if has_private_health_insurance {
        0.0
    } else {
        surcharge(income, &table)
    };

    let total = base + levy + mls;

    Ok(TaxAssessment {
        financial_year: year.label(),
        taxable_income: income,
        base_tax: base,
        medicare_levy: levy,
        medicare_levy_surcharge: mls,
        total_tax: total,
        marginal_rate: marginal_rate(income, &table),
        effective_rate: if income > 0.0 { total / income } else { 0.0 },
        take_home: income - total,
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

    fn table() -> RateTable {
        RateTable::fy_2024_25()
    }

    #[test]
    fn test_tax_free_threshold() {
        assert_eq!(base_tax(0.0, &table()), 0.0);
        assert_eq!(base_tax(18_200.0, &table()), 0.0);
        assert!(base_tax(18_201.0, &table()) > 0.0);
    }

    #[test]
    fn test_bracket_transitions() {
        // (45,000 - 18,200) * 16%
        assert_eq!(base_tax(45_000.0, &table()), 4_288.0);
        // 4,288 + (135,000 - 45,000) * 30% + (190,000 - 135,000) * 37%
        assert_eq!(base_tax(190_000.0, &table()), 51_638.0);
    }

    #[test]
    fn test_top_bracket() {
        // 51,638 + 10,000 * 45%
        assert_eq!(base_tax(200_000.0, &table()), 56_138.0);
    }

    #[test]
    fn test_monotonic_in_income() {
        let t = table();
        let mut prev = 0.0;
        for step in 0..500 {
            let income = step as f64 * 1_000.0;
            let tax = base_tax(income, &t);
            assert!(
                tax >= prev,
                "tax decreased between {} and {}",
                income - 1_000.0,
                income
            );
            prev = tax;
        }
    }

    #[test]
    fn test_negative_income_clamped() {
        let assessment = calculate_tax(-5_000.0, fy(), true, false).unwrap();
        assert_eq!(assessment.taxable_income, 0.0);
        assert_eq!(assessment.total_tax, 0.0);
        assert_eq!(assessment.effective_rate, 0.0);
    }

    #[test]
    fn test_marginal_rates() {
        let t = table();
        assert_eq!(marginal_rate(10_000.0, &t), 0.0);
        assert_eq!(marginal_rate(30_000.0, &t), 0.16);
        assert_eq!(marginal_rate(100_000.0, &t), 0.30);
        assert_eq!(marginal_rate(150_000.0, &t), 0.37);
        assert_eq!(marginal_rate(250_000.0, &t), 0.45);
    }

    #[test]
    fn test_medicare_levy() {
        let with = calculate_tax(100_000.0, fy(), true, true).unwrap();
        let without = calculate_tax(100_000.0, fy(), false, true).unwrap();

        assert_eq!(with.medicare_levy, 2_000.0);
        assert_eq!(without.medicare_levy, 0.0);
        assert_eq!(with.total_tax, without.total_tax + 2_000.0);
    }

    #[test]
    fn test_surcharge_tiers() {
        // Below first tier: no surcharge either way
        let low = calculate_tax(90_000.0, fy(), false, false).unwrap();
        assert_eq!(low.medicare_levy_surcharge, 0.0);

        // Tier 1: 1%
        let t1 = calculate_tax(100_000.0, fy(), false, false).unwrap();
        assert_eq!(t1.medicare_levy_surcharge, 1_000.0);

        // Tier 2: 1.25%
        let t2 = calculate_tax(120_000.0, fy(), false, false).unwrap();
        assert_eq!(t2.medicare_levy_surcharge, 1_500.0);

        // Tier 3: 1.5%
        let t3 = calculate_tax(150_000.0, fy(), false, false).unwrap();
        assert_eq!(t3.medicare_levy_surcharge, 2_250.0);

        // Insured: never surcharged
        let insured = calculate_tax(150_000.0, fy(), false, true).unwrap();
        assert_eq!(insured.medicare_levy_surcharge, 0.0);
    }

    #[test]
    fn test_take_home_and_effective_rate() {
        let a = calculate_tax(190_000.0, fy(), false, true).unwrap();
        assert_eq!(a.base_tax, 51_638.0);
        assert_eq!(a.take_home, 190_000.0 - 51_638.0);
        assert!((a.effective_rate - 51_638.0 / 190_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_year_is_error() {
        assert!(calculate_tax(50_000.0, FinancialYear::new(2030), true, true).is_err());
    }
}
