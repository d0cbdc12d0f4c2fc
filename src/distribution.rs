// ⚖️ Trust Distribution Modeller
// Compares percentage splits of distributable trust income between two
// beneficiaries and recommends the split with the lowest combined tax.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::fy::{FinancialYear, RateTable};
use crate::tax::base_tax;

/// Default splits to compare, as the percentage to the first beneficiary.
pub const DEFAULT_SPLITS: [f64; 6] = [50.0, 60.0, 70.0, 80.0, 100.0, 0.0];

/// Percentage to the first beneficiary in the baseline scenario.
const BASELINE_SPLIT: f64 = 50.0;

// ============================================================================
// SCENARIO OUTCOMES
// ============================================================================

/// One beneficiary's position under a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryOutcome {
    /// Taxable income before the distribution.
    pub other_income: f64,

    /// Share of the distributable amount.
    pub distribution_share: f64,

    /// Share of the franking credits.
    pub franking_share: f64,

    /// other_income + distribution_share + franking_share (grossed up).
    pub taxable_income: f64,

    /// Bracket tax on the grossed-up income.
    pub gross_tax: f64,

    /// Tax after the franking offset, floored at zero.
    pub net_tax: f64,
}

/// One candidate split and its combined outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionScenario {
    /// Percentage to the first beneficiary.
    pub split: f64,

    /// Display label, e.g. "70/30".
    pub label: String,

    pub beneficiaries: [BeneficiaryOutcome; 2],

    /// Combined net tax across both beneficiaries.
    pub total_tax: f64,
}

/// Full comparison across the requested splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionModel {
    pub financial_year: String,
    pub distributable_income: f64,
    pub franking_credits: f64,

    pub scenarios: Vec<DistributionScenario>,

    /// Split of the lowest-tax scenario.
    pub recommended_split: f64,
    pub recommended_label: String,
    pub recommended_total_tax: f64,

    /// Combined tax under the 50/50 baseline.
    pub baseline_total_tax: f64,

    /// baseline - recommended, floored at zero.
    pub tax_savings: f64,
}

// ============================================================================
// MODELLER
// ============================================================================

fn beneficiary_outcome(
    other_income: f64,
    distribution_share: f64,
    franking_share: f64,
    table: &RateTable,
) -> BeneficiaryOutcome {
    let taxable_income = other_income + distribution_share + franking_share;
    let gross_tax = base_tax(taxable_income, table);
    let net_tax = (gross_tax - franking_share).max(0.0);

    BeneficiaryOutcome {
        other_income,
        distribution_share,
        franking_share,
        taxable_income,
        gross_tax,
        net_tax,
    }
}

fn run_scenario(
    split: f64,
    distributable: f64,
    franking: f64,
    other_incomes: (f64, f64),
    table: &RateTable,
) -> DistributionScenario {
    let split = split.clamp(0.0, 100.0);

    // Second shares are remainders so the whole amount is always allocated
    let first_share = distributable * split / 100.0;
    let second_share = distributable - first_share;
    let first_franking = franking * split / 100.0;
    let second_franking = franking - first_franking;

    let first = beneficiary_outcome(other_incomes.0, first_share, first_franking, table);
    let second = beneficiary_outcome(other_incomes.1, second_share, second_franking, table);
    let total_tax = first.net_tax + second.net_tax;

    DistributionScenario {
        split,
        label: format!("{:.0}/{:.0}", split, 100.0 - split),
        beneficiaries: [first, second],
        total_tax,
    }
}

/// Model a set of splits and pick the lowest-tax one.
///
/// `splits` are percentages to the first beneficiary; `None` compares the
/// six default presets. The recommendation ties break on the split value,
/// so reordering the list never changes the result.
pub fn model_distribution(
    distributable_income: f64,
    franking_credits: f64,
    other_incomes: (f64, f64),
    splits: Option<&[f64]>,
    year: FinancialYear,
) -> Result<DistributionModel> {
    let table = RateTable::for_year(year)?;

    let distributable = distributable_income.max(0.0);
    let franking = franking_credits.max(0.0);

    let candidate_splits: Vec<f64> = match splits {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => DEFAULT_SPLITS.to_vec(),
    };

    let scenarios: Vec<DistributionScenario> = candidate_splits
        .iter()
        .map(|&split| run_scenario(split, distributable, franking, other_incomes, &table))
        .collect();

    let baseline =
        run_scenario(BASELINE_SPLIT, distributable, franking, other_incomes, &table);

    let recommended = scenarios
        .iter()
        .min_by(|a, b| {
            a.total_tax
                .partial_cmp(&b.total_tax)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.split
                        .partial_cmp(&b.split)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        })
        .cloned()
        .expect("at least one scenario");

    Ok(DistributionModel {
        financial_year: year.label(),
        distributable_income: distributable,
        franking_credits: franking,
        recommended_split: recommended.split,
        recommended_label: recommended.label.clone(),
        recommended_total_tax: recommended.total_tax,
        baseline_total_tax: baseline.total_tax,
        tax_savings: (baseline.total_tax - recommended.total_tax).max(0.0),
        scenarios,
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
    fn test_boundary_splits_allocate_everything() {
        let model =
            model_distribution(80_000.0, 6_000.0, (20_000.0, 90_000.0), Some(&[100.0, 0.0]), fy())
                .unwrap();

        let all_to_first = &model.scenarios[0];
        assert_eq!(all_to_first.beneficiaries[0].distribution_share, 80_000.0);
        assert_eq!(all_to_first.beneficiaries[0].franking_share, 6_000.0);
        assert_eq!(all_to_first.beneficiaries[1].distribution_share, 0.0);
        assert_eq!(all_to_first.beneficiaries[1].franking_share, 0.0);

        let all_to_second = &model.scenarios[1];
        assert_eq!(all_to_second.beneficiaries[0].distribution_share, 0.0);
        assert_eq!(all_to_second.beneficiaries[1].distribution_share, 80_000.0);
        assert_eq!(all_to_second.beneficiaries[1].franking_share, 6_000.0);
    }

    #[test]
    fn test_recommendation_never_worse_than_baseline() {
        let cases = [
            (100_000.0, 0.0, (0.0, 0.0)),
            (100_000.0, 10_000.0, (150_000.0, 20_000.0)),
            (50_000.0, 5_000.0, (45_000.0, 45_000.0)),
            (250_000.0, 0.0, (0.0, 200_000.0)),
            (0.0, 0.0, (60_000.0, 60_000.0)),
        ];

        for (income, franking, others) in cases {
            let model = model_distribution(income, franking, others, None, fy()).unwrap();
            assert!(
                model.recommended_total_tax <= model.baseline_total_tax + 1e-9,
                "recommendation worse than baseline for income={}",
                income
            );
            assert!(model.tax_savings >= 0.0);
        }
    }

    #[test]
    fn test_skews_to_lower_income_beneficiary() {
        // First beneficiary already in a high bracket: push income to second
        let model =
            model_distribution(100_000.0, 0.0, (180_000.0, 0.0), None, fy()).unwrap();

        assert_eq!(model.recommended_split, 0.0);
        assert!(model.tax_savings > 0.0);
    }

    #[test]
    fn test_reordering_does_not_change_recommendation() {
        let splits_a = [50.0, 60.0, 70.0, 80.0, 100.0, 0.0];
        let splits_b = [0.0, 100.0, 80.0, 70.0, 60.0, 50.0];

        let a = model_distribution(120_000.0, 9_000.0, (30_000.0, 75_000.0), Some(&splits_a), fy())
            .unwrap();
        let b = model_distribution(120_000.0, 9_000.0, (30_000.0, 75_000.0), Some(&splits_b), fy())
            .unwrap();

        assert_eq!(a.recommended_split, b.recommended_split);
        assert_eq!(a.recommended_total_tax, b.recommended_total_tax);
    }

    #[test]
    fn test_same_inputs_same_result() {
        let a = model_distribution(90_000.0, 3_000.0, (40_000.0, 55_000.0), None, fy()).unwrap();
        let b = model_distribution(90_000.0, 3_000.0, (40_000.0, 55_000.0), None, fy()).unwrap();

        assert_eq!(a.recommended_split, b.recommended_split);
        for (sa, sb) in a.scenarios.iter().zip(&b.scenarios) {
            assert_eq!(sa.total_tax, sb.total_tax);
        }
    }

    #[test]
    fn test_franking_offset_floors_at_zero() {
        // Tiny income, large franking share: offset exceeds gross tax
        let model =
            model_distribution(10_000.0, 20_000.0, (0.0, 0.0), Some(&[100.0]), fy()).unwrap();

        let outcome = &model.scenarios[0].beneficiaries[0];
        assert!(outcome.gross_tax < 20_000.0);
        assert_eq!(outcome.net_tax, 0.0);
    }

    #[test]
    fn test_gross_up_includes_franking() {
        let model =
            model_distribution(70_000.0, 30_000.0, (0.0, 0.0), Some(&[100.0]), fy()).unwrap();

        let outcome = &model.scenarios[0].beneficiaries[0];
        assert_eq!(outcome.taxable_income, 100_000.0);
    }

    #[test]
    fn test_default_presets_used_when_unspecified() {
        let model = model_distribution(60_000.0, 0.0, (50_000.0, 50_000.0), None, fy()).unwrap();
        assert_eq!(model.scenarios.len(), DEFAULT_SPLITS.len());
    }

    #[test]
    fn test_identical_beneficiaries_prefer_even_split() {
        // Symmetric inputs: 50/50 minimises tax (progressive brackets),
        // and the tie-break keeps it stable
        let model = model_distribution(100_000.0, 0.0, (30_000.0, 30_000.0), None, fy()).unwrap();
        assert_eq!(model.recommended_split, 50.0);
        assert_eq!(model.tax_savings, 0.0);
    }
}
