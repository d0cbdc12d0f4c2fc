// 🤝 Trust Entities
// Family trust, beneficiaries, income received, and distributions resolved.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fy::FinancialYear;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trust {
    /// Stable identity (UUID).
    pub id: String,

    pub name: String,
    pub trustee: Option<String>,
    pub established: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

impl Trust {
    pub fn new(name: impl Into<String>) -> Self {
        Trust {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            trustee: None,
            established: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_trustee(mut self, trustee: impl Into<String>) -> Self {
        self.trustee = Some(trustee.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustBeneficiary {
    /// Stable identity (UUID).
    pub id: String,

    pub trust_id: String,
    pub name: String,

    /// Taxable income outside the trust, used by the distribution modeller.
    pub other_taxable_income: f64,

    pub created_at: DateTime<Utc>,
}

impl TrustBeneficiary {
    pub fn new(trust_id: impl Into<String>, name: impl Into<String>) -> Self {
        TrustBeneficiary {
            id: uuid::Uuid::new_v4().to_string(),
            trust_id: trust_id.into(),
            name: name.into(),
            other_taxable_income: 0.0,
            created_at: Utc::now(),
        }
    }

    pub fn with_other_income(mut self, income: f64) -> Self {
        self.other_taxable_income = income;
        self
    }
}

/// Income received by the trust in a financial year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustIncome {
    /// Stable identity (UUID).
    pub id: String,

    pub trust_id: String,
    pub financial_year: FinancialYear,
    pub amount: f64,

    /// Franking credits attached to the income.
    pub franking_credits: f64,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl TrustIncome {
    pub fn new(trust_id: impl Into<String>, financial_year: FinancialYear, amount: f64) -> Self {
        TrustIncome {
            id: uuid::Uuid::new_v4().to_string(),
            trust_id: trust_id.into(),
            financial_year,
            amount,
            franking_credits: 0.0,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_franking_credits(mut self, credits: f64) -> Self {
        self.franking_credits = credits;
        self
    }
}

/// A resolved distribution to one beneficiary for a financial year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustDistribution {
    /// Stable identity (UUID).
    pub id: String,

    pub trust_id: String,
    pub beneficiary_id: String,
    pub financial_year: FinancialYear,

    pub amount: f64,
    pub franking_credits: f64,

    /// Date the trustee resolved the distribution.
    pub resolved_on: NaiveDate,

    pub created_at: DateTime<Utc>,
}

impl TrustDistribution {
    pub fn new(
        trust_id: impl Into<String>,
        beneficiary_id: impl Into<String>,
        financial_year: FinancialYear,
        amount: f64,
        resolved_on: NaiveDate,
    ) -> Self {
        TrustDistribution {
            id: uuid::Uuid::new_v4().to_string(),
            trust_id: trust_id.into(),
            beneficiary_id: beneficiary_id.into(),
            financial_year,
            amount,
            franking_credits: 0.0,
            resolved_on,
            created_at: Utc::now(),
        }
    }

    /// Distribution resolutions are due by EOFY (30 June). A resolution
    /// dated after the year's end is out of time.
    pub fn resolved_by_eofy(&self) -> bool {
        self.resolved_on <= self.financial_year.end_date()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eofy_resolution_deadline() {
        let fy = FinancialYear::new(2024);

        let on_time = TrustDistribution::new(
            "trust-1",
            "ben-1",
            fy,
            40_000.0,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        let late = TrustDistribution::new(
            "trust-1",
            "ben-1",
            fy,
            40_000.0,
            NaiveDate::from_ymd_opt(2025, 7, 2).unwrap(),
        );

        assert!(on_time.resolved_by_eofy());
        assert!(!late.resolved_by_eofy());
    }

    #[test]
    fn test_trust_builders() {
        let trust = Trust::new("Smith Family Trust").with_trustee("Smith Holdings Pty Ltd");
        let beneficiary =
            TrustBeneficiary::new(trust.id.clone(), "Jo Smith").with_other_income(85_000.0);
        let income = TrustIncome::new(trust.id.clone(), FinancialYear::new(2024), 120_000.0)
            .with_franking_credits(9_000.0);

        assert_eq!(trust.trustee.as_deref(), Some("Smith Holdings Pty Ltd"));
        assert_eq!(beneficiary.other_taxable_income, 85_000.0);
        assert_eq!(income.franking_credits, 9_000.0);
    }
}
