// 🧓 SMSF Entities
// Self-managed super fund, its members, and their contributions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fy::FinancialYear;

// ============================================================================
// CONTRIBUTION TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionType {
    /// Pre-tax: employer, salary-sacrifice, personal-deductible.
    Concessional,
    /// After-tax.
    NonConcessional,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::Concessional => "Concessional",
            ContributionType::NonConcessional => "NonConcessional",
        }
    }

    pub fn parse(s: &str) -> Option<ContributionType> {
        match s {
            "Concessional" => Some(ContributionType::Concessional),
            "NonConcessional" => Some(ContributionType::NonConcessional),
            _ => None,
        }
    }
}

// ============================================================================
// FUND / MEMBER / CONTRIBUTION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsfFund {
    /// Stable identity (UUID).
    pub id: String,

    pub name: String,

    /// Australian Business Number, if registered.
    pub abn: Option<String>,

    pub established: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

impl SmsfFund {
    pub fn new(name: impl Into<String>) -> Self {
        SmsfFund {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            abn: None,
            established: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsfMember {
    /// Stable identity (UUID).
    pub id: String,

    pub fund_id: String,
    pub name: String,

    /// Total superannuation balance across all funds. Gates carry-forward.
    pub total_super_balance: f64,

    pub created_at: DateTime<Utc>,
}

impl SmsfMember {
    pub fn new(fund_id: impl Into<String>, name: impl Into<String>) -> Self {
        SmsfMember {
            id: uuid::Uuid::new_v4().to_string(),
            fund_id: fund_id.into(),
            name: name.into(),
            total_super_balance: 0.0,
            created_at: Utc::now(),
        }
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.total_super_balance = balance;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsfContribution {
    /// Stable identity (UUID).
    pub id: String,

    pub member_id: String,
    pub contribution_type: ContributionType,
    pub amount: f64,
    pub date: NaiveDate,

    pub created_at: DateTime<Utc>,
}

impl SmsfContribution {
    pub fn new(
        member_id: impl Into<String>,
        contribution_type: ContributionType,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        SmsfContribution {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            contribution_type,
            amount,
            date,
            created_at: Utc::now(),
        }
    }

    /// Financial year the contribution counts toward.
    pub fn financial_year(&self) -> FinancialYear {
        FinancialYear::from_date(self.date)
    }
}

// ============================================================================
// TESTS
// ============================================================================
