// 🏦 Account Entity
// A family account: bank, credit card, investment, super or loan.
// UUID is identity and never changes; name and balance are values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ACCOUNT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Bank,
    Credit,
    Investment,
    Super,
    Loan,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Bank => "Bank",
            AccountType::Credit => "Credit",
            AccountType::Investment => "Investment",
            AccountType::Super => "Super",
            AccountType::Loan => "Loan",
        }
    }

    pub fn parse(s: &str) -> Option<AccountType> {
        match s {
            "Bank" => Some(AccountType::Bank),
            "Credit" => Some(AccountType::Credit),
            "Investment" => Some(AccountType::Investment),
            "Super" => Some(AccountType::Super),
            "Loan" => Some(AccountType::Loan),
            _ => None,
        }
    }
}

// ============================================================================
// ACCOUNT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity (UUID).
    pub id: String,

    pub name: String,
    pub account_type: AccountType,

    /// Institution holding the account, if any.
    pub institution: Option<String>,

    /// Current balance. Liabilities (credit, loan) are negative.
    pub balance: f64,

    pub currency: String,

    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            account_type,
            institution: None,
            balance: 0.0,
            currency: "AUD".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    /// Liabilities count against net worth.
    pub fn is_liability(&self) -> bool {
        matches!(self.account_type, AccountType::Credit | AccountType::Loan)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_roundtrip() {
        for t in [
            AccountType::Bank,
            AccountType::Credit,
            AccountType::Investment,
            AccountType::Super,
            AccountType::Loan,
        ] {
            assert_eq!(AccountType::parse(t.as_str()), Some(t));
        }
        assert_eq!(AccountType::parse("Cheque"), None);
    }

    #[test]
    fn test_account_builder() {
        let account = Account::new("Family Offset", AccountType::Bank)
            .with_institution("Example Bank")
            .with_balance(12_500.0);

        assert_eq!(account.name, "Family Offset");
        assert_eq!(account.balance, 12_500.0);
        assert_eq!(account.currency, "AUD");
        assert!(!account.is_liability());
        assert!(!account.id.is_empty());
    }

    #[test]
    fn test_liability_types() {
        assert!(Account::new("Visa", AccountType::Credit).is_liability());
        assert!(Account::new("Mortgage", AccountType::Loan).is_liability());
        assert!(!Account::new("SMSF", AccountType::Super).is_liability());
    }
}
