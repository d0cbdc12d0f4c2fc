// Family Wealth Ledger - Core Library
// Accounts, transaction categorisation, SMSF contribution tracking,
// trust distributions, and the Australian tax calculators behind them.
// Exposed for the CLI, API server, assistant tool server, and tests.

pub mod cgt;
pub mod contributions;
pub mod db;
pub mod distribution;
pub mod entities;
pub mod format;
pub mod fy;
pub mod rules;
pub mod tax;
pub mod tools;
pub mod validate;

// Re-export commonly used types
pub use cgt::{calculate_cgt, months_between, CgtAssessment};
pub use contributions::{assess_caps, CapAssessment, CapUsage, CapWarning, CarryForward, WarningLevel};
pub use db::{
    count_transactions, get_accounts, get_all_transactions, get_categories,
    get_transactions_by_category, get_uncategorised, get_unread_notifications, insert_transactions,
    load_csv, setup_database, Notification, Transaction,
};
pub use distribution::{
    model_distribution, BeneficiaryOutcome, DistributionModel, DistributionScenario, DEFAULT_SPLITS,
};
pub use entities::{
    Account, AccountType, Category, CategoryType, ContributionType, SmsfContribution, SmsfFund,
    SmsfMember, Trust, TrustBeneficiary, TrustDistribution, TrustIncome,
};
pub use fy::{FinancialYear, RateTable, SurchargeTier, TaxBracket};
pub use rules::{CategoryRule, Classification, RuleEngine};
pub use tax::{base_tax, calculate_tax, marginal_rate, TaxAssessment};
pub use tools::{get_tools, ToolHandlers};
pub use validate::{ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
