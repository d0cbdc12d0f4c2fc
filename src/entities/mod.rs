// Ledger entity models
// One file per domain: accounts, categories, SMSF, trusts.

pub mod account;
pub mod category;
pub mod smsf;
pub mod trust;

pub use account::{Account, AccountType};
pub use category::{Category, CategoryType};
pub use smsf::{ContributionType, SmsfContribution, SmsfFund, SmsfMember};
pub use trust::{Trust, TrustBeneficiary, TrustDistribution, TrustIncome};
