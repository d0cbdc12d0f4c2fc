// 🗄️ Ledger Store - CSV → SQLite + WAL
// All durable state: accounts, categories, transactions, SMSF records,
// trusts, and notifications.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::entities::{
    Account, AccountType, Category, CategoryType, ContributionType, SmsfContribution, SmsfFund,
    SmsfMember, Trust, TrustBeneficiary, TrustDistribution, TrustIncome,
};
use crate::fy::FinancialYear;

// ============================================================================
// TRANSACTION
// ============================================================================

/// A ledger transaction as imported from a statement export.
/// Dates are kept as entered; parsing is permissive and deferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Account")]
    #[serde(default)]
    pub account: String,

    #[serde(rename = "Category")]
    #[serde(default)]
    pub category: String,

    #[serde(rename = "Counterparty")]
    #[serde(default)]
    pub counterparty: String,

    #[serde(rename = "Currency")]
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(skip)]
    pub source_file: String,

    #[serde(skip)]
    pub line_number: usize,
}

fn default_currency() -> String {
    "AUD".to_string()
}

impl Transaction {
    /// Hash over the fields that identify a statement line. Re-importing the
    /// same file (or an overlapping export) inserts nothing new.
    pub fn idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.date.as_bytes());
        hasher.update(b"|");
        hasher.update(self.description.as_bytes());
        hasher.update(b"|");
        hasher.update(format!("{:.2}", self.amount).as_bytes());
        hasher.update(b"|");
        hasher.update(self.account.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Date parsed as ISO, if it parses.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Financial year, when the date parses.
    pub fn financial_year(&self) -> Option<FinancialYear> {
        self.parsed_date().map(FinancialYear::from_date)
    }
}

/// An in-app notification (cap warnings, late resolutions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub severity: String,
    pub message: String,
    pub source: String,
    pub created_at: String,
    pub read: bool,
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Create all ledger tables and switch the database to WAL mode.
pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("Failed to enable WAL mode")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            account_type TEXT NOT NULL,
            institution TEXT,
            balance REAL NOT NULL DEFAULT 0,
            currency TEXT NOT NULL DEFAULT 'AUD',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            parent_id TEXT,
            category_type TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            account TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            counterparty TEXT NOT NULL DEFAULT '',
            currency TEXT NOT NULL DEFAULT 'AUD',
            source_file TEXT NOT NULL DEFAULT '',
            line_number INTEGER NOT NULL DEFAULT 0,
            idempotency_hash TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_category
            ON transactions(category);

        CREATE TABLE IF NOT EXISTS smsf_funds (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            abn TEXT,
            established TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS smsf_members (
            id TEXT PRIMARY KEY,
            fund_id TEXT NOT NULL REFERENCES smsf_funds(id),
            name TEXT NOT NULL,
            total_super_balance REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS smsf_contributions (
            id TEXT PRIMARY KEY,
            member_id TEXT NOT NULL REFERENCES smsf_members(id),
            contribution_type TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trusts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            trustee TEXT,
            established TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trust_beneficiaries (
            id TEXT PRIMARY KEY,
            trust_id TEXT NOT NULL REFERENCES trusts(id),
            name TEXT NOT NULL,
            other_taxable_income REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trust_income (
            id TEXT PRIMARY KEY,
            trust_id TEXT NOT NULL REFERENCES trusts(id),
            financial_year TEXT NOT NULL,
            amount REAL NOT NULL,
            franking_credits REAL NOT NULL DEFAULT 0,
            description TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trust_distributions (
            id TEXT PRIMARY KEY,
            trust_id TEXT NOT NULL REFERENCES trusts(id),
            beneficiary_id TEXT NOT NULL REFERENCES trust_beneficiaries(id),
            financial_year TEXT NOT NULL,
            amount REAL NOT NULL,
            franking_credits REAL NOT NULL DEFAULT 0,
            resolved_on TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0
        );",
    )
    .context("Failed to create ledger tables")?;

    Ok(())
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// Load transactions from a statement CSV export.
/// Expected headers: Date, Description, Amount, Account, Category,
/// Counterparty, Currency (the last four optional).
pub fn load_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV: {:?}", csv_path))?;

    let source_file = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut transactions = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let mut tx: Transaction =
            row.with_context(|| format!("Failed to parse CSV line {}", i + 2))?;
        tx.source_file = source_file.clone();
        tx.line_number = i + 2; // 1-based, after the header
        transactions.push(tx);
    }

    Ok(transactions)
}

/// Insert transactions, skipping lines already present (hash dedup).
/// Returns the number actually inserted.
pub fn insert_transactions(conn: &Connection, transactions: &[Transaction]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO transactions
            (date, description, amount, account, category, counterparty,
             currency, source_file, line_number, idempotency_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for tx in transactions {
        inserted += stmt.execute(params![
            tx.date,
            tx.description,
            tx.amount,
            tx.account,
            tx.category,
            tx.counterparty,
            tx.currency,
            tx.source_file,
            tx.line_number as i64,
            tx.idempotency_hash(),
            now,
        ])?;
    }

    Ok(inserted)
}

fn row_to_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        date: row.get("date")?,
        description: row.get("description")?,
        amount: row.get("amount")?,
        account: row.get("account")?,
        category: row.get("category")?,
        counterparty: row.get("counterparty")?,
        currency: row.get("currency")?,
        source_file: row.get("source_file")?,
        line_number: row.get::<_, i64>("line_number")? as usize,
    })
}

pub fn get_all_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare("SELECT * FROM transactions ORDER BY date, id")?;
    let rows = stmt.query_map([], row_to_transaction)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read transactions")
}

pub fn get_transactions_by_category(conn: &Connection, category: &str) -> Result<Vec<Transaction>> {
    let mut stmt =
        conn.prepare("SELECT * FROM transactions WHERE category = ?1 ORDER BY date, id")?;
    let rows = stmt.query_map([category], row_to_transaction)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read transactions by category")
}

/// Transactions not yet categorised, with their row ids, for a rules pass.
pub fn get_uncategorised(conn: &Connection) -> Result<Vec<(i64, Transaction)>> {
    let mut stmt = conn.prepare("SELECT * FROM transactions WHERE category = '' ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok((row.get("id")?, row_to_transaction(row)?)))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read uncategorised transactions")
}

pub fn set_transaction_category(
    conn: &Connection,
    row_id: i64,
    category: &str,
    counterparty: Option<&str>,
) -> Result<()> {
    match counterparty {
        Some(cp) => conn.execute(
            "UPDATE transactions SET category = ?1, counterparty = ?2 WHERE id = ?3",
            params![category, cp, row_id],
        )?,
        None => conn.execute(
            "UPDATE transactions SET category = ?1 WHERE id = ?2",
            params![category, row_id],
        )?,
    };
    Ok(())
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
        .context("Failed to count transactions")
}

// ============================================================================
// ACCOUNTS & CATEGORIES
// ============================================================================

pub fn insert_account(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        "INSERT INTO accounts (id, name, account_type, institution, balance, currency, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            account.id,
            account.name,
            account.account_type.as_str(),
            account.institution,
            account.balance,
            account.currency,
            account.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert account")?;
    Ok(())
}

pub fn get_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT * FROM accounts ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Account {
            id: row.get("id")?,
            name: row.get("name")?,
            account_type: AccountType::parse(&row.get::<_, String>("account_type")?)
                .unwrap_or(AccountType::Bank),
            institution: row.get("institution")?,
            balance: row.get("balance")?,
            currency: row.get("currency")?,
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read accounts")
}

pub fn update_account_balance(conn: &Connection, account_id: &str, balance: f64) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![balance, account_id],
    )
    .context("Failed to update account balance")?;
    Ok(())
}

pub fn insert_category(conn: &Connection, category: &Category) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO categories (id, name, parent_id, category_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            category.id,
            category.name,
            category.parent_id,
            category.category_type.as_str(),
            category.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert category")?;
    Ok(())
}

pub fn get_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT * FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get("id")?,
            name: row.get("name")?,
            parent_id: row.get("parent_id")?,
            category_type: CategoryType::parse(&row.get::<_, String>("category_type")?)
                .unwrap_or(CategoryType::Expense),
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read categories")
}

// ============================================================================
// SMSF
// ============================================================================

pub fn insert_smsf_fund(conn: &Connection, fund: &SmsfFund) -> Result<()> {
    conn.execute(
        "INSERT INTO smsf_funds (id, name, abn, established, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fund.id,
            fund.name,
            fund.abn,
            fund.established.map(|d| d.to_string()),
            fund.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert SMSF fund")?;
    Ok(())
}

pub fn get_smsf_funds(conn: &Connection) -> Result<Vec<SmsfFund>> {
    let mut stmt = conn.prepare("SELECT * FROM smsf_funds ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(SmsfFund {
            id: row.get("id")?,
            name: row.get("name")?,
            abn: row.get("abn")?,
            established: row
                .get::<_, Option<String>>("established")?
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read SMSF funds")
}

pub fn insert_smsf_member(conn: &Connection, member: &SmsfMember) -> Result<()> {
    conn.execute(
        "INSERT INTO smsf_members (id, fund_id, name, total_super_balance, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            member.id,
            member.fund_id,
            member.name,
            member.total_super_balance,
            member.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert SMSF member")?;
    Ok(())
}

fn row_to_member(row: &rusqlite::Row<'_>) -> rusqlite::Result<SmsfMember> {
    Ok(SmsfMember {
        id: row.get("id")?,
        fund_id: row.get("fund_id")?,
        name: row.get("name")?,
        total_super_balance: row.get("total_super_balance")?,
        created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
    })
}

pub fn get_smsf_members(conn: &Connection, fund_id: &str) -> Result<Vec<SmsfMember>> {
    let mut stmt = conn.prepare("SELECT * FROM smsf_members WHERE fund_id = ?1 ORDER BY name")?;
    let rows = stmt.query_map([fund_id], row_to_member)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read SMSF members")
}

pub fn get_smsf_member(conn: &Connection, member_id: &str) -> Result<Option<SmsfMember>> {
    conn.query_row("SELECT * FROM smsf_members WHERE id = ?1", [member_id], row_to_member)
        .optional()
        .context("Failed to read SMSF member")
}

pub fn insert_smsf_contribution(conn: &Connection, contribution: &SmsfContribution) -> Result<()> {
    conn.execute(
        "INSERT INTO smsf_contributions (id, member_id, contribution_type, amount, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            contribution.id,
            contribution.member_id,
            contribution.contribution_type.as_str(),
            contribution.amount,
            contribution.date.to_string(),
            contribution.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert SMSF contribution")?;
    Ok(())
}

/// A member's contribution totals for one financial year, split by type.
pub fn contribution_totals(
    conn: &Connection,
    member_id: &str,
    year: FinancialYear,
) -> Result<(f64, f64)> {
    let mut stmt = conn.prepare(
        "SELECT contribution_type, amount, date FROM smsf_contributions WHERE member_id = ?1",
    )?;
    let rows = stmt.query_map([member_id], |row| {
        Ok((
            row.get::<_, String>("contribution_type")?,
            row.get::<_, f64>("amount")?,
            row.get::<_, String>("date")?,
        ))
    })?;

    let mut concessional = 0.0;
    let mut non_concessional = 0.0;

    for row in rows {
        let (type_str, amount, date) = row?;
        let in_year = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map(|d| FinancialYear::from_date(d) == year)
            .unwrap_or(false);
        if !in_year {
            continue;
        }

        match ContributionType::parse(&type_str) {
            Some(ContributionType::Concessional) => concessional += amount,
            Some(ContributionType::NonConcessional) => non_concessional += amount,
            None => {}
        }
    }

    Ok((concessional, non_concessional))
}

// ============================================================================
// TRUSTS
// ============================================================================

pub fn insert_trust(conn: &Connection, trust: &Trust) -> Result<()> {
    conn.execute(
        "INSERT INTO trusts (id, name, trustee, established, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            trust.id,
            trust.name,
            trust.trustee,
            trust.established.map(|d| d.to_string()),
            trust.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert trust")?;
    Ok(())
}

pub fn get_trusts(conn: &Connection) -> Result<Vec<Trust>> {
    let mut stmt = conn.prepare("SELECT * FROM trusts ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Trust {
            id: row.get("id")?,
            name: row.get("name")?,
            trustee: row.get("trustee")?,
            established: row
                .get::<_, Option<String>>("established")?
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read trusts")
}

pub fn insert_trust_beneficiary(conn: &Connection, beneficiary: &TrustBeneficiary) -> Result<()> {
    conn.execute(
        "INSERT INTO trust_beneficiaries (id, trust_id, name, other_taxable_income, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            beneficiary.id,
            beneficiary.trust_id,
            beneficiary.name,
            beneficiary.other_taxable_income,
            beneficiary.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert trust beneficiary")?;
    Ok(())
}

pub fn get_trust_beneficiaries(conn: &Connection, trust_id: &str) -> Result<Vec<TrustBeneficiary>> {
    let mut stmt =
        conn.prepare("SELECT * FROM trust_beneficiaries WHERE trust_id = ?1 ORDER BY name")?;
    let rows = stmt.query_map([trust_id], |row| {
        Ok(TrustBeneficiary {
            id: row.get("id")?,
            trust_id: row.get("trust_id")?,
            name: row.get("name")?,
            other_taxable_income: row.get("other_taxable_income")?,
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read trust beneficiaries")
}

pub fn insert_trust_income(conn: &Connection, income: &TrustIncome) -> Result<()> {
    conn.execute(
        "INSERT INTO trust_income
            (id, trust_id, financial_year, amount, franking_credits, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            income.id,
            income.trust_id,
            income.financial_year.label(),
            income.amount,
            income.franking_credits,
            income.description,
            income.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert trust income")?;
    Ok(())
}

/// Distributable income and attached franking credits for a trust year.
pub fn trust_income_totals(
    conn: &Connection,
    trust_id: &str,
    year: FinancialYear,
) -> Result<(f64, f64)> {
    conn.query_row(
        "SELECT COALESCE(SUM(amount), 0), COALESCE(SUM(franking_credits), 0)
         FROM trust_income WHERE trust_id = ?1 AND financial_year = ?2",
        params![trust_id, year.label()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .context("Failed to total trust income")
}

pub fn insert_trust_distribution(
    conn: &Connection,
    distribution: &TrustDistribution,
) -> Result<()> {
    conn.execute(
        "INSERT INTO trust_distributions
            (id, trust_id, beneficiary_id, financial_year, amount, franking_credits,
             resolved_on, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            distribution.id,
            distribution.trust_id,
            distribution.beneficiary_id,
            distribution.financial_year.label(),
            distribution.amount,
            distribution.franking_credits,
            distribution.resolved_on.to_string(),
            distribution.created_at.to_rfc3339(),
        ],
    )
    .context("Failed to insert trust distribution")?;
    Ok(())
}

pub fn get_trust_distributions(
    conn: &Connection,
    trust_id: &str,
    year: FinancialYear,
) -> Result<Vec<TrustDistribution>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM trust_distributions
         WHERE trust_id = ?1 AND financial_year = ?2 ORDER BY resolved_on",
    )?;
    let rows = stmt.query_map(params![trust_id, year.label()], |row| {
        Ok(TrustDistribution {
            id: row.get("id")?,
            trust_id: row.get("trust_id")?,
            beneficiary_id: row.get("beneficiary_id")?,
            financial_year: FinancialYear::from_label(&row.get::<_, String>("financial_year")?)
                .unwrap_or(FinancialYear(0)),
            amount: row.get("amount")?,
            franking_credits: row.get("franking_credits")?,
            resolved_on: NaiveDate::parse_from_str(
                &row.get::<_, String>("resolved_on")?,
                "%Y-%m-%d",
            )
            .unwrap_or_default(),
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read trust distributions")
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

pub fn insert_notification(
    conn: &Connection,
    severity: &str,
    message: &str,
    source: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications (id, severity, message, source, created_at, read)
         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        params![
            uuid::Uuid::new_v4().to_string(),
            severity,
            message,
            source,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("Failed to insert notification")?;
    Ok(())
}

pub fn get_unread_notifications(conn: &Connection) -> Result<Vec<Notification>> {
    let mut stmt = conn.prepare("SELECT * FROM notifications WHERE read = 0 ORDER BY created_at")?;
    let rows = stmt.query_map([], |row| {
        Ok(Notification {
            id: row.get("id")?,
            severity: row.get("severity")?,
            message: row.get("message")?,
            source: row.get("source")?,
            created_at: row.get("created_at")?,
            read: row.get::<_, i64>("read")? != 0,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read notifications")
}

pub fn mark_notifications_read(conn: &Connection) -> Result<usize> {
    conn.execute("UPDATE notifications SET read = 1 WHERE read = 0", [])
        .context("Failed to mark notifications read")
}

// ============================================================================
// HELPERS
// ============================================================================

fn parse_timestamp(s: &str) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn sample_tx(date: &str, description: &str, amount: f64) -> Transaction {
        Transaction {
            date: date.to_string(),
            description: description.to_string(),
            amount,
            account: "Family Offset".to_string(),
            category: String::new(),
            counterparty: String::new(),
            currency: "AUD".to_string(),
            source_file: "test.csv".to_string(),
            line_number: 2,
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let conn = scratch_db();
        let txs = vec![
            sample_tx("2025-01-10", "WOOLWORTHS 1234", -84.20),
            sample_tx("2025-01-11", "SALARY", 4_200.0),
        ];

        assert_eq!(insert_transactions(&conn, &txs).unwrap(), 2);
        // Re-import: nothing new
        assert_eq!(insert_transactions(&conn, &txs).unwrap(), 0);
        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }

    #[test]
    fn test_csv_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Date,Description,Amount,Account").unwrap();
        writeln!(file, "2025-01-10,WOOLWORTHS 1234,-84.20,Family Offset").unwrap();
        writeln!(file, "2025-01-11,SALARY,4200.00,Family Offset").unwrap();

        let txs = load_csv(&path).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].source_file, "statement.csv");
        assert_eq!(txs[0].line_number, 2);
        assert_eq!(txs[1].amount, 4_200.0);
        assert_eq!(txs[1].financial_year().unwrap().label(), "2024-25");
    }

    #[test]
    fn test_categorise_flow() {
        let conn = scratch_db();
        insert_transactions(&conn, &[sample_tx("2025-01-10", "WOOLWORTHS 1234", -84.20)]).unwrap();

        let uncategorised = get_uncategorised(&conn).unwrap();
        assert_eq!(uncategorised.len(), 1);

        let (row_id, _) = &uncategorised[0];
        set_transaction_category(&conn, *row_id, "Groceries", Some("Woolworths")).unwrap();

        assert!(get_uncategorised(&conn).unwrap().is_empty());
        let by_category = get_transactions_by_category(&conn, "Groceries").unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].counterparty, "Woolworths");
    }

    #[test]
    fn test_accounts_and_categories() {
        let conn = scratch_db();

        insert_account(
            &conn,
            &Account::new("Family Offset", AccountType::Bank).with_balance(10_000.0),
        )
        .unwrap();
        for category in crate::entities::category::default_categories() {
            insert_category(&conn, &category).unwrap();
        }

        let accounts = get_accounts(&conn).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, 10_000.0);

        let categories = get_categories(&conn).unwrap();
        assert!(categories.iter().any(|c| c.name == "Groceries"));

        update_account_balance(&conn, &accounts[0].id, 12_000.0).unwrap();
        assert_eq!(get_accounts(&conn).unwrap()[0].balance, 12_000.0);
    }

    #[test]
    fn test_contribution_totals_by_year() {
        let conn = scratch_db();

        let fund = SmsfFund::new("Family Super Fund");
        insert_smsf_fund(&conn, &fund).unwrap();
        let member = SmsfMember::new(fund.id.clone(), "Alex").with_balance(420_000.0);
        insert_smsf_member(&conn, &member).unwrap();

        let in_year = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let out_of_year = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        for (kind, amount, date) in [
            (ContributionType::Concessional, 10_000.0, in_year),
            (ContributionType::Concessional, 5_000.0, in_year),
            (ContributionType::NonConcessional, 20_000.0, in_year),
            (ContributionType::Concessional, 7_000.0, out_of_year),
        ] {
            insert_smsf_contribution(
                &conn,
                &SmsfContribution::new(member.id.clone(), kind, amount, date),
            )
            .unwrap();
        }

        let (concessional, non_concessional) =
            contribution_totals(&conn, &member.id, FinancialYear::new(2024)).unwrap();
        assert_eq!(concessional, 15_000.0);
        assert_eq!(non_concessional, 20_000.0);

        let found = get_smsf_member(&conn, &member.id).unwrap().unwrap();
        assert_eq!(found.total_super_balance, 420_000.0);
        assert!(get_smsf_member(&conn, "missing").unwrap().is_none());

        let funds = get_smsf_funds(&conn).unwrap();
        assert_eq!(funds.len(), 1);
        assert_eq!(get_smsf_members(&conn, &fund.id).unwrap().len(), 1);
    }

    #[test]
    fn test_trust_income_and_distributions() {
        let conn = scratch_db();
        let fy = FinancialYear::new(2024);

        let trust = Trust::new("Smith Family Trust");
        insert_trust(&conn, &trust).unwrap();

        let b1 = TrustBeneficiary::new(trust.id.clone(), "Jo").with_other_income(85_000.0);
        let b2 = TrustBeneficiary::new(trust.id.clone(), "Sam").with_other_income(30_000.0);
        insert_trust_beneficiary(&conn, &b1).unwrap();
        insert_trust_beneficiary(&conn, &b2).unwrap();

        insert_trust_income(
            &conn,
            &TrustIncome::new(trust.id.clone(), fy, 100_000.0).with_franking_credits(6_000.0),
        )
        .unwrap();
        insert_trust_income(&conn, &TrustIncome::new(trust.id.clone(), fy, 20_000.0)).unwrap();

        let (amount, franking) = trust_income_totals(&conn, &trust.id, fy).unwrap();
        assert_eq!(amount, 120_000.0);
        assert_eq!(franking, 6_000.0);

        insert_trust_distribution(
            &conn,
            &TrustDistribution::new(
                trust.id.clone(),
                b2.id.clone(),
                fy,
                120_000.0,
                NaiveDate::from_ymd_opt(2025, 6, 28).unwrap(),
            ),
        )
        .unwrap();

        let distributions = get_trust_distributions(&conn, &trust.id, fy).unwrap();
        assert_eq!(distributions.len(), 1);
        assert!(distributions[0].resolved_by_eofy());

        assert_eq!(get_trusts(&conn).unwrap().len(), 1);
        assert_eq!(get_trust_beneficiaries(&conn, &trust.id).unwrap().len(), 2);
    }

    #[test]
    fn test_notifications() {
        let conn = scratch_db();

        insert_notification(&conn, "Exceeded", "Concessional cap reached", "contributions")
            .unwrap();
        let unread = get_unread_notifications(&conn).unwrap();
        assert_eq!(unread.len(), 1);
        assert!(!unread[0].read);

        assert_eq!(mark_notifications_read(&conn).unwrap(), 1);
        assert!(get_unread_notifications(&conn).unwrap().is_empty());
    }
}
