// 🏷️ Categorisation Rules - Rules as Data
// Pattern rules that assign categories and counterparties to imported
// transactions. Rules live in JSON so the family can edit them without
// touching code.

use anyhow::{Context as AnyhowContext, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::db;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Rule ID for tracking which rule categorised a transaction.
    pub id: String,

    /// Pattern matched against the transaction description.
    /// Supports wildcards with *.
    pub pattern: String,

    /// Category to assign.
    pub category: String,

    /// Normalised counterparty name, if the rule knows it.
    pub counterparty: Option<String>,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f64,

    /// Priority (higher = applied first).
    #[serde(default)]
    pub priority: i32,
}

impl CategoryRule {
    /// Case-insensitive match of `pattern` against `text`.
    /// Without wildcards the pattern matches anywhere in the text;
    /// `*` splits the pattern into ordered anchored parts.
    pub fn matches(&self, text: &str) -> bool {
        let pattern = self.pattern.to_lowercase();
        let text = text.to_lowercase();

        if !pattern.contains('*') {
            return text.contains(&pattern);
        }

        let parts: Vec<&str> = pattern.split('*').collect();

        if let Some(first) = parts.first() {
            if !first.is_empty() && !text.starts_with(first) {
                return false;
            }
        }
        if let Some(last) = parts.last() {
            if !last.is_empty() && !text.ends_with(last) {
                return false;
            }
        }

        // Middle parts must appear in order
        let mut pos = parts[0].len();
        for part in &parts[1..parts.len() - 1] {
            if part.is_empty() {
                continue;
            }
            match text[pos..].find(part) {
                Some(found) => pos += found + part.len(),
                None => return false,
            }
        }

        true
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub category: Option<String>,
    pub counterparty: Option<String>,
    pub confidence: f64,
    pub rule_id: Option<String>,
}

pub struct RuleEngine {
    rules: Vec<CategoryRule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        RuleEngine { rules: Vec::new() }
    }

    /// Load rules from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let rules: Vec<CategoryRule> =
            serde_json::from_str(&content).context("Failed to parse rules JSON")?;

        Ok(RuleEngine::from_rules(rules))
    }

    pub fn from_rules(mut rules: Vec<CategoryRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        RuleEngine { rules }
    }

    pub fn add_rule(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// First matching rule wins (rules are sorted by priority).
    pub fn classify(&self, description: &str) -> Classification {
        for rule in &self.rules {
            if rule.matches(description) {
                return Classification {
                    category: Some(rule.category.clone()),
                    counterparty: rule.counterparty.clone(),
                    confidence: rule.confidence,
                    rule_id: Some(rule.id.clone()),
                };
            }
        }
        Classification::default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run the engine over every uncategorised transaction.
    /// Returns the number of transactions categorised.
    pub fn apply(&self, conn: &Connection) -> Result<usize> {
        let mut categorised = 0;

        for (row_id, tx) in db::get_uncategorised(conn)? {
            let result = self.classify(&tx.description);
            if let Some(category) = result.category {
                db::set_transaction_category(
                    conn,
                    row_id,
                    &category,
                    result.counterparty.as_deref(),
                )?;
                categorised += 1;
            }
        }

        Ok(categorised)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, pattern: &str, category: &str, priority: i32) -> CategoryRule {
        CategoryRule {
            id: id.to_string(),
            pattern: pattern.to_string(),
            category: category.to_string(),
            counterparty: None,
            confidence: 0.9,
            priority,
        }
    }

    #[test]
    fn test_exact_pattern_match() {
        let r = rule("woolworths", "WOOLWORTHS", "Groceries", 0);

        assert!(r.matches("WOOLWORTHS 1234 SYDNEY"));
        assert!(r.matches("woolworths metro"));
        assert!(!r.matches("COLES 0482"));
    }

    #[test]
    fn test_wildcard_pattern() {
        let r = rule("agl", "AGL*ELECTRICITY", "Utilities", 0);

        assert!(r.matches("AGL RETAIL ELECTRICITY"));
        assert!(!r.matches("ELECTRICITY AGL"));

        let prefix = rule("bpay", "BPAY*", "Utilities", 0);
        assert!(prefix.matches("BPAY 34561 WATER CORP"));
        assert!(!prefix.matches("PAYMENT BPAY"));
    }

    #[test]
    fn test_priority_order() {
        let mut engine = RuleEngine::new();
        engine.add_rule(rule("generic", "TRANSFER*", "Transfer", 1));
        engine.add_rule({
            let mut r = rule("super", "TRANSFER TO SMSF*", "Super Contribution", 100);
            r.counterparty = Some("Family Super Fund".to_string());
            r
        });

        let result = engine.classify("TRANSFER TO SMSF JULY");
        assert_eq!(result.category.as_deref(), Some("Super Contribution"));
        assert_eq!(result.counterparty.as_deref(), Some("Family Super Fund"));
        assert_eq!(result.rule_id.as_deref(), Some("super"));
    }

    #[test]
    fn test_no_match_is_empty() {
        let engine = RuleEngine::new();
        let result = engine.classify("UNKNOWN PAYEE");

        assert!(result.category.is_none());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_apply_categorises_uncategorised_rows() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();

        let txs = vec![
            db::Transaction {
                date: "2025-01-10".to_string(),
                description: "WOOLWORTHS 1234".to_string(),
                amount: -84.20,
                account: String::new(),
                category: String::new(),
                counterparty: String::new(),
                currency: "AUD".to_string(),
                source_file: "test.csv".to_string(),
                line_number: 2,
            },
            db::Transaction {
                date: "2025-01-11".to_string(),
                description: "UNKNOWN PAYEE".to_string(),
                amount: -10.0,
                account: String::new(),
                category: String::new(),
                counterparty: String::new(),
                currency: "AUD".to_string(),
                source_file: "test.csv".to_string(),
                line_number: 3,
            },
        ];
        db::insert_transactions(&conn, &txs).unwrap();

        let engine = RuleEngine::from_rules(vec![rule("woolworths", "WOOLWORTHS*", "Groceries", 0)]);
        assert_eq!(engine.apply(&conn).unwrap(), 1);

        // The unmatched row stays uncategorised
        assert_eq!(db::get_uncategorised(&conn).unwrap().len(), 1);
    }
}
