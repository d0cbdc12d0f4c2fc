// 🏷️ Category Entity
// Transaction categories with optional hierarchy. Renaming a category
// never breaks historical transactions: they reference the UUID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryType {
    /// Money going out.
    Expense,
    /// Money coming in.
    Income,
    /// Movement between own accounts (neutral).
    Transfer,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "Expense",
            CategoryType::Income => "Income",
            CategoryType::Transfer => "Transfer",
        }
    }

    pub fn parse(s: &str) -> Option<CategoryType> {
        match s {
            "Expense" => Some(CategoryType::Expense),
            "Income" => Some(CategoryType::Income),
            "Transfer" => Some(CategoryType::Transfer),
            _ => None,
        }
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Stable identity (UUID).
    pub id: String,

    pub name: String,

    /// Parent category UUID for hierarchy; root categories have none.
    pub parent_id: Option<String>,

    pub category_type: CategoryType,

    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, category_type: CategoryType) -> Self {
        Category {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            parent_id: None,
            category_type,
            created_at: Utc::now(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Starter set used when a new ledger is initialised.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Groceries", CategoryType::Expense),
        Category::new("Utilities", CategoryType::Expense),
        Category::new("Insurance", CategoryType::Expense),
        Category::new("Education", CategoryType::Expense),
        Category::new("Medical", CategoryType::Expense),
        Category::new("Salary", CategoryType::Income),
        Category::new("Dividends", CategoryType::Income),
        Category::new("Trust Distribution", CategoryType::Income),
        Category::new("Transfer", CategoryType::Transfer),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_type_roundtrip() {
        for t in [CategoryType::Expense, CategoryType::Income, CategoryType::Transfer] {
            assert_eq!(CategoryType::parse(t.as_str()), Some(t));
        }
        assert_eq!(CategoryType::parse("Misc"), None);
    }

    #[test]
    fn test_hierarchy() {
        let parent = Category::new("Utilities", CategoryType::Expense);
        let child = Category::new("Electricity", CategoryType::Expense).with_parent(parent.id.clone());

        assert!(parent.is_root());
        assert!(!child.is_root());
        assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
    }

    #[test]
    fn test_default_categories_cover_all_types() {
        let defaults = default_categories();

        assert!(defaults.iter().any(|c| c.category_type == CategoryType::Expense));
        assert!(defaults.iter().any(|c| c.category_type == CategoryType::Income));
        assert!(defaults.iter().any(|c| c.category_type == CategoryType::Transfer));
    }
}
