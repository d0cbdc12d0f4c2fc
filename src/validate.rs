// 📐 Input Validation
// Advisory checks over calculator inputs and imported transactions.
// The calculators stay permissive (bad numbers default or clamp to zero);
// these validators exist so the CLI and tool layer can warn instead of
// silently computing on nonsense.

use crate::db::Transaction;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

fn err(context: &str, field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
        context: context.to_string(),
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// CALCULATOR INPUTS
// ============================================================================

/// Tax calculator input. Negative income is legal at the calculator level
/// (clamped to zero) but almost always a data-entry mistake.
pub fn validate_tax_input(taxable_income: f64) -> ValidationResult {
    let mut errors = Vec::new();

    if taxable_income.is_nan() {
        errors.push(err("Tax", "taxable_income", "Not a number"));
    } else if taxable_income < 0.0 {
        errors.push(err(
            "Tax",
            "taxable_income",
            "Negative income will be treated as zero",
        ));
    }

    finish(errors)
}

/// CGT input: amounts non-negative, sale not before acquisition.
pub fn validate_cgt_input(
    cost_base: f64,
    sale_price: f64,
    acquisition_date: chrono::NaiveDate,
    sale_date: chrono::NaiveDate,
) -> ValidationResult {
    let mut errors = Vec::new();

    if cost_base < 0.0 {
        errors.push(err("CGT", "cost_base", "Must be non-negative"));
    }
    if sale_price < 0.0 {
        errors.push(err("CGT", "sale_price", "Must be non-negative"));
    }
    if sale_date < acquisition_date {
        errors.push(err("CGT", "sale_date", "Sale precedes acquisition"));
    }

    finish(errors)
}

/// Distribution splits must each be a percentage.
pub fn validate_splits(splits: &[f64]) -> ValidationResult {
    let mut errors = Vec::new();

    for (i, &split) in splits.iter().enumerate() {
        if !(0.0..=100.0).contains(&split) {
            errors.push(err(
                "Distribution",
                "splits",
                format!("Split #{} is {} - must be between 0 and 100", i + 1, split),
            ));
        }
    }

    finish(errors)
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// Checks an imported transaction has the fields every downstream
/// consumer relies on.
pub fn validate_transaction(tx: &Transaction) -> ValidationResult {
    let mut errors = Vec::new();

    if tx.date.is_empty() {
        errors.push(err("Transaction", "date", "Required field is empty"));
    } else if tx.parsed_date().is_none() {
        errors.push(err("Transaction", "date", "Not an ISO date (YYYY-MM-DD)"));
    }

    if tx.description.is_empty() {
        errors.push(err("Transaction", "description", "Required field is empty"));
    }

    if tx.amount.is_nan() {
        errors.push(err("Transaction", "amount", "Not a number"));
    }

    if tx.source_file.is_empty() {
        errors.push(err("Transaction", "source_file", "Required field is empty"));
    }

    finish(errors)
}

// ============================================================================
// TESTS
// ============================================================================
