//! Tool call dispatch.
//!
//! Numeric arguments parse permissively (missing or malformed → zero);
//! database failures come back as a generic `{"error": message}` object.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::cgt::calculate_cgt;
use crate::contributions::assess_caps;
use crate::db;
use crate::distribution::model_distribution;
use crate::fy::{FinancialYear, RateTable};
use crate::tax::calculate_tax;

use super::protocol::ToolCallResult;

// ============================================================================
// ARGUMENT PARSING
// ============================================================================

fn num(args: &Value, key: &str) -> f64 {
    args.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn flag(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn text<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn num_list(args: &Value, key: &str) -> Vec<f64> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

fn year(args: &Value) -> Result<FinancialYear, String> {
    let label = text(args, "financial_year").unwrap_or("2024-25");
    FinancialYear::from_label(label).map_err(|e| e.to_string())
}

fn date(args: &Value, key: &str) -> Result<NaiveDate, String> {
    let raw = text(args, key).ok_or_else(|| format!("Missing {}", key))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("{} is not a YYYY-MM-DD date: {}", key, raw))
}

fn error(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Executes tool calls against the ledger database.
pub struct ToolHandlers {
    conn: Connection,
}

impl ToolHandlers {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Dispatch a tool call by name.
    pub fn call(&self, name: &str, arguments: &Value) -> ToolCallResult {
        let value = match name {
            "calculate_tax" => self.calculate_tax(arguments),
            "calculate_cgt" => self.calculate_cgt(arguments),
            "calculate_contribution_caps" => self.calculate_contribution_caps(arguments),
            "calculate_distribution" => self.calculate_distribution(arguments),
            "list_transactions" => self.list_transactions(arguments),
            "list_accounts" => self.list_accounts(),
            "smsf_summary" => self.smsf_summary(arguments),
            "trust_summary" => self.trust_summary(arguments),
            _ => return ToolCallResult::error(format!("Unknown tool: {}", name)),
        };

        ToolCallResult::json(&value)
    }

    fn calculate_tax(&self, args: &Value) -> Value {
        let fy = match year(args) {
            Ok(fy) => fy,
            Err(e) => return error(e),
        };

        match calculate_tax(
            num(args, "income"),
            fy,
            flag(args, "include_medicare_levy", true),
            flag(args, "has_private_health_insurance", false),
        ) {
            Ok(assessment) => json!(assessment),
            Err(e) => error(e),
        }
    }

    fn calculate_cgt(&self, args: &Value) -> Value {
        let purchase = match date(args, "purchase_date") {
            Ok(d) => d,
            Err(e) => return error(e),
        };
        let sale = match date(args, "sale_date") {
            Ok(d) => d,
            Err(e) => return error(e),
        };

        // The discount rule is not year-dependent; the current table holds it
        let table = RateTable::fy_2024_25();
        let assessment = calculate_cgt(
            num(args, "cost_base"),
            num(args, "sale_price"),
            purchase,
            sale,
            &table,
        );
        json!(assessment)
    }

    fn calculate_contribution_caps(&self, args: &Value) -> Value {
        let fy = match year(args) {
            Ok(fy) => fy,
            Err(e) => return error(e),
        };

        match assess_caps(
            num(args, "concessional"),
            num(args, "non_concessional"),
            num(args, "total_super_balance"),
            &num_list(args, "unused_prior_years"),
            fy,
        ) {
            Ok(assessment) => json!(assessment),
            Err(e) => error(e),
        }
    }

    fn calculate_distribution(&self, args: &Value) -> Value {
        let fy = match year(args) {
            Ok(fy) => fy,
            Err(e) => return error(e),
        };

        let splits = num_list(args, "splits");
        let splits = if splits.is_empty() {
            None
        } else {
            Some(splits)
        };

        match model_distribution(
            num(args, "trust_income"),
            num(args, "franking_credits"),
            (num(args, "beneficiary1_income"), num(args, "beneficiary2_income")),
            splits.as_deref(),
            fy,
        ) {
            Ok(model) => json!(model),
            Err(e) => error(e),
        }
    }

    fn list_transactions(&self, args: &Value) -> Value {
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(20) as usize;

        let result = match text(args, "category") {
            Some(category) => db::get_transactions_by_category(&self.conn, category),
            None => db::get_all_transactions(&self.conn),
        };

        match result {
            Ok(mut transactions) => {
                transactions.truncate(limit);
                json!({ "transactions": transactions })
            }
            Err(e) => error(e),
        }
    }

    fn list_accounts(&self) -> Value {
        match db::get_accounts(&self.conn) {
            Ok(accounts) => json!({ "accounts": accounts }),
            Err(e) => error(e),
        }
    }

    fn smsf_summary(&self, args: &Value) -> Value {
        let fy = match year(args) {
            Ok(fy) => fy,
            Err(e) => return error(e),
        };
        let member_id = match text(args, "member_id") {
            Some(id) => id,
            None => return error("Missing member_id"),
        };

        let member = match db::get_smsf_member(&self.conn, member_id) {
            Ok(Some(member)) => member,
            Ok(None) => return error(format!("No SMSF member with id {}", member_id)),
            Err(e) => return error(e),
        };

        let (concessional, non_concessional) =
            match db::contribution_totals(&self.conn, member_id, fy) {
                Ok(totals) => totals,
                Err(e) => return error(e),
            };

        let assessment = match assess_caps(
            concessional,
            non_concessional,
            member.total_super_balance,
            &[],
            fy,
        ) {
            Ok(assessment) => assessment,
            Err(e) => return error(e),
        };

        // Cap warnings surface in the app's notification feed too
        for warning in assessment.warnings() {
            let _ = db::insert_notification(
                &self.conn,
                warning.level.as_str(),
                &format!("{}: {}", member.name, warning.message),
                "smsf_summary",
            );
        }

        json!({
            "member": member,
            "assessment": assessment,
        })
    }

    fn trust_summary(&self, args: &Value) -> Value {
        let fy = match year(args) {
            Ok(fy) => fy,
            Err(e) => return error(e),
        };
        let trust_id = match text(args, "trust_id") {
            Some(id) => id,
            None => return error("Missing trust_id"),
        };

        let beneficiaries = match db::get_trust_beneficiaries(&self.conn, trust_id) {
            Ok(list) => list,
            Err(e) => return error(e),
        };

        let (distributable, franking) = match db::trust_income_totals(&self.conn, trust_id, fy) {
            Ok(totals) => totals,
            Err(e) => return error(e),
        };

        let distributions = match db::get_trust_distributions(&self.conn, trust_id, fy) {
            Ok(list) => list,
            Err(e) => return error(e),
        };

        let resolved_late: Vec<&str> = distributions
            .iter()
            .filter(|d| !d.resolved_by_eofy())
            .map(|d| d.id.as_str())
            .collect();

        // With exactly two beneficiaries the modeller can recommend a split
        let recommendation = if beneficiaries.len() == 2 && distributable > 0.0 {
            model_distribution(
                distributable,
                franking,
                (
                    beneficiaries[0].other_taxable_income,
                    beneficiaries[1].other_taxable_income,
                ),
                None,
                fy,
            )
            .map(|model| {
                json!({
                    "recommended_split": model.recommended_label,
                    "total_tax": model.recommended_total_tax,
                    "tax_savings": model.tax_savings,
                })
            })
            .unwrap_or(Value::Null)
        } else {
            Value::Null
        };

        json!({
            "financial_year": fy.label(),
            "beneficiaries": beneficiaries,
            "distributable_income": distributable,
            "franking_credits": franking,
            "distributions": distributions,
            "resolved_after_eofy": resolved_late,
            "recommendation": recommendation,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ContributionType, SmsfContribution, SmsfFund, SmsfMember};

    fn handlers() -> ToolHandlers {
        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        ToolHandlers::new(conn)
    }

    fn result_json(result: &ToolCallResult) -> Value {
        serde_json::from_str(&result.content[0].text).unwrap()
    }

    #[test]
    fn test_calculate_tax_tool() {
        let h = handlers();
        let result = h.call(
            "calculate_tax",
            &json!({ "income": 190000, "include_medicare_levy": false, "has_private_health_insurance": true }),
        );

        let value = result_json(&result);
        assert_eq!(value["base_tax"], 51_638.0);
        assert_eq!(value["financial_year"], "2024-25");
    }

    #[test]
    fn test_calculate_tax_missing_income_defaults_to_zero() {
        let h = handlers();
        let value = result_json(&h.call("calculate_tax", &json!({})));

        assert_eq!(value["total_tax"], 0.0);
    }

    #[test]
    fn test_calculate_cgt_tool() {
        let h = handlers();
        let value = result_json(&h.call(
            "calculate_cgt",
            &json!({
                "cost_base": 10000,
                "sale_price": 15000,
                "purchase_date": "2024-01-10",
                "sale_date": "2025-02-10"
            }),
        ));

        assert_eq!(value["taxable_gain"], 2_500.0);
        assert_eq!(value["discount_applied"], true);
    }

    #[test]
    fn test_calculate_cgt_bad_date_is_error_object() {
        let h = handlers();
        let value = result_json(&h.call(
            "calculate_cgt",
            &json!({
                "cost_base": 10000,
                "sale_price": 15000,
                "purchase_date": "10/01/2024",
                "sale_date": "2025-02-10"
            }),
        ));

        assert!(value["error"].is_string());
    }

    #[test]
    fn test_contribution_caps_tool() {
        let h = handlers();
        let value = result_json(&h.call(
            "calculate_contribution_caps",
            &json!({ "concessional": 35000, "total_super_balance": 400000 }),
        ));

        assert_eq!(value["concessional"]["remaining"], 0.0);
        assert_eq!(value["concessional"]["exceeded"], true);
    }

    #[test]
    fn test_distribution_tool() {
        let h = handlers();
        let value = result_json(&h.call(
            "calculate_distribution",
            &json!({
                "trust_income": 100000,
                "beneficiary1_income": 180000,
                "beneficiary2_income": 0
            }),
        ));

        assert_eq!(value["recommended_split"], 0.0);
        assert_eq!(value["scenarios"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_unknown_tool() {
        let h = handlers();
        let result = h.call("drop_tables", &json!({}));

        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn test_smsf_summary_records_warnings() {
        let h = handlers();

        let fund = SmsfFund::new("Family Super Fund");
        db::insert_smsf_fund(&h.conn, &fund).unwrap();
        let member = SmsfMember::new(fund.id.clone(), "Alex").with_balance(420_000.0);
        db::insert_smsf_member(&h.conn, &member).unwrap();
        db::insert_smsf_contribution(
            &h.conn,
            &SmsfContribution::new(
                member.id.clone(),
                ContributionType::Concessional,
                32_000.0,
                NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            ),
        )
        .unwrap();

        let value = result_json(&h.call("smsf_summary", &json!({ "member_id": member.id })));
        assert_eq!(value["assessment"]["concessional"]["exceeded"], true);

        let notifications = db::get_unread_notifications(&h.conn).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, "Exceeded");
    }

    #[test]
    fn test_smsf_summary_unknown_member() {
        let h = handlers();
        let value = result_json(&h.call("smsf_summary", &json!({ "member_id": "nope" })));

        assert!(value["error"].is_string());
    }

    #[test]
    fn test_trust_summary() {
        use crate::entities::{Trust, TrustBeneficiary, TrustIncome};

        let h = handlers();
        let fy = FinancialYear::new(2024);

        let trust = Trust::new("Smith Family Trust");
        db::insert_trust(&h.conn, &trust).unwrap();
        db::insert_trust_beneficiary(
            &h.conn,
            &TrustBeneficiary::new(trust.id.clone(), "Jo").with_other_income(180_000.0),
        )
        .unwrap();
        db::insert_trust_beneficiary(
            &h.conn,
            &TrustBeneficiary::new(trust.id.clone(), "Sam").with_other_income(0.0),
        )
        .unwrap();
        db::insert_trust_income(&h.conn, &TrustIncome::new(trust.id.clone(), fy, 100_000.0))
            .unwrap();

        let value = result_json(&h.call("trust_summary", &json!({ "trust_id": trust.id })));

        assert_eq!(value["distributable_income"], 100_000.0);
        assert!(value["recommendation"]["recommended_split"].is_string());
    }
}
