//! Assistant tool definitions.
//!
//! Parameter names, types, defaults and enums here are the contract with
//! existing callers - change them and the assistant breaks.

use super::protocol::Tool;
use serde_json::json;

/// All tools the assistant can call.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "calculate_tax".into(),
            description:
                "Calculate Australian income tax: brackets, Medicare levy, surcharge, take-home pay."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "income": {
                        "type": "number",
                        "description": "Taxable income in dollars"
                    },
                    "financial_year": {
                        "type": "string",
                        "default": "2024-25",
                        "description": "Financial year label, e.g. 2024-25"
                    },
                    "include_medicare_levy": {
                        "type": "boolean",
                        "default": true,
                        "description": "Add the 2% Medicare levy"
                    },
                    "has_private_health_insurance": {
                        "type": "boolean",
                        "default": false,
                        "description": "If false, the Medicare levy surcharge applies above the tier thresholds"
                    }
                },
                "required": ["income"]
            }),
        },
        Tool {
            name: "calculate_cgt".into(),
            description:
                "Calculate capital gains tax position for an asset sale, including the 50% discount for assets held 12 months or more."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cost_base": {
                        "type": "number",
                        "description": "Purchase price plus costs, in dollars"
                    },
                    "sale_price": {
                        "type": "number",
                        "description": "Sale proceeds in dollars"
                    },
                    "purchase_date": {
                        "type": "string",
                        "description": "Acquisition date, YYYY-MM-DD"
                    },
                    "sale_date": {
                        "type": "string",
                        "description": "Sale date, YYYY-MM-DD"
                    }
                },
                "required": ["cost_base", "sale_price", "purchase_date", "sale_date"]
            }),
        },
        Tool {
            name: "calculate_contribution_caps".into(),
            description:
                "Check SMSF contribution cap usage, headroom, and carry-forward availability for a financial year."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "concessional": {
                        "type": "number",
                        "default": 0,
                        "description": "Concessional (pre-tax) contributions this year"
                    },
                    "non_concessional": {
                        "type": "number",
                        "default": 0,
                        "description": "Non-concessional (after-tax) contributions this year"
                    },
                    "total_super_balance": {
                        "type": "number",
                        "description": "Total superannuation balance across all funds"
                    },
                    "unused_prior_years": {
                        "type": "array",
                        "items": { "type": "number" },
                        "default": [],
                        "description": "Unused concessional cap per prior year, most recent first (up to 5 used)"
                    },
                    "financial_year": {
                        "type": "string",
                        "default": "2024-25",
                        "description": "Financial year label"
                    }
                },
                "required": ["total_super_balance"]
            }),
        },
        Tool {
            name: "calculate_distribution".into(),
            description:
                "Model trust distribution splits between two beneficiaries and recommend the split with the lowest combined tax."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "trust_income": {
                        "type": "number",
                        "description": "Distributable trust income in dollars"
                    },
                    "franking_credits": {
                        "type": "number",
                        "default": 0,
                        "description": "Franking credits attached to the income"
                    },
                    "beneficiary1_income": {
                        "type": "number",
                        "default": 0,
                        "description": "First beneficiary's other taxable income"
                    },
                    "beneficiary2_income": {
                        "type": "number",
                        "default": 0,
                        "description": "Second beneficiary's other taxable income"
                    },
                    "splits": {
                        "type": "array",
                        "items": { "type": "number" },
                        "description": "Percentages to the first beneficiary. Defaults to six presets: 50, 60, 70, 80, 100, 0"
                    },
                    "financial_year": {
                        "type": "string",
                        "default": "2024-25",
                        "description": "Financial year label"
                    }
                },
                "required": ["trust_income"]
            }),
        },
        Tool {
            name: "list_transactions".into(),
            description: "List ledger transactions, optionally filtered by category.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "Filter by category name"
                    },
                    "limit": {
                        "type": "integer",
                        "default": 20,
                        "description": "Max results to return"
                    }
                }
            }),
        },
        Tool {
            name: "list_accounts".into(),
            description: "List family accounts with balances.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "smsf_summary".into(),
            description:
                "Summarise an SMSF member's contributions for a year against the caps, with warnings."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "member_id": {
                        "type": "string",
                        "description": "SMSF member UUID"
                    },
                    "financial_year": {
                        "type": "string",
                        "default": "2024-25",
                        "description": "Financial year label"
                    }
                },
                "required": ["member_id"]
            }),
        },
        Tool {
            name: "trust_summary".into(),
            description:
                "Summarise a trust's year: beneficiaries, distributable income, resolved distributions."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "trust_id": {
                        "type": "string",
                        "description": "Trust UUID"
                    },
                    "financial_year": {
                        "type": "string",
                        "default": "2024-25",
                        "description": "Financial year label"
                    }
                },
                "required": ["trust_id"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_are_stable() {
        let names: Vec<String> = get_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "calculate_tax",
                "calculate_cgt",
                "calculate_contribution_caps",
                "calculate_distribution",
                "list_transactions",
                "list_accounts",
                "smsf_summary",
                "trust_summary",
            ]
        );
    }

    #[test]
    fn test_schemas_declare_required_fields() {
        for tool in get_tools() {
            let schema = &tool.input_schema;
            assert_eq!(schema["type"], "object", "{} schema", tool.name);
            assert!(schema["properties"].is_object(), "{} properties", tool.name);
        }
    }
}
