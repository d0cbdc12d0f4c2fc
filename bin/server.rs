// Family Wealth Ledger - Web Server
// REST API over the ledger database and the tax calculators.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use family_ledger::{
    assess_caps, calculate_tax, db, model_distribution, FinancialYear, RateTable,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    eprintln!("Error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::fail(e.to_string())),
    )
        .into_response()
}

fn year_from_query(params: &HashMap<String, String>) -> Result<FinancialYear, String> {
    match params.get("financial_year") {
        Some(label) => FinancialYear::from_label(label).map_err(|e| e.to_string()),
        None => Ok(FinancialYear::new(2024)),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/accounts - All accounts with balances
async fn get_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match db::get_accounts(&conn) {
        Ok(accounts) => (StatusCode::OK, Json(ApiResponse::ok(accounts))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/transactions - All transactions
async fn get_transactions(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match db::get_all_transactions(&conn) {
        Ok(transactions) => (StatusCode::OK, Json(ApiResponse::ok(transactions))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/transactions/category/:name - Transactions in one category
async fn get_transactions_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let decoded = urlencoding::decode(&name)
        .unwrap_or_else(|_| name.clone().into())
        .into_owned();

    match db::get_transactions_by_category(&conn, &decoded) {
        Ok(transactions) => (StatusCode::OK, Json(ApiResponse::ok(transactions))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Stats response
#[derive(Serialize)]
struct StatsResponse {
    total_transactions: usize,
    total_income: f64,
    total_expenses: f64,
    by_category: Vec<CategoryStat>,
}

#[derive(Serialize)]
struct CategoryStat {
    category: String,
    count: usize,
    total: f64,
}

/// GET /api/stats - Income/expense totals by category
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match db::get_all_transactions(&conn) {
        Ok(transactions) => {
            let mut total_income = 0.0;
            let mut total_expenses = 0.0;
            let mut category_stats: HashMap<String, (usize, f64)> = HashMap::new();

            for tx in &transactions {
                if tx.amount > 0.0 {
                    total_income += tx.amount;
                } else {
                    total_expenses += tx.amount.abs();
                }

                let key = if tx.category.is_empty() {
                    "Uncategorised".to_string()
                } else {
                    tx.category.clone()
                };
                let entry = category_stats.entry(key).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += tx.amount;
            }

            let mut by_category: Vec<CategoryStat> = category_stats
                .into_iter()
                .map(|(category, (count, total))| CategoryStat {
                    category,
                    count,
                    total,
                })
                .collect();
            by_category.sort_by(|a, b| a.category.cmp(&b.category));

            let stats = StatsResponse {
                total_transactions: transactions.len(),
                total_income,
                total_expenses,
                by_category,
            };

            (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// GET /api/smsf/members/:id/caps - Contribution cap position for a member
async fn get_member_caps(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let year = match year_from_query(&params) {
        Ok(year) => year,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e))).into_response();
        }
    };

    let member = match db::get_smsf_member(&conn, &member_id) {
        Ok(Some(member)) => member,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::fail(format!("No SMSF member with id {}", member_id))),
            )
                .into_response();
        }
        Err(e) => return internal_error(e),
    };

    let (concessional, non_concessional) = match db::contribution_totals(&conn, &member_id, year) {
        Ok(totals) => totals,
        Err(e) => return internal_error(e),
    };

    match assess_caps(concessional, non_concessional, member.total_super_balance, &[], year) {
        Ok(assessment) => {
            for warning in assessment.warnings() {
                let _ = db::insert_notification(
                    &conn,
                    warning.level.as_str(),
                    &format!("{}: {}", member.name, warning.message),
                    "api/caps",
                );
            }
            (StatusCode::OK, Json(ApiResponse::ok(assessment))).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// GET /api/trusts/:id/distributions - Resolved distributions for a year
async fn get_trust_distributions(
    State(state): State<AppState>,
    Path(trust_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let year = match year_from_query(&params) {
        Ok(year) => year,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e))).into_response();
        }
    };

    match db::get_trust_distributions(&conn, &trust_id, year) {
        Ok(distributions) => {
            (StatusCode::OK, Json(ApiResponse::ok(distributions))).into_response()
        }
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// Calculator endpoints
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct TaxRequest {
    income: f64,
    #[serde(default = "default_true")]
    include_medicare_levy: bool,
    #[serde(default)]
    has_private_health_insurance: bool,
    financial_year: Option<String>,
}

/// POST /api/calculators/tax
async fn post_tax(Json(req): Json<TaxRequest>) -> impl IntoResponse {
    let year = match req.financial_year.as_deref() {
        Some(label) => match FinancialYear::from_label(label) {
            Ok(year) => year,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e.to_string())))
                    .into_response();
            }
        },
        None => FinancialYear::new(2024),
    };

    match calculate_tax(
        req.income,
        year,
        req.include_medicare_levy,
        req.has_private_health_insurance,
    ) {
        Ok(assessment) => (StatusCode::OK, Json(ApiResponse::ok(assessment))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e.to_string()))).into_response(),
    }
}

#[derive(Deserialize)]
struct CgtRequest {
    cost_base: f64,
    sale_price: f64,
    purchase_date: NaiveDate,
    sale_date: NaiveDate,
}

/// POST /api/calculators/cgt
async fn post_cgt(Json(req): Json<CgtRequest>) -> impl IntoResponse {
    let table = RateTable::fy_2024_25();
    let assessment = family_ledger::calculate_cgt(
        req.cost_base,
        req.sale_price,
        req.purchase_date,
        req.sale_date,
        &table,
    );
    (StatusCode::OK, Json(ApiResponse::ok(assessment))).into_response()
}

#[derive(Deserialize)]
struct DistributionRequest {
    trust_income: f64,
    #[serde(default)]
    franking_credits: f64,
    #[serde(default)]
    beneficiary1_income: f64,
    #[serde(default)]
    beneficiary2_income: f64,
    splits: Option<Vec<f64>>,
    financial_year: Option<String>,
}

/// POST /api/calculators/distribution
async fn post_distribution(Json(req): Json<DistributionRequest>) -> impl IntoResponse {
    let year = match req.financial_year.as_deref() {
        Some(label) => match FinancialYear::from_label(label) {
            Ok(year) => year,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e.to_string())))
                    .into_response();
            }
        },
        None => FinancialYear::new(2024),
    };

    match model_distribution(
        req.trust_income,
        req.franking_credits,
        (req.beneficiary1_income, req.beneficiary2_income),
        req.splits.as_deref(),
        year,
    ) {
        Ok(model) => (StatusCode::OK, Json(ApiResponse::ok(model))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e.to_string()))).into_response(),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Family Wealth Ledger - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("FAMILY_LEDGER_DB")
        .unwrap_or_else(|_| "family-ledger.db".to_string());

    let conn = Connection::open(&db_path).expect("Failed to open database");
    db::setup_database(&conn).expect("Failed to initialise ledger tables");
    println!("✓ Ledger opened: {}", db_path);

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/accounts", get(get_accounts))
        .route("/transactions", get(get_transactions))
        .route("/transactions/category/:name", get(get_transactions_by_category))
        .route("/stats", get(get_stats))
        .route("/smsf/members/:id/caps", get(get_member_caps))
        .route("/trusts/:id/distributions", get(get_trust_distributions))
        .route("/calculators/tax", post(post_tax))
        .route("/calculators/cgt", post(post_cgt))
        .route("/calculators/distribution", post(post_distribution))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/stats");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
