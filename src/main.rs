use anyhow::{bail, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use family_ledger::entities::category::default_categories;
use family_ledger::{
    count_transactions, format, get_unread_notifications, insert_transactions, load_csv,
    setup_database, FinancialYear, RateTable, RuleEngine,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(args.get(2)),
        Some("categorise") => run_categorise(args.get(2)),
        Some("summary") => run_summary(),
        Some("tax") => run_tax(args.get(2)),
        Some("cgt") => run_cgt(&args[2..]),
        _ => {
            eprintln!("Usage: family-ledger <command>");
            eprintln!("  import <statement.csv>    Import transactions");
            eprintln!("  categorise [rules.json]   Apply categorisation rules");
            eprintln!("  summary                   Ledger totals and notifications");
            eprintln!("  tax <income>              Income tax estimate for 2024-25");
            eprintln!("  cgt <cost> <sale> <acquired> <sold>   Capital gains position");
            Ok(())
        }
    }
}

fn db_path() -> PathBuf {
    env::var("FAMILY_LEDGER_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("family-ledger.db"))
}

fn open_ledger() -> Result<Connection> {
    let conn = Connection::open(db_path())?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_import(csv_arg: Option<&String>) -> Result<()> {
    let Some(csv_path) = csv_arg else {
        bail!("Usage: family-ledger import <statement.csv>");
    };

    println!("🗄️  Importing {} → {}", csv_path, db_path().display());

    let transactions = load_csv(Path::new(csv_path))?;
    println!("✓ Loaded {} transactions from CSV", transactions.len());

    let conn = open_ledger()?;
    for category in default_categories() {
        family_ledger::db::insert_category(&conn, &category)?;
    }

    let inserted = insert_transactions(&conn, &transactions)?;
    let total = count_transactions(&conn)?;

    println!("✓ Inserted {} new transactions", inserted);
    if inserted < transactions.len() {
        println!("✓ Skipped {} already-imported lines", transactions.len() - inserted);
    }
    println!("✓ Ledger now holds {} transactions", total);

    Ok(())
}

fn run_categorise(rules_arg: Option<&String>) -> Result<()> {
    let conn = open_ledger()?;

    let engine = match rules_arg {
        Some(path) => RuleEngine::from_file(path)?,
        None => RuleEngine::new(),
    };

    if engine.rule_count() == 0 {
        println!("No rules loaded - pass a rules.json file");
        return Ok(());
    }

    println!("🏷️  Applying {} rules...", engine.rule_count());
    let categorised = engine.apply(&conn)?;
    let remaining = family_ledger::get_uncategorised(&conn)?.len();

    println!("✓ Categorised {} transactions", categorised);
    println!("✓ {} still uncategorised", remaining);

    Ok(())
}

fn run_summary() -> Result<()> {
    let conn = open_ledger()?;

    let transactions = family_ledger::get_all_transactions(&conn)?;
    let income: f64 = transactions.iter().filter(|t| t.amount > 0.0).map(|t| t.amount).sum();
    let expenses: f64 = transactions.iter().filter(|t| t.amount < 0.0).map(|t| t.amount).sum();

    println!("📊 Ledger Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Transactions: {}", transactions.len());
    println!("Income:       {}", format::currency(income));
    println!("Expenses:     {}", format::currency(expenses));
    println!("Net:          {}", format::currency(income + expenses));

    let notifications = get_unread_notifications(&conn)?;
    if !notifications.is_empty() {
        println!("\n🔔 Notifications");
        for n in &notifications {
            println!("  [{}] {}", n.severity, n.message);
        }
    }

    Ok(())
}

fn run_tax(income_arg: Option<&String>) -> Result<()> {
    let Some(raw) = income_arg else {
        bail!("Usage: family-ledger tax <income>");
    };
    // Permissive: anything unparseable is zero
    let income: f64 = raw.parse().unwrap_or(0.0);

    if let Err(errors) = family_ledger::validate::validate_tax_input(income) {
        for e in errors {
            eprintln!("⚠️  {}", e);
        }
    }

    let assessment =
        family_ledger::calculate_tax(income, FinancialYear::new(2024), true, false)?;

    println!("💰 Income Tax {}", assessment.financial_year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Taxable income:  {}", format::currency(assessment.taxable_income));
    println!("Base tax:        {}", format::currency(assessment.base_tax));
    println!("Medicare levy:   {}", format::currency(assessment.medicare_levy));
    if assessment.medicare_levy_surcharge > 0.0 {
        println!("Levy surcharge:  {}", format::currency(assessment.medicare_levy_surcharge));
    }
    println!("Total tax:       {}", format::currency(assessment.total_tax));
    println!("Marginal rate:   {}", format::percent(assessment.marginal_rate));
    println!("Effective rate:  {}", format::percent(assessment.effective_rate));
    println!("Take-home:       {}", format::currency(assessment.take_home));

    Ok(())
}

fn run_cgt(args: &[String]) -> Result<()> {
    let [cost, sale, acquired, sold] = args else {
        bail!("Usage: family-ledger cgt <cost> <sale> <acquired YYYY-MM-DD> <sold YYYY-MM-DD>");
    };

    let cost_base: f64 = cost.parse().unwrap_or(0.0);
    let sale_price: f64 = sale.parse().unwrap_or(0.0);
    let acquisition_date = NaiveDate::parse_from_str(acquired, "%Y-%m-%d")?;
    let sale_date = NaiveDate::parse_from_str(sold, "%Y-%m-%d")?;

    if let Err(errors) =
        family_ledger::validate::validate_cgt_input(cost_base, sale_price, acquisition_date, sale_date)
    {
        for e in errors {
            eprintln!("⚠️  {}", e);
        }
    }

    let table = RateTable::fy_2024_25();
    let a = family_ledger::calculate_cgt(cost_base, sale_price, acquisition_date, sale_date, &table);

    println!("📈 Capital Gains");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Months held:     {}", a.months_held);
    if a.is_loss {
        println!("Capital loss:    {}", format::currency(a.carried_forward_loss));
        println!("Carried forward - no tax payable on this disposal");
    } else {
        println!("Capital gain:    {}", format::currency(a.capital_gain));
        println!(
            "Discount:        {}",
            if a.discount_applied { "50% (held 12+ months)" } else { "none" }
        );
        println!("Taxable gain:    {}", format::currency(a.taxable_gain));
    }

    Ok(())
}
