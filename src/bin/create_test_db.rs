use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;

use finboard_rs::{
    EntityType, InstallmentPlan, Kind, LedgerDate, MonthPeriod, Plan, SubscriptionStatus,
    TenantId, copy_fixed_expenses, count_transactions, create_installments, ensure_baseline_categories, initialize_db,
    set_subscription,
};

/// A utility for creating a test database for the JSON API server of finboard_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The tenant to create the demo data for.
    #[arg(long, default_value = "demo")]
    tenant: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let tenant = TenantId::new(&args.tenant)?;

    println!("Creating categories for {tenant}...");
    ensure_baseline_categories(&tenant, &conn)?;

    let category_id = |name: &str| -> Result<Option<i64>, rusqlite::Error> {
        conn.query_row(
            "SELECT id FROM category WHERE tenant_id = ?1 AND name = ?2",
            (&tenant, name),
            |row| row.get(0),
        )
        .map(Some)
    };

    println!("Creating transactions...");

    let entries = [
        ("Salary", 6500, 1, Kind::Income, "Salary", EntityType::Personal, false, 1),
        ("Consulting invoice", 4200, 10, Kind::Income, "Investments", EntityType::Business, false, 1),
        ("Mortgage", 2100, 5, Kind::Expense, "Financing", EntityType::Personal, true, 1),
        ("Streaming", 55, 12, Kind::Expense, "Subscriptions & Apps", EntityType::Personal, true, 1),
        ("Accounting software", 120, 15, Kind::Expense, "Subscriptions & Apps", EntityType::Business, true, 1),
        ("Supermarket", 834, 8, Kind::Expense, "Groceries", EntityType::Personal, false, 1),
        ("Fuel", 250, 20, Kind::Expense, "Transport", EntityType::Personal, false, 1),
        ("Flights", 7200, 18, Kind::Expense, "Travel", EntityType::Business, false, 12),
    ];

    for (description, total, day, kind, category, entity_type, is_fixed, installments) in entries {
        let plan = InstallmentPlan {
            total: Decimal::from(total),
            installments,
            base_date: LedgerDate::new(2024, 3, day)?,
            description: description.to_owned(),
            kind,
            category_id: category_id(category)?,
            entity_type,
            is_fixed,
            is_paid: true,
        };

        create_installments(&tenant, &plan, &conn)?;
    }

    println!("Copying fixed expenses to the next month...");
    let report = copy_fixed_expenses(&tenant, MonthPeriod::new(2024, 3)?, None, &conn)?;
    println!("Copied {} of {} fixed expenses.", report.copied, report.found);

    println!(
        "{tenant} now has {} transactions.",
        count_transactions(&tenant, &conn)?
    );

    set_subscription(&tenant, Plan::Monthly, SubscriptionStatus::Active, &conn)?;

    println!("Success!");

    Ok(())
}
