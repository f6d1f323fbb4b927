use std::error::Error;

use clap::Parser;
use rusqlite::Connection;

use finboard_rs::{Plan, SubscriptionStatus, TenantId, initialize_db, set_subscription};

/// Set a tenant's subscription plan, e.g. after the payment provider confirms a payment.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The tenant ID as set by the authentication proxy.
    #[arg(long)]
    tenant: String,

    /// The plan to set.
    #[arg(long, value_enum)]
    plan: Plan,

    /// Whether the plan is in effect.
    #[arg(long, value_enum, default_value_t = SubscriptionStatus::Active)]
    status: SubscriptionStatus,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let tenant = TenantId::new(&args.tenant)?;
    set_subscription(&tenant, args.plan, args.status, &conn)?;

    println!(
        "Set the plan for {tenant} to {} ({}).",
        args.plan, args.status
    );

    Ok(())
}
