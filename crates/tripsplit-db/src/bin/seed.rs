//! # Demo Trip Seeder
//!
//! Creates a demo trip, records a few expenses, settles it and prints the
//! resulting plan.
//!
//! ## Usage
//! ```bash
//! # Use TRIPSPLIT_DB_PATH (default ./tripsplit.db)
//! cargo run -p tripsplit-db --bin seed
//!
//! # Specify database path
//! cargo run -p tripsplit-db --bin seed -- --db ./data/demo.db
//!
//! # Print the settlement as JSON
//! cargo run -p tripsplit-db --bin seed -- --json
//! ```

use std::env;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;
use tripsplit_core::{Money, NewExpense};
use tripsplit_db::{Database, NewTrip, TripsplitConfig};

/// Demo expenses: (description, amount, payer, day of May 2026)
const EXPENSES: &[(&str, &str, &str, u32)] = &[
    ("Apartment", "420.00", "Alice", 1),
    ("Groceries", "63.45", "Bob", 1),
    ("Dinner at the harbour", "131.10", "Carol", 2),
    ("Tram passes", "24.00", "Bob", 2),
    ("Museum tickets", "45.00", "Dan", 3),
];

const PARTICIPANTS: &[&str] = &["Bob", "Carol", "Dan"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = TripsplitConfig::from_env();
    let mut json = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Tripsplit Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $TRIPSPLIT_DB_PATH or ./tripsplit.db)");
                println!("      --json         Print the settlement as JSON");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let db = Database::new(config.db_config())
        .await?
        .with_policy(config.policy);

    let trip = db
        .trips()
        .create(
            NewTrip::new("Lisbon weekend")
                .on(demo_date(1)?)
                .owned_by("demo-user", "Alice"),
        )
        .await?;

    for name in PARTICIPANTS {
        db.participants().add(&trip.id, name).await?;
    }

    for (description, amount, paid_by, day) in EXPENSES {
        let amount: Money = amount.parse()?;
        db.expenses()
            .add(
                &trip.id,
                &NewExpense {
                    description: description.to_string(),
                    amount,
                    paid_by: paid_by.to_string(),
                    date: Some(demo_date(*day)?),
                },
            )
            .await?;
    }

    let outcome = db.settlement().settle_trip(&trip.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let total = db.trips().get_by_id(&trip.id).await?.map(|t| t.total());
    println!("Trip:   {} ({})", trip.name, trip.id);
    println!("Database: {}", config.database_path.display());
    if let Some(total) = total {
        println!("Total:  {}", total);
    }
    println!();
    println!("Balances:");
    for balance in &outcome.plan.balances {
        println!("  {:<8} {:>10}", balance.name, balance.amount.to_string());
    }
    println!();
    println!("Transfers:");
    if outcome.plan.is_noop() {
        println!("  Nobody owes anything.");
    }
    for transfer in &outcome.plan.transfers {
        println!("  {} pays {} {}", transfer.from, transfer.to, transfer.amount);
    }

    db.close().await;
    Ok(())
}

fn demo_date(day: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(2026, 5, day).ok_or_else(|| format!("invalid demo day {day}"))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: info, debug for tripsplit crates, warn for sqlx
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tripsplit=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
