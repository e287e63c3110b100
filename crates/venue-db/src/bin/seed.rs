//! # Seed Data Generator
//!
//! Populates the database with the venue's demo catalogue.
//!
//! ## Usage
//! ```bash
//! # Seed ./venue.db (or $VENUE_DATABASE_PATH)
//! cargo run -p venue-db --bin seed
//!
//! # Specify database path
//! cargo run -p venue-db --bin seed -- --db ./data/venue.db
//! ```
//!
//! ## Seeded Data
//! - Room types: Phòng đôi (2), Phòng basic (4), Phòng vip (8), Phòng supper vip (15)
//! - Rooms: Đôi 01, Đôi 02, Basic 01, VIP 01, SVIP 01
//! - Services: Food (Khô bò, Đậu phộng, Bim bim), Drink (Tiger, Pepsi, Aqua)
//! - Users: staff / admin
//!
//! Entries already present are left alone. After seeding, the room catalogue
//! and this month's revenue report are printed as JSON.

use std::env;
use std::path::PathBuf;

use chrono::{Datelike, Local, Months, NaiveDate};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use venue_db::seed::seed_demo_data;
use venue_db::{BookingEngine, VenueConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = VenueConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Venue Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $VENUE_DATABASE_PATH or ./venue.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 Venue Seed Data Generator");
    println!("============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let engine = BookingEngine::open(&config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let summary = seed_demo_data(engine.database()).await?;
    if summary.is_empty() {
        println!("⚠ Demo catalogue already present, nothing inserted");
    } else {
        println!(
            "✓ Inserted {} room types, {} rooms, {} services, {} users",
            summary.room_types, summary.rooms, summary.services, summary.users
        );
    }

    let today = Local::now().date_naive();
    let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    let next_month = month_start.checked_add_months(Months::new(1)).unwrap_or(today);

    let report = json!({
        "room_types": engine.room_types().await?,
        "rooms": engine.rooms(&Default::default()).await?,
        "services": engine.services().await?,
        "revenue": {
            "from": month_start,
            "until": next_month,
            "rows": engine.revenue_by_room_type(month_start, next_month).await?,
        },
    });

    println!();
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Seed complete");
    engine.database().close().await;

    Ok(())
}

/// Initializes the tracing subscriber.
///
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: `info,venue=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,venue=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
