//! # Seed Data Generator
//!
//! Writes a demo catalog and a few weeks of sales for one store profile.
//!
//! ## Usage
//! ```bash
//! # Demo data for the food counter
//! cargo run -p stockroom-db --bin seed -- --profile mochima
//!
//! # Card shop, custom database, also export the catalog
//! cargo run -p stockroom-db --bin seed -- --profile hencho_tcg --db ./data/tcg.db --csv ./tcg.csv
//! ```
//!
//! Without `--profile` or `--db` the values come from the store config
//! (file, then `STOCKROOM_*` environment variables).

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Duration, Local, Utc};
use rand::Rng;
use stockroom_core::{Money, NewProduct, StoreProfile};
use stockroom_db::{Dashboard, Database, DbConfig, Store, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `(sku, name, quantity, price)` per profile.
const CARD_SHOP: &[(&str, &str, i64, i64)] = &[
    ("PKM001", "Charizard VMAX Brillante", 5, 45000),
    ("PKM002", "Pikachu V-UNION", 8, 25000),
    ("PKM003", "Mewtwo GX Rainbow", 3, 38000),
    ("PKM004", "Lugia V Alt Art", 6, 32000),
    ("PKM005", "Rayquaza VMAX Shiny", 4, 55000),
    ("PKM006", "Umbreon VMAX Alt Art", 3, 48000),
    ("PKM007", "Snorlax VMAX", 8, 24000),
    ("PKM008", "Arceus VSTAR Brillante", 2, 65000),
    ("PKM009", "Giratina VSTAR", 0, 62000),
    ("PKM010", "Booster Evolving Skies", 36, 4500),
    ("PKM011", "Sobres Fusion Strike", 24, 3900),
    ("PKM012", "Fundas Ultra Pro x100", 15, 6000),
];

const FOOD_COUNTER: &[(&str, &str, i64, i64)] = &[
    ("MOCH001", "Ramen Tonkotsu Premium", 25, 8500),
    ("MOCH002", "Sushi Nigiri Salmón", 30, 12000),
    ("MOCH003", "Gyoza de Cerdo", 40, 6500),
    ("MOCH004", "Tempura de Camarón", 4, 9500),
    ("MOCH005", "Yakitori de Pollo", 35, 7500),
    ("MOCH006", "Miso Soup Tradicional", 50, 3500),
    ("MOCH007", "Chirashi Bowl", 9, 13500),
    ("MOCH008", "Onigiri de Atún", 38, 4500),
    ("MOCH009", "Karaage de Pollo", 0, 8500),
    ("MOCH010", "Sashimi de Atún", 12, 18000),
    ("MOCH011", "Matcha Latte", 60, 3500),
    ("MOCH012", "Poke Bowl Salmón", 20, 12000),
];

const GENERAL_STORE: &[(&str, &str, i64, i64)] = &[
    ("GEN001", "Cuaderno Universitario", 40, 2500),
    ("GEN002", "Lápiz Grafito x12", 3, 1800),
    ("GEN003", "Mochila Escolar", 7, 19990),
    ("GEN004", "Botella Térmica", 0, 12990),
    ("GEN005", "Audífonos Bluetooth", 12, 24990),
    ("GEN006", "Cargador USB-C", 25, 8990),
];

fn catalog_for(profile: StoreProfile) -> &'static [(&'static str, &'static str, i64, i64)] {
    match profile {
        StoreProfile::HenchoTcg => CARD_SHOP,
        StoreProfile::Mochima => FOOD_COUNTER,
        StoreProfile::Basic => GENERAL_STORE,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = StoreConfig::load_or_default(None);

    let mut profile = config.profile();
    let mut db_path = config.database_path();
    let mut csv_path: Option<PathBuf> = None;
    let mut days: i64 = 21;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--profile" | "-p" => {
                if i + 1 < args.len() {
                    profile = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--csv" => {
                if i + 1 < args.len() {
                    csv_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--days" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(21);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --profile <NAME>  hencho_tcg | mochima | basic (default: from config)");
                println!("  -d, --db <PATH>       Database file path (default: from config)");
                println!("      --csv <PATH>      Also export the catalog as CSV");
                println!("      --days <N>        Days of demo sales to generate (default: 21)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    config.store.profile = profile;

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Profile:  {}", profile.display_name());
    println!("Database: {}", db_path.display());
    println!();

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::new(DbConfig::new(db_path.clone())).await?;
    let store = Store::new(db.kv_store(), profile);

    let existing = store.products().count().await?;
    if existing > 0 {
        println!("Store already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Clear the catalog or use another database to regenerate.");
        return Ok(());
    }

    let start = Instant::now();
    let mut rng = rand::thread_rng();
    let catalog = catalog_for(profile);

    // Backfill plan, oldest first: (catalog row, units, when).
    let now = Utc::now();
    let mut plan: Vec<(usize, i64, DateTime<Utc>)> = Vec::new();
    for day in (0..days).rev() {
        for _ in 0..rng.gen_range(0..6) {
            let at = now - Duration::days(day) - Duration::minutes(rng.gen_range(0..600));
            plan.push((rng.gen_range(0..catalog.len()), rng.gen_range(1..=3), at));
        }
    }
    plan.sort_by_key(|(_, _, at)| *at);

    // Each product starts with its listed stock plus what the plan sells, so
    // replaying the plan through the sale handler lands on the listed stock.
    let mut created = Vec::new();
    for (row, (sku, name, quantity, price)) in catalog.iter().enumerate() {
        let planned: i64 = plan.iter().filter(|(r, _, _)| *r == row).map(|(_, q, _)| q).sum();
        let cost_pct = rng.gen_range(55..=80);
        let product = store
            .products()
            .create(NewProduct {
                sku: sku.to_string(),
                name: name.to_string(),
                quantity: quantity + planned,
                price: Money::from_units(*price),
                cost: Some(Money::from_units(price * cost_pct / 100)),
            })
            .await?;
        created.push(product);
    }
    println!("Created {} products", created.len());

    let checkout = store.checkout();
    for (row, quantity, at) in &plan {
        checkout.sell_at(&created[*row].id, *quantity, *at).await?;
    }
    let sale_count = plan.len();
    println!("Recorded {} sales over {} days", sale_count, days);

    if let Some(path) = csv_path {
        store.products().export_file(&path).await?;
        println!("Exported catalog to {}", path.display());
    }

    let dashboard = Dashboard::with_config(store.clone(), config.analytics_config())
        .with_volatility(config.cost_volatility());
    let report = dashboard.report(Local::now().date_naive()).await?;
    println!();
    println!(
        "Health: {} ({:?}), {} alerts, revenue {}",
        report.kpis.health.score,
        report.kpis.health.status,
        report.kpis.alerts.total_alerts,
        report.sales.total_revenue
    );

    info!(
        profile = %profile,
        products = created.len(),
        sales = sale_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    Ok(())
}
