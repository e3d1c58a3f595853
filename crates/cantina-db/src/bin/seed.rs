//! # Seed Data Generator
//!
//! Populates the database with a small development dataset: a product
//! catalog, a few providers, and a few workers.
//!
//! ## Usage
//! ```bash
//! cargo run -p cantina-db --bin seed
//!
//! # Specify database path
//! cargo run -p cantina-db --bin seed -- --db ./data/cantina.db
//! ```

use std::env;

use cantina_core::Money;
use cantina_db::repository::product::NewProduct;
use cantina_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (name, sale_price, purchase_cost, token_price, units_per_box, units_per_basket)
const PRODUCTS: &[(&str, i64, i64, i64, i64, i64)] = &[
    ("Aguila 330ml", 3_500, 2_000, 500, 24, 30),
    ("Aguila Light 330ml", 3_500, 2_000, 500, 24, 30),
    ("Club Colombia Dorada", 4_500, 2_800, 600, 24, 30),
    ("Poker 330ml", 3_000, 1_800, 400, 24, 30),
    ("Costena 330ml", 3_000, 1_800, 400, 24, 30),
    ("Corona 355ml", 8_000, 5_000, 1_000, 24, 1),
    ("Gaseosa Colombiana 400ml", 3_000, 1_600, 0, 30, 1),
    ("Agua 600ml", 2_500, 1_200, 0, 24, 1),
    ("Aguardiente Antioqueno 750ml", 60_000, 42_000, 5_000, 12, 1),
    ("Ron Medellin 750ml", 70_000, 48_000, 5_000, 12, 1),
];

/// (name, contact, accepts_consignment)
const PROVIDERS: &[(&str, Option<&str>, bool)] = &[
    ("Bavaria", Some("310 555 0101"), true),
    ("Postobon", Some("312 555 0707"), false),
    ("Licores del Valle", None, true),
];

/// (name, base_pay)
const WORKERS: &[(&str, i64)] = &[
    ("Ana Torres", 30_000),
    ("Carlos Mejia", 30_000),
    ("Luisa Rios", 35_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./cantina_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cantina Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cantina_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Cantina Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, sale_price, purchase_cost, token_price, per_box, per_basket) in PRODUCTS {
        db.products()
            .create(NewProduct {
                name: (*name).to_string(),
                sale_price: *sale_price,
                purchase_cost: *purchase_cost,
                token_price: *token_price,
                units_per_box: *per_box,
                units_per_basket: *per_basket,
            })
            .await?;
    }
    println!("✓ Seeded {} products", PRODUCTS.len());

    for (name, contact, accepts_consignment) in PROVIDERS {
        db.providers()
            .create(name, contact.map(str::to_string), *accepts_consignment)
            .await?;
    }
    println!("✓ Seeded {} providers", PROVIDERS.len());

    for (name, base_pay) in WORKERS {
        db.workers()
            .create(name, Money::from_pesos(*base_pay))
            .await?;
    }
    println!("✓ Seeded {} workers", WORKERS.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
