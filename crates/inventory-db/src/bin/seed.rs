//! # Seed Data Generator
//!
//! Populates the database with test items for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 items (default)
//! cargo run -p inventory-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p inventory-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p inventory-db --bin seed -- --db ./data/inventory.db
//! ```
//!
//! ## Generated Items
//! Each item is a product name plus a size variant, e.g. `Desk Lamp Large`:
//! - Price: $1.99 - $9.99 plus a size addon
//! - Stock: 0 - 100 (some items start out of stock)

use inventory_core::{Item, Money};
use inventory_db::{Database, DbConfig};
use std::env;

/// Product names for realistic test data
const PRODUCTS: &[&str] = &[
    "Notebook",
    "Ballpoint Pen",
    "Pencil Case",
    "Stapler",
    "Desk Lamp",
    "USB Cable",
    "Phone Charger",
    "Headphones",
    "Board Game",
    "Puzzle",
    "Coffee Mug",
    "Water Bottle",
    "Backpack",
    "Umbrella",
    "Wall Clock",
    "Picture Frame",
    "Scissors",
    "Tape Dispenser",
    "Sticky Notes",
    "Calculator",
];

/// Size variants with a price addon in cents
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("XL", 350),
    ("2-Pack", 150),
    ("6-Pack", 300),
    ("12-Pack", 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./inventory_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Inventory Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./inventory_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Inventory Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.items();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = store.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating items...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    let variants = PRODUCTS
        .iter()
        .flat_map(|name| SIZES.iter().map(move |size| (*name, *size)))
        .take(count);

    for (seed, (name, (size, price_addon))) in variants.enumerate() {
        let item = generate_item(name, size, price_addon, seed);

        if let Err(e) = store.insert(&item).await {
            eprintln!("Failed to insert {}: {}", item.name, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} items...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} items in {:?}", generated, elapsed);
    if generated < count {
        println!(
            "  Only {} distinct name/size combinations are available",
            PRODUCTS.len() * SIZES.len()
        );
    }

    let out_of_stock = store
        .list()
        .await?
        .iter()
        .filter(|item| item.is_out_of_stock())
        .count();
    println!("  Out of stock: {}", out_of_stock);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single item with deterministic pseudo-random data.
fn generate_item(name: &str, size: &str, price_addon: i64, seed: usize) -> Item {
    // $1.99 - $9.99 + size addon
    let base_cents = 199 + ((seed * 17) % 800) as i64;
    let price = Money::from_cents(base_cents + price_addon).to_price();

    // Every 13th item starts out of stock
    let quantity = if seed % 13 == 0 {
        0
    } else {
        (seed % 101) as i64
    };

    Item::new(format!("{} {}", name, size), price, quantity)
}
