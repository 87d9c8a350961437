//! # Seed Data Generator
//!
//! Populates the database with sample credit sales for development.
//!
//! ## Usage
//! ```bash
//! # Seed with the defaults
//! cargo run -p fiado-ledger --bin seed
//!
//! # Specify database path
//! cargo run -p fiado-ledger --bin seed -- --db ./data/fiado.db
//! ```
//!
//! ## Generated Data
//! A handful of neighborhood customers, each with one or two open credit
//! sales made of realistic grocery line items plus the occasional manual
//! surcharge. One sale is then settled in full so the daily cash register
//! has something on today's page.

use std::env;

use chrono::{Local, Utc};
use fiado_core::{
    ChequePolicy, CreditSale, Money, PaymentMethod, PaymentSplit, SaleLineItem,
};
use fiado_ledger::{Ledger, LedgerConfig};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Sample line items: (name, category, unit, quantity, unit price cents, unit cost cents)
const PANTRY: &[(&str, Option<&str>, &str, f64, i64, i64)] = &[
    ("Rice 1kg", Some("grocery"), "ud", 2.0, 1_250, 900),
    ("Black Beans 500g", Some("grocery"), "ud", 3.0, 890, 610),
    ("Sunflower Oil 900ml", Some("grocery"), "ud", 1.0, 2_100, 1_650),
    ("White Bread", Some("bakery"), "ud", 2.0, 650, 380),
    ("Ground Beef", Some("butcher"), "kg", 0.75, 5_400, 4_100),
    ("Chicken Thighs", Some("butcher"), "kg", 1.2, 3_200, 2_350),
    ("Whole Milk 1L", Some("dairy"), "ud", 4.0, 980, 720),
    ("Yerba Mate 500g", Some("grocery"), "ud", 1.0, 2_850, 2_050),
    ("Laundry Soap", Some("cleaning"), "ud", 2.0, 1_150, 780),
    ("Sugar 1kg", Some("grocery"), "ud", 1.0, 940, 640),
];

/// Customers and which pantry rows land on their tab.
const CUSTOMERS: &[(&str, &[usize], i64)] = &[
    ("Ana Gomez", &[0, 1, 3], 0),
    ("Carlos Diaz", &[4, 6], 500),
    ("Marta Silva", &[2, 7, 9], 0),
    ("Pedro Alves", &[5, 8], 1_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./fiado_dev.db");

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
                println!("Fiado Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./fiado_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Fiado Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let ledger = Ledger::new(LedgerConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip if sales already exist, so reruns don't pile on duplicates
    let existing = ledger.credit().list_sales(None, None).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} credit sales", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating credit sales...");

    let mut first_sale_id = None;
    for (customer, item_rows, surcharge_cents) in CUSTOMERS {
        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let items: Vec<SaleLineItem> = item_rows
            .iter()
            .map(|&row| {
                let (name, category, unit, quantity, price, cost) = PANTRY[row];
                let line_total = (price as f64 * quantity).round() as i64;
                SaleLineItem {
                    id: Uuid::new_v4().to_string(),
                    sale_id: sale_id.clone(),
                    name: name.to_string(),
                    category: category.map(str::to_string),
                    unit: unit.to_string(),
                    quantity,
                    unit_price_cents: price,
                    unit_cost_cents: cost,
                    line_total_cents: line_total,
                }
            })
            .collect();

        let items_total: i64 = items.iter().map(|item| item.line_total_cents).sum();
        let sale = CreditSale {
            id: sale_id.clone(),
            customer_name: customer.to_string(),
            manual_amount_cents: *surcharge_cents,
            total_cents: items_total + surcharge_cents,
            paid: false,
            sale_date: now,
            payment_methods: Vec::new(),
            created_at: now,
        };

        ledger.credit().insert_sale(&sale, &items).await?;
        println!(
            "  {} owes {} ({} items)",
            customer,
            Money::from_cents(sale.total_cents),
            items.len()
        );

        if first_sale_id.is_none() {
            first_sale_id = Some((sale_id, sale.total_cents));
        }
    }

    // Settle the first tab in full so today's register page exists
    if let Some((sale_id, total_cents)) = first_sale_id {
        println!();
        println!("Settling one tab in full...");

        let splits = [PaymentSplit {
            method: PaymentMethod::Cash,
            amount_cents: total_cents,
        }];
        let outcome = ledger.settlements().settle(&sale_id, &splits).await?;
        println!(
            "  {} settled for {} (register date {})",
            outcome.sale.customer_name,
            Money::from_cents(outcome.paid_now_cents),
            Local::now().date_naive()
        );
    }

    println!();
    println!("Outstanding balances:");
    for (customer, _, _) in CUSTOMERS {
        let balance = ledger
            .credit()
            .outstanding_balance(customer, ChequePolicy::default())
            .await?;
        println!("  {:<12} {}", customer, balance);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
