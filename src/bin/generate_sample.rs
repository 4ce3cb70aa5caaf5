//! Writes a synthetic `Imports_Exports_Dataset.csv` with the column layout the
//! dashboard expects, so the fallback dataset exists on a fresh checkout.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const COUNTRIES: &[&str] = &[
    "Brazil", "Chile", "China", "France", "Ghana", "Germany", "India", "Japan",
    "Kenya", "Mexico", "Peru", "Spain", "Turkey", "United States", "Vietnam",
];
const CATEGORIES: &[&str] = &["Clothing", "Electronics", "Furniture", "Machinery", "Toys"];
const SHIPPING_METHODS: &[&str] = &["Air", "Land", "Sea"];
const PAYMENT_TERMS: &[&str] = &["Cash on Delivery", "Net 30", "Net 60", "Prepaid"];
const PORTS: &[&str] = &["Antwerp", "Busan", "Hamburg", "Rotterdam", "Santos", "Shanghai", "Valencia"];
const PRODUCTS: &[&str] = &["cable", "chair", "drill", "jacket", "lamp", "puzzle", "sensor", "table"];
const NAMES: &[&str] = &["Acme Ltd", "Baker & Sons", "Delta Trading", "Nordic Supply", "Orion Group", "Zenith Co"];

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Record {
    #[serde(rename = "Transaction_ID")]
    transaction_id: String,
    country: &'static str,
    product: &'static str,
    #[serde(rename = "Import_Export")]
    import_export: &'static str,
    quantity: u32,
    value: f64,
    date: String,
    category: &'static str,
    port: &'static str,
    #[serde(rename = "Customs_Code")]
    customs_code: u32,
    weight: f64,
    #[serde(rename = "Shipping_Method")]
    shipping_method: &'static str,
    supplier: &'static str,
    customer: &'static str,
    #[serde(rename = "Invoice_Number")]
    invoice_number: u32,
    #[serde(rename = "Payment_Terms")]
    payment_terms: &'static str,
}

fn pick(rng: &mut StdRng, values: &'static [&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Imports_Exports_Dataset.csv"));
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 15_000,
    };

    let mut rng = StdRng::seed_from_u64(42);
    let first_day = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;

    for i in 0..rows {
        let quantity: u32 = rng.random_range(1..=10_000);
        let unit_price: f64 = rng.random_range(1.0..1_000.0);
        let date = first_day
            .checked_add_days(Days::new(rng.random_range(0..(5 * 365))))
            .context("date out of range")?;

        // A few malformed dates so the dashboard's drop count has something to show.
        let date = if rng.random_ratio(1, 500) {
            "unknown".to_string()
        } else {
            date.format("%Y-%m-%d").to_string()
        };

        writer.serialize(Record {
            transaction_id: format!("T{i:06}"),
            country: pick(&mut rng, COUNTRIES),
            product: pick(&mut rng, PRODUCTS),
            import_export: if rng.random_bool(0.5) { "Import" } else { "Export" },
            quantity,
            value: (quantity as f64 * unit_price * 100.0).round() / 100.0,
            date,
            category: pick(&mut rng, CATEGORIES),
            port: pick(&mut rng, PORTS),
            customs_code: rng.random_range(100_000..1_000_000),
            weight: (rng.random_range(0.5..5_000.0_f64) * 100.0).round() / 100.0,
            shipping_method: pick(&mut rng, SHIPPING_METHODS),
            supplier: pick(&mut rng, NAMES),
            customer: pick(&mut rng, NAMES),
            invoice_number: rng.random_range(10_000_000..100_000_000),
            payment_terms: pick(&mut rng, PAYMENT_TERMS),
        })?;
    }
    writer.flush()?;

    log::info!("Wrote {rows} transactions to {}", output.display());
    println!("Wrote {rows} transactions to {}", output.display());
    Ok(())
}
