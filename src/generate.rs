//! Synthetic restaurant POS data for demos and tests.
//!
//! The distributions are fixed so that a given seed always yields the same
//! dataset, including its deliberate data-quality problems: missing
//! servers, tables and payment types, grossly wrong prices and duplicated
//! rows.

use crate::error::{AnalysisError, Result};
use crate::record::Transaction;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::seq::index;
use rand_distr::Normal;
use std::path::Path;
use tracing::info;

/// `(name, list price, category)`
const MENU: [(&str, f64, &str); 12] = [
    ("Burger", 12.99, "Main"),
    ("Cheeseburger", 14.99, "Main"),
    ("Veggie Burger", 13.99, "Main"),
    ("French Fries", 4.99, "Side"),
    ("Sweet Potato Fries", 5.99, "Side"),
    ("Garden Salad", 8.99, "Side"),
    ("Chicken Wings", 11.99, "Appetizer"),
    ("Mozzarella Sticks", 7.99, "Appetizer"),
    ("Soda", 2.99, "Beverage"),
    ("Iced Tea", 2.99, "Beverage"),
    ("Beer", 5.99, "Alcohol"),
    ("Wine", 7.99, "Alcohol"),
];

const LOCATIONS: [&str; 5] = ["Downtown", "Suburb West", "Suburb East", "Airport", "Mall"];

const SERVER_COUNT: u32 = 30;

/// Opening hour and the share of a day's orders placed in each hour.
const FIRST_HOUR: u32 = 11;
const HOUR_WEIGHTS: [f64; 12] = [
    0.05, 0.10, 0.15, 0.10, 0.05, 0.10, 0.15, 0.15, 0.08, 0.04, 0.02, 0.01,
];

const PAYMENT_TYPES: [Option<&str>; 4] = [Some("CASH"), Some("CREDIT"), Some("DEBIT"), None];
const PAYMENT_WEIGHTS: [f64; 4] = [0.2, 0.6, 0.15, 0.05];

const MISSING_SERVER_RATE: f64 = 0.05;
const MISSING_TABLE_RATE: f64 = 0.03;
const PRICE_ERROR_RATE: f64 = 0.02;
const PRICE_ERROR_FACTORS: [f64; 2] = [0.1, 10.0];
const DUPLICATE_RATE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub start_date: NaiveDate,
    pub days: u32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days: 90,
            seed: 42,
        }
    }
}

fn distribution_error(name: &str, e: impl ToString) -> AnalysisError {
    AnalysisError::Value {
        column: name.to_string(),
        message: e.to_string(),
    }
}

/// Generates a timestamp-sorted synthetic dataset.
#[tracing::instrument]
pub fn generate_pos_data(config: &GeneratorConfig) -> Result<Vec<Transaction>> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let weekday_orders = Normal::new(300.0, 30.0).map_err(|e| distribution_error("orders", e))?;
    let weekend_orders = Normal::new(400.0, 30.0).map_err(|e| distribution_error("orders", e))?;
    let hours = WeightedIndex::new(HOUR_WEIGHTS).map_err(|e| distribution_error("hour", e))?;
    let payments =
        WeightedIndex::new(PAYMENT_WEIGHTS).map_err(|e| distribution_error("payment_type", e))?;

    let servers: Vec<String> = (1..=SERVER_COUNT).map(|i| format!("S{i:03}")).collect();
    let mut records = Vec::new();

    for day in 0..config.days {
        let date = config.start_date + Duration::days(day as i64);
        let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let orders: f64 = if is_weekend {
            weekend_orders.sample(&mut rng)
        } else {
            weekday_orders.sample(&mut rng)
        };

        for _ in 0..orders.max(0.0) as usize {
            let location = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
            let hour = FIRST_HOUR + hours.sample(&mut rng) as u32;
            let minute = rng.gen_range(0..60);
            let Some(timestamp) = date.and_hms_opt(hour, minute, 0) else {
                continue;
            };

            let item_count = rng.gen_range(1..6);
            let server = (rng.r#gen::<f64>() > MISSING_SERVER_RATE)
                .then(|| servers[rng.gen_range(0..servers.len())].clone());
            let table = (rng.r#gen::<f64>() > MISSING_TABLE_RATE)
                .then(|| format!("T{}", rng.gen_range(1..21)));

            for _ in 0..item_count {
                let (name, list_price, category) = MENU[rng.gen_range(0..MENU.len())];
                let mut price = list_price;
                if rng.r#gen::<f64>() < PRICE_ERROR_RATE {
                    price *= PRICE_ERROR_FACTORS[rng.gen_range(0..PRICE_ERROR_FACTORS.len())];
                }

                records.push(Transaction {
                    timestamp,
                    location: location.to_string(),
                    server_id: server.clone(),
                    table_number: table.clone(),
                    item_name: name.to_string(),
                    item_category: category.to_string(),
                    price,
                    payment_type: PAYMENT_TYPES[payments.sample(&mut rng)].map(str::to_string),
                });
            }
        }
    }

    let duplicate_count = (records.len() as f64 * DUPLICATE_RATE) as usize;
    let duplicates: Vec<Transaction> = index::sample(&mut rng, records.len(), duplicate_count)
        .into_iter()
        .map(|i| records[i].clone())
        .collect();
    records.extend(duplicates);

    records.sort_by_key(|r| r.timestamp);

    info!(rows = records.len(), duplicates = duplicate_count, "Generated POS data");
    Ok(records)
}

/// Writes generated records as CSV with the standard header.
pub fn write_pos_data(records: &[Transaction], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Counts of missing optional fields, for a quick data-quality glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingValues {
    pub server_id: usize,
    pub table_number: usize,
    pub payment_type: usize,
}

pub fn missing_values(records: &[Transaction]) -> MissingValues {
    MissingValues {
        server_id: records.iter().filter(|r| r.server_id.is_none()).count(),
        table_number: records.iter().filter(|r| r.table_number.is_none()).count(),
        payment_type: records.iter().filter(|r| r.payment_type.is_none()).count(),
    }
}
