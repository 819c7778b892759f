//! Output formatting and persistence for summary tables.
//!
//! Supports CSV (optionally gzip-compressed) export, JSON logging and the
//! plain-text validation printouts that accompany each chart.

use anyhow::Result as AnyResult;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::{
    BasicStats, LocationHourHeatmap, WeekdayCoverage, WeekdayTicket, weekday_name,
};
use crate::error::Result;

/// File format for exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    CsvGz,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::CsvGz => "csv.gz",
        }
    }
}

/// Writes `rows` to `path` as CSV with a header row, replacing any
/// existing file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T], format: ExportFormat) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing table");

    let file = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => {
            serialize_rows(file, rows)?.flush()?;
        }
        ExportFormat::CsvGz => {
            let encoder = serialize_rows(GzEncoder::new(file, Compression::default()), rows)?;
            encoder.finish()?.flush()?;
        }
    }
    Ok(())
}

fn serialize_rows<W: Write, T: Serialize>(sink: W, rows: &[T]) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Writes `value` to stdout as pretty-printed JSON, for piping.
pub fn print_json(value: &impl Serialize) -> AnyResult<()> {
    let stdout = std::io::stdout();
    write_json(&mut stdout.lock(), value)?;
    info!("JSON report written to stdout");
    Ok(())
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(out: &mut W, value: &impl Serialize) -> AnyResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn dollars(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn print_basic_stats(stats: &BasicStats) {
    println!("\nBasic Statistics:");
    println!("{}", "-".repeat(50));
    match stats.date_range {
        Some((first, last)) => println!("  Date Range: {first} to {last}"),
        None => println!("  Date Range: n/a"),
    }
    println!("  Total Sales: {}", dollars(stats.total_sales));
    println!("  Transactions: {}", stats.total_transactions);
    println!("  Locations: {}", stats.unique_locations);
    println!("  Servers: {}", stats.unique_servers);
    println!("  Price Anomalies: {}", stats.price_anomalies);
}

pub fn print_weekday_tickets(tickets: &[WeekdayTicket]) {
    println!("\nDaily Average Ticket Analysis:");
    println!("{}", "-".repeat(50));
    for t in tickets {
        println!("{}:", weekday_name(t.day_of_week));
        match t.avg_ticket {
            Some(avg) => println!("  Average Ticket: {}", dollars(avg)),
            None => println!("  Average Ticket: n/a"),
        }
        println!("  Number of Orders: {}", t.num_orders);
        println!("  Total Revenue: {}", dollars(t.total_revenue));
    }
}

pub fn print_weekday_coverage(coverage: &[WeekdayCoverage]) {
    println!("\nValidation Statistics:");
    println!("{}", "-".repeat(50));
    for c in coverage {
        let day = weekday_name(c.day_of_week);
        println!("{day}:");
        println!("  Total orders: {}", c.total_orders);
        println!("  Number of {day}s in dataset: {}", c.dates);
        match c.avg_orders_per_date {
            Some(avg) => println!("  Average orders per {day}: {avg:.1}"),
            None => println!("  Average orders per {day}: n/a"),
        }
    }
}

pub fn print_heatmap_sums(heatmap: &LocationHourHeatmap) {
    for location in &heatmap.locations {
        println!(
            "{location} - Sum of hourly averages: {:.1}",
            heatmap.location_sum(location)
        );
    }
}
