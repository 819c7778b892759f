use crate::analyzers::utility::{mean, stddev};
use crate::record::Transaction;
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use std::collections::HashMap;
use tracing::info;

/// Payment type recorded when the terminal did not capture one.
pub const UNKNOWN_PAYMENT: &str = "UNKNOWN";

/// How many standard deviations from an item's mean price count as normal.
pub const ANOMALY_SIGMAS: f64 = 3.0;

/// A transaction with its calendar fields and price band attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    pub record: Transaction,
    pub payment_type: String,
    pub date: NaiveDate,
    pub hour: u32,
    pub day_of_week: Weekday,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub price_anomaly: bool,
}

impl EnrichedTransaction {
    pub fn price(&self) -> f64 {
        self.record.price
    }

    pub fn item_name(&self) -> &str {
        &self.record.item_name
    }

    pub fn location(&self) -> &str {
        &self.record.location
    }

    pub fn server_id(&self) -> Option<&str> {
        self.record.server_id.as_deref()
    }
}

/// Price band for one menu item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub mean: f64,
    pub stddev: f64,
    pub lower: f64,
    pub upper: f64,
}

impl PriceBand {
    pub fn from_prices(prices: &[f64]) -> Self {
        let mean = mean(prices);
        let stddev = stddev(prices, mean);
        Self {
            mean,
            stddev,
            lower: mean - ANOMALY_SIGMAS * stddev,
            upper: mean + ANOMALY_SIGMAS * stddev,
        }
    }

    /// Strictly outside `[lower, upper]`.
    pub fn is_anomalous(&self, price: f64) -> bool {
        price > self.upper || price < self.lower
    }
}

/// Computes the price band of every distinct item name in `rows`.
pub fn price_bands(rows: &[Transaction]) -> HashMap<&str, PriceBand> {
    let mut prices: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in rows {
        prices.entry(&row.item_name).or_default().push(row.price);
    }

    prices
        .into_iter()
        .map(|(item, series)| (item, PriceBand::from_prices(&series)))
        .collect()
}

/// Owns a preprocessed copy of a transaction table and answers
/// aggregate queries over it.
///
/// Price bands are computed once, in [`PosAnalyzer::new`]. The table is
/// only exposed read-only, so flags always agree with the rows they were
/// computed from.
#[derive(Debug, Clone)]
pub struct PosAnalyzer {
    rows: Vec<EnrichedTransaction>,
}

impl PosAnalyzer {
    /// Preprocesses a copy of `raw`; the caller's records are left untouched.
    #[tracing::instrument(skip_all, fields(rows = raw.len()))]
    pub fn new(raw: &[Transaction]) -> Self {
        info!("Preprocessing data...");

        let bands = price_bands(raw);

        let rows: Vec<EnrichedTransaction> = raw
            .iter()
            .map(|record| {
                let band = bands[record.item_name.as_str()];
                EnrichedTransaction {
                    payment_type: record
                        .payment_type
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_PAYMENT.to_string()),
                    date: record.timestamp.date(),
                    hour: record.timestamp.hour(),
                    day_of_week: record.timestamp.weekday(),
                    lower_bound: band.lower,
                    upper_bound: band.upper,
                    price_anomaly: band.is_anomalous(record.price),
                    record: record.clone(),
                }
            })
            .collect();

        let anomalies = rows.iter().filter(|r| r.price_anomaly).count();
        info!(anomalies, "Preprocessing complete.");

        Self { rows }
    }

    pub fn rows(&self) -> &[EnrichedTransaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    pub(crate) fn txn(
        ts: &str,
        location: &str,
        server: Option<&str>,
        item: &str,
        category: &str,
        price: f64,
        payment: Option<&str>,
    ) -> Transaction {
        Transaction {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            location: location.to_string(),
            server_id: server.map(str::to_string),
            table_number: Some("T1".to_string()),
            item_name: item.to_string(),
            item_category: category.to_string(),
            price,
            payment_type: payment.map(str::to_string),
        }
    }

    fn burgers_with_outlier() -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = (0..20)
            .map(|i| {
                txn(
                    &format!("2024-01-01 12:{:02}:00", i),
                    "Downtown",
                    Some("S001"),
                    "Burger",
                    "Main",
                    12.99,
                    Some("CREDIT"),
                )
            })
            .collect();
        rows.push(txn(
            "2024-01-01 13:00:00",
            "Downtown",
            Some("S001"),
            "Burger",
            "Main",
            129.9,
            None,
        ));
        rows
    }

    #[test]
    fn test_derived_calendar_fields() {
        let rows = vec![txn(
            "2024-01-06 17:42:00",
            "Mall",
            None,
            "Soda",
            "Beverage",
            2.99,
            Some("CASH"),
        )];
        let analyzer = PosAnalyzer::new(&rows);
        let row = &analyzer.rows()[0];

        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(row.hour, 17);
        assert_eq!(row.day_of_week, Weekday::Sat);
    }

    #[test]
    fn test_missing_payment_becomes_unknown() {
        let analyzer = PosAnalyzer::new(&burgers_with_outlier());
        assert!(analyzer.rows().iter().all(|r| !r.payment_type.is_empty()));
        assert_eq!(analyzer.rows()[20].payment_type, UNKNOWN_PAYMENT);
        assert_eq!(analyzer.rows()[0].payment_type, "CREDIT");
    }

    #[test]
    fn test_outlier_is_flagged() {
        let analyzer = PosAnalyzer::new(&burgers_with_outlier());
        let flagged: Vec<_> = analyzer.rows().iter().filter(|r| r.price_anomaly).collect();

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].price(), 129.9);
    }

    #[test]
    fn test_single_occurrence_never_flagged() {
        let rows = vec![
            txn("2024-01-01 12:00:00", "Mall", None, "Wine", "Alcohol", 79.9, None),
            txn("2024-01-01 12:00:00", "Mall", None, "Soda", "Beverage", 2.99, None),
        ];
        let analyzer = PosAnalyzer::new(&rows);
        let wine = &analyzer.rows()[0];

        assert!(!wine.price_anomaly);
        assert_eq!(wine.lower_bound, 79.9);
        assert_eq!(wine.upper_bound, 79.9);
    }

    #[test]
    fn test_flags_match_recomputed_bands() {
        let mut rows = burgers_with_outlier();
        rows.push(txn("2024-01-02 11:00:00", "Mall", None, "Soda", "Beverage", 2.99, None));
        rows.push(txn("2024-01-02 11:00:00", "Mall", None, "Soda", "Beverage", 0.29, None));

        let analyzer = PosAnalyzer::new(&rows);
        for row in analyzer.rows() {
            let prices: Vec<f64> = rows
                .iter()
                .filter(|r| r.item_name == row.item_name())
                .map(|r| r.price)
                .collect();
            let band = PriceBand::from_prices(&prices);
            assert_eq!(row.price_anomaly, band.is_anomalous(row.price()));
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let rows = burgers_with_outlier();
        let before = rows.clone();
        let _ = PosAnalyzer::new(&rows);
        assert_eq!(rows, before);
    }
}
