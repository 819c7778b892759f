//! The raw POS transaction record as it arrives from a file or a query.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AnalysisError, Result};

/// Columns every source must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "timestamp",
    "location",
    "server_id",
    "table_number",
    "item_name",
    "item_category",
    "price",
    "payment_type",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line item rung up at a POS terminal.
///
/// Rows are identified by position only; exact duplicates are legal and
/// do occur in real exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: NaiveDateTime,
    pub location: String,
    pub server_id: Option<String>,
    pub table_number: Option<String>,
    pub item_name: String,
    pub item_category: String,
    pub price: f64,
    pub payment_type: Option<String>,
}

/// Returns the required columns absent from `columns`, in canonical order.
pub fn missing_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.as_ref().trim() == **required))
        .map(|c| c.to_string())
        .collect()
}

/// Parses the timestamp layouts seen in POS exports.
///
/// Offsets are normalised to UTC and dropped; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_utc());
    }

    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(ts.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AnalysisError::Timestamp(raw.to_string()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-01-05 13:45:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-05T13:45:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-05 13:45").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-05 13:45:00.000").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-05T14:45:00+01:00").unwrap(), expected);
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let ts = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(AnalysisError::Timestamp(_))
        ));
    }

    #[test]
    fn test_missing_columns_in_canonical_order() {
        let columns = ["location", "timestamp", "item_name", "price", "extra"];
        assert_eq!(
            missing_columns(&columns),
            vec!["server_id", "table_number", "item_category", "payment_type"]
        );
    }

    #[test]
    fn test_csv_empty_optionals_are_none() {
        let data = "\
timestamp,location,server_id,table_number,item_name,item_category,price,payment_type
2024-01-01 11:05:00,Downtown,,T4,Soda,Beverage,2.99,
";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let record: Transaction = rdr.deserialize().next().unwrap().unwrap();

        assert_eq!(record.server_id, None);
        assert_eq!(record.table_number.as_deref(), Some("T4"));
        assert_eq!(record.payment_type, None);
        assert_eq!(record.price, 2.99);
    }
}
