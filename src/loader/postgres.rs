use super::{DbConfig, TransactionSource};
use crate::error::{AnalysisError, Result};
use crate::record::{Transaction, missing_columns, parse_timestamp};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, Connection, Executor, PgConnection, Row, Statement};
use tracing::debug;

/// Runs a caller-supplied query against PostgreSQL.
///
/// A new connection is opened for every load and closed afterwards.
pub struct PostgresSource {
    config: DbConfig,
    query: String,
}

impl PostgresSource {
    pub fn new(config: DbConfig, query: &str) -> Self {
        Self {
            config,
            query: expand_query(query),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl TransactionSource for PostgresSource {
    async fn load(&self) -> Result<Vec<Transaction>> {
        debug!(host = %self.config.host, database = %self.config.database, "Connecting");
        let mut conn = PgConnection::connect(&self.config.connection_string()).await?;

        // preparing reports the result columns without fetching any rows
        let statement = (&mut conn).prepare(&self.query).await?;
        let columns: Vec<&str> = statement.columns().iter().map(|c| c.name()).collect();
        check_columns(&columns)?;

        let rows = sqlx::query(&cast_columns(&self.query))
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        rows.iter().map(decode_row).collect()
    }
}

fn check_columns(columns: &[&str]) -> Result<()> {
    let missing = missing_columns(columns);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::Schema { missing })
    }
}

/// Wraps `query` so the server hands back prices as `float8` and the
/// identifier columns as `text`, whatever their stored types.
pub(crate) fn cast_columns(query: &str) -> String {
    format!(
        "SELECT \"timestamp\", location::text AS location, \
         server_id::text AS server_id, table_number::text AS table_number, \
         item_name::text AS item_name, item_category::text AS item_category, \
         price::float8 AS price, payment_type::text AS payment_type \
         FROM ({}) AS pos_source",
        query
    )
}

/// A bare identifier is shorthand for selecting the whole table.
pub(crate) fn expand_query(query: &str) -> String {
    let trimmed = query.trim();
    let is_identifier = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if is_identifier {
        format!("SELECT * FROM {trimmed}")
    } else {
        trimmed.trim_end_matches(';').trim_end().to_string()
    }
}

fn decode_row(row: &PgRow) -> Result<Transaction> {
    Ok(Transaction {
        timestamp: decode_timestamp(row)?,
        location: decode_text(row, "location")?,
        server_id: decode_optional_text(row, "server_id")?,
        table_number: decode_optional_text(row, "table_number")?,
        item_name: decode_text(row, "item_name")?,
        item_category: decode_text(row, "item_category")?,
        price: decode_price(row)?,
        payment_type: decode_optional_text(row, "payment_type")?,
    })
}

fn value_error(column: &str, message: impl ToString) -> AnalysisError {
    AnalysisError::Value {
        column: column.to_string(),
        message: message.to_string(),
    }
}

fn decode_timestamp(row: &PgRow) -> Result<NaiveDateTime> {
    if let Ok(ts) = row.try_get::<NaiveDateTime, _>("timestamp") {
        return Ok(ts);
    }
    if let Ok(ts) = row.try_get::<DateTime<Utc>, _>("timestamp") {
        return Ok(ts.naive_utc());
    }
    if let Ok(Some(date)) = row
        .try_get::<NaiveDate, _>("timestamp")
        .map(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(date);
    }
    let raw: String = row
        .try_get("timestamp")
        .map_err(|e| value_error("timestamp", e))?;
    parse_timestamp(&raw)
}

fn decode_price(row: &PgRow) -> Result<f64> {
    row.try_get("price").map_err(|e| value_error("price", e))
}

fn decode_text(row: &PgRow, column: &str) -> Result<String> {
    row.try_get(column).map_err(|e| value_error(column, e))
}

fn decode_optional_text(row: &PgRow, column: &str) -> Result<Option<String>> {
    row.try_get(column).map_err(|e| value_error(column, e))
}
