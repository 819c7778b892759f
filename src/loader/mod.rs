//! Loading POS transactions from CSV files or a PostgreSQL query.
//!
//! [`TransactionSource`] is the seam both backends implement.
//! [`load_transactions`] is the entry point the CLI uses: it picks the
//! backend for a [`Source`], logs the outcome and passes any failure
//! through unchanged.

mod config;
mod csv_file;
mod postgres;

pub use config::DbConfig;
pub use csv_file::CsvSource;
pub use postgres::PostgresSource;

use crate::error::Result;
use crate::record::Transaction;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{error, info};

/// Anything that can produce a validated list of transactions.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Transaction>>;
}

/// Where to read transactions from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A delimited text file, optionally gzip-compressed.
    File(PathBuf),
    /// A SQL query, or a bare table name.
    Query(String),
}

impl Source {
    /// Interprets `descriptor` as a query when `from_database` is set and as
    /// a file path otherwise.
    pub fn new(descriptor: &str, from_database: bool) -> Self {
        if from_database {
            Source::Query(descriptor.to_string())
        } else {
            Source::File(PathBuf::from(descriptor))
        }
    }
}

/// Loads transactions from `source`, logging the row count on success and
/// the error on failure.
#[tracing::instrument(skip_all, fields(source = ?source))]
pub async fn load_transactions(source: &Source) -> Result<Vec<Transaction>> {
    let result = match source {
        Source::File(path) => CsvSource::new(path.clone()).load().await,
        Source::Query(query) => match DbConfig::from_env() {
            Ok(config) => PostgresSource::new(config, query).load().await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(rows) => {
            info!(rows = rows.len(), "Successfully loaded records");
            Ok(rows)
        }
        Err(e) => {
            error!(error = %e, "Error loading data");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_flag() {
        assert_eq!(
            Source::new("data.csv", false),
            Source::File(PathBuf::from("data.csv"))
        );
        assert_eq!(
            Source::new("SELECT * FROM pos", true),
            Source::Query("SELECT * FROM pos".to_string())
        );
    }
}
