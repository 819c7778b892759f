//! Error types shared by the loader, analyzers and chart renderers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can abort an analysis run. None of these are retried.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A database connection parameter is missing from the environment.
    #[error("Missing required environment variables: {}", missing.join(", "))]
    Config { missing: Vec<String> },

    /// The loaded data lacks one or more required columns.
    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("Invalid value in column '{column}': {message}")]
    Value { column: String, message: String },

    #[error("Plot error: {0}")]
    Plot(#[from] crate::charts::PlotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = AnalysisError::Schema {
            missing: vec!["price".to_string(), "payment_type".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required columns: price, payment_type"
        );
    }

    #[test]
    fn test_config_error_lists_variables() {
        let err = AnalysisError::Config {
            missing: vec!["DB_HOST".to_string()],
        };
        assert!(err.to_string().contains("DB_HOST"));
    }
}
