//! Preprocessing and aggregation of POS transactions.
//!
//! [`PosAnalyzer`] takes a private copy of the loaded records, attaches
//! calendar fields and per-item price bands, and exposes every summary as
//! a method returning freshly allocated rows.

pub mod aggregate;
pub mod heatmap;
pub mod preprocess;
pub mod report;
pub mod types;
pub mod utility;
pub mod weekday;

pub use aggregate::DEFAULT_MIN_TRANSACTIONS;
pub use preprocess::{EnrichedTransaction, PosAnalyzer, UNKNOWN_PAYMENT};
pub use report::export_report;
