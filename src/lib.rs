pub mod analyzers;
pub mod charts;
pub mod error;
pub mod generate;
pub mod loader;
pub mod output;
pub mod record;
