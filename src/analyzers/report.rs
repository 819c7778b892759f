use crate::analyzers::aggregate::DEFAULT_MIN_TRANSACTIONS;
use crate::analyzers::preprocess::PosAnalyzer;
use crate::analyzers::types::{BasicStats, Report};
use crate::analyzers::utility::round2;
use crate::error::Result;
use crate::output::{ExportFormat, write_table};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

impl PosAnalyzer {
    /// Headline numbers for the whole table.
    pub fn basic_stats(&self) -> BasicStats {
        let rows = self.rows();

        let date_range = rows
            .iter()
            .map(|r| r.date)
            .min()
            .zip(rows.iter().map(|r| r.date).max());

        BasicStats {
            date_range,
            total_sales: round2(rows.iter().map(|r| r.price()).sum()),
            total_transactions: rows.len(),
            unique_locations: rows.iter().map(|r| r.location()).collect::<HashSet<_>>().len(),
            unique_servers: rows
                .iter()
                .filter_map(|r| r.server_id())
                .collect::<HashSet<_>>()
                .len(),
            price_anomalies: rows.iter().filter(|r| r.price_anomaly).count(),
        }
    }

    /// Runs every aggregator with default parameters.
    pub fn report(&self) -> Report {
        self.report_with_threshold(DEFAULT_MIN_TRANSACTIONS)
    }

    /// Runs every aggregator, keeping servers with at least
    /// `min_transactions` rows.
    pub fn report_with_threshold(&self, min_transactions: usize) -> Report {
        Report {
            basic_stats: self.basic_stats(),
            daily_trends: self.daily_trends(),
            hourly_patterns: self.hourly_patterns(),
            server_performance: self.server_performance(min_transactions),
            menu_performance: self.menu_performance(),
            location_performance: self.location_performance(),
            payment_analysis: self.payment_types(),
        }
    }

    /// Builds the full report and, when `output_dir` is given, writes each
    /// table to `<output_dir>/<section>.csv`.
    pub fn generate_report(&self, output_dir: Option<&Path>) -> Result<Report> {
        let report = self.report();
        if let Some(dir) = output_dir {
            export_report(&report, dir, ExportFormat::Csv)?;
        }
        Ok(report)
    }
}

/// Writes every tabular section of `report` into `dir`, creating it if
/// needed. Basic stats are not written.
///
/// Sections are written one after another; if one fails the error is
/// returned and files already written stay in place.
#[tracing::instrument(skip(report, dir), fields(dir = %dir.display()))]
pub fn export_report(report: &Report, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let path = |section: &str| dir.join(format!("{section}.{}", format.extension()));
    let mut written = Vec::new();

    macro_rules! export {
        ($section:expr, $rows:expr) => {
            let target = path($section);
            write_table(&target, $rows, format)?;
            written.push(target);
        };
    }

    export!("daily_trends", &report.daily_trends);
    export!("hourly_patterns", &report.hourly_patterns);
    export!("server_performance", &report.server_performance);
    export!("menu_performance_items", &report.menu_performance.items);
    export!("menu_performance_categories", &report.menu_performance.categories);
    export!("location_performance", &report.location_performance);
    export!("payment_analysis", &report.payment_analysis);

    info!(files = written.len(), "Report exported");
    Ok(written)
}
