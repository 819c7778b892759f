//! CLI entry point for the POS analyzer.
//!
//! Provides subcommands for the full CSV report, the weekday/hour charts,
//! the location heatmap and synthetic data generation.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pos_analyzer::analyzers::{DEFAULT_MIN_TRANSACTIONS, PosAnalyzer, export_report};
use pos_analyzer::charts::{
    self, DEFAULT_OUTPUT_DIR, location_hour_heatmap_chart, trend_line_chart,
    weekday_hourly_line_chart, weekday_ticket_bar_chart,
};
use pos_analyzer::generate::{GeneratorConfig, generate_pos_data, missing_values, write_pos_data};
use pos_analyzer::loader::{Source, load_transactions};
use pos_analyzer::output::{
    ExportFormat, print_basic_stats, print_heatmap_sums, print_json, print_weekday_coverage,
    print_weekday_tickets,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "pos_analyzer")]
#[command(about = "Aggregate statistics and charts for restaurant POS data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// CSV file path, or a SQL query / table name with --from-db
    #[arg(value_name = "FILE_OR_QUERY")]
    source: String,

    /// Run SOURCE against the database configured by DB_* variables
    #[arg(long, default_value_t = false)]
    from_db: bool,
}

impl SourceArgs {
    fn source(&self) -> Source {
        Source::new(&self.source, self.from_db)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every summary table and optionally export them as CSV
    Report {
        #[command(flatten)]
        input: SourceArgs,

        /// Directory to write one CSV per report section into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Gzip-compress exported CSV files
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Minimum transactions for a server to be listed
        #[arg(long, default_value_t = DEFAULT_MIN_TRANSACTIONS)]
        min_transactions: usize,

        /// Print the whole report to stdout as JSON instead of the summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Bar chart of the average ticket per weekday
    WeekdayTickets {
        #[command(flatten)]
        input: SourceArgs,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Line chart of average hourly orders for each weekday
    WeekdayHourly {
        #[command(flatten)]
        input: SourceArgs,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Heatmap of average orders per location and hour
    Heatmap {
        #[command(flatten)]
        input: SourceArgs,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Line charts of total sales per date and per hour
    Trends {
        #[command(flatten)]
        input: SourceArgs,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Generate a synthetic POS dataset
    Generate {
        /// First day of generated data (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        start_date: NaiveDate,

        /// Number of consecutive days to generate
        #[arg(short, long, default_value_t = 90)]
        days: u32,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// CSV file to write
        #[arg(short, long, default_value = "restaurant_pos_data.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/pos_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("pos_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            input,
            output_dir,
            gzip,
            min_transactions,
            json,
        } => run_report(&input, output_dir.as_deref(), gzip, min_transactions, json).await,
        Commands::WeekdayTickets { input, output_dir } => {
            run_weekday_tickets(&input, &output_dir).await
        }
        Commands::WeekdayHourly { input, output_dir } => {
            run_weekday_hourly(&input, &output_dir).await
        }
        Commands::Heatmap { input, output_dir } => run_heatmap(&input, &output_dir).await,
        Commands::Trends { input, output_dir } => run_trends(&input, &output_dir).await,
        Commands::Generate {
            start_date,
            days,
            seed,
            output,
        } => run_generate(
            GeneratorConfig {
                start_date,
                days,
                seed,
            },
            &output,
        ),
    };

    if let Err(e) = &result {
        error!(error = %e, "Error during analysis");
    }
    result
}

/// Loads the source and preprocesses it.
async fn analyzer_for(input: &SourceArgs) -> Result<PosAnalyzer> {
    info!(source = %input.source, from_db = input.from_db, "Loading POS data");
    let records = load_transactions(&input.source()).await?;
    Ok(PosAnalyzer::new(&records))
}

#[tracing::instrument(skip(input), fields(source = %input.source))]
async fn run_report(
    input: &SourceArgs,
    output_dir: Option<&Path>,
    gzip: bool,
    min_transactions: usize,
    json: bool,
) -> Result<()> {
    let analyzer = analyzer_for(input).await?;
    let report = analyzer.report_with_threshold(min_transactions);

    if !json {
        print_basic_stats(&report.basic_stats);
    }

    if let Some(dir) = output_dir {
        let format = if gzip {
            ExportFormat::CsvGz
        } else {
            ExportFormat::Csv
        };
        let written = export_report(&report, dir, format)?;
        info!(dir = %dir.display(), files = written.len(), "Report saved");
    }

    if json {
        print_json(&report)?;
    }

    Ok(())
}

#[tracing::instrument(skip(input), fields(source = %input.source))]
async fn run_weekday_tickets(input: &SourceArgs, output_dir: &Path) -> Result<()> {
    let analyzer = analyzer_for(input).await?;

    info!("Creating daily average ticket analysis...");
    let tickets = analyzer.daily_average_by_weekday();
    print_weekday_tickets(&tickets);

    let path = charts::chart_path(output_dir, "daily_average_tickets.png")?;
    weekday_ticket_bar_chart(&tickets, &path)?;

    info!(path = %path.display(), "Analysis complete");
    Ok(())
}

#[tracing::instrument(skip(input), fields(source = %input.source))]
async fn run_weekday_hourly(input: &SourceArgs, output_dir: &Path) -> Result<()> {
    let analyzer = analyzer_for(input).await?;

    let volume = analyzer.hourly_volume_by_weekday();
    print_weekday_coverage(&analyzer.weekday_coverage());

    let path = charts::chart_path(output_dir, "weekday_hourly_volume.png")?;
    weekday_hourly_line_chart(&volume, &path)?;

    info!(path = %path.display(), "Analysis complete");
    Ok(())
}

#[tracing::instrument(skip(input), fields(source = %input.source))]
async fn run_heatmap(input: &SourceArgs, output_dir: &Path) -> Result<()> {
    let analyzer = analyzer_for(input).await?;

    let heatmap = analyzer.location_hour_heatmap();
    print_heatmap_sums(&heatmap);

    let path = charts::chart_path(output_dir, "location_hour_heatmap.png")?;
    location_hour_heatmap_chart(&heatmap, &path)?;

    info!(path = %path.display(), "Analysis complete");
    Ok(())
}

#[tracing::instrument(skip(input), fields(source = %input.source))]
async fn run_trends(input: &SourceArgs, output_dir: &Path) -> Result<()> {
    let analyzer = analyzer_for(input).await?;

    let daily: Vec<(String, f64)> = analyzer
        .daily_trends()
        .iter()
        .map(|d| (d.date.format("%Y-%m-%d").to_string(), d.total_sales))
        .collect();
    let path = charts::chart_path(output_dir, "daily_trends.png")?;
    trend_line_chart(&daily, "Daily Sales Trend", "Date", "Total Sales ($)", &path)?;
    info!(path = %path.display(), "Daily trend saved");

    let hourly: Vec<(String, f64)> = analyzer
        .hourly_patterns()
        .iter()
        .map(|h| (h.hour.to_string(), h.total_sales))
        .collect();
    let path = charts::chart_path(output_dir, "hourly_patterns.png")?;
    trend_line_chart(
        &hourly,
        "Hourly Sales Pattern",
        "Hour of Day",
        "Total Sales ($)",
        &path,
    )?;
    info!(path = %path.display(), "Hourly pattern saved");

    Ok(())
}

#[tracing::instrument(skip(config), fields(days = config.days, seed = config.seed))]
fn run_generate(config: GeneratorConfig, output: &Path) -> Result<()> {
    let records = generate_pos_data(&config)?;
    write_pos_data(&records, output)?;

    let missing = missing_values(&records);
    info!(
        rows = records.len(),
        missing_server_id = missing.server_id,
        missing_table_number = missing.table_number,
        missing_payment_type = missing.payment_type,
        path = %output.display(),
        "Synthetic data written"
    );
    Ok(())
}
