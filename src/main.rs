//! CLI entry point for the hotel booking analysis.
//!
//! Runs with no arguments: every option has a default, and a JSON config
//! file can replace the defaults before individual flags override them.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use hotel_booking_analysis::analyzers::MonthlyPolicy;
use hotel_booking_analysis::charts::{ChartSink, FileChartSink, NoopChartSink};
use hotel_booking_analysis::config::AnalysisConfig;
use hotel_booking_analysis::pipeline::{AnalysisSummary, run, write_summary};
use hotel_booking_analysis::report::Reporter;
use hotel_booking_analysis::schema;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMonthlyPolicy {
    /// Average per month name across the years covered
    Average,
    /// Count per calendar month over the actual date range
    Chronological,
}

impl From<CliMonthlyPolicy> for MonthlyPolicy {
    fn from(cli: CliMonthlyPolicy) -> Self {
        match cli {
            CliMonthlyPolicy::Average => MonthlyPolicy::AverageAcrossYears,
            CliMonthlyPolicy::Chronological => MonthlyPolicy::Chronological,
        }
    }
}

#[derive(Parser)]
#[command(name = "hotel_booking_analysis")]
#[command(about = "Cancellation and seasonality analysis of hotel bookings", long_about = None)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bookings table to analyze
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Field delimiter of the input table
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Directory to write chart files to
    #[arg(long, value_name = "DIR")]
    chart_dir: Option<PathBuf>,

    /// Skip chart output
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// How monthly booking volume is computed
    #[arg(short, long, value_enum)]
    monthly_policy: Option<CliMonthlyPolicy>,

    /// Group cancellation rates by customer type and hotel
    #[arg(long, default_value_t = false)]
    group_by_hotel: bool,

    /// Rows shown in the table preview
    #[arg(long)]
    head_rows: Option<usize>,

    /// Columns shown before eliding (0 = all)
    #[arg(long)]
    max_columns: Option<usize>,

    /// Write a JSON summary of the run to this file
    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(dir) = self.chart_dir {
            config.chart_dir = Some(dir);
        }
        if self.no_charts {
            config.chart_dir = None;
        }
        if let Some(policy) = self.monthly_policy {
            config.monthly_policy = policy.into();
        }
        if self.group_by_hotel {
            config.group_by = vec![schema::CUSTOMER_TYPE.to_string(), schema::HOTEL.to_string()];
        }
        if let Some(rows) = self.head_rows {
            config.head_rows = rows;
        }
        if let Some(max_columns) = self.max_columns {
            config.display.max_columns = max_columns;
        }
        if let Some(path) = self.summary_json {
            config.summary_json = Some(path);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file; stdout carries the report
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/hotel_booking_analysis.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hotel_booking_analysis.log"));

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

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };
    info!(input = %config.input.display(), policy = ?config.monthly_policy, "Starting analysis");

    let summary = match execute(&config) {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Analysis failed");
            return Err(e.into());
        }
    };

    info!(
        rows = summary.cleaned_shape.0,
        rate = summary.overall_cancellation_rate,
        "Analysis finished"
    );
    Ok(())
}

/// Runs the analysis with stdout as the report and the configured chart
/// sink, then writes the optional summary.
fn execute(config: &AnalysisConfig) -> hotel_booking_analysis::Result<AnalysisSummary> {
    let mut charts: Box<dyn ChartSink> = match &config.chart_dir {
        Some(dir) => Box::new(FileChartSink::new(dir)?),
        None => Box::new(NoopChartSink),
    };

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock(), config.display);
    let summary = run(config, &mut reporter, charts.as_mut())?;

    if let Some(path) = &config.summary_json {
        write_summary(path, &summary)?;
    }
    Ok(summary)
}
