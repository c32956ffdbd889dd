//! CLI entry point for the accident heatmap tool.
//!
//! Loads accident records from a CSV (or generates mock ones), buckets them
//! by month and writes an animated density heatmap as a standalone HTML page.

use accident_heatmap::{
    bucket::bucket_by_month,
    loader::{CsvSettings, PointRecord, SyntheticSettings, generate_synthetic, load_csv},
    output::{log_frame_counts, print_json, write_frame_counts},
    render::{ChartStyle, PlotlyJs, RenderTarget, render_heatmap},
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "accident_heatmap")]
#[command(about = "Animated monthly heatmap of traffic accidents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a heatmap from an accident CSV file or URL
    Csv {
        /// Path or URL of the CSV (gzip accepted)
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[command(flatten)]
        columns: CsvArgs,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Render a heatmap from randomly generated accidents
    Synthetic {
        /// First day of the generated range
        #[arg(long, default_value = "2016-01-01")]
        start: NaiveDate,

        /// Day after the last generated day
        #[arg(long, default_value = "2020-12-31")]
        end: NaiveDate,

        /// Number of records to generate
        #[arg(short = 'n', long, default_value_t = 60_000)]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Load and bucket a CSV, then log the frames without rendering
    Frames {
        /// Path or URL of the CSV (gzip accepted)
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[command(flatten)]
        columns: CsvArgs,

        /// Optional: write per-frame row counts to this CSV
        #[arg(long)]
        frame_counts: Option<String>,
    },
}

#[derive(Args)]
struct CsvArgs {
    /// Latitude column
    #[arg(long, default_value = "Lat")]
    lat_column: String,

    /// Longitude column
    #[arg(long, default_value = "Lng")]
    lng_column: String,

    /// Timestamp column
    #[arg(long, default_value = "Start_Time")]
    time_column: String,

    /// Severity column, used if present in the file
    #[arg(long, default_value = "Severity")]
    severity_column: String,

    /// Drop accidents below this severity
    #[arg(long)]
    min_severity: Option<u8>,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// First year kept (inclusive)
    #[arg(long, default_value_t = 2016)]
    start_year: i32,

    /// Last year kept (inclusive)
    #[arg(long, default_value_t = 2023)]
    end_year: i32,
}

impl CsvArgs {
    fn into_settings(self) -> Result<CsvSettings> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("delimiter '{}' is not a single ASCII byte", self.delimiter))?;

        Ok(CsvSettings {
            lat_column: self.lat_column,
            lng_column: self.lng_column,
            time_column: self.time_column,
            severity_column: Some(self.severity_column),
            min_severity: self.min_severity,
            delimiter,
            start_year: self.start_year,
            end_year: self.end_year,
        })
    }
}

#[derive(Args)]
struct RenderArgs {
    /// HTML file to write
    #[arg(short, long, default_value = "us_accidents_monthly_heatmap.html")]
    output: String,

    /// Optional: JSON file overriding chart style defaults
    #[arg(long)]
    style: Option<String>,

    /// Load plotly.js from the public CDN instead of embedding it in the page
    #[arg(long)]
    cdn: bool,

    /// Optional: write per-frame row counts to this CSV
    #[arg(long)]
    frame_counts: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/accident_heatmap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("accident_heatmap.log"));

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

    match cli.command {
        Commands::Csv {
            source,
            columns,
            render,
        } => {
            let settings = columns.into_settings()?;
            let records = load_csv(&source, &settings)
                .with_context(|| format!("failed to load accidents from {}", source))?;
            render_records(records, &render)?;
        }
        Commands::Synthetic {
            start,
            end,
            count,
            seed,
            render,
        } => {
            let settings = SyntheticSettings {
                start,
                end,
                count,
                seed,
            };
            let records = generate_synthetic(&settings)?;
            render_records(records, &render)?;
        }
        Commands::Frames {
            source,
            columns,
            frame_counts,
        } => {
            let settings = columns.into_settings()?;
            let records = load_csv(&source, &settings)
                .with_context(|| format!("failed to load accidents from {}", source))?;
            let table = bucket_by_month(records);
            let counts = table.frame_counts();

            log_frame_counts(&counts);
            print_json(&counts)?;
            if let Some(path) = frame_counts {
                write_frame_counts(&path, &counts)?;
            }
        }
    }

    Ok(())
}

/// Buckets `records` by month and writes the animated heatmap described by `args`.
#[tracing::instrument(skip(records, args), fields(records = records.len(), output = %args.output))]
fn render_records(records: Vec<PointRecord>, args: &RenderArgs) -> Result<()> {
    let style = match &args.style {
        Some(path) => ChartStyle::load(path)
            .with_context(|| format!("failed to load chart style from {}", path))?,
        None => ChartStyle::default(),
    };

    let table = bucket_by_month(records);
    if let (Some(first), Some(last)) = (table.frames.first(), table.frames.last()) {
        info!(frames = table.frames.len(), first = %first, last = %last, "Frames bucketed");
    }

    let target = RenderTarget {
        output: args.output.clone(),
        plotly_js: PlotlyJs::from_cdn_flag(args.cdn),
        frame_counts: args.frame_counts.clone(),
    };
    render_heatmap(&table, &style, &target)
        .context("cannot render heatmap")?;

    info!(output = %args.output, "Successfully generated interactive monthly heatmap");
    Ok(())
}
