//! Stockview CLI
//!
//! Command-line interface for Stockview:
//! - List companies and the stored date range
//! - Print a field series or its summary statistics
//! - Compare up to five companies side by side
//! - Import a CSV file into the local store

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use stockview::client::{ApiClient, ClientError, Comparison, SeriesRequest};
use stockview::config::Config;
use stockview::import::CsvImporter;
use stockview::query::{FieldMetrics, SeriesPoint};
use stockview::storage::{PriceField, RecordStore, SqliteStore};

#[derive(Parser)]
#[command(name = "stockview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stock price analytics over a historical daily price dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:3000", global = true)]
    pub api_url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub timeout: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Date window shared by the series-style commands
#[derive(clap::Args)]
pub struct Window {
    /// First day, inclusive (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS")
    #[arg(short, long)]
    start: Option<String>,
    /// Last day, inclusive (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS")
    #[arg(short, long)]
    end: Option<String>,
}

impl Window {
    fn request(&self) -> SeriesRequest {
        SeriesRequest {
            company: None,
            start_date: self.start.clone(),
            end_date: self.end.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all companies
    Companies,

    /// Show the earliest and latest stored day
    DateRange,

    /// Print a field series
    Series {
        /// Field (Open, High, Low, Close, Volume)
        field: PriceField,
        /// Company (default: all)
        #[arg(short, long)]
        company: Option<String>,
        #[command(flatten)]
        window: Window,
    },

    /// Print summary statistics of a field
    Metrics {
        /// Field (Open, High, Low, Close, Volume)
        field: PriceField,
        /// Company (default: all)
        #[arg(short, long)]
        company: Option<String>,
        #[command(flatten)]
        window: Window,
    },

    /// Compare a field across up to five companies
    Compare {
        /// Field (Open, High, Low, Close, Volume)
        field: PriceField,
        /// Companies (comma-separated or multiple args)
        #[arg(required = true)]
        companies: Vec<String>,
        /// Print every series point instead of summary statistics
        #[arg(long)]
        series: bool,
        #[command(flatten)]
        window: Window,
    },

    /// Import a CSV file into the local SQLite store
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Database file (default: configured store path)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Company for rows without a Company column
        #[arg(long)]
        company: Option<String>,
        /// Parse only, don't write to the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Import {
            path,
            db,
            company,
            dry_run,
        } => return import(path, db.clone(), company.clone(), *dry_run).await,
        Commands::Config { output } => return write_config(output.as_deref()),
        _ => {}
    }

    let client = ApiClient::new(&cli.api_url, Duration::from_secs(cli.timeout))?;

    let result = run(&cli, &client).await;
    if let Err(e) = result {
        match e.downcast_ref::<ClientError>() {
            Some(ClientError::Http(http)) if http.is_connect() => {
                eprintln!("Cannot connect to Stockview API at {}", client.base_url());
                eprintln!("Error: {}", http);
                eprintln!();
                eprintln!("Make sure the Stockview API server is running:");
                eprintln!("  cargo run --bin stockview-api");
            }
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli, client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.format == OutputFormat::Json;

    match &cli.command {
        Commands::Companies => {
            let companies = client.companies().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&companies)?);
            } else if companies.is_empty() {
                println!("No companies stored yet.");
            } else {
                for company in companies {
                    println!("{}", company);
                }
            }
        }

        Commands::DateRange => {
            let range = client.date_range().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&range)?);
            } else {
                println!("{} .. {}", range.min_date, range.max_date);
            }
        }

        Commands::Series {
            field,
            company,
            window,
        } => {
            let mut request = window.request();
            request.company = company.clone();

            let points = client.series(*field, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                print_series(*field, &points);
            }
        }

        Commands::Metrics {
            field,
            company,
            window,
        } => {
            let mut request = window.request();
            request.company = company.clone();

            let metrics = client.metrics(*field, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics_header();
                print_metrics_row(company.as_deref().unwrap_or("(all)"), &metrics);
            }
        }

        Commands::Compare {
            field,
            companies,
            series,
            window,
        } => {
            // Flatten companies (support comma-separated)
            let companies: Vec<String> = companies
                .iter()
                .flat_map(|c| c.split(',').map(|s| s.trim().to_string()))
                .collect();

            if *series {
                let comparison = client
                    .compare_series(*field, &companies, &window.request())
                    .await?;
                if json {
                    print_comparison_json(&comparison)?;
                } else {
                    for (company, points) in &comparison.results {
                        println!("== {} ==", company);
                        print_series(*field, points);
                        println!();
                    }
                    print_skipped(&comparison);
                }
            } else {
                let comparison = client
                    .compare_metrics(*field, &companies, &window.request())
                    .await?;
                if json {
                    print_comparison_json(&comparison)?;
                } else {
                    print_metrics_header();
                    for (company, metrics) in &comparison.results {
                        print_metrics_row(company, metrics);
                    }
                    print_skipped(&comparison);
                }
            }
        }

        Commands::Import { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

async fn import(
    path: &Path,
    db: Option<PathBuf>,
    company: Option<String>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        eprintln!("File not found: {:?}", path);
        std::process::exit(1);
    }

    let mut importer = CsvImporter::new();
    if let Some(company) = company {
        importer = importer.with_default_company(company);
    }

    let result = importer.read_path(path)?;

    println!("Import results:");
    println!("  Rows processed: {}", result.rows_processed);
    println!("  Rows failed: {}", result.rows_failed);

    if !result.errors.is_empty() {
        println!();
        println!("Errors (first 10):");
        for error in result.errors.iter().take(10) {
            println!("  {}", error);
        }
    }

    if dry_run {
        println!();
        println!("(Dry run - no data was imported)");
        return Ok(());
    }

    if result.records.is_empty() {
        return Ok(());
    }

    let db = db.unwrap_or_else(|| PathBuf::from(Config::load_default().store.path));
    let store = SqliteStore::open(&db)?;
    let inserted = store.insert_many(result.records).await?;

    println!();
    println!("  Imported: {} records into {:?}", inserted, db);
    Ok(())
}

fn write_config(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = stockview::config::generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}

fn print_series(field: PriceField, points: &[SeriesPoint]) {
    println!("{:<28} {:<10} {:>16}", "Timestamp", "Company", field.as_str());
    println!("{}", "-".repeat(56));
    for point in points {
        println!(
            "{:<28} {:<10} {:>16.4}",
            point.timestamp, point.company, point.value
        );
    }
}

fn print_metrics_header() {
    println!(
        "{:<10} {:<8} {:>8} {:>14} {:>14} {:>14} {:>12}",
        "Company", "Field", "Count", "Avg", "Min", "Max", "StdDev"
    );
    println!("{}", "-".repeat(86));
}

fn print_metrics_row(company: &str, metrics: &FieldMetrics) {
    println!(
        "{:<10} {:<8} {:>8} {:>14.4} {:>14.4} {:>14.4} {:>12.4}",
        company,
        metrics.field,
        metrics.count,
        metrics.stats.avg,
        metrics.stats.min,
        metrics.stats.max,
        metrics.stats.std_dev
    );
}

fn print_comparison_json<T: serde::Serialize>(
    comparison: &Comparison<T>,
) -> Result<(), serde_json::Error> {
    let mut results = serde_json::Map::new();
    for (company, value) in &comparison.results {
        results.insert(company.clone(), serde_json::to_value(value)?);
    }

    let skipped: serde_json::Map<String, serde_json::Value> = comparison
        .skipped
        .iter()
        .map(|(company, reason)| (company.clone(), serde_json::Value::from(reason.as_str())))
        .collect();

    let body = serde_json::json!({ "results": results, "skipped": skipped });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_skipped<T>(comparison: &Comparison<T>) {
    for (company, reason) in &comparison.skipped {
        eprintln!("Skipped {}: {}", company, reason);
    }
}
