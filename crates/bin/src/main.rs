//! dartlens CLI binary.
//!
//! Computes multi-year financial ratios from DART filings and writes an
//! LLM-assisted risk summary.

mod integration;

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dartlens::{CompanyName, default_years, default_years_now};
use dartlens_data::dart::DartClient;
use dartlens_output::{
    CsvOptions, ExportError, ExportFormat, Exporter, company_dir, render_ascii, render_markdown,
    sanitize_filename, series_to_csv,
};
use dartlens_ratios::{AggregateReport, CanonicalAccount, RatioTimeSeries};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager::{self, print_cache_info};
use integration::config::AppConfig;
use integration::data_pipeline::{FetchConfig, compute_ratio_report, resolve_corp, search_corps};
use integration::risk_pipeline::{self, RiskSources};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Registry matches shown by `corp`.
const CORP_SEARCH_LIMIT: usize = 20;

/// Years of news and filings read for the risk summary.
const RISK_LOOKBACK_YEARS: i32 = 5;

/// Most fiscal years accepted by `--years`.
const MAX_YEAR_COUNT: u32 = 30;

#[derive(Parser)]
#[command(name = "dartlens")]
#[command(about = "Financial ratios and risk summaries from DART filings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute ratios, export them and write a risk summary
    Analyze {
        /// Company name exactly as registered with DART
        company: String,

        /// Number of fiscal years
        #[arg(
            long,
            default_value = "5",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_YEAR_COUNT))
        )]
        years: u32,

        /// Last fiscal year (defaults to last year)
        #[arg(long)]
        end_year: Option<i32>,

        /// Output root directory
        #[arg(long, default_value = "results")]
        output: PathBuf,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// Skip the LLM risk summary
        #[arg(long)]
        skip_risk: bool,

        /// Ratio file format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Print the ratio table for a company
    Ratios {
        /// Company name exactly as registered with DART
        company: String,

        /// Number of fiscal years
        #[arg(
            long,
            default_value = "5",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_YEAR_COUNT))
        )]
        years: u32,

        /// Last fiscal year (defaults to last year)
        #[arg(long)]
        end_year: Option<i32>,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// Output format (table, markdown, csv or json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Search the DART corp-code registry
    Corp {
        /// Part of a company name
        query: String,
    },

    /// Inspect or clear the local cache
    Cache {
        /// Show cache statistics
        #[arg(long)]
        stats: bool,

        /// Remove every cached entry
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let app = AppConfig::from_env();

    match cli.command {
        Commands::Analyze {
            company,
            years,
            end_year,
            output,
            no_cache,
            refresh,
            skip_risk,
            format,
        } => {
            let request = AnalyzeRequest {
                company: CompanyName::parse(&company)?,
                years: requested_years(years, end_year)?,
                output,
                format: ExportFormat::from_name(&format)?,
                fetch: FetchConfig {
                    use_cache: !no_cache,
                    force_refresh: refresh,
                },
                skip_risk,
            };
            analyze_company(&app, request).await?;
        }
        Commands::Ratios {
            company,
            years,
            end_year,
            no_cache,
            refresh,
            format,
        } => {
            let company = CompanyName::parse(&company)?;
            let years = requested_years(years, end_year)?;
            let fetch = FetchConfig {
                use_cache: !no_cache,
                force_refresh: refresh,
            };
            print_ratios(&app, &company, &years, &fetch, &format).await?;
        }
        Commands::Corp { query } => {
            search_registry(&app, &query).await?;
        }
        Commands::Cache { stats, clear } => {
            manage_cache(stats, clear)?;
        }
    }

    Ok(())
}

fn requested_years(count: u32, end_year: Option<i32>) -> Result<Vec<i32>, dartlens::InputError> {
    match end_year {
        Some(end) if count > 0 => {
            let end_exclusive = end.checked_add(1).ok_or(dartlens::InputError::YearOutOfRange)?;
            default_years(end_exclusive, count)
        }
        _ => default_years_now(count),
    }
}

/// The ratio file written by `analyze`. CSV is laid out for spreadsheets.
fn ratio_artifact(series: &RatioTimeSeries, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => series_to_csv(series, &CsvOptions::spreadsheet()),
        other => series.export_to_string(other),
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

fn statement_bar() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Resolve the company and compute its ratio report with progress output.
async fn fetch_ratios(
    client: &DartClient,
    company: &CompanyName,
    years: &[i32],
    fetch: &FetchConfig,
) -> Result<(String, AggregateReport), Box<dyn std::error::Error>> {
    let pb = spinner("Resolving corp code...")?;
    let corp = match resolve_corp(client, company.as_str(), fetch).await {
        Ok(corp) => {
            pb.finish_with_message(format!("Corp code: {}", corp.corp_code));
            corp
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    let pb = statement_bar()?;
    let report = compute_ratio_report(client, &corp.corp_code, years, fetch, Some(&pb)).await?;
    let available = report.periods.iter().filter(|p| p.is_available()).count();
    pb.finish_with_message(format!("{available}/{} years with statements", years.len()));

    Ok((corp.corp_code, report))
}

fn print_period_details(report: &AggregateReport) {
    for period in &report.periods {
        match period.basis {
            Some(basis) => {
                let missing: Vec<&str> = period
                    .resolved
                    .missing()
                    .iter()
                    .map(CanonicalAccount::key)
                    .collect();
                if missing.is_empty() {
                    println!("  {}: {} ({})", period.year, basis.label(), basis);
                } else {
                    println!(
                        "  {}: {} ({}), missing {}",
                        period.year,
                        basis.label(),
                        basis,
                        missing.join(", ")
                    );
                }
            }
            None => println!("  {}: no statements", period.year),
        }
    }
}

struct AnalyzeRequest {
    company: CompanyName,
    years: Vec<i32>,
    output: PathBuf,
    format: ExportFormat,
    fetch: FetchConfig,
    skip_risk: bool,
}

async fn analyze_company(
    app: &AppConfig,
    request: AnalyzeRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let AnalyzeRequest {
        company,
        years,
        output,
        format,
        fetch,
        skip_risk,
    } = request;
    let client = DartClient::new(app.dart()?)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("DART RATIO ANALYSIS: {company}"));
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!(
        "Fiscal years: {}",
        years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
    );
    if fetch.use_cache {
        print_cache_info();
        if fetch.force_refresh {
            println!("  Mode: Force refresh (re-fetching all data)");
        }
    } else {
        println!("  Cache: Disabled");
    }
    println!();

    let (corp_code, report) = fetch_ratios(&client, &company, &years, &fetch).await?;
    println!();
    print_period_details(&report);
    println!("\n{}", render_ascii(&report.series));

    let dir = company_dir(&output, company.as_str());
    std::fs::create_dir_all(&dir)?;
    let stem = sanitize_filename(company.as_str());
    let ratios_path = dir.join(format!("{stem}_ratios.{}", format.extension()));
    std::fs::write(&ratios_path, ratio_artifact(&report.series, format)?)?;
    println!("Ratios saved: {}", ratios_path.display());

    if skip_risk {
        return Ok(());
    }
    let Some(llm) = app.llm() else {
        println!("OPENAI_API_KEY not set, skipping risk summary");
        return Ok(());
    };

    let since = NaiveDate::from_ymd_opt(Utc::now().year() - RISK_LOOKBACK_YEARS, 1, 1)
        .ok_or("invalid lookback date")?;
    let sources = RiskSources {
        dart: &client,
        corp_code: &corp_code,
        company: company.as_str(),
        years: &years,
        since,
        naver: app.naver(),
    };

    let pb = spinner("Collecting filings and news...")?;
    let ratio_table = (!report.series.is_empty()).then(|| render_markdown(&report.series));
    let inputs = risk_pipeline::gather_inputs(&sources, ratio_table).await;
    pb.set_message(format!(
        "Summarizing {} filings, {} key reports, {} articles...",
        inputs.filings.len(),
        inputs.key_reports.len(),
        inputs.news.len()
    ));
    let summary = risk_pipeline::analyst(llm)?.analyze(&inputs).await;
    pb.finish_with_message("Risk summary ready");

    let saved = save_summary(&dir, company.as_str(), &years, &summary)?;
    println!("Risk summary saved: {}", saved.display());
    println!("\nAll results are in {}", dir.display());

    Ok(())
}

fn save_summary(
    dir: &Path,
    company: &str,
    years: &[i32],
    summary: &dartlens_risk::RiskSummary,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let report = risk_pipeline::to_report(company, years, summary);
    Ok(report.save_to(dir)?)
}

async fn print_ratios(
    app: &AppConfig,
    company: &CompanyName,
    years: &[i32],
    fetch: &FetchConfig,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = DartClient::new(app.dart()?)?;
    let (_, report) = fetch_ratios(&client, company, years, fetch).await?;

    match format.trim().to_ascii_lowercase().as_str() {
        "table" => {
            print_period_details(&report);
            println!("\n{}", render_ascii(&report.series));
        }
        "markdown" | "md" => println!("{}", render_markdown(&report.series)),
        other => {
            let format = ExportFormat::from_name(other)?;
            println!("{}", report.series.export_to_string(format)?);
        }
    }

    Ok(())
}

async fn search_registry(app: &AppConfig, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = DartClient::new(app.dart()?)?;
    let pb = spinner("Downloading corp-code registry...")?;
    let matches = search_corps(&client, query, CORP_SEARCH_LIMIT).await?;
    pb.finish_and_clear();

    if matches.is_empty() {
        println!("No company matches '{query}'");
        return Ok(());
    }

    println!("{:<10} {:<8} Name", "Corp code", "Stock");
    println!("{}", "-".repeat(40));
    for corp in &matches {
        println!(
            "{:<10} {:<8} {}",
            corp.corp_code,
            corp.stock_code.as_deref().unwrap_or("-"),
            corp.corp_name
        );
    }

    if let Some(exact) = matches.iter().find(|corp| corp.corp_name == query.trim()) {
        match client.company_info(&exact.corp_code).await {
            Ok(info) => {
                println!("\n{} ({})", info.corp_name, info.market());
                println!("  CEO:          {}", info.ceo_nm);
                println!("  Industry:     {}", info.induty_code);
                println!("  Established:  {}", info.est_dt);
                println!("  Fiscal month: {}", info.acc_mt);
            }
            Err(e) => warn!(corp_code = %exact.corp_code, error = %e, "company overview unavailable"),
        }
    }

    Ok(())
}

fn manage_cache(stats: bool, clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager::open_cache()?;

    if clear {
        cache.clear_all()?;
        println!("Cache cleared: {}", cache_manager::cache_path().display());
    }
    if stats || !clear {
        let stats = cache.get_stats()?;
        println!("Cache location: {}", cache_manager::cache_path().display());
        println!("  Statements:  {}", stats.statements);
        println!("  Companies:   {}", stats.companies);
        println!("  Corp codes:  {}", stats.corp_codes);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_requested_years_with_end_year() {
        assert_eq!(requested_years(3, Some(2023)).unwrap(), vec![2021, 2022, 2023]);
        assert!(requested_years(0, Some(2023)).is_err());
    }

    #[test]
    fn test_requested_years_out_of_range() {
        assert_eq!(
            requested_years(5, Some(i32::MAX)),
            Err(dartlens::InputError::YearOutOfRange)
        );
        assert_eq!(
            requested_years(u32::MAX, Some(2023)),
            Err(dartlens::InputError::YearOutOfRange)
        );
    }

    #[test]
    fn test_years_flag_bounded() {
        assert!(Cli::try_parse_from(["dartlens", "ratios", "삼성전자", "--years", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["dartlens", "analyze", "삼성전자", "--years", "2147483648"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["dartlens", "analyze", "삼성전자", "--years", "30"]).is_ok());
    }

    #[test]
    fn test_ratio_artifact_csv_is_spreadsheet_ready() {
        let series =
            RatioTimeSeries::from_records(vec![dartlens_ratios::RatioRecord::missing(2023)]);
        let csv = ratio_artifact(&series, ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("\u{feff}연도,"));
        assert!(csv.contains("\n2023,"));

        let json = ratio_artifact(&series, ExportFormat::Json).unwrap();
        assert!(json.starts_with('['));
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::parse_from(["dartlens", "analyze", "삼성전자"]);
        let Commands::Analyze {
            years,
            output,
            format,
            skip_risk,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(years, 5);
        assert_eq!(output, PathBuf::from("results"));
        assert_eq!(format, "csv");
        assert!(!skip_risk);
    }
}
