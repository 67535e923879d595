use agristat::catalog::{self, FetchQuery};
use agristat::config::AnalysisConfig;
use agristat::ingestion::{CsvConnector, SimulatedSource};
use agristat::{AnalysisReport, SessionContext};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agristat")]
#[command(about = "Trend analysis, recommendations and keyword Q&A for agricultural time series")]
#[command(version)]
struct Args {
    /// Analysis config (JSON); AGRISTAT_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse an uploaded CSV file
    Analyze {
        /// CSV file to analyse
        csv_file: PathBuf,

        /// Question to answer after the analysis (repeatable)
        #[arg(short, long)]
        question: Vec<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Answer a single question about a CSV file
    Ask {
        /// CSV file to query
        csv_file: PathBuf,

        /// The question, e.g. "What is the average value?"
        question: String,
    },
    /// Generate a simulated series for a catalogue selection and analyse it
    Simulate {
        #[arg(long, default_value = "Production")]
        domain: String,

        #[arg(long, default_value = "Production")]
        metric: String,

        #[arg(long, default_value = "Wheat")]
        commodity: String,

        #[arg(long, default_value = "USA")]
        country: String,

        /// First year (default: 2000)
        #[arg(long)]
        start: Option<i32>,

        /// Last year (default: last calendar year)
        #[arg(long)]
        end: Option<i32>,

        /// Random seed for the simulated series
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Question to answer after the analysis (repeatable)
        #[arg(short, long)]
        question: Vec<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the domains, commodities and countries that can be selected
    Catalog,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    match args.command {
        Commands::Analyze { csv_file, question, json } => {
            let dataset = CsvConnector::from_path(&csv_file)
                .and_then(|c| c.read_dataset())
                .with_context(|| format!("Failed to read {}", csv_file.display()))?;
            let mut session = SessionContext::new(&config);
            session.load_dataset(dataset)?;
            print_session(&session, &question, json)
        }
        Commands::Ask { csv_file, question } => {
            let dataset = CsvConnector::from_path(&csv_file)
                .and_then(|c| c.read_dataset())
                .with_context(|| format!("Failed to read {}", csv_file.display()))?;
            let mut session = SessionContext::new(&config);
            session.load_dataset(dataset)?;
            println!("{}", session.ask(&question)?);
            Ok(())
        }
        Commands::Simulate { domain, metric, commodity, country, start, end, seed, question, json } => {
            let (default_start, default_end) = FetchQuery::default_years();
            let query = FetchQuery::new(
                &domain,
                &metric,
                &commodity,
                &country,
                start.unwrap_or(default_start),
                end.unwrap_or(default_end),
            )?;
            info!(
                "Simulating {} of {} in {} ({}-{})",
                query.metric, query.commodity, query.country, query.start_year, query.end_year
            );
            let source = SimulatedSource::new("simulator".to_string(), seed);
            let mut session = SessionContext::new(&config);
            session.fetch(&source, query)?;
            print_session(&session, &question, json)
        }
        Commands::Catalog => {
            print_catalog();
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    let config = match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn print_session(session: &SessionContext, questions: &[String], json: bool) -> Result<()> {
    let report = session.report().context("No analysis available")?;

    if json {
        let answers: Vec<serde_json::Value> = questions
            .iter()
            .map(|q| -> agristat::Result<serde_json::Value> {
                Ok(serde_json::json!({ "question": q, "answer": session.ask(q)? }))
            })
            .collect::<agristat::Result<_>>()?;
        let out = serde_json::json!({
            "session": session.id(),
            "created_at": session.created_at(),
            "query": session.last_query(),
            "report": report,
            "answers": answers,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", report.summary);
    print_describe(report);
    print_annual_changes(report);
    for q in questions {
        println!("\nQ: {}", q);
        println!("A: {}", session.ask(q)?);
    }
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(agristat::query::format_number).unwrap_or_else(|| "-".to_string())
}

fn print_describe(report: &AnalysisReport) {
    if report.describe.is_empty() {
        return;
    }
    println!("Descriptive statistics");
    println!(
        "  {:<20} {:>8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for s in &report.describe {
        println!(
            "  {:<20} {:>8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
            s.column,
            s.count,
            fmt_opt(s.mean),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.q25),
            fmt_opt(s.median),
            fmt_opt(s.q75),
            fmt_opt(s.max)
        );
    }
    println!();
}

fn print_annual_changes(report: &AnalysisReport) {
    let rows = report
        .annual_changes
        .iter()
        .filter_map(|c| c.change_percent.map(|p| format!("  {}  {:+.2}%", c.year, p)))
        .collect::<Vec<_>>();
    if rows.is_empty() {
        return;
    }
    println!("Annual changes");
    println!("{}", rows.join("\n"));
}

fn print_catalog() {
    println!("Domains");
    for d in catalog::DOMAINS {
        println!("  {} [{}]: {}", d.name, d.code, d.metrics.iter().join(", "));
    }
    println!("\nCommodities");
    for g in catalog::COMMODITY_GROUPS {
        println!("  {}: {}", g.name, g.entries.iter().map(|(n, _)| n).join(", "));
    }
    println!("\nCountries");
    for r in catalog::REGIONS {
        println!("  {}: {}", r.name, r.entries.iter().map(|(n, _)| n).join(", "));
    }
    println!(
        "\nYears: {}-{}",
        catalog::FIRST_YEAR,
        catalog::current_year()
    );
}
