use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{Config, NullPolicy};
use core_types::Predictor;
use pipeline::{AnalysisParams, AnalysisReport, Pipeline};
use std::fs::{self, File};
use std::io::BufWriter;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Gold and silver market analysis: merges price and macro exports, computes
/// rolling statistics and rolling regression betas.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;
    let _guard = web_server::telemetry::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config),
        Commands::Serve(args) => handle_serve(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of `config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analysis once and print a summary.
    Analyze(AnalyzeArgs),
    /// Serve the analysis as a JSON API.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// CSV export of the gold/silver price sheet.
    #[arg(long)]
    prices: Option<PathBuf>,

    /// CSV export of the macro indicator sheet.
    #[arg(long = "macro")]
    macro_data: Option<PathBuf>,

    /// Rows per regression window.
    #[arg(long)]
    regression_window: Option<usize>,

    /// How rows with missing regression inputs are handled.
    #[arg(long, value_enum)]
    null_policy: Option<NullPolicy>,

    /// Write `merged.csv` and `betas.csv` into this directory, or into
    /// `data.output_dir` when given without a value.
    #[arg(long, num_args = 0..=1)]
    csv_dir: Option<Option<PathBuf>>,

    /// Parquet file for the merged series; betas go next to it.
    #[arg(long)]
    parquet: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding `server.addr`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_analyze(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let prices = args
        .prices
        .or(config.data.prices_path)
        .context("No price export given; pass --prices or set data.prices_path")?;
    let macros = args
        .macro_data
        .or(config.data.macro_path)
        .context("No macro export given; pass --macro or set data.macro_path")?;

    let mut params = AnalysisParams::from(&config.analysis);
    if let Some(window) = args.regression_window {
        params.regression.window = window;
    }
    if let Some(policy) = args.null_policy {
        params.regression.null_policy = policy;
    }

    let (price_rows, macro_rows) = pipeline::load_inputs(&prices, &macros)?;
    let report = Pipeline::run(&price_rows, &macro_rows, &params)?;

    print_summary(&report);

    if let Some(dir) = args.csv_dir {
        let dir = dir.unwrap_or(config.data.output_dir);
        write_csv_outputs(&dir, &report)?;
    }
    if let Some(path) = args.parquet {
        write_parquet_outputs(&path, &report)?;
    }
    Ok(())
}

async fn handle_serve(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let addr = args.addr.unwrap_or(config.server.addr);
    let state = Arc::new(web_server::AppState::new(config));
    web_server::run_server(addr, state).await
}

fn print_summary(report: &AnalysisReport) {
    let fmt_opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    let summary = &report.summary;
    let date_range = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "-".to_string(),
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Merged rows".to_string(), summary.rows.to_string()]);
    table.add_row(vec!["Date range".to_string(), date_range]);
    table.add_row(vec![
        "Unmatched dates (prices / macro)".to_string(),
        format!("{} / {}", report.merge.unmatched_price_dates, report.merge.unmatched_macro_dates),
    ]);
    table.add_row(vec![
        "Coercion warnings".to_string(),
        report.merge.coercion_warnings.len().to_string(),
    ]);
    table.add_row(vec!["Latest gold close".to_string(), fmt_opt(summary.latest_gold_close)]);
    table.add_row(vec!["Latest gold/silver ratio".to_string(), fmt_opt(summary.latest_gold_silver_ratio)]);
    table.add_row(vec!["Latest gold volatility".to_string(), fmt_opt(summary.latest_gold_volatility)]);
    table.add_row(vec!["Latest gold/DXY correlation".to_string(), fmt_opt(summary.latest_gold_to_dxy_corr)]);
    table.add_row(vec!["Regression points".to_string(), summary.regression_points.to_string()]);
    for (reason, count) in &report.skipped_windows {
        table.add_row(vec![format!("Skipped: {reason}"), count.to_string()]);
    }
    if let Some(point) = &summary.latest_betas {
        for predictor in Predictor::ALL {
            table.add_row(vec![
                format!("Latest {}", predictor.beta_name()),
                fmt_opt(point.beta(predictor)),
            ]);
        }
        table.add_row(vec!["Latest R²".to_string(), fmt_opt(point.r_squared)]);
    }

    println!("{table}");
}

fn write_csv_outputs(dir: &Path, report: &AnalysisReport) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let series_path = dir.join("merged.csv");
    let file = File::create(&series_path).with_context(|| format!("Failed to create {}", series_path.display()))?;
    dataset::write_series_csv(BufWriter::new(file), &report.rows)?;

    let betas_path = dir.join("betas.csv");
    let file = File::create(&betas_path).with_context(|| format!("Failed to create {}", betas_path.display()))?;
    dataset::write_betas_csv(BufWriter::new(file), &report.betas)?;

    tracing::info!(dir = %dir.display(), "Wrote CSV outputs.");
    Ok(())
}

fn write_parquet_outputs(path: &Path, report: &AnalysisReport) -> anyhow::Result<()> {
    let mut series = dataset::series_frame(&report.rows)?;
    dataset::write_parquet(&mut series, path)?;

    let mut betas = dataset::betas_frame(&report.betas)?;
    dataset::write_parquet(&mut betas, &path.with_extension("betas.parquet"))?;
    Ok(())
}
