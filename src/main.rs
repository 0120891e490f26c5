use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use cost_model::alignment::{align, daily_series, fill_gaps};
use cost_model::report::write_csv;
use cost_model::{CostCalculator, CostReport, ModelPreset, PriceHistoryLoader};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

mod console;
mod fetcher;
mod settings;

use fetcher::{reconcile_hashrate_unit, Chart, ChartData, ChartFetcher};
use settings::Settings;

const DEFAULT_PRICE_HISTORY: &str = "btc_price_history.csv";

#[derive(Parser)]
#[command(name = "btc_mining_cost")]
#[command(about = "Estimate the historical cost to mine one bitcoin from network hashrate")]
struct Args {
    /// TOML settings file with optional [fetch] and [model] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model preset; the settings file's [model] values are applied on top.
    /// Defaults to the file's `preset` key, then `full`
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Where to write the JSON report
    #[arg(short, long, default_value = "data.json")]
    output: PathBuf,

    /// Local CSV of daily closing prices that fills gaps in the live series
    #[arg(long)]
    price_history: Option<PathBuf>,

    /// Also export the daily rows as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Charts API timespan, e.g. 2years or 365days
    #[arg(long)]
    timespan: Option<String>,

    /// Worker threads for the per-day computation
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,
}

#[derive(Clone, ValueEnum)]
enum Preset {
    /// Electricity, hardware depreciation, fee ramp, smoothing
    Full,
    /// Electricity only, fee ramp, smoothing
    Electrical,
    /// Flat 25 J/TH electrical cost, no fees, no smoothing
    CashCost,
}

impl From<Preset> for ModelPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Full => ModelPreset::Full,
            Preset::Electrical => ModelPreset::Electrical,
            Preset::CashCost => ModelPreset::CashCost,
        }
    }
}

fn fetch_chart(fetcher: &ChartFetcher, chart: Chart) -> Result<ChartData> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("📡 Fetching {} data from {}", chart.label(), fetcher.url(chart)));
    pb.enable_steady_tick(Duration::from_millis(100));

    match fetcher.fetch(chart) {
        Ok(data) => {
            pb.finish_with_message(format!("✅ Got {} {} points", data.points.len(), chart.label()));
            Ok(data)
        }
        Err(e) => {
            pb.abandon_with_message(format!("❌ Failed to fetch {}", chart.label()));
            Err(e.into())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("🚀 Starting Bitcoin mining cost calculation...\n");

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(timespan) = &args.timespan {
        settings.fetch.timespan = timespan.clone();
    }

    let mut model = settings.model_config(args.preset.clone().map(ModelPreset::from));
    model.validate().context("invalid model configuration")?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .context("configuring worker threads")?;

    // Both fetches must succeed before anything is computed or written
    let fetcher = ChartFetcher::new(settings.fetch.clone())?;
    let hashrate_chart = fetch_chart(&fetcher, Chart::HashRate)?;
    let price_chart = fetch_chart(&fetcher, Chart::MarketPrice)?;

    model.hashrate_unit = reconcile_hashrate_unit(
        settings.model.hashrate_unit,
        hashrate_chart.hashrate_unit(),
        model.hashrate_unit,
    )?;

    let hashrate = daily_series(&hashrate_chart.points);
    let mut prices = daily_series(&price_chart.points);

    let history_path = args
        .price_history
        .clone()
        .or_else(|| settings.price_history.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICE_HISTORY));
    match PriceHistoryLoader::new(&history_path).load() {
        Ok(Some(history)) => {
            let filled = fill_gaps(&mut prices, &history.prices);
            println!("📂 Price history filled {} missing days", filled);
        }
        Ok(None) => {}
        Err(e) => warn!("Ignoring price history {}: {}", history_path.display(), e),
    }

    println!("🔄 Aligning data...");
    let days = align(&hashrate, &prices);
    let as_of = days
        .last()
        .map(|d| d.date)
        .context("hashrate and price series share no dates")?;
    println!("   ✅ {} common dates ({} to {})", days.len(), days[0].date, as_of);

    println!("\n💰 Calculating mining costs...");
    let calculator = CostCalculator::new(model, as_of)?;
    let rows = calculator.calculate_series(&days);
    let report = CostReport::build(&rows, calculator.config(), Utc::now())?;
    info!("Built report with {} days", report.len());

    console::print_summary(&calculator, &rows);

    report
        .write_json(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("\n💾 Saved to {}", args.output.display());

    if let Some(csv_path) = &args.csv {
        write_csv(&rows, csv_path).with_context(|| format!("writing {}", csv_path.display()))?;
        println!("💾 Saved CSV to {}", csv_path.display());
    }

    Ok(())
}
