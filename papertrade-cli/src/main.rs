//! Papertrade CLI: run and inspect backtests from the terminal.
//!
//! Commands:
//! - `run`: one backtest from a TOML run file or a named strategy
//! - `batch`: several strategies over one series, in parallel, ranked by Sharpe
//! - `strategies`: list the strategy catalog with default risk
//! - `indicators`: print the indicator frame for the last bars of a series
//! - `features`: print feature vectors as JSON lines

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use papertrade_core::config::StrategyConfig;
use papertrade_core::domain::PriceSeries;
use papertrade_core::engine::{EngineConfig, DEFAULT_WARMUP_BARS};
use papertrade_core::features::{extract_all, FEATURE_NAMES};
use papertrade_core::frame::{compute_frames, FrameField};
use papertrade_core::strategy::{build_strategy, StrategyPreset};
use papertrade_runner::export::{export_json, format_ratio, save_artifacts};
use papertrade_runner::{
    generate_synthetic, load_csv, rank_by_sharpe, run_from_config, run_strategies, run_strategy,
    BacktestConfig, BacktestResult,
};

#[derive(Parser)]
#[command(
    name = "papertrade",
    about = "Papertrade CLI: indicator and backtest engine for paper trading"
)]
struct Cli {
    /// Debug-level logging (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where bars come from when no run file is given.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// CSV file with columns timestamp,open,high,low,close,volume.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use the deterministic synthetic random walk.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Symbol label for the series.
    #[arg(long, default_value = "SYNTH")]
    symbol: String,

    /// Synthetic bar count.
    #[arg(long, default_value_t = 500)]
    bars: usize,

    /// Synthetic RNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Synthetic starting price.
    #[arg(long, default_value_t = 100.0)]
    start_price: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML run file or a named strategy.
    Run {
        /// Path to a TOML run file.
        #[arg(long, conflicts_with = "strategy")]
        config: Option<PathBuf>,

        /// Catalog strategy name (see `papertrade strategies`).
        #[arg(long)]
        strategy: Option<String>,

        #[command(flatten)]
        data: DataArgs,

        /// Bars skipped before the first entry.
        #[arg(long, default_value_t = DEFAULT_WARMUP_BARS)]
        warmup: usize,

        /// Save manifest.json, trades.csv, equity.csv and report.md here.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full result as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run several strategies over the same series in parallel.
    Batch {
        /// Comma-separated strategy names. Defaults to the whole catalog.
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,

        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = DEFAULT_WARMUP_BARS)]
        warmup: usize,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// List the strategy catalog.
    Strategies,
    /// Print indicator values for the last bars of a series.
    Indicators {
        #[command(flatten)]
        data: DataArgs,

        /// How many trailing bars to show.
        #[arg(long, default_value_t = 10)]
        last: usize,
    },
    /// Print feature vectors for the last bars as JSON lines.
    Features {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = 5)]
        last: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            strategy,
            data,
            warmup,
            output_dir,
            json,
        } => run_cmd(config, strategy, &data, warmup, output_dir, json),
        Commands::Batch {
            strategies,
            data,
            warmup,
            output_dir,
        } => batch_cmd(&strategies, &data, warmup, output_dir),
        Commands::Strategies => {
            strategies_cmd();
            Ok(())
        }
        Commands::Indicators { data, last } => indicators_cmd(&data, last),
        Commands::Features { data, last } => features_cmd(&data, last),
    }
}

/// Logs go to stderr so stdout stays clean for tables and JSON.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();
}

fn load_series(data: &DataArgs) -> Result<PriceSeries> {
    match (&data.csv, data.synthetic) {
        (Some(path), _) => load_csv(path, &data.symbol)
            .with_context(|| format!("failed to load {}", path.display())),
        (None, true) => Ok(generate_synthetic(
            &data.symbol,
            data.bars,
            data.seed,
            data.start_price,
        )?),
        (None, false) => bail!("one of --csv or --synthetic is required"),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    strategy: Option<String>,
    data: &DataArgs,
    warmup: usize,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let result = match (config_path, strategy) {
        (Some(path), _) => {
            let config = BacktestConfig::from_file(&path)
                .with_context(|| format!("failed to read run file {}", path.display()))?;
            info!(run_id = %config.run_id()?, "loaded run file");
            run_from_config(&config)?
        }
        (None, Some(name)) => {
            let series = load_series(data)?;
            let config = build_strategy(&name)?;
            run_strategy(&series, &config, &EngineConfig::new(warmup))?
        }
        (None, None) => bail!("one of --config or --strategy is required"),
    };

    if json {
        println!("{}", export_json(&result)?);
    } else {
        print_summary(&result);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn batch_cmd(
    names: &[String],
    data: &DataArgs,
    warmup: usize,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let configs: Vec<StrategyConfig> = if names.is_empty() {
        StrategyPreset::ALL.iter().map(|p| p.config()).collect()
    } else {
        names
            .iter()
            .map(|n| build_strategy(n.trim()))
            .collect::<Result<Vec<_>, _>>()?
    };

    let series = Arc::new(load_series(data)?);
    let engine = EngineConfig::new(warmup);
    let results = run_strategies(&series, &configs, &engine, &AtomicBool::new(false));

    let mut ok = Vec::with_capacity(results.len());
    for (config, result) in configs.iter().zip(results) {
        match result {
            Ok(r) => ok.push(r),
            Err(e) => eprintln!("{}: {e}", config.name),
        }
    }

    println!(
        "{:<20} {:>7} {:>8} {:>12} {:>9} {:>9} {:>8}",
        "Strategy", "Trades", "Win %", "Total P&L", "Sharpe", "Max DD %", "PF"
    );
    println!("{}", "-".repeat(79));
    for r in rank_by_sharpe(&ok) {
        let m = &r.metrics;
        println!(
            "{:<20} {:>7} {:>8.1} {:>12.2} {:>9.3} {:>9.2} {:>8}",
            r.strategy_name,
            m.trade_count,
            m.win_rate * 100.0,
            m.total_pnl,
            m.sharpe,
            m.max_drawdown_pct,
            format_ratio(m.profit_factor)
        );
    }

    if let Some(dir) = output_dir {
        for r in &ok {
            save_artifacts(r, &dir)?;
        }
        eprintln!("Artifacts saved under: {}", dir.display());
    }
    Ok(())
}

fn strategies_cmd() {
    println!(
        "{:<20} {:>6} {:>8} {:>9} {:>9}  Description",
        "Name", "SL %", "TP %", "Trail %", "Max bars"
    );
    println!("{}", "-".repeat(100));
    for preset in StrategyPreset::ALL {
        let risk = preset.default_risk();
        println!(
            "{:<20} {:>6.1} {:>8.1} {:>9} {:>9}  {}",
            preset.name(),
            risk.stop_loss_pct,
            risk.take_profit_pct,
            risk.trailing_stop_pct.map_or("-".to_string(), |t| format!("{t:.1}")),
            risk.max_holding_bars.map_or("-".to_string(), |b| b.to_string()),
            preset.description()
        );
    }
}

fn indicators_cmd(data: &DataArgs, last: usize) -> Result<()> {
    let series = load_series(data)?;
    let frames = compute_frames(&series);
    let start = series.len().saturating_sub(last);

    let header: Vec<String> = FrameField::ALL
        .iter()
        .map(|f| format!("{:>12}", f.name()))
        .collect();
    println!("{:<12}{}", "date", header.join(""));

    for (bar, frame) in series.bars()[start..].iter().zip(&frames[start..]) {
        let row: Vec<String> = FrameField::ALL
            .iter()
            .map(|&f| {
                let v = frame.get(f);
                if v.is_nan() {
                    format!("{:>12}", "-")
                } else {
                    format!("{v:>12.3}")
                }
            })
            .collect();
        println!("{:<12}{}", bar.timestamp.format("%Y-%m-%d"), row.join(""));
    }
    Ok(())
}

fn features_cmd(data: &DataArgs, last: usize) -> Result<()> {
    let series = load_series(data)?;
    let frames = compute_frames(&series);
    let vectors = extract_all(&series, &frames);
    let start = series.len().saturating_sub(last);

    for (bar, vector) in series.bars()[start..].iter().zip(&vectors[start..]) {
        let Some(vector) = vector else {
            continue;
        };
        let features: serde_json::Map<String, serde_json::Value> = FEATURE_NAMES
            .iter()
            .zip(vector.iter())
            .map(|(name, v)| (name.to_string(), serde_json::json!(v)))
            .collect();
        let line = serde_json::json!({
            "timestamp": bar.timestamp.to_rfc3339(),
            "features": features,
        });
        println!("{line}");
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Strategy:       {}", result.strategy_name);
    if let (Some(start), Some(end)) = (result.start_time, result.end_time) {
        println!(
            "Period:         {} to {}",
            start.date_naive(),
            end.date_naive()
        );
    }
    println!(
        "Bars:           {} ({} warm-up)",
        result.bar_count, result.warmup_bars
    );
    println!(
        "Trades:         {} ({} won, {} lost)",
        m.trade_count, m.winning_trades, m.losing_trades
    );
    println!();
    println!("--- Performance ---");
    println!("Total P&L:      {:.2}", m.total_pnl);
    println!("Total Return:   {:.2}%", m.total_return_pct);
    println!("Annualized:     {:.2}%", m.annualized_return_pct);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Sortino:        {:.3}", m.sortino);
    println!("Calmar:         {:.3}", m.calmar);
    println!(
        "Max Drawdown:   {:.2}% ({:.2})",
        m.max_drawdown_pct, m.max_drawdown_abs
    );
    println!("Win Rate:       {:.1}%", m.win_rate * 100.0);
    println!("Profit Factor:  {}", format_ratio(m.profit_factor));
    println!("Avg Holding:    {:.2} days", m.avg_holding_days);
    println!("Final Equity:   {:.2}", result.final_equity);
    if let Some(open) = &result.open_position {
        println!();
        println!(
            "Open position:  {:?} {} @ {:.2} (bar {})",
            open.side, open.quantity, open.entry_price, open.entry_index
        );
    }
    if result.cancelled {
        println!();
        println!("WARNING: run was cancelled before the end of data");
    }
    println!();
}
