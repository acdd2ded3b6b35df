//! Backtest runner: wires together data, engine and metrics.
//!
//! Three entry points:
//! - `run_strategy()`: one series, one strategy. Used by tests and the batch runner.
//! - `run_strategy_with_frames()`: same, reusing precomputed indicator frames.
//! - `run_from_config()`: loads data described by a TOML run file, then runs. Used by CLI.

use std::sync::atomic::AtomicBool;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use papertrade_core::config::{ConfigError, RiskParams, StrategyConfig};
use papertrade_core::domain::{ClosedTrade, OpenPosition, PriceSeries, SeriesError};
use papertrade_core::engine::{
    run_backtest_with_cancel, run_backtest_with_frames, DrawdownPoint, EngineConfig, EquityPoint,
    RunResult,
};
use papertrade_core::frame::IndicatorFrame;

use crate::config::{BacktestConfig, DataSource};
use crate::data_loader::{dataset_hash, generate_synthetic, load_csv, LoadError};
use crate::metrics::{monthly_returns, MonthlyReturn, PerformanceMetrics};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("run file parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid run file: {0}")]
    InvalidRunFile(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Content hash of (strategy, risk, warm-up, dataset).
    pub run_id: String,
    pub symbol: String,
    pub strategy_name: String,
    pub risk: RiskParams,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub final_equity: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub open_position: Option<OpenPosition>,
    pub dataset_hash: String,
    #[serde(default)]
    pub cancelled: bool,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything that determines a run's output, hashed into its id.
#[derive(Serialize)]
struct RunKey<'a> {
    strategy: &'a str,
    risk: &'a RiskParams,
    warmup_bars: usize,
    dataset_hash: &'a str,
}

/// Run one strategy over one series.
pub fn run_strategy(
    series: &PriceSeries,
    config: &StrategyConfig,
    engine: &EngineConfig,
) -> Result<BacktestResult, RunError> {
    let run = run_backtest_with_cancel(series, config, engine, &AtomicBool::new(false))?;
    assemble(series, config, run)
}

/// Run with frames that were already computed for `series`.
///
/// Used by the batch runner so N strategies share one indicator precompute.
pub fn run_strategy_with_frames(
    series: &PriceSeries,
    frames: &[IndicatorFrame],
    config: &StrategyConfig,
    engine: &EngineConfig,
    cancel: &AtomicBool,
) -> Result<BacktestResult, RunError> {
    let run = run_backtest_with_frames(series, frames, config, engine, cancel)?;
    assemble(series, config, run)
}

/// Load the data a run file describes, then run its strategy.
pub fn run_from_config(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let series = load_series(config)?;
    let strategy = config.to_strategy_config()?;
    run_strategy(&series, &strategy, &config.engine_config())
}

/// Resolve a run file's `[data]` section to a series.
pub fn load_series(config: &BacktestConfig) -> Result<PriceSeries, RunError> {
    let symbol = &config.backtest.symbol;
    let series = match &config.data {
        DataSource::Csv { path } => load_csv(path, symbol)?,
        DataSource::Synthetic(spec) => {
            generate_synthetic(symbol, spec.bars, spec.seed, spec.start_price)?
        }
    };
    Ok(series)
}

fn assemble(
    series: &PriceSeries,
    config: &StrategyConfig,
    run: RunResult,
) -> Result<BacktestResult, RunError> {
    let metrics = PerformanceMetrics::compute(&run);
    let monthly = monthly_returns(&run.trades);
    let hash = dataset_hash(series);

    let key = RunKey {
        strategy: &config.name,
        risk: &config.risk,
        warmup_bars: run.warmup_bars,
        dataset_hash: &hash,
    };
    let run_id = blake3::hash(serde_json::to_string(&key)?.as_bytes())
        .to_hex()
        .to_string();

    info!(
        symbol = %run.symbol,
        strategy = %run.strategy_name,
        trades = metrics.trade_count,
        total_pnl = metrics.total_pnl,
        sharpe = metrics.sharpe,
        run_id = %&run_id[..12],
        "run finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        symbol: run.symbol,
        strategy_name: run.strategy_name,
        risk: config.risk,
        start_time: series.bars().first().map(|b| b.timestamp),
        end_time: series.bars().last().map(|b| b.timestamp),
        bar_count: run.bar_count,
        warmup_bars: run.warmup_bars,
        initial_capital: run.initial_capital,
        final_capital: run.final_capital,
        final_equity: run.final_equity,
        metrics,
        trades: run.trades,
        equity_curve: run.equity_curve,
        drawdown_curve: run.drawdown_curve,
        monthly_returns: monthly,
        open_position: run.open_position,
        dataset_hash: hash,
        cancelled: run.cancelled,
    })
}
