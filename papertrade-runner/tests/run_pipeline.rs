//! Integration tests for the runner: run files on disk, CSV data, batch runs
//! and the artifact bundle.

use std::fmt::Write as _;
use std::sync::Arc;

use papertrade_core::engine::EngineConfig;
use papertrade_core::strategy::StrategyPreset;
use papertrade_runner::config::BacktestConfig;
use papertrade_runner::data_loader::{generate_synthetic, load_csv};
use papertrade_runner::export::{load_artifacts, save_artifacts};
use papertrade_runner::parallel::{run_batch, BatchJob};
use papertrade_runner::runner::{run_from_config, run_strategy, RunError};

/// Write a synthetic series to CSV so the file loader can read it back.
fn write_csv(dir: &std::path::Path, bars: usize) -> std::path::PathBuf {
    let series = generate_synthetic("CSVSYM", bars, 21, 150.0).unwrap();
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for bar in series.bars() {
        let _ = writeln!(
            text,
            "{},{},{},{},{},{}",
            bar.timestamp.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
    let path = dir.join("bars.csv");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn csv_run_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), 300);
    let run_file = dir.path().join("run.toml");
    std::fs::write(
        &run_file,
        r#"
[backtest]
symbol = "CSVSYM"

[strategy]
name = "bollinger_reversion"

[data.csv]
path = "bars.csv"
"#,
    )
    .unwrap();

    let config = BacktestConfig::from_file(&run_file).unwrap();
    let result = run_from_config(&config).unwrap();

    assert_eq!(result.symbol, "CSVSYM");
    assert_eq!(result.strategy_name, "bollinger_reversion");
    assert_eq!(result.bar_count, 300);
    assert_eq!(result.equity_curve.len(), 250);
    assert_eq!(result.metrics.trade_count, result.trades.len());

    // the CSV path and the in-memory path see the same bars
    let series = load_csv(&dir.path().join("bars.csv"), "CSVSYM").unwrap();
    let direct = run_strategy(
        &series,
        &config.to_strategy_config().unwrap(),
        &EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(direct.run_id, result.run_id);
}

#[test]
fn synthetic_run_file_is_reproducible() {
    let text = r#"
[backtest]
symbol = "SYN"
warmup_bars = 40

[strategy]
name = "volume_breakout"
take_profit_pct = 6.0

[data.synthetic]
bars = 400
seed = 99
"#;
    let a = run_from_config(&BacktestConfig::from_toml_str(text).unwrap()).unwrap();
    let b = run_from_config(&BacktestConfig::from_toml_str(text).unwrap()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.warmup_bars, 40);
    assert_eq!(a.risk.take_profit_pct, 6.0);
}

#[test]
fn missing_csv_is_a_load_error() {
    let text = r#"
[backtest]
symbol = "X"

[strategy]
name = "rsi_reversal"

[data.csv]
path = "/nowhere/at/all.csv"
"#;
    let err = run_from_config(&BacktestConfig::from_toml_str(text).unwrap()).unwrap_err();
    assert!(matches!(err, RunError::Load(_)), "{err}");
}

#[test]
fn batch_then_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let series = Arc::new(generate_synthetic("BATCH", 500, 8, 100.0).unwrap());
    let jobs: Vec<BatchJob> = StrategyPreset::ALL
        .iter()
        .map(|p| BatchJob::new(Arc::clone(&series), p.config(), EngineConfig::default()))
        .collect();

    let results = run_batch(&jobs);
    for result in results {
        let result = result.unwrap();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();
        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded.strategy_name, result.strategy_name);
        assert_eq!(loaded.trades.len(), result.trades.len());
    }

    // one directory per strategy
    let count = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(count, StrategyPreset::ALL.len());
}

#[test]
fn short_series_produces_empty_run() {
    let series = generate_synthetic("SHORT", 20, 1, 100.0).unwrap();
    let result = run_strategy(
        &series,
        &StrategyPreset::RsiReversal.config(),
        &EngineConfig::default(),
    )
    .unwrap();
    assert!(result.trades.is_empty());
    assert!(result.equity_curve.is_empty());
    assert_eq!(result.metrics.trade_count, 0);
    assert_eq!(result.metrics.sharpe, 0.0);
    assert_eq!(result.final_equity, result.initial_capital);
}
