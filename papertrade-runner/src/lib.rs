//! Papertrade Runner: backtest orchestration on top of `papertrade-core`.
//!
//! This crate provides:
//! - Data loading from CSV files and a deterministic synthetic feed
//! - Single-run runner producing trades, curves and performance metrics
//! - TOML run files with content-addressed run ids
//! - Parallel batch runs over shared read-only series
//! - JSON, CSV and Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod parallel;
pub mod runner;

pub use config::{BacktestConfig, DataSource, RunId};
pub use data_loader::{dataset_hash, generate_synthetic, load_csv, LoadError, SyntheticSpec};
pub use metrics::{MonthlyReturn, PerformanceMetrics};
pub use parallel::{rank_by_sharpe, run_batch, run_strategies, BatchJob};
pub use runner::{run_from_config, run_strategy, BacktestResult, RunError, SCHEMA_VERSION};
