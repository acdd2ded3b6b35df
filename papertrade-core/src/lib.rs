//! Papertrade core: price series, indicators, feature vectors, the strategy
//! contract and the bar-by-bar backtest loop.
//!
//! Data flows one way:
//! price series -> indicator frames -> strategy decisions + simulation loop
//! -> trade log and equity/drawdown curves.
//!
//! Statistics over a finished run live in the runner crate.

pub mod config;
pub mod domain;
pub mod engine;
pub mod features;
pub mod frame;
pub mod indicators;
pub mod strategy;

pub use config::{ConfigError, RiskParams, StrategyConfig};
pub use domain::{ClosedTrade, ExitReason, OpenPosition, PriceBar, PriceSeries, SeriesError, Side};
pub use engine::{
    run_backtest, run_backtest_with_cancel, run_backtest_with_frames, EngineConfig, RunResult,
};
pub use features::{extract_all, extract_features, FeatureVector, FEATURE_LOOKBACK, FEATURE_NAMES};
pub use frame::{compute_frames, FrameField, IndicatorFrame};
pub use strategy::{build_strategy, Strategy, StrategyPreset};
