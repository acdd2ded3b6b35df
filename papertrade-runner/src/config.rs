//! Serializable run file: what to trade, with which strategy, on which data.
//!
//! ```toml
//! [backtest]
//! symbol = "NIFTY"
//! warmup_bars = 50
//!
//! [strategy]
//! name = "rsi_reversal"
//! stop_loss_pct = 1.5
//!
//! [data.synthetic]
//! bars = 750
//! seed = 7
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use papertrade_core::config::{ConfigError, RiskParams, StrategyConfig};
use papertrade_core::engine::{EngineConfig, DEFAULT_WARMUP_BARS};
use papertrade_core::strategy::StrategyPreset;

use crate::data_loader::SyntheticSpec;
use crate::runner::RunError;

/// Unique identifier for a run file (content-addressable hash).
pub type RunId = String;

/// Serializable configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
    /// Required. A run file never falls back to generated prices.
    pub data: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default = "default_warmup")]
    pub warmup_bars: usize,
}

fn default_warmup() -> usize {
    DEFAULT_WARMUP_BARS
}

/// Catalog strategy name plus optional overrides of its default risk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategySection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_capital: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_holding_bars: Option<usize>,
}

impl StrategySection {
    /// Apply the overrides on top of a preset's defaults.
    pub fn apply(&self, mut risk: RiskParams) -> RiskParams {
        if let Some(v) = self.initial_capital {
            risk.initial_capital = v;
        }
        if let Some(v) = self.position_size {
            risk.position_size = v;
        }
        if let Some(v) = self.stop_loss_pct {
            risk.stop_loss_pct = v;
        }
        if let Some(v) = self.take_profit_pct {
            risk.take_profit_pct = v;
        }
        if self.trailing_stop_pct.is_some() {
            risk.trailing_stop_pct = self.trailing_stop_pct;
        }
        if self.max_holding_bars.is_some() {
            risk.max_holding_bars = self.max_holding_bars;
        }
        risk
    }
}

/// Where the bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv { path: PathBuf },
    Synthetic(SyntheticSpec),
}

impl BacktestConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, RunError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a run file. Relative CSV paths resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, RunError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let DataSource::Csv { path: csv } = &mut config.data {
            if csv.is_relative() {
                if let Some(dir) = path.parent() {
                    *csv = dir.join(&*csv);
                }
            }
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, RunError> {
        toml::to_string_pretty(self).map_err(|e| RunError::InvalidRunFile(e.to_string()))
    }

    /// Fail fast on anything that would make the run meaningless.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(RunError::InvalidRunFile("symbol must not be empty".into()));
        }
        if let DataSource::Synthetic(spec) = &self.data {
            if spec.bars == 0 {
                return Err(RunError::InvalidRunFile(
                    "synthetic bar count must be at least 1".into(),
                ));
            }
        }
        self.to_strategy_config()?;
        Ok(())
    }

    /// Resolve the catalog strategy and apply risk overrides.
    pub fn to_strategy_config(&self) -> Result<StrategyConfig, ConfigError> {
        let preset: StrategyPreset = self.strategy.name.parse()?;
        let risk = self.strategy.apply(preset.default_risk());
        let config = preset.config().with_risk(risk);
        config.validate()?;
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.backtest.warmup_bars)
    }

    /// Deterministic hash of the whole run file.
    ///
    /// Two identical run files share a RunId.
    pub fn run_id(&self) -> Result<RunId, RunError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
