//! Strategy configuration: risk parameters plus the decision logic.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategy::Strategy;

/// Rejected before the simulation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial capital must be positive, got {0}")]
    InvalidCapital(f64),

    #[error("position size must be in (0, 1], got {0}")]
    InvalidPositionSize(f64),

    #[error("stop-loss percent must be >= 0, got {0}")]
    InvalidStopLoss(f64),

    #[error("take-profit percent must be >= 0, got {0}")]
    InvalidTakeProfit(f64),

    #[error("trailing-stop percent must be >= 0, got {0}")]
    InvalidTrailingStop(f64),

    #[error("max holding period must be at least one bar")]
    InvalidMaxHolding,

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
}

/// Sizing and risk-exit parameters for one run.
///
/// Percentages are plain percent (2.0 = 2%). A stop-loss or take-profit of 0
/// disables that exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub initial_capital: f64,
    /// Fraction of current capital committed per entry.
    pub position_size: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub trailing_stop_pct: Option<f64>,
    pub max_holding_bars: Option<usize>,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            position_size: 0.5,
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
            trailing_stop_pct: None,
            max_holding_bars: None,
        }
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl RiskParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::InvalidCapital(self.initial_capital));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(ConfigError::InvalidPositionSize(self.position_size));
        }
        if !non_negative(self.stop_loss_pct) {
            return Err(ConfigError::InvalidStopLoss(self.stop_loss_pct));
        }
        if !non_negative(self.take_profit_pct) {
            return Err(ConfigError::InvalidTakeProfit(self.take_profit_pct));
        }
        if let Some(trail) = self.trailing_stop_pct {
            if !non_negative(trail) {
                return Err(ConfigError::InvalidTrailingStop(trail));
            }
        }
        if self.max_holding_bars == Some(0) {
            return Err(ConfigError::InvalidMaxHolding);
        }
        Ok(())
    }
}

/// Immutable input to a backtest run.
pub struct StrategyConfig {
    pub name: String,
    pub risk: RiskParams,
    pub strategy: Box<dyn Strategy>,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>, risk: RiskParams, strategy: Box<dyn Strategy>) -> Self {
        Self {
            name: name.into(),
            risk,
            strategy,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()
    }

    pub fn with_risk(mut self, risk: RiskParams) -> Self {
        self.risk = risk;
        self
    }
}

impl fmt::Debug for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyConfig")
            .field("name", &self.name)
            .field("risk", &self.risk)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
