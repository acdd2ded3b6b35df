//! Engine configuration and run result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ClosedTrade, OpenPosition};

pub const DEFAULT_WARMUP_BARS: usize = 50;

/// Configuration for a single backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// No entries before this bar index. Curves start here too.
    pub warmup_bars: usize,
}

impl EngineConfig {
    pub fn new(warmup_bars: usize) -> Self {
        Self { warmup_bars }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP_BARS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub timestamp: DateTime<Utc>,
    /// Percent below the running peak, always >= 0.
    pub drawdown_pct: f64,
}

/// Everything a finished (or cancelled) simulation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub symbol: String,
    pub strategy_name: String,
    pub initial_capital: f64,
    /// Capital after realized P&L only.
    pub final_capital: f64,
    /// Final capital plus the open position's unrealized P&L.
    pub final_equity: f64,
    /// Highest equity seen, starting from the initial capital.
    pub peak_equity: f64,
    pub trades: Vec<ClosedTrade>,
    /// One point per simulated bar, from the warm-up index onward.
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    /// Left open at the end of the series; never force-closed.
    pub open_position: Option<OpenPosition>,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub cancelled: bool,
}

impl RunResult {
    pub fn total_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl).sum()
    }

    /// Largest drawdown percent on the curve, 0 for an empty curve.
    pub fn max_drawdown_pct(&self) -> f64 {
        self.drawdown_curve
            .iter()
            .map(|p| p.drawdown_pct)
            .fold(0.0, f64::max)
    }
}
