//! Performance metrics: pure functions over a finished run.
//!
//! Every metric is a pure function: trade list and/or curve in, scalar out.
//! Degenerate inputs (no trades, zero variance, zero drawdown) resolve to 0,
//! except the profit factor which is +inf when there are profits but no losses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use papertrade_core::domain::ClosedTrade;
use papertrade_core::engine::{DrawdownPoint, RunResult};

/// Trading days per year, used for every annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Fraction of trades with pnl > 0.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// Serialized as `null` when infinite.
    #[serde(with = "infinite_as_null")]
    pub profit_factor: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown_abs: f64,
    pub max_drawdown_pct: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    /// Mean time between entry and exit, in fractional days.
    pub avg_holding_days: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

/// Summed percent P&L of the trades that exited in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    /// `YYYY-MM`
    pub month: String,
    pub return_pct: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a finished simulation.
    pub fn compute(run: &RunResult) -> Self {
        let trades = &run.trades;
        let total = total_pnl(trades);
        let dd_pct = max_drawdown_pct(&run.drawdown_curve);
        let ret_pct = total_return_pct(total, run.initial_capital);
        let annualized = annualized_return_pct(ret_pct, run.bar_count);

        let wins: Vec<f64> = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).collect();
        let losses: Vec<f64> = trades.iter().filter(|t| !t.is_winner()).map(|t| t.pnl).collect();
        let returns = pnl_pcts(trades);

        Self {
            trade_count: trades.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: win_rate(trades),
            total_pnl: total,
            avg_pnl: mean_f64(&trades.iter().map(|t| t.pnl).collect::<Vec<_>>()),
            largest_win: wins.iter().copied().fold(0.0, f64::max),
            largest_loss: losses.iter().copied().fold(0.0, f64::min),
            avg_win: mean_f64(&wins),
            avg_loss: mean_f64(&losses),
            profit_factor: profit_factor(trades),
            sharpe: sharpe_ratio(&returns),
            sortino: sortino_ratio(&returns),
            calmar: calmar_ratio(annualized, dd_pct),
            max_drawdown_abs: dd_pct / 100.0 * run.peak_equity,
            max_drawdown_pct: dd_pct,
            total_return_pct: ret_pct,
            annualized_return_pct: annualized,
            avg_holding_days: avg_holding_days(trades),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[ClosedTrade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Win rate: fraction of trades that were winners.
pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross profits / gross losses.
///
/// +inf when there are profits and no losses, 0 when there are neither.
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss == 0.0 {
        return if gross_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    gross_profit / gross_loss
}

/// Annualized Sharpe ratio over per-trade percent returns.
///
/// Sharpe = mean / population std * sqrt(252). Returns 0.0 if std is zero.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let std = population_std(returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(returns) / std * TRADING_DAYS.sqrt()
}

/// Annualized Sortino ratio over per-trade percent returns.
///
/// Downside deviation is sqrt(mean of squared negative returns), taken over
/// the negative returns only. Returns 0.0 when nothing lost.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    let downside_sq: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).collect();
    if downside_sq.is_empty() {
        return 0.0;
    }
    let downside_std = mean_f64(&downside_sq).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    mean_f64(returns) / downside_std * TRADING_DAYS.sqrt()
}

/// Calmar ratio: annualized return % / max drawdown %. 0 with no drawdown.
pub fn calmar_ratio(annualized_return_pct: f64, max_drawdown_pct: f64) -> f64 {
    if max_drawdown_pct <= 0.0 {
        return 0.0;
    }
    annualized_return_pct / max_drawdown_pct
}

/// Largest percent drawdown on the curve.
pub fn max_drawdown_pct(curve: &[DrawdownPoint]) -> f64 {
    curve.iter().map(|p| p.drawdown_pct).fold(0.0, f64::max)
}

pub fn total_return_pct(total_pnl: f64, initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    total_pnl / initial_capital * 100.0
}

/// Linear annualization: total % * 252 / number of bars.
pub fn annualized_return_pct(total_return_pct: f64, bar_count: usize) -> f64 {
    if bar_count == 0 {
        return 0.0;
    }
    total_return_pct * TRADING_DAYS / bar_count as f64
}

pub fn avg_holding_days(trades: &[ClosedTrade]) -> f64 {
    mean_f64(&trades.iter().map(ClosedTrade::holding_days).collect::<Vec<_>>())
}

/// Closed trades grouped by exit month, percent P&L summed, sorted by month.
pub fn monthly_returns(trades: &[ClosedTrade]) -> Vec<MonthlyReturn> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        let key = trade.exit_time.format("%Y-%m").to_string();
        *by_month.entry(key).or_insert(0.0) += trade.pnl_pct;
    }
    by_month
        .into_iter()
        .map(|(month, return_pct)| MonthlyReturn { month, return_pct })
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

fn pnl_pcts(trades: &[ClosedTrade]) -> Vec<f64> {
    trades.iter().map(|t| t.pnl_pct).collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[ClosedTrade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

/// JSON has no infinity: write it as `null` and read `null` back as +inf.
mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
