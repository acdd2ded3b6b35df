//! Bar-by-bar simulation loop.
//!
//! Per bar, from the warm-up index onward:
//! 1. Cancellation check
//! 2. In a position (and past the entry bar): risk exits, then the strategy exit
//! 3. Flat, and no exit taken on this bar: the strategy entry decision
//! 4. Mark-to-market: equity, running peak, drawdown
//!
//! Exits and entries fill at the bar's close.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{ClosedTrade, ExitReason, OpenPosition, PriceSeries};
use crate::frame::{compute_frames, IndicatorFrame};

use super::exits::risk_exit;
use super::state::{DrawdownPoint, EngineConfig, EquityPoint, RunResult};

/// Run a backtest over the whole series.
///
/// Validates the configuration, precomputes frames once, then walks the bars.
pub fn run_backtest(
    series: &PriceSeries,
    config: &StrategyConfig,
    engine: &EngineConfig,
) -> Result<RunResult, ConfigError> {
    run_backtest_with_cancel(series, config, engine, &AtomicBool::new(false))
}

/// Same as [`run_backtest`], stopping early at the first bar boundary after
/// `cancel` is set. The partial result carries `cancelled = true`.
pub fn run_backtest_with_cancel(
    series: &PriceSeries,
    config: &StrategyConfig,
    engine: &EngineConfig,
    cancel: &AtomicBool,
) -> Result<RunResult, ConfigError> {
    config.validate()?;
    let frames = compute_frames(series);
    Ok(simulate(series, &frames, config, engine, cancel))
}

/// Run over frames the caller already computed for `series`.
///
/// Lets several strategies share one precompute. `frames` must come from
/// [`compute_frames`] on the same series.
pub fn run_backtest_with_frames(
    series: &PriceSeries,
    frames: &[IndicatorFrame],
    config: &StrategyConfig,
    engine: &EngineConfig,
    cancel: &AtomicBool,
) -> Result<RunResult, ConfigError> {
    config.validate()?;
    debug_assert_eq!(frames.len(), series.len(), "frames/series length mismatch");
    Ok(simulate(series, frames, config, engine, cancel))
}

fn simulate(
    series: &PriceSeries,
    frames: &[IndicatorFrame],
    config: &StrategyConfig,
    engine: &EngineConfig,
    cancel: &AtomicBool,
) -> RunResult {
    let bars = series.bars();
    let n = bars.len().min(frames.len());
    let risk = &config.risk;
    let strategy = config.strategy.as_ref();

    if n <= engine.warmup_bars {
        warn!(
            symbol = series.symbol(),
            bars = n,
            warmup = engine.warmup_bars,
            "series too short for warm-up, no bars simulated"
        );
    }

    let simulated = n.saturating_sub(engine.warmup_bars);
    let mut capital = risk.initial_capital;
    let mut peak = risk.initial_capital;
    let mut position: Option<OpenPosition> = None;
    let mut trades: Vec<ClosedTrade> = Vec::new();
    let mut equity_curve = Vec::with_capacity(simulated);
    let mut drawdown_curve = Vec::with_capacity(simulated);
    let mut cancelled = false;

    for i in engine.warmup_bars..n {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            warn!(
                symbol = series.symbol(),
                strategy = %config.name,
                bar = i,
                "backtest cancelled"
            );
            break;
        }

        let bar = &bars[i];

        // Exit checks start on the bar after entry.
        let exit = match position.as_mut() {
            Some(pos) if i > pos.entry_index => {
                pos.observe_close(bar.close);
                risk_exit(pos, bar.close, i, risk)
                    .or_else(|| {
                        strategy
                            .decide_exit(bars, i, frames, pos.side)
                            .then_some(ExitReason::Signal)
                    })
                    .map(|reason| ClosedTrade::close(pos, i, bar.timestamp, bar.close, reason))
            }
            _ => None,
        };

        let exited = exit.is_some();
        if let Some(trade) = exit {
            capital += trade.pnl;
            debug!(
                bar = i,
                side = ?trade.side,
                reason = trade.exit_reason.as_str(),
                price = trade.exit_price,
                pnl = trade.pnl,
                "position closed"
            );
            trades.push(trade);
            position = None;
        }

        if position.is_none() && !exited {
            if let Some(side) = strategy.decide_entry(bars, i, frames) {
                let quantity = if bar.close > 0.0 {
                    (capital * risk.position_size / bar.close).floor()
                } else {
                    0.0
                };
                if quantity >= 1.0 {
                    debug!(bar = i, ?side, price = bar.close, quantity, "position opened");
                    position = Some(OpenPosition::open(
                        side,
                        bar.close,
                        bar.timestamp,
                        i,
                        quantity as u64,
                    ));
                }
            }
        }

        let equity = capital
            + position
                .as_ref()
                .map_or(0.0, |p| p.unrealized_pnl(bar.close));
        peak = peak.max(equity);
        let drawdown_pct = if peak > 0.0 {
            ((peak - equity) / peak * 100.0).max(0.0)
        } else {
            0.0
        };

        equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity,
        });
        drawdown_curve.push(DrawdownPoint {
            timestamp: bar.timestamp,
            drawdown_pct,
        });
    }

    let final_equity = equity_curve.last().map_or(capital, |p| p.equity);

    info!(
        symbol = series.symbol(),
        strategy = %config.name,
        trades = trades.len(),
        final_equity,
        open = position.is_some(),
        "backtest complete"
    );

    RunResult {
        symbol: series.symbol().to_string(),
        strategy_name: config.name.clone(),
        initial_capital: risk.initial_capital,
        final_capital: capital,
        final_equity,
        peak_equity: peak,
        trades,
        equity_curve,
        drawdown_curve,
        open_position: position,
        bar_count: n,
        warmup_bars: engine.warmup_bars,
        cancelled,
    }
}
