//! End-to-end simulation scenarios: each exit rule, short positions, open
//! positions at the end of data, cancellation and determinism.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use papertrade_core::config::{ConfigError, RiskParams, StrategyConfig};
use papertrade_core::domain::{ExitReason, PriceBar, PriceSeries, Side};
use papertrade_core::engine::{run_backtest, run_backtest_with_cancel, EngineConfig};
use papertrade_core::frame::IndicatorFrame;
use papertrade_core::strategy::{build_strategy, Strategy, StrategyPreset};

// ── Helpers ──────────────────────────────────────────────────────────

fn series_from(closes: &[f64]) -> PriceSeries {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 9, 15, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(
                t0 + Duration::days(i as i64),
                open,
                open.max(close) * 1.001,
                open.min(close) * 0.999,
                close,
                10_000,
            )
        })
        .collect();
    PriceSeries::new("SCENARIO", bars).unwrap()
}

/// Compounding move of `pct` percent per bar.
fn geometric(n: usize, pct: f64) -> Vec<f64> {
    (0..n).map(|i| 100.0 * (1.0 + pct / 100.0).powi(i as i32)).collect()
}

/// Opens one position at a fixed bar; never asks to exit.
struct EnterAt {
    bar: usize,
    side: Side,
}

impl Strategy for EnterAt {
    fn name(&self) -> &str {
        "enter_at"
    }

    fn decide_entry(&self, _: &[PriceBar], index: usize, _: &[IndicatorFrame]) -> Option<Side> {
        (index == self.bar).then_some(self.side)
    }
}

/// Opens one position at a fixed bar and asks to exit on every bar from `exit_from`.
struct EnterThenExit {
    bar: usize,
    side: Side,
    exit_from: usize,
}

impl Strategy for EnterThenExit {
    fn name(&self) -> &str {
        "enter_then_exit"
    }

    fn decide_entry(&self, _: &[PriceBar], index: usize, _: &[IndicatorFrame]) -> Option<Side> {
        (index == self.bar).then_some(self.side)
    }

    fn decide_exit(&self, _: &[PriceBar], index: usize, _: &[IndicatorFrame], _: Side) -> bool {
        index >= self.exit_from
    }
}

/// Never trades; raises the cancel flag when it reaches `bar`.
struct CancelAt {
    bar: usize,
    flag: Arc<AtomicBool>,
}

impl Strategy for CancelAt {
    fn name(&self) -> &str {
        "cancel_at"
    }

    fn decide_entry(&self, _: &[PriceBar], index: usize, _: &[IndicatorFrame]) -> Option<Side> {
        if index == self.bar {
            self.flag.store(true, Ordering::Relaxed);
        }
        None
    }
}

fn enter_at(bar: usize, side: Side, risk: RiskParams) -> StrategyConfig {
    StrategyConfig::new("enter_at", risk, Box::new(EnterAt { bar, side }))
}

fn enter_then_exit(bar: usize, exit_from: usize, side: Side, risk: RiskParams) -> StrategyConfig {
    StrategyConfig::new(
        "enter_then_exit",
        risk,
        Box::new(EnterThenExit {
            bar,
            side,
            exit_from,
        }),
    )
}

fn risk(stop: f64, target: f64) -> RiskParams {
    RiskParams {
        stop_loss_pct: stop,
        take_profit_pct: target,
        ..RiskParams::default()
    }
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn flat_series_under_rsi_reversal_never_trades() {
    let series = series_from(&[100.0; 120]);
    let config = build_strategy("rsi_reversal").unwrap();
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.total_pnl(), 0.0);
    assert_eq!(result.final_equity, config.risk.initial_capital);
    assert_eq!(result.max_drawdown_pct(), 0.0);
}

#[test]
fn rising_series_hits_target() {
    let series = series_from(&geometric(70, 1.0));
    let config = enter_at(50, Side::Long, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::Target);
    assert_eq!(trade.entry_index, 50);
    assert_eq!(trade.exit_index, 54);
    assert_eq!(trade.bars_held, 4);
    assert!(trade.pnl > 0.0);
    assert!(trade.pnl_pct >= 4.0);
    assert!(result.open_position.is_none());
}

#[test]
fn falling_series_stops_out_long() {
    let series = series_from(&geometric(70, -1.0));
    let config = enter_at(50, Side::Long, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::StopLoss);
    assert_eq!(trade.exit_index, 53);
    assert!(trade.pnl < 0.0);
}

#[test]
fn stop_loss_outranks_exit_signal_on_same_bar() {
    // -1%/bar crosses the 2% stop on bar 53, where the strategy also asks out
    let series = series_from(&geometric(70, -1.0));
    let config = enter_then_exit(50, 53, Side::Long, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_index, 53);
    assert_eq!(trade.exit_reason, ExitReason::StopLoss);
}

#[test]
fn target_outranks_exit_signal_on_same_bar() {
    let series = series_from(&geometric(70, 1.0));
    let config = enter_then_exit(50, 54, Side::Long, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_index, 54);
    assert_eq!(trade.exit_reason, ExitReason::Target);
}

#[test]
fn exit_signal_fires_before_any_risk_exit() {
    let series = series_from(&geometric(70, -1.0));
    let config = enter_then_exit(50, 52, Side::Long, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.exit_index, 52);
    assert_eq!(trade.exit_reason, ExitReason::Signal);
}

#[test]
fn short_profits_on_falling_series() {
    let series = series_from(&geometric(70, -1.0));
    let config = enter_at(50, Side::Short, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.side, Side::Short);
    assert_eq!(trade.exit_reason, ExitReason::Target);
    assert_eq!(trade.exit_index, 55);
    let expected = (trade.entry_price - trade.exit_price) * trade.quantity as f64;
    assert!((trade.pnl - expected).abs() < 1e-9);
    assert!(trade.pnl > 0.0);
}

#[test]
fn short_stops_out_on_rising_series() {
    let series = series_from(&geometric(70, 1.0));
    let config = enter_at(50, Side::Short, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();
    assert_eq!(result.trades[0].exit_reason, ExitReason::StopLoss);
    assert!(result.trades[0].pnl < 0.0);
}

#[test]
fn time_exit_after_max_holding() {
    let series = series_from(&[100.0; 70]);
    let config = enter_at(
        50,
        Side::Long,
        RiskParams {
            max_holding_bars: Some(5),
            ..risk(2.0, 4.0)
        },
    );
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::TimeExit);
    assert_eq!(trade.exit_index, 55);
    assert_eq!(trade.pnl, 0.0);
    assert!(!trade.is_winner());
}

#[test]
fn trailing_stop_locks_in_gain() {
    let mut closes = geometric(56, 1.0);
    let peak = closes[55];
    closes.extend((1..=10).map(|k| peak * 0.99_f64.powi(k)));
    let series = series_from(&closes);
    let config = enter_at(
        50,
        Side::Long,
        RiskParams {
            trailing_stop_pct: Some(2.5),
            ..risk(2.0, 0.0)
        },
    );
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::TrailingStop);
    assert_eq!(trade.exit_index, 58);
    assert!(trade.pnl > 0.0);
}

#[test]
fn position_left_open_at_end_of_data() {
    let series = series_from(&geometric(60, 1.0));
    let config = enter_at(50, Side::Long, risk(0.0, 0.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

    assert!(result.trades.is_empty());
    let open = result.open_position.as_ref().unwrap();
    assert_eq!(open.entry_index, 50);
    assert_eq!(result.final_capital, result.initial_capital);
    let last_close = series.bars()[59].close;
    let expected = result.initial_capital + open.unrealized_pnl(last_close);
    assert!((result.final_equity - expected).abs() < 1e-6);
    assert!(result.final_equity > result.initial_capital);
}

#[test]
fn curves_cover_bars_from_warmup() {
    let series = series_from(&geometric(80, 0.5));
    let config = enter_at(50, Side::Long, risk(2.0, 4.0));
    let engine = EngineConfig::new(30);
    let result = run_backtest(&series, &config, &engine).unwrap();

    assert_eq!(result.equity_curve.len(), 50);
    assert_eq!(result.drawdown_curve.len(), 50);
    assert_eq!(result.equity_curve[0].timestamp, series.bars()[30].timestamp);
    assert!(result.drawdown_curve.iter().all(|p| p.drawdown_pct >= 0.0));
}

#[test]
fn no_entry_before_warmup() {
    let series = series_from(&geometric(70, 1.0));
    let config = enter_at(10, Side::Long, risk(2.0, 4.0));
    let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();
    assert!(result.trades.is_empty());
    assert!(result.open_position.is_none());
}

#[test]
fn invalid_position_size_rejected() {
    let series = series_from(&[100.0; 60]);
    let config = enter_at(
        50,
        Side::Long,
        RiskParams {
            position_size: 0.0,
            ..RiskParams::default()
        },
    );
    let err = run_backtest(&series, &config, &EngineConfig::default()).unwrap_err();
    assert_eq!(err, ConfigError::InvalidPositionSize(0.0));
}

#[test]
fn cancellation_stops_at_bar_boundary() {
    let flag = Arc::new(AtomicBool::new(false));
    let config = StrategyConfig::new(
        "cancel_at",
        RiskParams::default(),
        Box::new(CancelAt {
            bar: 60,
            flag: Arc::clone(&flag),
        }),
    );
    let series = series_from(&geometric(100, 0.2));
    let result =
        run_backtest_with_cancel(&series, &config, &EngineConfig::default(), &flag).unwrap();

    assert!(result.cancelled);
    // bars 50..=60 were simulated before the flag was seen
    assert_eq!(result.equity_curve.len(), 11);
}

#[test]
fn identical_inputs_identical_results() {
    let closes: Vec<f64> = (0..300)
        .map(|i| 100.0 + (i as f64 * 0.13).sin() * 8.0 + (i as f64 * 0.031).cos() * 5.0)
        .collect();
    let series = series_from(&closes);
    for preset in StrategyPreset::ALL {
        let config = preset.config();
        let a = run_backtest(&series, &config, &EngineConfig::default()).unwrap();
        let b = run_backtest(&series, &config, &EngineConfig::default()).unwrap();
        assert_eq!(a, b, "{preset}");
    }
}
