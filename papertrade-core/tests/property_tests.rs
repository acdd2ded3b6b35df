//! Property tests for indicator and engine invariants.
//!
//! Uses proptest to verify:
//! 1. Output length: every indicator returns one value per input
//! 2. Bounds: RSI in [0, 100], Bollinger upper >= middle >= lower
//! 3. Equity accounting: peak never decreases, drawdown never negative
//! 4. Trade log: one closed trade per exit, at most one open position
//! 5. Determinism: identical inputs give identical results

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use papertrade_core::domain::{PriceBar, PriceSeries};
use papertrade_core::engine::{run_backtest, EngineConfig};
use papertrade_core::indicators::{atr, bollinger, ema, rsi, sma};
use papertrade_core::strategy::StrategyPreset;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-3.0..3.0_f64, min_len..min_len + 150).prop_map(|moves| {
        let mut price = 100.0_f64;
        moves
            .into_iter()
            .map(|m| {
                price = (price * (1.0 + m / 100.0)).max(1.0);
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_preset() -> impl Strategy<Value = StrategyPreset> {
    prop::sample::select(StrategyPreset::ALL.to_vec())
}

fn to_series(closes: &[f64]) -> PriceSeries {
    let t0 = Utc.with_ymd_and_hms(2023, 6, 1, 9, 15, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(
                t0 + Duration::days(i as i64),
                open,
                open.max(close) + 0.5,
                (open.min(close) - 0.5).max(0.01),
                close,
                1_000 + (i as u64 * 37) % 900,
            )
        })
        .collect();
    PriceSeries::new("PROP", bars).unwrap()
}

// ── 1 & 2. Indicator shape and bounds ────────────────────────────────

proptest! {
    #[test]
    fn indicator_lengths_match_input(closes in arb_closes(1), period in 1usize..40) {
        let n = closes.len();
        prop_assert_eq!(sma(&closes, period).len(), n);
        prop_assert_eq!(ema(&closes, period).len(), n);
        prop_assert_eq!(rsi(&closes, period).len(), n);
        prop_assert_eq!(atr(to_series(&closes).bars(), period).len(), n);
    }

    #[test]
    fn sma_warmup_is_undefined(closes in arb_closes(1), period in 1usize..40) {
        let result = sma(&closes, period);
        let warmup = (period - 1).min(closes.len());
        prop_assert!(result[..warmup].iter().all(|v| v.is_nan()));
        prop_assert!(result[warmup..].iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn rsi_within_bounds(closes in arb_closes(2), period in 1usize..30) {
        for v in rsi(&closes, period).into_iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(&v), "RSI out of bounds: {}", v);
        }
    }

    #[test]
    fn bollinger_bands_ordered(
        closes in arb_closes(2),
        period in 1usize..30,
        mult in 0.0..4.0_f64,
    ) {
        let bands = bollinger(&closes, period, mult);
        for i in 0..closes.len() {
            if bands.middle[i].is_nan() {
                continue;
            }
            prop_assert!(bands.upper[i] >= bands.middle[i]);
            prop_assert!(bands.middle[i] >= bands.lower[i]);
        }
    }
}

// ── 3, 4 & 5. Engine invariants ──────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn equity_peak_and_drawdown_invariants(closes in arb_closes(60), preset in arb_preset()) {
        let series = to_series(&closes);
        let config = preset.config();
        let result = run_backtest(&series, &config, &EngineConfig::default()).unwrap();

        let mut peak = result.initial_capital;
        for (eq, dd) in result.equity_curve.iter().zip(&result.drawdown_curve) {
            let next = peak.max(eq.equity);
            prop_assert!(next >= peak);
            peak = next;
            prop_assert!(dd.drawdown_pct >= 0.0);
            let expected = (peak - eq.equity) / peak * 100.0;
            prop_assert!((dd.drawdown_pct - expected).abs() < 1e-9);
        }
        prop_assert!((result.peak_equity - peak).abs() < 1e-9);
    }

    #[test]
    fn trades_never_overlap(closes in arb_closes(60), preset in arb_preset()) {
        let series = to_series(&closes);
        let result = run_backtest(&series, &preset.config(), &EngineConfig::default()).unwrap();

        for trade in &result.trades {
            prop_assert!(trade.exit_index > trade.entry_index);
            prop_assert!(trade.entry_index >= result.warmup_bars);
        }
        // Each trade ends strictly before the next one starts: one slot, no re-entry on exit bar.
        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].entry_index > pair[0].exit_index);
        }
        if let (Some(open), Some(last)) = (&result.open_position, result.trades.last()) {
            prop_assert!(open.entry_index > last.exit_index);
        }

        let realized: f64 = result.trades.iter().map(|t| t.pnl).sum();
        prop_assert!((result.final_capital - (result.initial_capital + realized)).abs() < 1e-6);
    }

    #[test]
    fn backtest_is_deterministic(closes in arb_closes(60), preset in arb_preset()) {
        let series = to_series(&closes);
        let config = preset.config();
        let a = run_backtest(&series, &config, &EngineConfig::default()).unwrap();
        let b = run_backtest(&series, &config, &EngineConfig::default()).unwrap();
        prop_assert_eq!(a, b);
    }
}
