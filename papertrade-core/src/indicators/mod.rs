//! Technical indicator library.
//!
//! Every indicator exists in two forms:
//! - a pure function over a numeric series (or bar slice for OHLCV-based ones)
//!   returning a `Vec<f64>` of the same length, and
//! - a struct implementing [`Indicator`], computing over close prices or bars.
//!
//! Positions before an indicator's warm-up window hold `f64::NAN`. Callers must
//! read NaN as "insufficient history", never as zero. A period larger than the
//! series yields an all-NaN output (EMA keeps its index-0 seed).

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod vwap;

pub use adx::{adx, Adx};
pub use atr::{atr, true_range, Atr};
pub use bollinger::{bollinger, Bollinger, BollingerBand, BollingerBands};
pub use ema::{ema, ema_of_defined, Ema};
pub use macd::{macd, Macd, MacdComponent, MacdLines};
pub use obv::{obv, Obv};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};
pub use vwap::{vwap, SessionReset, Vwap};

use crate::domain::PriceBar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. Values inside the warm-up window are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces its steady-state output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

pub(crate) fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high = max(open,close) + 1,
/// low = min(open,close) - 1, volume = 1000, one bar per day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    use chrono::{Duration, TimeZone, Utc};
    let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 9, 15, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(
                t0 + Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
