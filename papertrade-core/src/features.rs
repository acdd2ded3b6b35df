//! Feature aggregator: a fixed-order numeric vector per bar index.
//!
//! This is the input contract for an external classifier. The order of
//! [`FEATURE_NAMES`] is stable; append new features, never reorder.
//!
//! Groups: price change (5), volume (3), indicator (9), moving average (6),
//! candle pattern (4), time of day (2).
//!
//! Time-of-day features read the bar timestamp in UTC. Exchange-local
//! sessions are shifted by their offset (NSE 09:15 IST is 03:45 UTC).

use chrono::{Datelike, Timelike};

use crate::domain::PriceSeries;
use crate::frame::IndicatorFrame;

pub const FEATURE_COUNT: usize = 29;

/// Bars of history required before a vector is produced.
pub const FEATURE_LOOKBACK: usize = 50;

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Published feature names, index-aligned with [`FeatureVector`].
///
/// `hour_of_day` is UTC minutes since midnight / 1440; `day_of_week` is
/// days since Monday / 6, also in UTC.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // price change
    "return_1",
    "return_5",
    "return_10",
    "return_20",
    "range_pct",
    // volume
    "volume_ratio_20",
    "volume_change_1",
    "obv_slope_5",
    // indicator
    "rsi",
    "macd",
    "macd_signal",
    "macd_histogram",
    "bb_position",
    "bb_width",
    "atr_pct",
    "adx",
    "vwap_distance",
    // moving average
    "close_vs_sma20",
    "close_vs_sma50",
    "close_vs_ema12",
    "close_vs_ema26",
    "sma20_vs_sma50",
    "ema12_vs_ema26",
    // candle pattern
    "body_pct",
    "upper_wick",
    "lower_wick",
    "is_bullish",
    // time of day
    "hour_of_day",
    "day_of_week",
];

/// num / den, or 0 when the quotient is not finite.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let q = num / den;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}

/// Relative distance of `a` from `b`: a / b - 1.
fn rel(a: f64, b: f64) -> f64 {
    ratio(a - b, b)
}

/// Extract the feature vector at `index`.
///
/// Returns `None` when `index` is out of range or has fewer than
/// [`FEATURE_LOOKBACK`] bars of history.
pub fn extract_features(
    series: &PriceSeries,
    frames: &[IndicatorFrame],
    index: usize,
) -> Option<FeatureVector> {
    let bars = series.bars();
    if index >= bars.len() || index >= frames.len() || index < FEATURE_LOOKBACK {
        return None;
    }

    let bar = &bars[index];
    let frame = &frames[index];
    let close = bar.close;
    let close_back = |k: usize| bars[index - k].close;
    let volume = bar.volume as f64;

    let avg_volume_20 = bars[index + 1 - 20..=index]
        .iter()
        .map(|b| b.volume as f64)
        .sum::<f64>()
        / 20.0;
    let volume_5: f64 = bars[index + 1 - 5..=index]
        .iter()
        .map(|b| b.volume as f64)
        .sum();

    let range = bar.high - bar.low;
    let body_top = bar.open.max(close);
    let body_bottom = bar.open.min(close);
    let minutes = bar.timestamp.hour() * 60 + bar.timestamp.minute();

    let mut v = [0.0; FEATURE_COUNT];

    v[0] = rel(close, close_back(1));
    v[1] = rel(close, close_back(5));
    v[2] = rel(close, close_back(10));
    v[3] = rel(close, close_back(20));
    v[4] = ratio(range, close);

    v[5] = ratio(volume, avg_volume_20);
    v[6] = rel(volume, bars[index - 1].volume as f64);
    v[7] = ratio(frame.obv - frames[index - 5].obv, volume_5);

    v[8] = ratio(frame.rsi, 100.0);
    v[9] = ratio(frame.macd, close);
    v[10] = ratio(frame.macd_signal, close);
    v[11] = ratio(frame.macd_histogram, close);
    v[12] = ratio(close - frame.bb_lower, frame.bb_upper - frame.bb_lower);
    v[13] = ratio(frame.bb_upper - frame.bb_lower, frame.bb_middle);
    v[14] = ratio(frame.atr, close);
    v[15] = ratio(frame.adx, 100.0);
    v[16] = rel(close, frame.vwap);

    v[17] = rel(close, frame.sma20);
    v[18] = rel(close, frame.sma50);
    v[19] = rel(close, frame.ema12);
    v[20] = rel(close, frame.ema26);
    v[21] = rel(frame.sma20, frame.sma50);
    v[22] = rel(frame.ema12, frame.ema26);

    v[23] = rel(close, bar.open);
    v[24] = ratio(bar.high - body_top, range);
    v[25] = ratio(body_bottom - bar.low, range);
    v[26] = if close > bar.open { 1.0 } else { 0.0 };

    v[27] = minutes as f64 / 1440.0;
    v[28] = bar.timestamp.weekday().num_days_from_monday() as f64 / 6.0;

    Some(v)
}

/// Feature vectors for every index, `None` where history is insufficient.
pub fn extract_all(series: &PriceSeries, frames: &[IndicatorFrame]) -> Vec<Option<FeatureVector>> {
    (0..series.len())
        .map(|i| extract_features(series, frames, i))
        .collect()
}
