//! Exponential Moving Average (EMA).
//!
//! Seed: EMA[0] = x[0]; EMA[period-1] = SMA of the first `period` values.
//! Recurrence: EMA[i] = (x[i] - EMA[i-1]) * 2/(period+1) + EMA[i-1].
//! Indices 1..period-1 are NaN.
//!
//! The index-0 raw seed is kept for compatibility with existing consumers of
//! the warm-up region; the steady-state values are unaffected by it.
//! Lookback: period - 1.

use super::{closes, Indicator};
use crate::domain::PriceBar;

pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "EMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n == 0 {
        return result;
    }
    result[0] = values[0];

    if n < period {
        return result;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;
    recur(values, &mut result, period, period - 1);
    result
}

/// EMA over the defined tail of a series that starts with NaN (or has NaN gaps).
///
/// Only the longest NaN-free suffix is used. It is seeded with the SMA of its
/// first `period` values; there is no raw seed. Everything before
/// `tail_start + period - 1` is NaN.
pub fn ema_of_defined(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "EMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let start = values.iter().rposition(|v| v.is_nan()).map_or(0, |p| p + 1);
    if n - start < period {
        return result;
    }

    let seed_at = start + period - 1;
    result[seed_at] = values[start..=seed_at].iter().sum::<f64>() / period as f64;
    recur(values, &mut result, period, seed_at);
    result
}

fn recur(values: &[f64], result: &mut [f64], period: usize, seed_at: usize) {
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = result[seed_at];
    for i in (seed_at + 1)..values.len() {
        let next = (values[i] - prev) * k + prev;
        result[i] = next;
        prev = next;
    }
}

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        ema(&closes(bars), self.period)
    }
}
