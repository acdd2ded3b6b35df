//! Relative Strength Index (RSI).
//!
//! Simple averages (not Wilder-smoothed) of gains and losses over each
//! trailing window of `period` price changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge case: avg_loss == 0 → RSI = 100 (this includes a flat window).

use super::{closes, Indicator};
use crate::domain::PriceBar;

pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "RSI period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period + 1 {
        return result;
    }

    'bars: for i in period..n {
        let mut gains = 0.0;
        let mut losses = 0.0;
        for j in (i + 1 - period)..=i {
            let change = values[j] - values[j - 1];
            if change.is_nan() {
                continue 'bars;
            }
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }
        result[i] = rsi_from_averages(gains / period as f64, losses / period as f64);
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rsi(&closes(bars), self.period)
    }
}
