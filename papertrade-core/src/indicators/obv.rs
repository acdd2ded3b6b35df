//! On-Balance Volume (OBV).
//!
//! Running sum of signed volume: +volume when the close rose, -volume when it
//! fell, unchanged otherwise. Seeded at 0 on the first bar, so OBV has no
//! warm-up window.

use super::Indicator;
use crate::domain::PriceBar;

pub fn obv(bars: &[PriceBar]) -> Vec<f64> {
    let mut result = Vec::with_capacity(bars.len());
    let mut running = 0.0_f64;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev_close = bars[i - 1].close;
            if bar.close > prev_close {
                running += bar.volume as f64;
            } else if bar.close < prev_close {
                running -= bar.volume as f64;
            }
        }
        result.push(running);
    }

    result
}

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        obv(bars)
    }
}
