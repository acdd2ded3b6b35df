//! PriceBar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV sample for a single sampling interval.
///
/// Bars are immutable once produced. `volume` is a share/contract count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLC sanity: positive prices, high above open/close, low below open/close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.open > 0.0
            && self.close > 0.0
            && self.low > 0.0
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }

    /// (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> PriceBar {
        PriceBar::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 15, 0).unwrap(),
            100.0,
            105.0,
            98.0,
            103.0,
            50_000,
        )
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_high_below_close() {
        let mut bar = sample_bar();
        bar.high = 102.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_non_positive_price() {
        let mut bar = sample_bar();
        bar.low = 0.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn typical_price() {
        let bar = sample_bar();
        assert!((bar.typical_price() - (105.0 + 98.0 + 103.0) / 3.0).abs() < 1e-12);
    }
}
