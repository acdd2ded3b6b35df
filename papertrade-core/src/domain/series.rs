//! PriceSeries: an ordered, validated sequence of bars for one symbol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::PriceBar;

/// Reasons a bar sequence is rejected as a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index}: timestamp is not after the previous bar")]
    NonMonotonicTimestamp { index: usize },
    #[error("bar {index}: inconsistent OHLC (open={open}, high={high}, low={low}, close={close})")]
    InconsistentOhlc {
        index: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// Ordered bar sequence, index 0 = earliest.
///
/// The series is read-only for the duration of a backtest; runs borrow it.
/// Deserialization goes through [`PriceSeries::new`], so it is checked too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

/// Wire shape of a series before validation.
#[derive(Deserialize)]
struct RawSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl TryFrom<RawSeries> for PriceSeries {
    type Error = SeriesError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.symbol, raw.bars)
    }
}

impl PriceSeries {
    /// Build a series, checking strictly increasing timestamps and OHLC consistency.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InconsistentOhlc {
                    index,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::NonMonotonicTimestamp { index });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Build a series without validation. The caller vouches for the invariants.
    pub fn new_unchecked(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
