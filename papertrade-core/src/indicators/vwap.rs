//! Volume-weighted average price, cumulative approximation.
//!
//! VWAP[t] = sum(typical * volume) / sum(volume) over the current session,
//! typical = (high + low + close) / 3. Where the session has seen no volume
//! yet the value is NaN.
//!
//! With [`SessionReset::Never`] the whole series is one session. That is a
//! running average, not a true intraday VWAP.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::PriceBar;

/// When the cumulative sums restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionReset {
    #[default]
    Never,
    /// Restart whenever the UTC calendar date changes.
    Daily,
}

pub fn vwap(bars: &[PriceBar], reset: SessionReset) -> Vec<f64> {
    let mut result = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0_f64;
    let mut cum_vol = 0.0_f64;

    for (i, bar) in bars.iter().enumerate() {
        if reset == SessionReset::Daily
            && i > 0
            && bar.timestamp.date_naive() != bars[i - 1].timestamp.date_naive()
        {
            cum_pv = 0.0;
            cum_vol = 0.0;
        }

        let volume = bar.volume as f64;
        cum_pv += bar.typical_price() * volume;
        cum_vol += volume;

        result.push(if cum_vol == 0.0 {
            f64::NAN
        } else {
            cum_pv / cum_vol
        });
    }

    result
}

#[derive(Debug, Clone)]
pub struct Vwap {
    reset: SessionReset,
    name: String,
}

impl Vwap {
    pub fn new(reset: SessionReset) -> Self {
        let name = match reset {
            SessionReset::Never => "vwap".to_string(),
            SessionReset::Daily => "vwap_daily".to_string(),
        };
        Self { reset, name }
    }
}

impl Default for Vwap {
    fn default() -> Self {
        Self::new(SessionReset::Never)
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        vwap(bars, self.reset)
    }
}
