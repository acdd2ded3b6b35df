//! RSI reversal: fade exhaustion at the oversold/overbought thresholds.
//!
//! Long when RSI climbs back above `oversold`, short when it drops back
//! below `overbought`. A long exits once RSI reaches `overbought`, a short
//! once it reaches `oversold`.

use serde::{Deserialize, Serialize};

use super::{crossed_above, crossed_below, frame_pair, Strategy};
use crate::domain::{PriceBar, Side};
use crate::frame::IndicatorFrame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReversal {
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiReversal {
    pub fn new(oversold: f64, overbought: f64) -> Self {
        assert!(
            oversold < overbought,
            "oversold threshold must be below overbought"
        );
        Self {
            oversold,
            overbought,
        }
    }
}

impl Default for RsiReversal {
    fn default() -> Self {
        Self::new(30.0, 70.0)
    }
}

impl Strategy for RsiReversal {
    fn name(&self) -> &str {
        "rsi_reversal"
    }

    fn decide_entry(
        &self,
        _bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
    ) -> Option<Side> {
        let (prev, cur) = frame_pair(frames, index)?;
        if crossed_above(prev.rsi, self.oversold, cur.rsi, self.oversold) {
            return Some(Side::Long);
        }
        if crossed_below(prev.rsi, self.overbought, cur.rsi, self.overbought) {
            return Some(Side::Short);
        }
        None
    }

    fn decide_exit(
        &self,
        _bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
        side: Side,
    ) -> bool {
        let Some(frame) = frames.get(index) else {
            return false;
        };
        match side {
            Side::Long => frame.rsi >= self.overbought,
            Side::Short => frame.rsi <= self.oversold,
        }
    }
}
