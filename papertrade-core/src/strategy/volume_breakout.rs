//! Volume-confirmed breakout of the trailing price channel.
//!
//! Long when the close breaks above the highest high of the previous
//! `lookback` bars on volume at least `volume_mult` times their average.
//! Short is the mirror on the lowest low. Positions exit when the close
//! crosses back through SMA(20).

use serde::{Deserialize, Serialize};

use super::Strategy;
use crate::domain::{PriceBar, Side};
use crate::frame::IndicatorFrame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBreakout {
    pub lookback: usize,
    pub volume_mult: f64,
}

impl VolumeBreakout {
    pub fn new(lookback: usize, volume_mult: f64) -> Self {
        assert!(lookback >= 1, "breakout lookback must be >= 1");
        Self {
            lookback,
            volume_mult,
        }
    }
}

impl Default for VolumeBreakout {
    fn default() -> Self {
        Self::new(20, 1.5)
    }
}

impl Strategy for VolumeBreakout {
    fn name(&self) -> &str {
        "volume_breakout"
    }

    fn decide_entry(
        &self,
        bars: &[PriceBar],
        index: usize,
        _frames: &[IndicatorFrame],
    ) -> Option<Side> {
        if index < self.lookback || index >= bars.len() {
            return None;
        }
        let bar = &bars[index];
        let window = &bars[index - self.lookback..index];

        let avg_volume =
            window.iter().map(|b| b.volume as f64).sum::<f64>() / self.lookback as f64;
        if avg_volume == 0.0 || (bar.volume as f64) < avg_volume * self.volume_mult {
            return None;
        }

        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        if bar.close > highest {
            Some(Side::Long)
        } else if bar.close < lowest {
            Some(Side::Short)
        } else {
            None
        }
    }

    fn decide_exit(
        &self,
        bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
        side: Side,
    ) -> bool {
        let (Some(bar), Some(f)) = (bars.get(index), frames.get(index)) else {
            return false;
        };
        match side {
            Side::Long => bar.close < f.sma20,
            Side::Short => bar.close > f.sma20,
        }
    }
}
