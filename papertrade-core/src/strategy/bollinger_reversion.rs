//! Bollinger mean reversion.
//!
//! Long when the close pierces the lower band, short when it pierces the
//! upper band. Exit when the close gets back to the middle band.

use super::Strategy;
use crate::domain::{PriceBar, Side};
use crate::frame::IndicatorFrame;

#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerReversion;

impl Strategy for BollingerReversion {
    fn name(&self) -> &str {
        "bollinger_reversion"
    }

    fn decide_entry(
        &self,
        bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
    ) -> Option<Side> {
        let close = bars.get(index)?.close;
        let f = frames.get(index)?;
        if close < f.bb_lower {
            Some(Side::Long)
        } else if close > f.bb_upper {
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
            Side::Long => bar.close >= f.bb_middle,
            Side::Short => bar.close <= f.bb_middle,
        }
    }
}
