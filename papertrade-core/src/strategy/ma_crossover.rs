//! Moving average crossover on SMA(20) / SMA(50).
//!
//! Golden cross opens a long, death cross opens a short. A position exits
//! once the averages are back on the wrong side of each other.

use super::{crossed_above, crossed_below, frame_pair, Strategy};
use crate::domain::{PriceBar, Side};
use crate::frame::IndicatorFrame;

#[derive(Debug, Clone, Copy, Default)]
pub struct MaCrossover;

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn decide_entry(
        &self,
        _bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
    ) -> Option<Side> {
        let (prev, cur) = frame_pair(frames, index)?;
        if crossed_above(prev.sma20, prev.sma50, cur.sma20, cur.sma50) {
            Some(Side::Long)
        } else if crossed_below(prev.sma20, prev.sma50, cur.sma20, cur.sma50) {
            Some(Side::Short)
        } else {
            None
        }
    }

    fn decide_exit(
        &self,
        _bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
        side: Side,
    ) -> bool {
        let Some(f) = frames.get(index) else {
            return false;
        };
        match side {
            Side::Long => f.sma20 < f.sma50,
            Side::Short => f.sma20 > f.sma50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::blank;

    fn with_mas(fast: &[f64], slow: &[f64]) -> (Vec<PriceBar>, Vec<IndicatorFrame>) {
        let (bars, mut frames) = blank(fast.len());
        for (i, f) in frames.iter_mut().enumerate() {
            f.sma20 = fast[i];
            f.sma50 = slow[i];
        }
        (bars, frames)
    }

    #[test]
    fn golden_and_death_cross() {
        let (bars, frames) = with_mas(&[95.0, 101.0, 99.0], &[100.0, 100.0, 100.0]);
        assert_eq!(MaCrossover.decide_entry(&bars, 1, &frames), Some(Side::Long));
        assert_eq!(MaCrossover.decide_entry(&bars, 2, &frames), Some(Side::Short));
    }

    #[test]
    fn no_cross_no_entry() {
        let (bars, frames) = with_mas(&[101.0, 102.0], &[100.0, 100.0]);
        assert_eq!(MaCrossover.decide_entry(&bars, 1, &frames), None);
    }

    #[test]
    fn exit_when_averages_invert() {
        let (bars, frames) = with_mas(&[99.0], &[100.0]);
        assert!(MaCrossover.decide_exit(&bars, 0, &frames, Side::Long));
        assert!(!MaCrossover.decide_exit(&bars, 0, &frames, Side::Short));
    }
}
