//! MACD line / signal line crossover (12/26/9).

use super::{crossed_above, crossed_below, frame_pair, Strategy};
use crate::domain::{PriceBar, Side};
use crate::frame::IndicatorFrame;

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdCrossover;

impl Strategy for MacdCrossover {
    fn name(&self) -> &str {
        "macd_crossover"
    }

    fn decide_entry(
        &self,
        _bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
    ) -> Option<Side> {
        let (prev, cur) = frame_pair(frames, index)?;
        if crossed_above(prev.macd, prev.macd_signal, cur.macd, cur.macd_signal) {
            Some(Side::Long)
        } else if crossed_below(prev.macd, prev.macd_signal, cur.macd, cur.macd_signal) {
            Some(Side::Short)
        } else {
            None
        }
    }

    /// Exit on the opposite crossover.
    fn decide_exit(
        &self,
        bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
        side: Side,
    ) -> bool {
        match self.decide_entry(bars, index, frames) {
            Some(Side::Short) => side == Side::Long,
            Some(Side::Long) => side == Side::Short,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::blank;

    fn with_macd(line: &[f64], signal: &[f64]) -> (Vec<PriceBar>, Vec<IndicatorFrame>) {
        let (bars, mut frames) = blank(line.len());
        for (i, f) in frames.iter_mut().enumerate() {
            f.macd = line[i];
            f.macd_signal = signal[i];
        }
        (bars, frames)
    }

    #[test]
    fn crosses_open_positions() {
        let (bars, frames) = with_macd(&[-0.5, 0.2, -0.1], &[0.0, 0.0, 0.0]);
        assert_eq!(MacdCrossover.decide_entry(&bars, 1, &frames), Some(Side::Long));
        assert_eq!(MacdCrossover.decide_entry(&bars, 2, &frames), Some(Side::Short));
    }

    #[test]
    fn opposite_cross_exits() {
        let (bars, frames) = with_macd(&[-0.5, 0.2, -0.1], &[0.0, 0.0, 0.0]);
        assert!(MacdCrossover.decide_exit(&bars, 2, &frames, Side::Long));
        assert!(!MacdCrossover.decide_exit(&bars, 2, &frames, Side::Short));
        assert!(MacdCrossover.decide_exit(&bars, 1, &frames, Side::Short));
    }

    #[test]
    fn undefined_signal_line_is_ignored() {
        let (bars, frames) = with_macd(&[-0.5, 0.2], &[f64::NAN, f64::NAN]);
        assert_eq!(MacdCrossover.decide_entry(&bars, 1, &frames), None);
    }
}
