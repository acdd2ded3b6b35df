//! Strategy contract and the built-in strategy catalog.
//!
//! Strategies are position-agnostic: they see bar history and precomputed
//! frames, plus the side of the open position when asked about an exit.
//! Capital, quantity and entry price stay with the simulation loop.

pub mod bollinger_reversion;
pub mod catalog;
pub mod ma_crossover;
pub mod macd_crossover;
pub mod rsi_reversal;
pub mod volume_breakout;

pub use bollinger_reversion::BollingerReversion;
pub use catalog::{build_strategy, StrategyPreset};
pub use ma_crossover::MaCrossover;
pub use macd_crossover::MacdCrossover;
pub use rsi_reversal::RsiReversal;
pub use volume_breakout::VolumeBreakout;

use crate::domain::{PriceBar, Side};
use crate::frame::IndicatorFrame;

/// Entry and exit decisions for one strategy.
///
/// Implementations must only read `bars[..=index]` and `frames[..=index]`.
pub trait Strategy: Send + Sync {
    /// Catalog name (e.g. "rsi_reversal").
    fn name(&self) -> &str;

    /// Side to open at `index`, if any. Only called while flat.
    fn decide_entry(
        &self,
        bars: &[PriceBar],
        index: usize,
        frames: &[IndicatorFrame],
    ) -> Option<Side>;

    /// Whether to close a position of `side` at `index`. Only called while in
    /// a position, and after the risk exits have been checked.
    fn decide_exit(
        &self,
        _bars: &[PriceBar],
        _index: usize,
        _frames: &[IndicatorFrame],
        _side: Side,
    ) -> bool {
        false
    }
}

/// The previous and current frame, or `None` at index 0 or out of range.
pub(crate) fn frame_pair(
    frames: &[IndicatorFrame],
    index: usize,
) -> Option<(&IndicatorFrame, &IndicatorFrame)> {
    if index == 0 || index >= frames.len() {
        return None;
    }
    Some((&frames[index - 1], &frames[index]))
}

/// `a` crossed strictly above `b` between the previous and current bar.
/// NaN on either side never counts as a cross.
pub(crate) fn crossed_above(prev_a: f64, prev_b: f64, cur_a: f64, cur_b: f64) -> bool {
    prev_a <= prev_b && cur_a > cur_b
}

/// `a` crossed strictly below `b` between the previous and current bar.
pub(crate) fn crossed_below(prev_a: f64, prev_b: f64, cur_a: f64, cur_b: f64) -> bool {
    prev_a >= prev_b && cur_a < cur_b
}
