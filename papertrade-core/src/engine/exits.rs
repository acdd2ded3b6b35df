//! Risk exits, checked in fixed priority order.
//!
//! 1. Stop-loss: adverse move >= stop_loss_pct
//! 2. Trailing stop: retrace from the best close >= trailing_stop_pct
//! 3. Target: favourable move >= take_profit_pct
//! 4. Time exit: bars held >= max_holding_bars
//!
//! The strategy's own exit signal ranks below all of these and is asked by
//! the loop only when none fires. A percent of 0 disables its exit.

use crate::config::RiskParams;
use crate::domain::{ExitReason, OpenPosition};

/// First risk exit that fires at `close` on bar `index`, if any.
///
/// The position's best-close watermark must already include `close`.
pub fn risk_exit(
    position: &OpenPosition,
    close: f64,
    index: usize,
    risk: &RiskParams,
) -> Option<ExitReason> {
    let move_pct = position.move_pct(close);

    if risk.stop_loss_pct > 0.0 && move_pct <= -risk.stop_loss_pct {
        return Some(ExitReason::StopLoss);
    }

    if let Some(trail) = risk.trailing_stop_pct.filter(|t| *t > 0.0) {
        if position.retrace_pct(close) >= trail {
            return Some(ExitReason::TrailingStop);
        }
    }

    if risk.take_profit_pct > 0.0 && move_pct >= risk.take_profit_pct {
        return Some(ExitReason::Target);
    }

    if let Some(max_bars) = risk.max_holding_bars {
        if position.bars_held(index) >= max_bars {
            return Some(ExitReason::TimeExit);
        }
    }

    None
}
