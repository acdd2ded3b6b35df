//! ClosedTrade: a completed round trip, written once and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::{OpenPosition, Side};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Signal,
    StopLoss,
    Target,
    TrailingStop,
    TimeExit,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::Signal => "SIGNAL",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::Target => "TARGET",
            ExitReason::TrailingStop => "TRAILING_STOP",
            ExitReason::TimeExit => "TIME_EXIT",
        }
    }
}

/// A complete round-trip trade: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub side: Side,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    pub quantity: u64,

    // ── PnL ──
    pub pnl: f64,
    /// Percent move relative to entry price (not to capital).
    pub pnl_pct: f64,

    pub bars_held: usize,
}

impl ClosedTrade {
    /// Realize an open position at `exit_price`.
    pub fn close(
        position: &OpenPosition,
        exit_index: usize,
        exit_time: DateTime<Utc>,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        let pnl = position.unrealized_pnl(exit_price);
        let pnl_pct = position.move_pct(exit_price);
        Self {
            side: position.side,
            entry_index: position.entry_index,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_index,
            exit_time,
            exit_price,
            exit_reason,
            quantity: position.quantity,
            pnl,
            pnl_pct,
            bars_held: position.bars_held(exit_index),
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Holding time in fractional days.
    pub fn holding_days(&self) -> f64 {
        (self.exit_time - self.entry_time).num_milliseconds() as f64 / 86_400_000.0
    }
}
