use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a position or entry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

/// The single open position held by a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub entry_index: usize,
    pub quantity: u64,
    /// Best close in the position's favour since entry (highest for long, lowest for short).
    pub best_close: f64,
}

impl OpenPosition {
    pub fn open(
        side: Side,
        entry_price: f64,
        entry_time: DateTime<Utc>,
        entry_index: usize,
        quantity: u64,
    ) -> Self {
        Self {
            side,
            entry_price,
            entry_time,
            entry_index,
            quantity,
            best_close: entry_price,
        }
    }

    /// Signed price move relative to entry, in percent. Positive = in favour.
    pub fn move_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0 * self.side.sign()
    }

    /// Retracement from the best favourable close, in percent (>= 0).
    pub fn retrace_pct(&self, price: f64) -> f64 {
        ((self.best_close - price) / self.best_close * 100.0 * self.side.sign()).max(0.0)
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.quantity as f64 * self.side.sign()
    }

    pub fn bars_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    /// Ratchet the favourable-close watermark.
    pub fn observe_close(&mut self, close: f64) {
        self.best_close = match self.side {
            Side::Long => self.best_close.max(close),
            Side::Short => self.best_close.min(close),
        };
    }
}
