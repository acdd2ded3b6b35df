//! Backtest simulation loop and its result types.
//!
//! The loop is a single-threaded fold over an immutable series: at most one
//! open position, exits before entries on each bar, and a mark-to-market
//! equity point per bar from the warm-up index onward.

pub mod exits;
pub mod loop_runner;
pub mod state;

pub use exits::risk_exit;
pub use loop_runner::{run_backtest, run_backtest_with_cancel, run_backtest_with_frames};
pub use state::{DrawdownPoint, EngineConfig, EquityPoint, RunResult, DEFAULT_WARMUP_BARS};
