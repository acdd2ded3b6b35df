//! Domain types: bars, series, positions, trades.

pub mod bar;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::PriceBar;
pub use position::{OpenPosition, Side};
pub use series::{PriceSeries, SeriesError};
pub use trade::{ClosedTrade, ExitReason};
