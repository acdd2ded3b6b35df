//! IndicatorFrame precompute.
//!
//! Every indicator is computed once over the whole series before the bar loop.
//! Strategies and the feature aggregator then read frames by index; nothing
//! recomputes per bar.

use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::indicators::{
    adx, atr, bollinger, ema, macd, obv, rsi, sma, vwap, SessionReset,
};

pub const SMA_FAST: usize = 20;
pub const SMA_SLOW: usize = 50;
pub const EMA_FAST: usize = 12;
pub const EMA_SLOW: usize = 26;
pub const RSI_PERIOD: usize = 14;
pub const MACD_SIGNAL: usize = 9;
pub const BB_PERIOD: usize = 20;
pub const BB_MULT: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;

/// Per-bar snapshot of every precomputed indicator.
///
/// Fields inside their indicator's warm-up window are `f64::NAN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub sma20: f64,
    pub sma50: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub atr: f64,
    pub adx: f64,
    pub obv: f64,
    pub vwap: f64,
}

/// Names a single frame field, for generic access and tabular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameField {
    Sma20,
    Sma50,
    Ema12,
    Ema26,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbUpper,
    BbMiddle,
    BbLower,
    Atr,
    Adx,
    Obv,
    Vwap,
}

impl FrameField {
    pub const ALL: [FrameField; 15] = [
        FrameField::Sma20,
        FrameField::Sma50,
        FrameField::Ema12,
        FrameField::Ema26,
        FrameField::Rsi,
        FrameField::Macd,
        FrameField::MacdSignal,
        FrameField::MacdHistogram,
        FrameField::BbUpper,
        FrameField::BbMiddle,
        FrameField::BbLower,
        FrameField::Atr,
        FrameField::Adx,
        FrameField::Obv,
        FrameField::Vwap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FrameField::Sma20 => "sma20",
            FrameField::Sma50 => "sma50",
            FrameField::Ema12 => "ema12",
            FrameField::Ema26 => "ema26",
            FrameField::Rsi => "rsi",
            FrameField::Macd => "macd",
            FrameField::MacdSignal => "macd_signal",
            FrameField::MacdHistogram => "macd_histogram",
            FrameField::BbUpper => "bb_upper",
            FrameField::BbMiddle => "bb_middle",
            FrameField::BbLower => "bb_lower",
            FrameField::Atr => "atr",
            FrameField::Adx => "adx",
            FrameField::Obv => "obv",
            FrameField::Vwap => "vwap",
        }
    }

    /// First index at which the field is steadily defined.
    pub fn lookback(self) -> usize {
        match self {
            FrameField::Sma20 | FrameField::BbUpper | FrameField::BbMiddle | FrameField::BbLower => {
                SMA_FAST - 1
            }
            FrameField::Sma50 => SMA_SLOW - 1,
            FrameField::Ema12 => EMA_FAST - 1,
            FrameField::Ema26 | FrameField::Macd => EMA_SLOW - 1,
            FrameField::Rsi => RSI_PERIOD,
            FrameField::MacdSignal | FrameField::MacdHistogram => EMA_SLOW + MACD_SIGNAL - 2,
            FrameField::Atr => ATR_PERIOD - 1,
            FrameField::Adx => 2 * ADX_PERIOD - 1,
            FrameField::Obv | FrameField::Vwap => 0,
        }
    }
}

impl IndicatorFrame {
    /// A frame with every field undefined.
    pub fn undefined() -> Self {
        Self {
            sma20: f64::NAN,
            sma50: f64::NAN,
            ema12: f64::NAN,
            ema26: f64::NAN,
            rsi: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
            macd_histogram: f64::NAN,
            bb_upper: f64::NAN,
            bb_middle: f64::NAN,
            bb_lower: f64::NAN,
            atr: f64::NAN,
            adx: f64::NAN,
            obv: f64::NAN,
            vwap: f64::NAN,
        }
    }

    pub fn get(&self, field: FrameField) -> f64 {
        match field {
            FrameField::Sma20 => self.sma20,
            FrameField::Sma50 => self.sma50,
            FrameField::Ema12 => self.ema12,
            FrameField::Ema26 => self.ema26,
            FrameField::Rsi => self.rsi,
            FrameField::Macd => self.macd,
            FrameField::MacdSignal => self.macd_signal,
            FrameField::MacdHistogram => self.macd_histogram,
            FrameField::BbUpper => self.bb_upper,
            FrameField::BbMiddle => self.bb_middle,
            FrameField::BbLower => self.bb_lower,
            FrameField::Atr => self.atr,
            FrameField::Adx => self.adx,
            FrameField::Obv => self.obv,
            FrameField::Vwap => self.vwap,
        }
    }

    /// False while the field is still inside its warm-up window.
    pub fn is_defined(&self, field: FrameField) -> bool {
        !self.get(field).is_nan()
    }

    /// True once every field has left its warm-up window.
    pub fn is_complete(&self) -> bool {
        FrameField::ALL.iter().all(|&f| self.is_defined(f))
    }
}

/// Largest lookback across all frame fields.
pub fn frame_warmup() -> usize {
    FrameField::ALL.iter().map(|f| f.lookback()).max().unwrap_or(0)
}

/// Compute one frame per bar.
pub fn compute_frames(series: &PriceSeries) -> Vec<IndicatorFrame> {
    let bars = series.bars();
    let closes = series.closes();

    let sma20 = sma(&closes, SMA_FAST);
    let sma50 = sma(&closes, SMA_SLOW);
    let ema12 = ema(&closes, EMA_FAST);
    let ema26 = ema(&closes, EMA_SLOW);
    let rsi14 = rsi(&closes, RSI_PERIOD);
    let macd_lines = macd(&closes, EMA_FAST, EMA_SLOW, MACD_SIGNAL);
    let bands = bollinger(&closes, BB_PERIOD, BB_MULT);
    let atr14 = atr(bars, ATR_PERIOD);
    let adx14 = adx(bars, ADX_PERIOD);
    let obv_series = obv(bars);
    let vwap_series = vwap(bars, SessionReset::Never);

    (0..bars.len())
        .map(|i| IndicatorFrame {
            sma20: sma20[i],
            sma50: sma50[i],
            ema12: ema12[i],
            ema26: ema26[i],
            rsi: rsi14[i],
            macd: macd_lines.line[i],
            macd_signal: macd_lines.signal[i],
            macd_histogram: macd_lines.histogram[i],
            bb_upper: bands.upper[i],
            bb_middle: bands.middle[i],
            bb_lower: bands.lower[i],
            atr: atr14[i],
            adx: adx14[i],
            obv: obv_series[i],
            vwap: vwap_series[i],
        })
        .collect()
}
