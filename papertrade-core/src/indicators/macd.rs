//! MACD: moving average convergence/divergence.
//!
//! line = EMA(fast) - EMA(slow); signal = EMA(signal) of the line's defined
//! tail; histogram = line - signal.
//!
//! Because EMA keeps a raw seed at index 0, the line is 0.0 at index 0 and NaN
//! until index slow-1. The signal line starts from the defined tail only.

use super::ema::{ema, ema_of_defined};
use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct MacdLines {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_defined(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(l, s)| l - s).collect();
    MacdLines {
        line,
        signal: signal_line,
        histogram,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdComponent {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    component: MacdComponent,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, component: MacdComponent) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        let label = match component {
            MacdComponent::Line => "line",
            MacdComponent::Signal => "signal",
            MacdComponent::Histogram => "histogram",
        };
        Self {
            fast,
            slow,
            signal,
            component,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// The standard 12/26/9 configuration.
    pub fn standard(component: MacdComponent) -> Self {
        Self::new(12, 26, 9, component)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let line = self.fast.max(self.slow) - 1;
        match self.component {
            MacdComponent::Line => line,
            MacdComponent::Signal | MacdComponent::Histogram => line + self.signal - 1,
        }
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let lines = macd(&closes(bars), self.fast, self.slow, self.signal);
        match self.component {
            MacdComponent::Line => lines.line,
            MacdComponent::Signal => lines.signal,
            MacdComponent::Histogram => lines.histogram,
        }
    }
}
