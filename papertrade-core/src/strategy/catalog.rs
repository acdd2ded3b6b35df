//! Static strategy catalog.
//!
//! Each preset pairs a strategy implementation with its default risk
//! parameters. The catalog is configuration data; the engine knows nothing
//! about individual presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    BollingerReversion, MaCrossover, MacdCrossover, RsiReversal, Strategy, VolumeBreakout,
};
use crate::config::{ConfigError, RiskParams, StrategyConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPreset {
    RsiReversal,
    MaCrossover,
    MacdCrossover,
    BollingerReversion,
    VolumeBreakout,
}

impl StrategyPreset {
    pub const ALL: [StrategyPreset; 5] = [
        StrategyPreset::RsiReversal,
        StrategyPreset::MaCrossover,
        StrategyPreset::MacdCrossover,
        StrategyPreset::BollingerReversion,
        StrategyPreset::VolumeBreakout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyPreset::RsiReversal => "rsi_reversal",
            StrategyPreset::MaCrossover => "ma_crossover",
            StrategyPreset::MacdCrossover => "macd_crossover",
            StrategyPreset::BollingerReversion => "bollinger_reversion",
            StrategyPreset::VolumeBreakout => "volume_breakout",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyPreset::RsiReversal => "RSI(14) back through 30/70, exit at the opposite threshold",
            StrategyPreset::MaCrossover => "SMA(20)/SMA(50) golden and death crosses",
            StrategyPreset::MacdCrossover => "MACD(12,26,9) line crossing its signal line",
            StrategyPreset::BollingerReversion => "Close outside BB(20,2), exit at the middle band",
            StrategyPreset::VolumeBreakout => "20-bar channel breakout on 1.5x average volume",
        }
    }

    pub fn default_risk(self) -> RiskParams {
        let base = RiskParams::default();
        match self {
            StrategyPreset::RsiReversal => RiskParams {
                max_holding_bars: Some(20),
                ..base
            },
            StrategyPreset::MaCrossover => RiskParams {
                stop_loss_pct: 3.0,
                take_profit_pct: 8.0,
                trailing_stop_pct: Some(2.5),
                ..base
            },
            StrategyPreset::MacdCrossover => RiskParams {
                stop_loss_pct: 2.5,
                take_profit_pct: 6.0,
                max_holding_bars: Some(30),
                ..base
            },
            StrategyPreset::BollingerReversion => RiskParams {
                stop_loss_pct: 2.0,
                take_profit_pct: 3.0,
                max_holding_bars: Some(10),
                ..base
            },
            StrategyPreset::VolumeBreakout => RiskParams {
                stop_loss_pct: 3.0,
                take_profit_pct: 10.0,
                trailing_stop_pct: Some(3.0),
                max_holding_bars: Some(40),
                ..base
            },
        }
    }

    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyPreset::RsiReversal => Box::new(RsiReversal::default()),
            StrategyPreset::MaCrossover => Box::new(MaCrossover),
            StrategyPreset::MacdCrossover => Box::new(MacdCrossover),
            StrategyPreset::BollingerReversion => Box::new(BollingerReversion),
            StrategyPreset::VolumeBreakout => Box::new(VolumeBreakout::default()),
        }
    }

    pub fn config(self) -> StrategyConfig {
        StrategyConfig::new(self.name(), self.default_risk(), self.build())
    }
}

impl fmt::Display for StrategyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyPreset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Look up a catalog strategy by name, with its default risk parameters.
pub fn build_strategy(name: &str) -> Result<StrategyConfig, ConfigError> {
    name.parse::<StrategyPreset>().map(StrategyPreset::config)
}
