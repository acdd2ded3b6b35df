//! Data loading: CSV files, the deterministic synthetic feed, dataset hashing.
//!
//! Every loader returns a validated `PriceSeries`; nothing downstream ever sees
//! unsorted timestamps or inconsistent OHLC.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use papertrade_core::domain::{PriceBar, PriceSeries, SeriesError};

/// Errors from data loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unparseable timestamp '{value}' (expected RFC 3339 or YYYY-MM-DD)")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: volume must be a non-negative whole number, got {value}")]
    Volume { row: usize, value: f64 },
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
    #[error("no bars found for '{0}'")]
    Empty(String),
    #[error("invalid synthetic spec: {0}")]
    Synthetic(String),
}

/// One CSV row as written on disk.
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load a CSV file with header `timestamp,open,high,low,close,volume`.
pub fn load_csv(path: &Path, symbol: &str) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = parse_csv(file, symbol)?;
    info!(
        symbol,
        bars = series.len(),
        path = %path.display(),
        "loaded CSV series"
    );
    Ok(series)
}

/// Parse CSV bars from any reader. Rows must already be in time order.
pub fn parse_csv<R: Read>(reader: R, symbol: &str) -> Result<PriceSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();

    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        // 1-based, header is row 1
        let row_no = i + 2;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: row_no,
            value: row.timestamp.clone(),
        })?;
        if !(row.volume.is_finite() && row.volume >= 0.0 && row.volume.fract() == 0.0) {
            return Err(LoadError::Volume {
                row: row_no,
                value: row.volume,
            });
        }
        bars.push(PriceBar::new(
            timestamp,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume as u64,
        ));
    }

    if bars.is_empty() {
        return Err(LoadError::Empty(symbol.to_string()));
    }
    Ok(PriceSeries::new(symbol, bars)?)
}

/// RFC 3339 first, then a bare date at midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Parameters of the synthetic random-walk feed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSpec {
    pub bars: usize,
    pub seed: u64,
    pub start_price: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            bars: 500,
            seed: 42,
            start_price: 100.0,
        }
    }
}

/// Generate a deterministic daily random walk.
///
/// Weekdays only, starting 2024-01-01. The same `(symbol, seed)` always
/// produces the same bars. Stands in for a live feed during development.
pub fn generate_synthetic(
    symbol: &str,
    bars: usize,
    seed: u64,
    start_price: f64,
) -> Result<PriceSeries, LoadError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    if bars == 0 {
        return Err(LoadError::Synthetic("bar count must be at least 1".into()));
    }
    if !(start_price.is_finite() && start_price > 0.0) {
        return Err(LoadError::Synthetic(format!(
            "start price must be positive, got {start_price}"
        )));
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    hasher.update(&seed.to_le_bytes());
    let mut rng = StdRng::from_seed(*hasher.finalize().as_bytes());

    let mut out = Vec::with_capacity(bars);
    let mut price = start_price;
    let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();

    while out.len() < bars {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        let timestamp = day
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| LoadError::Synthetic(format!("bad calendar day {day}")))?;
        out.push(PriceBar::new(timestamp, open, high, low, close, volume));

        price = close;
        day += Duration::days(1);
    }

    debug!(symbol, bars, seed, "generated synthetic series");
    Ok(PriceSeries::new(symbol, out)?)
}

/// Deterministic BLAKE3 hash over the symbol and every bar.
pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for bar in series.bars() {
        hasher.update(&bar.timestamp.timestamp_millis().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
