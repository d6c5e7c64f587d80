//! Plain data types shared by the pages

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build a pair, rejecting values outside -90..90 / -180..180.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }
}

/// A named point added by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    pub position: Coordinates,
}

impl Bookmark {
    pub fn new(name: &str, lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            position: Coordinates::new(lat, lon)?,
        })
    }
}

/// Male and female head counts for one region, one entry per age bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRow {
    pub region: String,
    pub male: Vec<u64>,
    pub female: Vec<u64>,
}

impl PopulationRow {
    /// Largest count over both sexes, 0 for an empty row.
    pub fn max_count(&self) -> u64 {
        self.male
            .iter()
            .chain(self.female.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBar {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

/// Price history of one ticker, oldest bar first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockSeries {
    bars: Vec<StockBar>,
}

impl StockSeries {
    /// Create new empty series
    pub fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Create from bars, sorting them by date
    pub fn from_vec(mut bars: Vec<StockBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[StockBar] {
        &self.bars
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// The last `n` bars, newest first
    pub fn tail_newest_first(&self, n: usize) -> Vec<&StockBar> {
        self.bars.iter().rev().take(n).collect()
    }
}

impl From<Vec<StockBar>> for StockSeries {
    fn from(bars: Vec<StockBar>) -> Self {
        Self::from_vec(bars)
    }
}
