//! CSV bar loading.
//!
//! Reads daily OHLCV bars from `date,open,high,low,close,volume` files,
//! one file per ticker.

use crate::historical::PriceBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tradesim_core::{Error, Result};

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BarRecord {
    fn into_bar(self) -> Result<PriceBar> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| Error::data(format!("bad date '{}': {}", self.date, e)))?;
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::data(format!("bad date '{}'", self.date)))?
            .and_utc();
        Ok(PriceBar {
            timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// Load one ticker's daily bars from a CSV file.
pub fn load_bars_csv(path: impl AsRef<Path>) -> Result<Vec<PriceBar>> {
    let mut reader = ::csv::Reader::from_path(path.as_ref())
        .map_err(|e| Error::data(format!("{}: {}", path.as_ref().display(), e)))?;

    let mut bars = Vec::new();
    for record in reader.deserialize::<BarRecord>() {
        let record = record.map_err(|e| Error::data(format!("bad bar row: {}", e)))?;
        bars.push(record.into_bar()?);
    }
    tracing::debug!(path = %path.as_ref().display(), rows = bars.len(), "loaded bar file");
    Ok(bars)
}
