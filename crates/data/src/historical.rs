//! In-memory historical feed.
//!
//! Merges per-ticker bar series and dividend schedules into one
//! chronological event stream, and indexes closes for as-of price queries.

use crate::feed::DataFeed;
use std::collections::{BTreeMap, BTreeSet};
use tradesim_core::{Dividend, Event, MarketUpdate, Timestamp};

/// One OHLCV bar for a single security.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PriceBar {
    /// Bar timestamp (close time).
    pub timestamp: Timestamp,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

/// Replays pre-loaded bars and dividends in timestamp order.
///
/// A time step is the set of events sharing one timestamp, streamed
/// together as a single batch. Within a step, events keep insertion order.
pub struct HistoricalFeed {
    /// All pending events, sorted lazily before the first stream call.
    events: Vec<Event>,
    /// Read position into `events`.
    cursor: usize,
    sorted: bool,
    /// Ticker -> close price by bar timestamp, for as-of lookups.
    price_index: BTreeMap<String, BTreeMap<Timestamp, f64>>,
    /// Non-empty set restricts streaming to these tickers.
    subscribed: BTreeSet<String>,
}

impl HistoricalFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            cursor: 0,
            sorted: true,
            price_index: BTreeMap::new(),
            subscribed: BTreeSet::new(),
        }
    }

    /// Load a bar series for one ticker.
    pub fn add_bars(&mut self, ticker: impl Into<String>, bars: Vec<PriceBar>) {
        let ticker = ticker.into();
        let index = self.price_index.entry(ticker.clone()).or_default();

        for bar in bars {
            index.insert(bar.timestamp, bar.close);
            self.events.push(Event::Market(MarketUpdate {
                timestamp: bar.timestamp,
                ticker: ticker.clone(),
                price: bar.close,
                open: Some(bar.open),
                high: Some(bar.high),
                low: Some(bar.low),
                volume: Some(bar.volume),
            }));
        }
        self.sorted = false;
    }

    /// Load a dividend schedule.
    pub fn add_dividends(&mut self, dividends: Vec<Dividend>) {
        self.events
            .extend(dividends.into_iter().map(Event::Dividend));
        self.sorted = false;
    }

    /// Stable-sort pending events by timestamp so ties keep insertion order.
    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.events[self.cursor..].sort_by_key(|e| e.timestamp());
            self.sorted = true;
        }
    }

    fn is_subscribed(&self, ticker: &str) -> bool {
        self.subscribed.is_empty() || self.subscribed.contains(ticker)
    }
}

impl Default for HistoricalFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFeed for HistoricalFeed {
    fn stream_next(&mut self) -> Vec<Event> {
        self.ensure_sorted();

        // Skip unsubscribed tickers entirely.
        while self.cursor < self.events.len()
            && !self.is_subscribed(self.events[self.cursor].ticker())
        {
            self.cursor += 1;
        }
        if self.cursor >= self.events.len() {
            return Vec::new();
        }

        let step_ts = self.events[self.cursor].timestamp();
        let mut batch = Vec::new();
        while self.cursor < self.events.len() && self.events[self.cursor].timestamp() == step_ts {
            let event = self.events[self.cursor].clone();
            self.cursor += 1;
            if self.is_subscribed(event.ticker()) {
                batch.push(event);
            }
        }
        batch
    }

    fn latest_price(&self, ticker: &str, as_of: Timestamp) -> Option<f64> {
        self.price_index
            .get(ticker)?
            .range(..=as_of)
            .next_back()
            .map(|(_, price)| *price)
    }

    fn subscribe(&mut self, tickers: &[String]) {
        self.subscribed.extend(tickers.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn make_bar(secs: i64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: ts(secs),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn test_streams_in_timestamp_order() {
        let mut feed = HistoricalFeed::new();
        feed.add_bars("AAPL", vec![make_bar(200, 151.0), make_bar(100, 150.0)]);
        feed.add_bars("MSFT", vec![make_bar(100, 300.0)]);

        let first = feed.stream_next();
        assert_eq!(first.len(), 2); // AAPL + MSFT at t=100
        assert!(first.iter().all(|e| e.timestamp() == ts(100)));

        let second = feed.stream_next();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].timestamp(), ts(200));

        assert!(feed.stream_next().is_empty());
    }

    #[test]
    fn test_dividends_interleave_with_bars() {
        let mut feed = HistoricalFeed::new();
        feed.add_bars("KO", vec![make_bar(100, 60.0), make_bar(300, 61.0)]);
        feed.add_dividends(vec![Dividend::new(ts(200), "KO", 0.44)]);

        feed.stream_next();
        let step = feed.stream_next();
        assert_eq!(step.len(), 1);
        assert!(matches!(step[0], Event::Dividend(_)));
    }

    #[test]
    fn test_latest_price_as_of() {
        let mut feed = HistoricalFeed::new();
        feed.add_bars("AAPL", vec![make_bar(100, 150.0), make_bar(200, 152.0)]);

        assert_eq!(feed.latest_price("AAPL", ts(150)), Some(150.0));
        assert_eq!(feed.latest_price("AAPL", ts(200)), Some(152.0));
        assert_eq!(feed.latest_price("AAPL", ts(50)), None);
        assert_eq!(feed.latest_price("TSLA", ts(200)), None);
    }

    #[test]
    fn test_subscription_filters_stream() {
        let mut feed = HistoricalFeed::new();
        feed.add_bars("AAPL", vec![make_bar(100, 150.0)]);
        feed.add_bars("MSFT", vec![make_bar(100, 300.0)]);
        feed.subscribe(&["AAPL".to_string()]);

        let step = feed.stream_next();
        assert_eq!(step.len(), 1);
        assert_eq!(step[0].ticker(), "AAPL");
    }
}
