//! Strategy contract and reference strategies.

use std::collections::{BTreeMap, BTreeSet};
use tradesim_core::{MarketUpdate, Side, Signal};

/// A trading strategy maps market updates to zero or more signals. The
/// orchestrator depends only on this trait; concrete strategies are
/// registered at run-configuration time.
pub trait Strategy {
    /// React to a market update with trade suggestions.
    fn calculate_signals(&mut self, update: &MarketUpdate) -> Vec<Signal>;

    /// Tickers this strategy wants the feed subscribed to.
    fn subscribed_tickers(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Buys a fixed quantity of each target ticker on its first market update,
/// then holds.
#[derive(Debug)]
pub struct BuyAndHoldStrategy {
    /// Ticker -> quantity to buy.
    targets: BTreeMap<String, f64>,
    bought: BTreeSet<String>,
}

impl BuyAndHoldStrategy {
    /// Create a strategy buying the given quantities.
    pub fn new(targets: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            bought: BTreeSet::new(),
        }
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn calculate_signals(&mut self, update: &MarketUpdate) -> Vec<Signal> {
        let quantity = match self.targets.get(&update.ticker) {
            Some(q) => *q,
            None => return Vec::new(),
        };
        if !self.bought.insert(update.ticker.clone()) {
            return Vec::new();
        }

        tracing::debug!(ticker = %update.ticker, quantity, "buy-and-hold entry signal");
        vec![Signal {
            timestamp: update.timestamp,
            ticker: update.ticker.clone(),
            side: Side::Buy,
            suggested_quantity: Some(quantity),
            strength: None,
        }]
    }

    fn subscribed_tickers(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tradesim_core::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_buys_each_target_once() {
        let mut strategy =
            BuyAndHoldStrategy::new([("AAPL".to_string(), 10.0), ("GOOG".to_string(), 5.0)]);

        let first = strategy.calculate_signals(&MarketUpdate::new(ts(100), "AAPL", 150.0));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].side, Side::Buy);
        assert_eq!(first[0].suggested_quantity, Some(10.0));

        // Same ticker again: already bought.
        let again = strategy.calculate_signals(&MarketUpdate::new(ts(200), "AAPL", 152.0));
        assert!(again.is_empty());

        // Other target still pending.
        let goog = strategy.calculate_signals(&MarketUpdate::new(ts(200), "GOOG", 2500.0));
        assert_eq!(goog.len(), 1);
    }

    #[test]
    fn test_ignores_non_target_tickers() {
        let mut strategy = BuyAndHoldStrategy::new([("AAPL".to_string(), 10.0)]);
        let signals = strategy.calculate_signals(&MarketUpdate::new(ts(100), "MSFT", 300.0));
        assert!(signals.is_empty());
    }

    #[test]
    fn test_subscribed_tickers() {
        let strategy =
            BuyAndHoldStrategy::new([("AAPL".to_string(), 10.0), ("GOOG".to_string(), 5.0)]);
        assert_eq!(strategy.subscribed_tickers(), vec!["AAPL", "GOOG"]);
    }
}
