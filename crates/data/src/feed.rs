//! Data feed contract.
//!
//! The engine pulls chronological market data through this trait; any
//! source that can stream ordered events and answer as-of price queries is
//! substitutable.

use tradesim_core::{Event, Timestamp};

/// Source of historical market events for a simulation run.
///
/// Contract: successive `stream_next` calls yield batches in
/// non-decreasing timestamp order (the orchestrator treats a regression as
/// fatal). An empty batch means the feed is exhausted.
pub trait DataFeed {
    /// Pull the next batch of market/dividend events, nominally everything
    /// belonging to one time step. Empty when no data remains.
    fn stream_next(&mut self) -> Vec<Event>;

    /// Most recent price known for `ticker` at or before `as_of`, or `None`
    /// if the ticker has no price history up to that point.
    fn latest_price(&self, ticker: &str, as_of: Timestamp) -> Option<f64>;

    /// Hint listing the tickers a consumer cares about. Feeds may use this
    /// to restrict what they stream; ignoring it is allowed.
    fn subscribe(&mut self, _tickers: &[String]) {}
}
