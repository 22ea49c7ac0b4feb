//! Event model for the simulation loop.
//!
//! Five event kinds flow through the engine as a closed sum type:
//! market update -> signal -> order -> fill, plus dividends injected by the
//! data feed. Timestamps are immutable once an event is constructed; FIFO
//! ordering is the queue's job, temporal ordering is the feed's.

use crate::types::{OrderKind, Quantity, Side, Timestamp};
use serde::{Deserialize, Serialize};

/// New market data for one security (typically one bar close).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketUpdate {
    /// Time of the market data.
    pub timestamp: Timestamp,
    /// Ticker symbol.
    pub ticker: String,
    /// The new price (closing price of a bar).
    pub price: f64,
    /// Open price, if available.
    pub open: Option<f64>,
    /// High price, if available.
    pub high: Option<f64>,
    /// Low price, if available.
    pub low: Option<f64>,
    /// Traded volume, if available.
    pub volume: Option<f64>,
}

impl MarketUpdate {
    /// Build a close-only update with no OHLV detail.
    pub fn new(timestamp: Timestamp, ticker: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            price,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// A strategy's suggestion to trade, not yet sized into an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Time the signal was generated.
    pub timestamp: Timestamp,
    /// Ticker symbol.
    pub ticker: String,
    /// Trade direction.
    pub side: Side,
    /// Number of units to trade. A signal without a positive quantity is
    /// dropped by the orchestrator.
    pub suggested_quantity: Option<Quantity>,
    /// Signal strength/confidence (e.g. 0.0 to 1.0).
    pub strength: Option<f64>,
}

/// An order submitted to the execution policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Time the order was created.
    pub timestamp: Timestamp,
    /// Ticker symbol.
    pub ticker: String,
    /// Trade direction.
    pub side: Side,
    /// Units to trade. Must be positive.
    pub quantity: Quantity,
    /// Market or limit.
    pub kind: OrderKind,
}

/// Confirmation that an order executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// Time of fill.
    pub timestamp: Timestamp,
    /// Ticker symbol.
    pub ticker: String,
    /// Trade direction.
    pub side: Side,
    /// Units actually filled. Positive.
    pub quantity: Quantity,
    /// Price at which the order was filled. Non-negative.
    pub price: f64,
    /// Commission paid. Non-negative.
    pub commission: f64,
    /// Originating order, if tracked.
    pub order_id: Option<String>,
}

impl Fill {
    /// Notional cost/proceeds of the fill, excluding commission.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}

/// A dividend payment on a held security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dividend {
    /// Event timestamp (the ex-dividend date for simulation purposes).
    pub timestamp: Timestamp,
    /// Ticker symbol of the paying security.
    pub ticker: String,
    /// Cash amount per share. Non-negative.
    pub amount_per_share: f64,
    /// Ex-dividend date.
    pub ex_date: Timestamp,
    /// Date cash is actually paid.
    pub payment_date: Timestamp,
}

impl Dividend {
    /// Build a dividend whose ex-date and payment date coincide with the
    /// event timestamp.
    pub fn new(timestamp: Timestamp, ticker: impl Into<String>, amount_per_share: f64) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            amount_per_share,
            ex_date: timestamp,
            payment_date: timestamp,
        }
    }
}

/// The closed set of events the engine dispatches on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Market(MarketUpdate),
    Signal(Signal),
    Order(Order),
    Fill(Fill),
    Dividend(Dividend),
}

impl Event {
    /// Timestamp of the event, regardless of kind.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Event::Market(e) => e.timestamp,
            Event::Signal(e) => e.timestamp,
            Event::Order(e) => e.timestamp,
            Event::Fill(e) => e.timestamp,
            Event::Dividend(e) => e.timestamp,
        }
    }

    /// Ticker the event refers to.
    pub fn ticker(&self) -> &str {
        match self {
            Event::Market(e) => &e.ticker,
            Event::Signal(e) => &e.ticker,
            Event::Order(e) => &e.ticker,
            Event::Fill(e) => &e.ticker,
            Event::Dividend(e) => &e.ticker,
        }
    }
}
