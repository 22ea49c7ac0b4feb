//! Ledger transaction record.

use crate::types::{Quantity, Side, Timestamp};
use serde::{Deserialize, Serialize};

/// A single executed trade, as recorded in the portfolio's append-only
/// ledger. Immutable once written; dividends are deliberately not
/// transactions (they are a distinct record class, not a trade).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Time of execution.
    pub timestamp: Timestamp,
    /// Ticker symbol.
    pub ticker: String,
    /// Trade direction.
    pub side: Side,
    /// Units traded. Positive.
    pub quantity: Quantity,
    /// Execution price. Non-negative.
    pub price: f64,
    /// Commission paid. Non-negative.
    pub commission: f64,
    /// Originating order, if tracked.
    pub order_id: Option<String>,
}

impl Transaction {
    /// Notional value of the trade, excluding commission.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}
