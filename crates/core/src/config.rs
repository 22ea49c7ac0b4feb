//! Configuration structures for the tradesim system.

use crate::error::{Error, Result};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Run configuration for one simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Start of the simulation.
    pub start: Timestamp,
    /// End of the simulation. Inclusive: an event stamped exactly `end` is
    /// processed, anything later terminates the run.
    pub end: Timestamp,
    /// Starting cash balance.
    pub initial_cash: f64,
    /// Benchmark ticker to subscribe alongside the strategy's tickers.
    /// Informational only; never enters accounting.
    pub benchmark_ticker: Option<String>,
}

impl SimulationConfig {
    /// Check internal consistency. Called by the orchestrator at
    /// construction; a bad config is a fail-fast error, not a rejection.
    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(Error::config(format!(
                "end ({}) is before start ({})",
                self.end, self.start
            )));
        }
        if self.initial_cash < 0.0 || !self.initial_cash.is_finite() {
            return Err(Error::config(format!(
                "initial cash must be a non-negative number, got {}",
                self.initial_cash
            )));
        }
        Ok(())
    }
}

/// Commission schedule for the simple execution policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Fixed commission per share.
    pub per_share: f64,
    /// Commission as a fraction of notional (e.g. 0.001 for 0.1%).
    pub pct_of_notional: f64,
    /// Floor applied to any non-zero-quantity trade.
    pub minimum: f64,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            per_share: 0.005,
            pct_of_notional: 0.0,
            minimum: 1.0,
        }
    }
}

impl CommissionConfig {
    /// Commission for a trade: `max(per_share*qty + pct*qty*price, minimum)`.
    pub fn commission(&self, quantity: f64, price: f64) -> f64 {
        if quantity <= 0.0 {
            return 0.0;
        }
        let variable = self.per_share * quantity + self.pct_of_notional * quantity * price;
        variable.max(self.minimum)
    }
}
