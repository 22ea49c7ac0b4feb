//! Portfolio accounting.
//!
//! Owns the cash balance, the holdings map, the append-only transaction
//! ledger and the daily snapshot series. Mutated exclusively through
//! `apply_transaction` and `apply_dividend`; every rejected mutation leaves
//! the portfolio exactly as it was.

use crate::holding::Holding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tradesim_core::{Dividend, Error, Result, Side, Timestamp, Transaction};

/// Per-ticker detail captured in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingSnapshot {
    pub quantity: f64,
    pub average_cost: f64,
    pub last_price: f64,
    pub market_value: f64,
}

/// Timestamped capture of portfolio valuation and composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation time the snapshot was taken.
    pub timestamp: Timestamp,
    /// Cash plus market value of all holdings.
    pub net_value: f64,
    /// Cash component.
    pub cash: f64,
    /// Market value of all holdings.
    pub holdings_value: f64,
    /// Per-ticker composition.
    pub holdings: BTreeMap<String, HoldingSnapshot>,
}

/// Trading portfolio state: cash, holdings, ledger, snapshots.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    holdings: BTreeMap<String, Holding>,
    ledger: Vec<Transaction>,
    snapshots: Vec<Snapshot>,
    start_time: Timestamp,
    current_time: Timestamp,
}

impl Portfolio {
    /// Create a portfolio with an initial cash balance and start time.
    pub fn new(initial_cash: f64, start_time: Timestamp) -> Result<Self> {
        if initial_cash < 0.0 || !initial_cash.is_finite() {
            return Err(Error::contract(format!(
                "initial cash must be a non-negative number, got {}",
                initial_cash
            )));
        }
        Ok(Self {
            cash: initial_cash,
            holdings: BTreeMap::new(),
            ledger: Vec::new(),
            snapshots: Vec::new(),
            start_time,
            current_time: start_time,
        })
    }

    /// Current cash balance.
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Portfolio start time.
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Current simulation time as the portfolio knows it.
    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    /// All holdings, keyed by ticker.
    pub fn holdings(&self) -> &BTreeMap<String, Holding> {
        &self.holdings
    }

    /// One holding, if owned.
    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        self.holdings.get(ticker)
    }

    /// The append-only transaction ledger.
    pub fn ledger(&self) -> &[Transaction] {
        &self.ledger
    }

    /// Recorded snapshots, in recording order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Add cash. Errors on a negative amount.
    pub fn add_cash(&mut self, amount: f64) -> Result<()> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(Error::contract(format!(
                "amount to add must be a non-negative number, got {}",
                amount
            )));
        }
        self.cash += amount;
        Ok(())
    }

    /// Remove cash. Errors on a negative amount or insufficient funds.
    pub fn remove_cash(&mut self, amount: f64) -> Result<()> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(Error::contract(format!(
                "amount to remove must be a non-negative number, got {}",
                amount
            )));
        }
        if amount > self.cash {
            return Err(Error::InsufficientFunds {
                requested: amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    /// Update the mark for a held ticker. A market update for an unheld
    /// ticker is accepted but has no accounting effect.
    pub fn update_holding_price(&mut self, ticker: &str, price: f64) -> Result<()> {
        if let Some(holding) = self.holdings.get_mut(ticker) {
            holding.update_price(price)?;
        }
        Ok(())
    }

    /// Sum of all holdings' market value.
    pub fn total_holdings_value(&self) -> f64 {
        self.holdings.values().map(|h| h.market_value()).sum()
    }

    /// Net asset value: holdings plus cash.
    pub fn net_value(&self) -> f64 {
        self.total_holdings_value() + self.cash
    }

    /// Apply an executed trade to the portfolio.
    ///
    /// All preconditions are checked before any state changes, so a
    /// rejected transaction leaves cash, holdings and ledger untouched.
    /// Commission is part of the committed debit for both sides.
    pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<()> {
        if tx.quantity <= 0.0 {
            return Err(Error::contract(format!(
                "transaction quantity must be positive, got {}",
                tx.quantity
            )));
        }
        if tx.price < 0.0 || tx.commission < 0.0 {
            return Err(Error::contract(format!(
                "transaction price ({}) and commission ({}) must be non-negative",
                tx.price, tx.commission
            )));
        }

        match tx.side {
            Side::Buy => {
                let debit = tx.commission + tx.notional();
                if debit > self.cash {
                    return Err(Error::InsufficientFunds {
                        requested: debit,
                        available: self.cash,
                    });
                }
                self.remove_cash(tx.commission)?;
                self.remove_cash(tx.notional())?;
                let holding = self
                    .holdings
                    .entry(tx.ticker.clone())
                    .or_insert_with(|| Holding::new(&tx.ticker));
                holding.add_shares(tx.quantity, tx.price)?;
            }
            Side::Sell => {
                let held = match self.holdings.get(&tx.ticker) {
                    Some(holding) => holding.quantity,
                    None => return Err(Error::NotHeld(tx.ticker.clone())),
                };
                if tx.quantity > held {
                    return Err(Error::InsufficientShares {
                        ticker: tx.ticker.clone(),
                        requested: tx.quantity,
                        held,
                    });
                }
                if tx.commission > self.cash {
                    return Err(Error::InsufficientFunds {
                        requested: tx.commission,
                        available: self.cash,
                    });
                }
                self.remove_cash(tx.commission)?;
                self.add_cash(tx.notional())?;
                if let Some(holding) = self.holdings.get_mut(&tx.ticker) {
                    holding.remove_shares(tx.quantity)?;
                    if holding.quantity == 0.0 {
                        self.holdings.remove(&tx.ticker);
                    }
                }
            }
        }

        self.ledger.push(tx.clone());
        Ok(())
    }

    /// Credit a dividend: `quantity held * amount per share`. No-op for
    /// unheld tickers; never recorded in the trade ledger.
    pub fn apply_dividend(&mut self, dividend: &Dividend) -> Result<()> {
        if dividend.amount_per_share < 0.0 {
            return Err(Error::contract(format!(
                "dividend per share must be non-negative, got {}",
                dividend.amount_per_share
            )));
        }
        if let Some(holding) = self.holdings.get(&dividend.ticker) {
            let payment = holding.quantity * dividend.amount_per_share;
            self.add_cash(payment)?;
        }
        Ok(())
    }

    /// Capture the current valuation and composition. Callers are
    /// responsible for calling this at most once per calendar day; the
    /// portfolio itself does not deduplicate.
    pub fn record_snapshot(&mut self, timestamp: Timestamp) {
        let holdings = self
            .holdings
            .iter()
            .map(|(ticker, holding)| {
                (
                    ticker.clone(),
                    HoldingSnapshot {
                        quantity: holding.quantity,
                        average_cost: holding.average_cost,
                        last_price: holding.last_price,
                        market_value: holding.market_value(),
                    },
                )
            })
            .collect();

        self.snapshots.push(Snapshot {
            timestamp,
            net_value: self.net_value(),
            cash: self.cash,
            holdings_value: self.total_holdings_value(),
            holdings,
        });
    }

    /// Advance the portfolio clock. Time only moves forward; an earlier
    /// timestamp is ignored.
    pub fn advance_time(&mut self, timestamp: Timestamp) {
        if timestamp > self.current_time {
            self.current_time = timestamp;
        }
    }
}
