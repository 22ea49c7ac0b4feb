//! Core types and configuration for the tradesim system.
//!
//! This crate provides shared types used across all other crates:
//! - The event model (market updates, signals, orders, fills, dividends)
//! - Ledger transaction records
//! - Run configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod transaction;
pub mod types;

pub use config::{CommissionConfig, SimulationConfig};
pub use error::{Error, Result};
pub use event::{Dividend, Event, Fill, MarketUpdate, Order, Signal};
pub use transaction::Transaction;
pub use types::*;
