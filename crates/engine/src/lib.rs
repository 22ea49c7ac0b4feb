//! Event-driven simulation engine for the tradesim system.
//!
//! This crate provides:
//! - FIFO event queue with synchronous one-pass resolution
//! - Cash and holdings accounting with a transaction ledger
//! - Market order execution with commission modeling
//! - The backtester orchestration loop and run metrics

pub mod backtester;
pub mod execution;
pub mod holding;
pub mod metrics;
pub mod portfolio;
pub mod queue;
pub mod strategy;

pub use backtester::{BacktestResults, Backtester, SimulationState};
pub use execution::{ExecutionHandler, SimpleExecutionHandler};
pub use holding::Holding;
pub use metrics::{MetricsCalculator, SummaryMetrics};
pub use portfolio::{Portfolio, Snapshot};
pub use queue::EventQueue;
pub use strategy::{BuyAndHoldStrategy, Strategy};
