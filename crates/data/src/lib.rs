//! Market data feeds for the tradesim system.
//!
//! This crate provides:
//! - The `DataFeed` contract the engine pulls events through
//! - An in-memory `HistoricalFeed` merging bars and dividends
//! - CSV loading for daily bar files

pub mod csv;
pub mod feed;
pub mod historical;

pub use feed::DataFeed;
pub use historical::{HistoricalFeed, PriceBar};
