//! Error types for the tradesim system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tradesim system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Contract violation (negative price, negative amount, non-positive quantity).
    /// Indicates a programmer error at the call site, never retried.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Not enough cash to cover a debit.
    #[error("Insufficient funds: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },

    /// Not enough shares of a position to cover a removal.
    #[error("Insufficient position in {ticker}: requested {requested}, held {held}")]
    InsufficientShares {
        ticker: String,
        requested: f64,
        held: f64,
    },

    /// Attempted to sell a security the portfolio does not hold.
    #[error("Security not held: {0}")]
    NotHeld(String),

    /// Order kind the execution policy does not support.
    #[error("Unsupported order kind: {0}")]
    UnsupportedOrderKind(String),

    /// Data error (invalid or unparseable input data).
    #[error("Data error: {0}")]
    Data(String),

    /// Data feed contract violation (e.g. timestamp regression).
    #[error("Feed error: {0}")]
    Feed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a contract violation error.
    pub fn contract(msg: impl Into<String>) -> Self {
        Error::Contract(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a feed error.
    pub fn feed(msg: impl Into<String>) -> Self {
        Error::Feed(msg.into())
    }

    /// Whether this error is a domain rejection: a single event that cannot
    /// be honored (insufficient funds, unheld position, unsupported order).
    /// Domain rejections are logged and the event dropped; they never
    /// terminate a simulation run.
    pub fn is_domain_rejection(&self) -> bool {
        matches!(
            self,
            Error::InsufficientFunds { .. }
                | Error::InsufficientShares { .. }
                | Error::NotHeld(_)
                | Error::UnsupportedOrderKind(_)
        )
    }
}
