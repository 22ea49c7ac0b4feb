//! Order execution policy.
//!
//! Converts orders into simulated fills. Any component implementing
//! `ExecutionHandler` is substitutable; the orchestrator depends only on
//! the trait.

use tradesim_core::{CommissionConfig, Fill, Order, OrderKind};

/// Execution policy contract: an order plus a reference price either
/// produces a fill or is rejected (`None`).
pub trait ExecutionHandler {
    /// Simulate execution of `order` at `reference_price`. `None` means the
    /// order was rejected and should be dropped.
    fn execute(&self, order: &Order, reference_price: f64) -> Option<Fill>;
}

/// Immediate fill-at-market execution with a commission schedule.
///
/// Rejects non-market order kinds, non-positive reference prices and
/// non-positive quantities. No slippage beyond the given price.
#[derive(Debug, Clone, Default)]
pub struct SimpleExecutionHandler {
    commission: CommissionConfig,
}

impl SimpleExecutionHandler {
    /// Create an execution handler with a commission schedule.
    pub fn new(commission: CommissionConfig) -> Self {
        Self { commission }
    }
}

impl ExecutionHandler for SimpleExecutionHandler {
    fn execute(&self, order: &Order, reference_price: f64) -> Option<Fill> {
        if order.kind != OrderKind::Market {
            tracing::warn!(
                ticker = %order.ticker,
                kind = %order.kind,
                "only MARKET orders are supported, rejecting"
            );
            return None;
        }
        if reference_price <= 0.0 {
            tracing::warn!(
                ticker = %order.ticker,
                price = reference_price,
                "invalid reference price, rejecting order"
            );
            return None;
        }
        if order.quantity <= 0.0 {
            tracing::warn!(
                ticker = %order.ticker,
                quantity = order.quantity,
                "order quantity must be positive, rejecting"
            );
            return None;
        }

        Some(Fill {
            timestamp: order.timestamp,
            ticker: order.ticker.clone(),
            side: order.side,
            quantity: order.quantity,
            price: reference_price,
            commission: self.commission.commission(order.quantity, reference_price),
            order_id: None,
        })
    }
}
