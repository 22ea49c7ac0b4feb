//! Per-security position state.

use tradesim_core::{Error, Result};

/// Position record for one security: quantity owned, cost basis, current
/// mark. Market value is always derived from quantity and mark, never
/// stored, so it cannot drift.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    /// Ticker symbol (unique key within a portfolio).
    pub ticker: String,
    /// Units held. Never negative.
    pub quantity: f64,
    /// Weighted average acquisition cost. Meaningful only while quantity is
    /// positive; resets to 0 on a full exit.
    pub average_cost: f64,
    /// Most recently observed price used for valuation.
    pub last_price: f64,
}

impl Holding {
    /// Create an empty holding for a ticker.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            quantity: 0.0,
            average_cost: 0.0,
            last_price: 0.0,
        }
    }

    /// Current market value: `quantity * last_price`.
    #[inline]
    pub fn market_value(&self) -> f64 {
        self.quantity * self.last_price
    }

    /// Update the mark. Errors on a negative price.
    pub fn update_price(&mut self, price: f64) -> Result<()> {
        if price < 0.0 || !price.is_finite() {
            return Err(Error::contract(format!(
                "price for {} must be a non-negative number, got {}",
                self.ticker, price
            )));
        }
        self.last_price = price;
        Ok(())
    }

    /// Add shares at a price, recomputing the weighted average cost. The
    /// transaction price becomes the new mark.
    pub fn add_shares(&mut self, quantity: f64, price: f64) -> Result<()> {
        if quantity <= 0.0 {
            return Err(Error::contract(format!(
                "quantity to add must be positive, got {}",
                quantity
            )));
        }
        if price < 0.0 {
            return Err(Error::contract(format!(
                "price must be non-negative, got {}",
                price
            )));
        }

        let total_cost = self.average_cost * self.quantity + price * quantity;
        self.quantity += quantity;
        self.average_cost = total_cost / self.quantity;
        self.last_price = price;
        Ok(())
    }

    /// Remove shares, leaving the average cost unchanged unless the
    /// position is fully exited. Returns the cost basis removed
    /// (`quantity * average_cost`, computed before any reset) for realized
    /// P&L use by the caller.
    pub fn remove_shares(&mut self, quantity: f64) -> Result<f64> {
        if quantity <= 0.0 {
            return Err(Error::contract(format!(
                "quantity to remove must be positive, got {}",
                quantity
            )));
        }
        if quantity > self.quantity {
            return Err(Error::InsufficientShares {
                ticker: self.ticker.clone(),
                requested: quantity,
                held: self.quantity,
            });
        }

        let cost_basis_removed = quantity * self.average_cost;
        self.quantity -= quantity;
        if self.quantity == 0.0 {
            self.average_cost = 0.0;
        }
        Ok(cost_basis_removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_shares_weighted_average() {
        let mut holding = Holding::new("AAPL");
        holding.add_shares(10.0, 100.0).unwrap();
        holding.add_shares(10.0, 200.0).unwrap();

        assert_eq!(holding.quantity, 20.0);
        assert_relative_eq!(holding.average_cost, 150.0);
        // The transaction price becomes the mark.
        assert_eq!(holding.last_price, 200.0);
        assert_relative_eq!(holding.market_value(), 4000.0);
    }

    #[test]
    fn test_remove_shares_keeps_average_cost() {
        let mut holding = Holding::new("AAPL");
        holding.add_shares(10.0, 150.0).unwrap();

        let basis = holding.remove_shares(4.0).unwrap();
        assert_relative_eq!(basis, 600.0);
        assert_eq!(holding.quantity, 6.0);
        assert_eq!(holding.average_cost, 150.0);
    }

    #[test]
    fn test_full_exit_resets_average_cost() {
        let mut holding = Holding::new("AAPL");
        holding.add_shares(10.0, 150.0).unwrap();

        let basis = holding.remove_shares(10.0).unwrap();
        assert_relative_eq!(basis, 1500.0);
        assert_eq!(holding.quantity, 0.0);
        assert_eq!(holding.average_cost, 0.0);
    }

    #[test]
    fn test_remove_more_than_held_fails_unchanged() {
        let mut holding = Holding::new("AAPL");
        holding.add_shares(5.0, 150.0).unwrap();

        let before = holding.clone();
        let err = holding.remove_shares(6.0).unwrap_err();
        assert!(matches!(err, Error::InsufficientShares { .. }));
        assert_eq!(holding, before);
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut holding = Holding::new("AAPL");
        assert!(holding.update_price(-1.0).is_err());
        assert!(holding.add_shares(1.0, -1.0).is_err());
        assert!(holding.remove_shares(0.0).is_err());
    }

    #[test]
    fn test_market_value_tracks_mark() {
        let mut holding = Holding::new("AAPL");
        holding.add_shares(10.0, 150.0).unwrap();
        holding.update_price(152.0).unwrap();
        assert_relative_eq!(holding.market_value(), 1520.0);
    }
}
