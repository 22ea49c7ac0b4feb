//! Run summary metrics.
//!
//! Derives headline numbers from the daily snapshot series and the ledger.

use crate::backtester::BacktestResults;
use crate::portfolio::Snapshot;
use serde::{Deserialize, Serialize};
use tradesim_core::Timestamp;

/// Headline metrics for a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Net value at the first snapshot.
    pub initial_value: f64,
    /// Net value at the last snapshot.
    pub final_value: f64,
    /// Total return percentage over the run.
    pub total_return_pct: f64,
    /// Maximum drawdown (absolute).
    pub max_drawdown: f64,
    /// Maximum drawdown percentage.
    pub max_drawdown_pct: f64,
    /// Number of executed transactions.
    pub total_transactions: usize,
    /// Total commission paid.
    pub total_commission: f64,
}

/// Daily equity curve point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: Timestamp,
    pub net_value: f64,
    pub drawdown: f64,
    pub drawdown_pct: f64,
}

impl BacktestResults {
    /// Summary metrics for this run, given the starting capital.
    pub fn summary(&self, initial_capital: f64) -> SummaryMetrics {
        MetricsCalculator::new(initial_capital).calculate(self)
    }
}

/// Metrics calculator over backtest results.
pub struct MetricsCalculator {
    initial_capital: f64,
}

impl MetricsCalculator {
    /// Create a calculator for a run that started with `initial_capital`.
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    /// Calculate summary metrics from a completed run.
    pub fn calculate(&self, results: &BacktestResults) -> SummaryMetrics {
        let mut metrics = SummaryMetrics {
            initial_value: self.initial_capital,
            final_value: self.initial_capital,
            total_transactions: results.ledger.len(),
            total_commission: results.ledger.iter().map(|tx| tx.commission).sum(),
            ..Default::default()
        };

        if let Some(first) = results.snapshots.first() {
            metrics.initial_value = first.net_value;
        }
        if let Some(last) = results.snapshots.last() {
            metrics.final_value = last.net_value;
        }
        if self.initial_capital > 0.0 {
            metrics.total_return_pct =
                (metrics.final_value - self.initial_capital) / self.initial_capital * 100.0;
        }

        for point in self.build_equity_curve(&results.snapshots) {
            if point.drawdown > metrics.max_drawdown {
                metrics.max_drawdown = point.drawdown;
                metrics.max_drawdown_pct = point.drawdown_pct;
            }
        }

        metrics
    }

    /// Build the daily equity curve with running peak drawdowns.
    pub fn build_equity_curve(&self, snapshots: &[Snapshot]) -> Vec<EquityPoint> {
        let mut curve = Vec::with_capacity(snapshots.len());
        let mut peak = self.initial_capital;

        for snapshot in snapshots {
            peak = peak.max(snapshot.net_value);
            let drawdown = peak - snapshot.net_value;
            let drawdown_pct = if peak > 0.0 {
                drawdown / peak * 100.0
            } else {
                0.0
            };
            curve.push(EquityPoint {
                timestamp: snapshot.timestamp,
                net_value: snapshot.net_value,
                drawdown,
                drawdown_pct,
            });
        }
        curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn make_snapshot(secs: i64, net_value: f64) -> Snapshot {
        Snapshot {
            timestamp: chrono::Utc.timestamp_opt(secs, 0).unwrap(),
            net_value,
            cash: net_value,
            holdings_value: 0.0,
            holdings: BTreeMap::new(),
        }
    }

    fn make_results(values: &[(i64, f64)]) -> BacktestResults {
        BacktestResults {
            snapshots: values.iter().map(|&(s, v)| make_snapshot(s, v)).collect(),
            ledger: Vec::new(),
        }
    }

    #[test]
    fn test_total_return() {
        let calculator = MetricsCalculator::new(10_000.0);
        let results = make_results(&[(1, 10_000.0), (2, 10_500.0), (3, 11_000.0)]);

        let metrics = calculator.calculate(&results);
        assert_relative_eq!(metrics.total_return_pct, 10.0);
        assert_relative_eq!(metrics.final_value, 11_000.0);
    }

    #[test]
    fn test_max_drawdown_tracks_peak() {
        let calculator = MetricsCalculator::new(10_000.0);
        let results = make_results(&[
            (1, 10_000.0),
            (2, 11_000.0),
            (3, 9_900.0), // 1100 below the 11k peak
            (4, 10_500.0),
        ]);

        let metrics = calculator.calculate(&results);
        assert_relative_eq!(metrics.max_drawdown, 1_100.0);
        assert_relative_eq!(metrics.max_drawdown_pct, 10.0);
    }

    #[test]
    fn test_empty_results() {
        let calculator = MetricsCalculator::new(10_000.0);
        let metrics = calculator.calculate(&make_results(&[]));

        assert_eq!(metrics.total_transactions, 0);
        assert_relative_eq!(metrics.total_return_pct, 0.0);
        assert_relative_eq!(metrics.final_value, 10_000.0);
    }

    #[test]
    fn test_equity_curve_length() {
        let calculator = MetricsCalculator::new(10_000.0);
        let results = make_results(&[(1, 10_000.0), (2, 10_100.0)]);
        let curve = calculator.build_equity_curve(&results.snapshots);
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve[1].net_value, 10_100.0);
    }
}
