//! Backtest orchestrator.
//!
//! Pulls chronological data from the feed, drives the event queue, and
//! dispatches each event to the strategy, execution policy or portfolio.
//! The orchestrator exclusively owns the queue and the portfolio for the
//! duration of one run; collaborators receive event data and return new
//! events instead of mutating state.

use crate::execution::ExecutionHandler;
use crate::portfolio::{Portfolio, Snapshot};
use crate::queue::EventQueue;
use crate::strategy::Strategy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tradesim_core::{
    Error, Event, Order, OrderKind, Result, SimulationConfig, Timestamp, Transaction,
};
use tradesim_data::DataFeed;

/// Orchestrator loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Pulling data and dispatching normally.
    Running,
    /// Inside a full FIFO drain of the queue.
    DrainingQueue,
    /// Terminated; no further events are processed.
    Stopped,
}

/// Output of a completed run: the daily snapshot series and the full
/// transaction ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResults {
    pub snapshots: Vec<Snapshot>,
    pub ledger: Vec<Transaction>,
}

/// The main backtesting engine.
pub struct Backtester<F, S, E> {
    config: SimulationConfig,
    feed: F,
    strategy: S,
    execution: E,
    queue: EventQueue,
    portfolio: Portfolio,
    state: SimulationState,
    /// Simulation clock; advances to each enqueued feed event's timestamp.
    clock: Timestamp,
    /// Last feed timestamp seen, for regression detection.
    last_feed_timestamp: Option<Timestamp>,
    /// Calendar day of the most recent snapshot.
    last_snapshot_date: Option<NaiveDate>,
}

impl<F, S, E> Backtester<F, S, E>
where
    F: DataFeed,
    S: Strategy,
    E: ExecutionHandler,
{
    /// Create a backtester. Validates the configuration and subscribes the
    /// strategy's tickers (plus the benchmark, if any) on the feed.
    pub fn new(config: SimulationConfig, mut feed: F, strategy: S, execution: E) -> Result<Self> {
        config.validate()?;

        let mut tickers = strategy.subscribed_tickers();
        if let Some(benchmark) = &config.benchmark_ticker {
            tickers.push(benchmark.clone());
        }
        if !tickers.is_empty() {
            feed.subscribe(&tickers);
        }

        let portfolio = Portfolio::new(config.initial_cash, config.start)?;
        let clock = config.start;
        Ok(Self {
            config,
            feed,
            strategy,
            execution,
            queue: EventQueue::new(),
            portfolio,
            state: SimulationState::Running,
            clock,
            last_feed_timestamp: None,
            last_snapshot_date: None,
        })
    }

    /// Current loop state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// The portfolio, for inspection during or after a run.
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Run the simulation to completion.
    pub fn run(&mut self) -> Result<BacktestResults> {
        tracing::info!(
            start = %self.config.start,
            end = %self.config.end,
            initial_cash = self.config.initial_cash,
            "starting backtest"
        );

        while self.state != SimulationState::Stopped {
            // 1. Pull the next batch of chronological events from the feed.
            let batch = self.feed.stream_next();
            if batch.is_empty() && self.queue.is_empty() {
                self.state = SimulationState::Stopped;
                break;
            }

            // 2. Enqueue within the end boundary, advancing the clock.
            let mut boundary_crossed = false;
            for event in batch {
                let timestamp = event.timestamp();
                if let Some(previous) = self.last_feed_timestamp {
                    if timestamp < previous {
                        return Err(Error::feed(format!(
                            "timestamp regression: {} after {}",
                            timestamp, previous
                        )));
                    }
                }
                self.last_feed_timestamp = Some(timestamp);

                if timestamp > self.config.end {
                    boundary_crossed = true;
                    break;
                }
                self.queue.push(event);
                self.clock = timestamp;
            }

            // 3. Drain the queue completely, FIFO. A market update can
            // resolve into a completed fill within this same pass.
            self.state = SimulationState::DrainingQueue;
            while let Some(event) = self.queue.pop() {
                if event.timestamp() > self.config.end {
                    // Should never have been enqueued past the boundary.
                    tracing::warn!(timestamp = %event.timestamp(), "skipping event beyond end boundary");
                    continue;
                }
                self.dispatch(event)?;
            }

            // 4. End-of-day snapshot once per calendar date.
            self.maybe_record_snapshot();

            // 5. Terminate at the end boundary.
            if boundary_crossed
                || (self.clock >= self.config.end && self.queue.is_empty())
            {
                self.state = SimulationState::Stopped;
            } else {
                self.state = SimulationState::Running;
            }
        }

        // Final snapshot if the last recorded date is strictly before the
        // end date and the portfolio clock has not passed the boundary.
        // The clock must have reached a date no snapshot covers yet, so the
        // once-per-calendar-day guarantee holds.
        let end_date = self.config.end.date_naive();
        let final_date = self.portfolio.current_time().date_naive();
        if self.last_snapshot_date.map_or(true, |d| d < end_date && final_date > d)
            && self.portfolio.current_time() <= self.config.end
        {
            self.portfolio.record_snapshot(self.portfolio.current_time());
        }

        tracing::info!(
            final_time = %self.clock,
            net_value = self.portfolio.net_value(),
            transactions = self.portfolio.ledger().len(),
            "backtest finished"
        );

        Ok(BacktestResults {
            snapshots: self.portfolio.snapshots().to_vec(),
            ledger: self.portfolio.ledger().to_vec(),
        })
    }

    /// Dispatch one event per its kind.
    fn dispatch(&mut self, event: Event) -> Result<()> {
        self.portfolio.advance_time(event.timestamp());

        match event {
            Event::Market(update) => {
                self.portfolio
                    .update_holding_price(&update.ticker, update.price)?;
                for signal in self.strategy.calculate_signals(&update) {
                    self.queue.push(Event::Signal(signal));
                }
            }
            Event::Signal(signal) => match signal.suggested_quantity {
                Some(quantity) if quantity > 0.0 => {
                    self.queue.push(Event::Order(Order {
                        timestamp: signal.timestamp,
                        ticker: signal.ticker,
                        side: signal.side,
                        quantity,
                        kind: OrderKind::Market,
                    }));
                }
                _ => {
                    tracing::warn!(
                        ticker = %signal.ticker,
                        quantity = ?signal.suggested_quantity,
                        "signal without a positive quantity, dropping"
                    );
                }
            },
            Event::Order(order) => {
                match self.feed.latest_price(&order.ticker, order.timestamp) {
                    Some(reference_price) => {
                        if let Some(fill) = self.execution.execute(&order, reference_price) {
                            self.queue.push(Event::Fill(fill));
                        }
                    }
                    None => {
                        tracing::warn!(
                            ticker = %order.ticker,
                            "no reference price available, dropping order"
                        );
                    }
                }
            }
            Event::Fill(fill) => {
                let transaction = Transaction {
                    timestamp: fill.timestamp,
                    ticker: fill.ticker,
                    side: fill.side,
                    quantity: fill.quantity,
                    price: fill.price,
                    commission: fill.commission,
                    order_id: fill.order_id,
                };
                match self.portfolio.apply_transaction(&transaction) {
                    Ok(()) => {}
                    Err(e) if e.is_domain_rejection() => {
                        tracing::warn!(
                            ticker = %transaction.ticker,
                            error = %e,
                            "fill rejected by portfolio, dropping"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            Event::Dividend(dividend) => {
                self.portfolio.apply_dividend(&dividend)?;
            }
        }
        Ok(())
    }

    /// Record a snapshot when the simulation date has advanced past the
    /// last recorded date and is still within the end date.
    fn maybe_record_snapshot(&mut self) {
        let current_date = self.clock.date_naive();
        let due = self.last_snapshot_date.map_or(true, |d| current_date > d);
        if due && current_date <= self.config.end.date_naive() {
            self.portfolio.record_snapshot(self.clock);
            self.last_snapshot_date = Some(current_date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::SimpleExecutionHandler;
    use crate::strategy::BuyAndHoldStrategy;
    use chrono::TimeZone;
    use tradesim_core::{CommissionConfig, MarketUpdate, Signal, Side};
    use tradesim_data::{HistoricalFeed, PriceBar};

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn day(n: u32) -> Timestamp {
        chrono::Utc
            .with_ymd_and_hms(2023, 1, n, 16, 0, 0)
            .unwrap()
    }

    fn make_bar(timestamp: Timestamp, close: f64) -> PriceBar {
        PriceBar {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        }
    }

    fn make_config(start: Timestamp, end: Timestamp) -> SimulationConfig {
        SimulationConfig {
            start,
            end,
            initial_cash: 100_000.0,
            benchmark_ticker: None,
        }
    }

    #[test]
    fn test_market_update_resolves_to_fill_in_one_pass() {
        let mut feed = HistoricalFeed::new();
        feed.add_bars("AAPL", vec![make_bar(day(2), 150.0)]);

        let strategy = BuyAndHoldStrategy::new([("AAPL".to_string(), 10.0)]);
        let execution = SimpleExecutionHandler::new(CommissionConfig {
            per_share: 0.0,
            pct_of_notional: 0.0,
            minimum: 5.0,
        });

        let mut backtester = Backtester::new(
            make_config(day(1), day(5)),
            feed,
            strategy,
            execution,
        )
        .unwrap();
        let results = backtester.run().unwrap();

        // market -> signal -> order -> fill, all in one drain pass.
        assert_eq!(results.ledger.len(), 1);
        let tx = &results.ledger[0];
        assert_eq!(tx.side, Side::Buy);
        assert_eq!(tx.quantity, 10.0);
        assert_eq!(tx.price, 150.0);
        assert_eq!(backtester.state(), SimulationState::Stopped);
        assert_eq!(backtester.portfolio().holding("AAPL").unwrap().quantity, 10.0);
    }

    #[test]
    fn test_feed_timestamp_regression_is_fatal() {
        struct RegressingFeed {
            calls: usize,
        }
        impl DataFeed for RegressingFeed {
            fn stream_next(&mut self) -> Vec<Event> {
                self.calls += 1;
                match self.calls {
                    1 => vec![Event::Market(MarketUpdate::new(ts(200), "AAPL", 1.0))],
                    2 => vec![Event::Market(MarketUpdate::new(ts(100), "AAPL", 1.0))],
                    _ => Vec::new(),
                }
            }
            fn latest_price(&self, _ticker: &str, _as_of: Timestamp) -> Option<f64> {
                Some(1.0)
            }
        }

        struct NullStrategy;
        impl Strategy for NullStrategy {
            fn calculate_signals(&mut self, _update: &MarketUpdate) -> Vec<Signal> {
                Vec::new()
            }
        }

        let mut backtester = Backtester::new(
            make_config(ts(0), ts(1_000)),
            RegressingFeed { calls: 0 },
            NullStrategy,
            SimpleExecutionHandler::default(),
        )
        .unwrap();

        let err = backtester.run().unwrap_err();
        assert!(matches!(err, Error::Feed(_)));
    }

    #[test]
    fn test_one_snapshot_per_calendar_day() {
        let mut feed = HistoricalFeed::new();
        // Two intraday updates on day 2, one on day 3.
        feed.add_bars(
            "AAPL",
            vec![
                make_bar(chrono::Utc.with_ymd_and_hms(2023, 1, 2, 10, 0, 0).unwrap(), 150.0),
                make_bar(chrono::Utc.with_ymd_and_hms(2023, 1, 2, 15, 0, 0).unwrap(), 151.0),
                make_bar(chrono::Utc.with_ymd_and_hms(2023, 1, 3, 10, 0, 0).unwrap(), 152.0),
            ],
        );

        let strategy = BuyAndHoldStrategy::new([("AAPL".to_string(), 10.0)]);
        let mut backtester = Backtester::new(
            make_config(day(1), day(5)),
            feed,
            strategy,
            SimpleExecutionHandler::default(),
        )
        .unwrap();
        let results = backtester.run().unwrap();

        let dates: Vec<NaiveDate> = results
            .snapshots
            .iter()
            .map(|s| s.timestamp.date_naive())
            .collect();
        let mut deduped = dates.clone();
        deduped.dedup();
        assert_eq!(dates, deduped, "snapshots must be unique per calendar day");
        assert!(dates
            .iter()
            .all(|d| *d <= chrono::NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()));
    }

    #[test]
    fn test_events_beyond_end_boundary_discarded() {
        let mut feed = HistoricalFeed::new();
        feed.add_bars(
            "AAPL",
            vec![make_bar(day(2), 150.0), make_bar(day(10), 160.0)],
        );

        let strategy = BuyAndHoldStrategy::new([("AAPL".to_string(), 10.0)]);
        let mut backtester = Backtester::new(
            make_config(day(1), day(5)),
            feed,
            strategy,
            SimpleExecutionHandler::default(),
        )
        .unwrap();
        let results = backtester.run().unwrap();

        // The day-10 bar is past the end boundary: never marked, never snapshotted.
        assert!(results
            .snapshots
            .iter()
            .all(|s| s.timestamp <= day(5)));
        let holding = backtester.portfolio().holding("AAPL").unwrap();
        assert_eq!(holding.last_price, 150.0);
    }
}
