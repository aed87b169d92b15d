//! Backtest engine and event loop.
//!
//! One `Backtest` owns its indicators, broker and strategy state, so separate
//! instances never share anything and can run on separate threads.
//!
//! Per bar:
//! 1. resolve a pending order at this bar's open (`FillPolicy::NextOpen`)
//! 2. update indicators; hold while any is still warming up
//! 3. let the strategy decide and possibly submit one order
//! 4. resolve that order at this bar's close (`FillPolicy::CurrentClose`)
//! 5. mark the portfolio to the close

use chrono::NaiveDate;
use tracing::{info, trace, warn};

use super::broker::{BrokerSimulator, CommissionInfo, OrderOutcome};
use super::config::{FillPolicy, TurtleConfig};
use super::config_validation::validate_config;
use super::error::TurtleError;
use super::event::Event;
use super::indicator::IndicatorSet;
use super::ohlcv::Bar;
use super::portfolio::PortfolioState;
use super::sizer::FixedPercSizer;
use super::strategy::{MarketState, TurtleStrategy};

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: PortfolioState,
    pub events: Vec<Event>,
    pub bars_processed: usize,
    pub final_value: f64,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct Backtest {
    fill_policy: FillPolicy,
    indicators: IndicatorSet,
    broker: BrokerSimulator,
    strategy: TurtleStrategy,
    last_bar: Option<Bar>,
    bars_processed: usize,
}

impl Backtest {
    pub fn new(config: &TurtleConfig) -> Result<Self, TurtleError> {
        validate_config(config)?;
        let comm = CommissionInfo {
            commission: config.commission_rate,
            margin: config.margin_per_unit,
        };
        Ok(Backtest {
            fill_policy: config.fill_policy,
            indicators: IndicatorSet::from_config(config)?,
            broker: BrokerSimulator::new(config.starting_cash, comm),
            strategy: TurtleStrategy::new(
                config.atr_distance,
                FixedPercSizer::new(config.sizer_perc, config.margin_per_unit),
            ),
            last_bar: None,
            bars_processed: 0,
        })
    }

    pub fn broker(&self) -> &BrokerSimulator {
        &self.broker
    }

    pub fn portfolio(&self) -> &PortfolioState {
        self.broker.portfolio()
    }

    pub fn state(&self) -> MarketState {
        self.strategy.state()
    }

    pub fn warmup(&self) -> usize {
        self.indicators.warmup()
    }

    /// Portfolio value at the last seen close; starting cash before any bar.
    pub fn portfolio_value(&self) -> f64 {
        match &self.last_bar {
            Some(bar) => self.broker.value(bar.close),
            None => self.broker.cash(),
        }
    }

    /// Advance the engine by one bar.
    pub fn on_bar(&mut self, bar: &Bar) -> Result<Vec<Event>, TurtleError> {
        if let Some(prev) = self.last_bar.as_ref().map(|b| b.date) {
            if bar.date <= prev {
                return Err(TurtleError::UnorderedFeed {
                    previous: prev,
                    current: bar.date,
                });
            }
        }

        let mut events = Vec::new();

        if self.fill_policy == FillPolicy::NextOpen {
            self.resolve_pending(bar.date, bar.open, &mut events);
        }

        match self.indicators.update(bar) {
            Ok(snapshot) => {
                events.extend(self.strategy.on_bar(bar, &snapshot, &mut self.broker));
            }
            Err(TurtleError::InsufficientData {
                indicator,
                observed,
                required,
            }) => {
                trace!(date = %bar.date, indicator, observed, required, "warming up");
            }
            Err(e) => return Err(e),
        }

        if self.fill_policy == FillPolicy::CurrentClose {
            self.resolve_pending(bar.date, bar.close, &mut events);
        }

        self.broker.record_equity(bar.date, bar.close);
        self.last_bar = Some(bar.clone());
        self.bars_processed += 1;
        Ok(events)
    }

    /// Replay a whole feed, cancel anything left pending, and value the
    /// portfolio at the final close.
    pub fn run<I>(mut self, feed: I) -> Result<BacktestResult, TurtleError>
    where
        I: IntoIterator<Item = Bar>,
    {
        info!(
            starting_value = self.portfolio_value(),
            warmup = self.warmup(),
            fill_policy = %self.fill_policy,
            "backtest started"
        );

        let mut events = Vec::new();
        for bar in feed {
            events.extend(self.on_bar(&bar)?);
        }
        events.extend(self.finish());

        let final_value = self.portfolio_value();
        info!(
            bars = self.bars_processed,
            trades = self.portfolio().closed_trades.len(),
            final_value,
            "backtest finished"
        );

        let last_date = self.last_bar.as_ref().map(|b| b.date);
        Ok(BacktestResult {
            bars_processed: self.bars_processed,
            final_value,
            last_date,
            events,
            portfolio: self.broker.into_portfolio(),
        })
    }

    /// End of feed: an order that never reached a fill bar is cancelled.
    pub fn finish(&mut self) -> Vec<Event> {
        let Some(outcome) = self.broker.cancel_pending() else {
            return Vec::new();
        };
        let date = self
            .last_bar
            .as_ref()
            .map(|b| b.date)
            .unwrap_or(outcome.order().created);
        warn!(id = outcome.order().id, %date, "feed ended with an order pending");
        self.strategy.on_order_outcome(&outcome);
        outcome_events(date, outcome)
    }

    fn resolve_pending(&mut self, date: NaiveDate, price: f64, events: &mut Vec<Event>) {
        if let Some(outcome) = self.broker.execute(date, price) {
            self.strategy.on_order_outcome(&outcome);
            events.extend(outcome_events(date, outcome));
        }
    }
}

fn outcome_events(date: NaiveDate, outcome: OrderOutcome) -> Vec<Event> {
    match outcome {
        OrderOutcome::Filled(fill) => {
            let trade = fill.trade.clone();
            let mut events = vec![Event::OrderFilled { date, fill }];
            if let Some(trade) = trade {
                events.push(Event::TradeClosed { date, trade });
            }
            events
        }
        OrderOutcome::Rejected { order, reason } => {
            vec![Event::OrderRejected {
                date,
                order,
                reason,
            }]
        }
        OrderOutcome::Cancelled { order } => vec![Event::OrderCancelled { date, order }],
    }
}
