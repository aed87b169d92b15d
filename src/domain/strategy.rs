//! Turtle strategy decision state machine.
//!
//! States are Flat, Long and Short, with an optional pending order overlaid
//! on any of them. Rules per bar, first match wins:
//! 1. order pending: hold
//! 2. flat: close above the Donchian high with fast EMA above slow EMA buys;
//!    close below the Donchian low with fast EMA below slow EMA sells
//! 3. long: exit when close < close - ATR*dist or close > close + ATR*dist
//! 4. short: exit when close > close + ATR*dist or close < close - ATR*dist
//!
//! The exit bracket is rebuilt from the current close on every bar, it is
//! not fixed at the entry price.

use tracing::{debug, warn};

use super::broker::{BrokerSimulator, OrderOutcome, OrderSide};
use super::event::Event;
use super::indicator::IndicatorSnapshot;
use super::ohlcv::Bar;
use super::sizer::FixedPercSizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Flat,
    Long,
    Short,
}

impl MarketState {
    pub fn from_size(size: i64) -> Self {
        match size {
            0 => MarketState::Flat,
            s if s > 0 => MarketState::Long,
            _ => MarketState::Short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hold,
    Buy,
    Sell,
    Exit,
}

/// Stop-loss / take-profit pair around a reference price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub stop: f64,
    pub profit: f64,
}

impl Bracket {
    pub fn long(close: f64, atr: f64, distance: f64) -> Self {
        let pdist = atr * distance;
        Bracket {
            stop: close - pdist,
            profit: close + pdist,
        }
    }

    pub fn short(close: f64, atr: f64, distance: f64) -> Self {
        let pdist = atr * distance;
        Bracket {
            stop: close + pdist,
            profit: close - pdist,
        }
    }
}

/// Rules 2-4 for a given market state.
pub fn decide(
    state: MarketState,
    close: f64,
    ind: &IndicatorSnapshot,
    atr_distance: f64,
) -> Decision {
    match state {
        MarketState::Flat => {
            if close > ind.donchian.high && ind.ema_fast > ind.ema_slow {
                Decision::Buy
            } else if close < ind.donchian.low && ind.ema_fast < ind.ema_slow {
                Decision::Sell
            } else {
                Decision::Hold
            }
        }
        MarketState::Long => {
            let b = Bracket::long(close, ind.atr, atr_distance);
            if close < b.stop || close > b.profit {
                Decision::Exit
            } else {
                Decision::Hold
            }
        }
        MarketState::Short => {
            let b = Bracket::short(close, ind.atr, atr_distance);
            if close > b.stop || close < b.profit {
                Decision::Exit
            } else {
                Decision::Hold
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOrder {
    pub order_id: u64,
    pub target: MarketState,
}

#[derive(Debug, Clone)]
pub struct TurtleStrategy {
    atr_distance: f64,
    sizer: FixedPercSizer,
    state: MarketState,
    pending: Option<PendingOrder>,
}

impl TurtleStrategy {
    pub fn new(atr_distance: f64, sizer: FixedPercSizer) -> Self {
        TurtleStrategy {
            atr_distance,
            sizer,
            state: MarketState::Flat,
            pending: None,
        }
    }

    /// State of the last resolved order; unchanged while an order is pending.
    pub fn state(&self) -> MarketState {
        self.state
    }

    pub fn pending(&self) -> Option<PendingOrder> {
        self.pending
    }

    /// Evaluate one bar with ready indicators and submit at most one order.
    pub fn on_bar(
        &mut self,
        bar: &Bar,
        ind: &IndicatorSnapshot,
        broker: &mut BrokerSimulator,
    ) -> Vec<Event> {
        let mut events = vec![Event::Close {
            date: bar.date,
            close: bar.close,
        }];

        if self.pending.is_some() {
            return events;
        }

        let (side, size, target) = match decide(self.state, bar.close, ind, self.atr_distance) {
            Decision::Hold => return events,
            Decision::Buy => (OrderSide::Buy, self.sizer.size(broker.cash()), MarketState::Long),
            Decision::Sell => (OrderSide::Sell, self.sizer.size(broker.cash()), MarketState::Short),
            Decision::Exit => (OrderSide::Close, 0, MarketState::Flat),
        };

        if side != OrderSide::Close && size == 0 {
            debug!(date = %bar.date, cash = broker.cash(), "sizer returned zero units, no order");
            return events;
        }

        match broker.submit(side, size, bar.date) {
            Ok(order) => {
                self.pending = Some(PendingOrder {
                    order_id: order.id,
                    target,
                });
                events.push(Event::OrderSubmitted {
                    date: bar.date,
                    order: order.clone(),
                    reference_price: bar.close,
                });
            }
            Err(e) => warn!(date = %bar.date, error = %e, "order not submitted"),
        }
        events
    }

    /// Apply a resolved order: fills move to the order's target state,
    /// rejections and cancellations leave the pre-order state in place.
    pub fn on_order_outcome(&mut self, outcome: &OrderOutcome) {
        let Some(pending) = self.pending else {
            return;
        };
        if pending.order_id != outcome.order().id {
            return;
        }
        self.pending = None;
        match outcome {
            OrderOutcome::Filled(fill) => {
                self.state = MarketState::from_size(fill.position_size);
                debug_assert_eq!(self.state, pending.target);
            }
            OrderOutcome::Rejected { order, reason } => {
                warn!(id = order.id, side = %order.side, %reason, "order canceled/margin/rejected");
            }
            OrderOutcome::Cancelled { order } => {
                warn!(id = order.id, side = %order.side, "order cancelled");
            }
        }
    }
}
