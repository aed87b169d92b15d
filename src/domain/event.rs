//! Events emitted by the backtest engine for reporters.

use chrono::NaiveDate;

use super::broker::{Fill, Order};
use super::error::RejectReason;
use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Close price of a bar the strategy evaluated.
    Close { date: NaiveDate, close: f64 },
    OrderSubmitted {
        date: NaiveDate,
        order: Order,
        /// Close of the submitting bar.
        reference_price: f64,
    },
    OrderFilled { date: NaiveDate, fill: Fill },
    OrderRejected {
        date: NaiveDate,
        order: Order,
        reason: RejectReason,
    },
    OrderCancelled { date: NaiveDate, order: Order },
    TradeClosed { date: NaiveDate, trade: Trade },
}

impl Event {
    pub fn date(&self) -> NaiveDate {
        match self {
            Event::Close { date, .. }
            | Event::OrderSubmitted { date, .. }
            | Event::OrderFilled { date, .. }
            | Event::OrderRejected { date, .. }
            | Event::OrderCancelled { date, .. }
            | Event::TradeClosed { date, .. } => *date,
        }
    }
}
