//! Portfolio state and equity tracking.
//!
//! Mutated only by the broker simulator; everything else reads it.

use chrono::NaiveDate;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub starting_cash: f64,
    pub position: Option<Position>,
    pub realized_pnl: f64,
    pub closed_trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl PortfolioState {
    pub fn new(starting_cash: f64) -> Self {
        PortfolioState {
            cash: starting_cash,
            starting_cash,
            position: None,
            realized_pnl: 0.0,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Signed size of the open position, 0 when flat.
    pub fn position_size(&self) -> i64 {
        self.position.as_ref().map_or(0, |p| p.size)
    }

    /// Margin held plus unrealized PnL of the open position at `price`.
    pub fn position_value(&self, price: f64, margin_per_unit: f64) -> f64 {
        self.position.as_ref().map_or(0.0, |p| {
            p.margin_held(margin_per_unit) + p.unrealized_pnl(price)
        })
    }

    pub fn total_value(&self, price: f64, margin_per_unit: f64) -> f64 {
        self.cash + self.position_value(price, margin_per_unit)
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.realized_pnl += trade.net_pnl;
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }
}
