//! Broker simulator: order lifecycle, fills, margin and commission.
//!
//! Futures-style margin model. Opening `n` units locks `n * margin` of cash
//! and charges `n * commission`; closing releases the margin, settles the
//! price difference and charges commission again. At most one order is
//! pending at a time; every order ends Filled, Rejected or Cancelled.

use chrono::NaiveDate;
use std::fmt;
use tracing::debug;

use super::error::{RejectReason, TurtleError};
use super::portfolio::PortfolioState;
use super::position::{Position, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
    Close,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
            OrderSide::Close => write!(f, "CLOSE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Filled,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub side: OrderSide,
    /// Units requested; for `Close` the open position's size at submission.
    pub requested_size: i64,
    pub status: OrderStatus,
    pub created: NaiveDate,
}

/// Per-unit commission and margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionInfo {
    pub commission: f64,
    pub margin: f64,
}

impl CommissionInfo {
    pub fn commission_for(&self, units: f64) -> f64 {
        units * self.commission
    }

    pub fn margin_for(&self, units: f64) -> f64 {
        units * self.margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub order: Order,
    pub date: NaiveDate,
    pub price: f64,
    /// Margin locked (open) or released (close).
    pub value: f64,
    pub commission: f64,
    /// Signed position size after the fill.
    pub position_size: i64,
    /// Present when the fill flattened a position.
    pub trade: Option<Trade>,
}

impl Fill {
    /// Whether units were bought. A close of a short buys back.
    pub fn is_buy(&self) -> bool {
        match self.order.side {
            OrderSide::Buy => true,
            OrderSide::Sell => false,
            OrderSide::Close => self.trade.as_ref().is_some_and(|t| t.size < 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Filled(Fill),
    Rejected { order: Order, reason: RejectReason },
    Cancelled { order: Order },
}

impl OrderOutcome {
    pub fn order(&self) -> &Order {
        match self {
            OrderOutcome::Filled(fill) => &fill.order,
            OrderOutcome::Rejected { order, .. } | OrderOutcome::Cancelled { order } => order,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrokerSimulator {
    portfolio: PortfolioState,
    comm: CommissionInfo,
    pending: Option<Order>,
    next_id: u64,
}

impl BrokerSimulator {
    pub fn new(starting_cash: f64, comm: CommissionInfo) -> Self {
        BrokerSimulator {
            portfolio: PortfolioState::new(starting_cash),
            comm,
            pending: None,
            next_id: 1,
        }
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    pub fn into_portfolio(self) -> PortfolioState {
        self.portfolio
    }

    pub fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    pub fn pending(&self) -> Option<&Order> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cash plus the open position's margin and unrealized PnL at `price`.
    pub fn value(&self, price: f64) -> f64 {
        self.portfolio.total_value(price, self.comm.margin)
    }

    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        let equity = self.value(price);
        self.portfolio.record_equity(date, equity);
    }

    /// Queue an order. Fails without touching the pending order if one exists.
    pub fn submit(
        &mut self,
        side: OrderSide,
        size: i64,
        date: NaiveDate,
    ) -> Result<&Order, TurtleError> {
        if self.pending.is_some() {
            return Err(TurtleError::OrderRejected {
                reason: RejectReason::OrderPending,
            });
        }
        let requested_size = match side {
            OrderSide::Close => self.portfolio.position_size().abs(),
            OrderSide::Buy | OrderSide::Sell => size,
        };
        let order = Order {
            id: self.next_id,
            side,
            requested_size,
            status: OrderStatus::Pending,
            created: date,
        };
        self.next_id += 1;
        debug!(id = order.id, side = %side, size = requested_size, %date, "order submitted");
        Ok(&*self.pending.insert(order))
    }

    /// Resolve the pending order at `price`. `None` when nothing is pending.
    pub fn execute(&mut self, date: NaiveDate, price: f64) -> Option<OrderOutcome> {
        let mut order = self.pending.take()?;
        let result = match order.side {
            OrderSide::Buy => self.open(&order, 1, date, price),
            OrderSide::Sell => self.open(&order, -1, date, price),
            OrderSide::Close => self.close(date, price),
        };
        let outcome = match result {
            Ok((value, commission, trade)) => {
                order.status = OrderStatus::Filled;
                OrderOutcome::Filled(Fill {
                    order,
                    date,
                    price,
                    value,
                    commission,
                    position_size: self.portfolio.position_size(),
                    trade,
                })
            }
            Err(reason) => {
                order.status = OrderStatus::Rejected;
                OrderOutcome::Rejected { order, reason }
            }
        };
        let order = outcome.order();
        debug!(id = order.id, status = ?order.status, %date, price, "order resolved");
        Some(outcome)
    }

    pub fn cancel_pending(&mut self) -> Option<OrderOutcome> {
        let mut order = self.pending.take()?;
        order.status = OrderStatus::Cancelled;
        Some(OrderOutcome::Cancelled { order })
    }

    fn open(
        &mut self,
        order: &Order,
        direction: i64,
        date: NaiveDate,
        price: f64,
    ) -> Result<(f64, f64, Option<Trade>), RejectReason> {
        if order.requested_size <= 0 {
            return Err(RejectReason::ZeroSize);
        }
        if self.portfolio.position.is_some() {
            return Err(RejectReason::PositionOpen);
        }
        let units = order.requested_size as f64;
        let value = self.comm.margin_for(units);
        let commission = self.comm.commission_for(units);
        if value + commission > self.portfolio.cash {
            return Err(RejectReason::Margin);
        }

        self.portfolio.cash -= value + commission;
        self.portfolio.position = Some(Position {
            size: direction * order.requested_size,
            entry_price: price,
            entry_commission: commission,
            entry_date: date,
        });
        Ok((value, commission, None))
    }

    fn close(
        &mut self,
        date: NaiveDate,
        price: f64,
    ) -> Result<(f64, f64, Option<Trade>), RejectReason> {
        let position = self.portfolio.position.take().ok_or(RejectReason::NoPosition)?;
        let units = position.units();
        let value = position.margin_held(self.comm.margin);
        let commission = self.comm.commission_for(units);
        let trade = Trade::close(&position, price, commission, date);

        self.portfolio.cash += value + trade.gross_pnl - commission;
        self.portfolio.record_trade(trade.clone());
        Ok((value, commission, Some(trade)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 2, d).unwrap()
    }

    fn broker(cash: f64) -> BrokerSimulator {
        BrokerSimulator::new(
            cash,
            CommissionInfo {
                commission: 5.0,
                margin: 5000.0,
            },
        )
    }

    fn filled(outcome: Option<OrderOutcome>) -> Fill {
        match outcome {
            Some(OrderOutcome::Filled(fill)) => fill,
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn buy_locks_margin_and_commission() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Buy, 1, date(3)).unwrap();
        assert!(b.has_pending());

        let fill = filled(b.execute(date(4), 100.0));
        assert_eq!(fill.order.status, OrderStatus::Filled);
        assert_eq!(fill.price, 100.0);
        assert_eq!(fill.value, 5000.0);
        assert_eq!(fill.commission, 5.0);
        assert_eq!(fill.position_size, 1);
        assert!(fill.trade.is_none());
        assert_eq!(b.cash(), 500_000.0 - 5000.0 - 5.0);
        assert!(!b.has_pending());
    }

    #[test]
    fn sell_opens_short() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Sell, 2, date(3)).unwrap();
        let fill = filled(b.execute(date(4), 50.0));
        assert_eq!(fill.position_size, -2);
        assert_eq!(b.cash(), 500_000.0 - 10_000.0 - 10.0);
    }

    #[test]
    fn round_trip_long_net_zero() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Buy, 1, date(3)).unwrap();
        b.execute(date(4), 100.0);
        b.submit(OrderSide::Close, 0, date(5)).unwrap();
        let fill = filled(b.execute(date(6), 110.0));

        let trade = fill.trade.unwrap();
        assert_eq!(trade.gross_pnl, 10.0);
        assert_eq!(trade.commission, 10.0);
        assert_eq!(trade.net_pnl, 0.0);
        assert_eq!(fill.position_size, 0);
        assert!(b.portfolio().is_flat());
        assert_eq!(b.cash(), 500_000.0);
        assert_eq!(b.portfolio().closed_trades.len(), 1);
    }

    #[test]
    fn round_trip_short_profit() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Sell, 1, date(3)).unwrap();
        b.execute(date(4), 100.0);
        b.submit(OrderSide::Close, 0, date(5)).unwrap();
        let trade = filled(b.execute(date(6), 90.0)).trade.unwrap();
        assert_eq!(trade.gross_pnl, 10.0);
        assert_eq!(trade.net_pnl, 0.0);
        assert_eq!(b.cash(), 500_000.0);
    }

    #[test]
    fn close_order_records_position_size() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Sell, 3, date(3)).unwrap();
        b.execute(date(4), 100.0);
        let order = b.submit(OrderSide::Close, 0, date(5)).unwrap();
        assert_eq!(order.requested_size, 3);
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut b = broker(500_000.0);
        let first_id = b.submit(OrderSide::Buy, 1, date(3)).unwrap().id;
        let err = b.submit(OrderSide::Sell, 1, date(3)).unwrap_err();
        assert!(matches!(
            err,
            TurtleError::OrderRejected {
                reason: RejectReason::OrderPending
            }
        ));
        let pending = b.pending().unwrap();
        assert_eq!(pending.id, first_id);
        assert_eq!(pending.side, OrderSide::Buy);
    }

    #[test]
    fn insufficient_cash_rejects_with_margin() {
        let mut b = broker(5004.0);
        b.submit(OrderSide::Buy, 1, date(3)).unwrap();
        match b.execute(date(4), 100.0) {
            Some(OrderOutcome::Rejected { order, reason }) => {
                assert_eq!(reason, RejectReason::Margin);
                assert_eq!(order.status, OrderStatus::Rejected);
            }
            other => panic!("expected margin rejection, got {other:?}"),
        }
        assert_eq!(b.cash(), 5004.0);
        assert!(b.portfolio().is_flat());
    }

    #[test]
    fn zero_size_rejected() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Buy, 0, date(3)).unwrap();
        assert!(matches!(
            b.execute(date(4), 100.0),
            Some(OrderOutcome::Rejected {
                reason: RejectReason::ZeroSize,
                ..
            })
        ));
    }

    #[test]
    fn close_while_flat_rejected() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Close, 0, date(3)).unwrap();
        assert!(matches!(
            b.execute(date(4), 100.0),
            Some(OrderOutcome::Rejected {
                reason: RejectReason::NoPosition,
                ..
            })
        ));
    }

    #[test]
    fn open_while_positioned_rejected() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Buy, 1, date(3)).unwrap();
        b.execute(date(4), 100.0);
        b.submit(OrderSide::Buy, 1, date(5)).unwrap();
        assert!(matches!(
            b.execute(date(6), 100.0),
            Some(OrderOutcome::Rejected {
                reason: RejectReason::PositionOpen,
                ..
            })
        ));
        assert_eq!(b.portfolio().position_size(), 1);
    }

    #[test]
    fn execute_without_pending_is_none() {
        let mut b = broker(500_000.0);
        assert!(b.execute(date(4), 100.0).is_none());
    }

    #[test]
    fn cancel_pending() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Buy, 1, date(3)).unwrap();
        match b.cancel_pending() {
            Some(OrderOutcome::Cancelled { order }) => {
                assert_eq!(order.status, OrderStatus::Cancelled)
            }
            other => panic!("expected cancel, got {other:?}"),
        }
        assert!(!b.has_pending());
        assert!(b.cancel_pending().is_none());
    }

    #[test]
    fn value_marks_open_position() {
        let mut b = broker(500_000.0);
        b.submit(OrderSide::Buy, 1, date(3)).unwrap();
        b.execute(date(4), 100.0);
        assert_eq!(b.value(120.0), 500_000.0 - 5.0 + 20.0);
        b.record_equity(date(4), 120.0);
        assert_eq!(b.portfolio().equity_curve.len(), 1);
    }

    #[test]
    fn order_ids_increase() {
        let mut b = broker(500_000.0);
        let a = b.submit(OrderSide::Buy, 1, date(3)).unwrap().id;
        b.cancel_pending();
        let c = b.submit(OrderSide::Buy, 1, date(3)).unwrap().id;
        assert!(c > a);
    }
}
