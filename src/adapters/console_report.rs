//! Plain-text run log.
//!
//! One `YYYY-MM-DD, <message>` line per event, followed by the run summary.

use std::io::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::broker::OrderSide;
use crate::domain::error::TurtleError;
use crate::domain::event::Event;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;

pub struct ConsoleReporter<W: Write> {
    out: W,
    show_summary: bool,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_summary: true,
        }
    }

    /// Skip the metrics block after the final value line.
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_summary(&mut self, metrics: &Metrics) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== Results ===")?;
        writeln!(self.out, "Total Return:     {:.2}%", metrics.total_return * 100.0)?;
        writeln!(self.out, "Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0)?;
        writeln!(self.out, "Total Trades:     {}", metrics.total_trades)?;
        writeln!(
            self.out,
            "Won / Lost:       {} / {}",
            metrics.trades_won, metrics.trades_lost
        )?;
        writeln!(self.out, "Win Rate:         {:.1}%", metrics.win_rate * 100.0)?;
        writeln!(self.out, "Profit Factor:    {:.2}", metrics.profit_factor)?;
        writeln!(self.out, "Net PnL:          {:.2}", metrics.net_pnl)?;
        writeln!(self.out, "Commission:       {:.2}", metrics.total_commission)
    }
}

/// Message part of an event line, without the date prefix.
pub fn event_message(event: &Event) -> String {
    match event {
        Event::Close { close, .. } => format!("Close, {close:.2}"),
        Event::OrderSubmitted {
            order,
            reference_price,
            ..
        } => match order.side {
            OrderSide::Buy => format!("BUY CREATE, {reference_price:.2}"),
            OrderSide::Sell => format!("SELL CREATE, {reference_price:.2}"),
            OrderSide::Close => format!("CLOSE CREATE, {reference_price:.2}"),
        },
        Event::OrderFilled { fill, .. } => format!(
            "{} EXECUTED, Price: {:.2}, Cost: {:.2}, Comm: {:.2}",
            if fill.is_buy() { "LONG" } else { "SHORT" },
            fill.price,
            fill.value,
            fill.commission
        ),
        Event::OrderRejected { .. } | Event::OrderCancelled { .. } => {
            "Order Canceled/Margin/Rejected".to_string()
        }
        Event::TradeClosed { trade, .. } => format!(
            "OPERATION PROFIT, Gross {:.2}, Net {:.2}",
            trade.gross_pnl, trade.net_pnl
        ),
    }
}

impl<W: Write> ReportPort for ConsoleReporter<W> {
    fn on_start(&mut self, starting_value: f64) -> Result<(), TurtleError> {
        writeln!(self.out, "Starting Portfolio Value: {starting_value:.2}")?;
        Ok(())
    }

    fn on_event(&mut self, event: &Event) -> Result<(), TurtleError> {
        writeln!(self.out, "{}, {}", event.date().format("%Y-%m-%d"), event_message(event))?;
        Ok(())
    }

    fn on_finish(&mut self, result: &BacktestResult) -> Result<(), TurtleError> {
        writeln!(self.out, "Final Portfolio Value: {:.2}", result.final_value)?;
        if self.show_summary {
            self.write_summary(&Metrics::compute(result))?;
        }
        self.out.flush()?;
        Ok(())
    }
}
