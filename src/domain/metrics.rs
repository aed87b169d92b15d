//! Run summary statistics.

use super::backtest::BacktestResult;
use super::portfolio::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub starting_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub gross_pnl: f64,
    pub net_pnl: f64,
    pub total_commission: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let portfolio = &result.portfolio;
        let trades = &portfolio.closed_trades;
        let starting_value = portfolio.starting_cash;

        let total_return = if starting_value > 0.0 {
            (result.final_value - starting_value) / starting_value
        } else {
            0.0
        };

        let trades_won = trades.iter().filter(|t| t.is_win()).count();
        let trades_lost = trades.iter().filter(|t| t.net_pnl < 0.0).count();
        let win_rate = if trades.is_empty() {
            0.0
        } else {
            trades_won as f64 / trades.len() as f64
        };

        let gross_profit: f64 = trades.iter().map(|t| t.net_pnl).filter(|p| *p > 0.0).sum();
        let gross_loss: f64 = trades
            .iter()
            .map(|t| t.net_pnl)
            .filter(|p| *p < 0.0)
            .map(f64::abs)
            .sum();
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        Metrics {
            starting_value,
            final_value: result.final_value,
            total_return,
            max_drawdown: compute_max_drawdown(&portfolio.equity_curve),
            total_trades: trades.len(),
            trades_won,
            trades_lost,
            win_rate,
            profit_factor,
            gross_pnl: trades.iter().map(|t| t.gross_pnl).sum(),
            net_pnl: trades.iter().map(|t| t.net_pnl).sum(),
            total_commission: trades.iter().map(|t| t.commission).sum(),
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn compute_max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for point in curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }
    max_dd
}
