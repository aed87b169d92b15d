//! Open position and closed-trade records.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Signed: positive long, negative short.
    pub size: i64,
    pub entry_price: f64,
    pub entry_commission: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn units(&self) -> f64 {
        self.size.unsigned_abs() as f64
    }

    /// Margin locked while the position is open.
    pub fn margin_held(&self, margin_per_unit: f64) -> f64 {
        self.units() * margin_per_unit
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.size as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: i64,
    pub gross_pnl: f64,
    /// Entry plus exit commission.
    pub commission: f64,
    pub net_pnl: f64,
}

impl Trade {
    pub fn close(
        position: &Position,
        exit_price: f64,
        exit_commission: f64,
        exit_date: NaiveDate,
    ) -> Self {
        let gross_pnl = position.unrealized_pnl(exit_price);
        let commission = position.entry_commission + exit_commission;
        Trade {
            entry_date: position.entry_date,
            exit_date,
            entry_price: position.entry_price,
            exit_price,
            size: position.size,
            gross_pnl,
            commission,
            net_pnl: gross_pnl - commission,
        }
    }

    pub fn is_win(&self) -> bool {
        self.net_pnl > 0.0
    }
}
