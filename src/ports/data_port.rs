//! Bar feed port trait.

use crate::domain::error::TurtleError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars with `start_date <= date <= end_date`, ascending by date.
    fn fetch_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TurtleError>;

    /// First date, last date and bar count of everything the source holds.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TurtleError> {
        let bars = self.fetch_bars(NaiveDate::MIN, NaiveDate::MAX)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
