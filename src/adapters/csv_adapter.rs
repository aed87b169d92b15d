//! CSV file data adapter.
//!
//! Expects a header row and `date,open,high,low,close,volume` columns with
//! `%Y-%m-%d` dates. Extra trailing columns are ignored.

use crate::domain::error::TurtleError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn data_error(line: u64, reason: impl std::fmt::Display) -> TurtleError {
    TurtleError::Data {
        reason: format!("line {line}: {reason}"),
    }
}

fn field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, TurtleError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| data_error(line, format!("missing {name} column")))
}

fn price(record: &StringRecord, idx: usize, name: &str, line: u64) -> Result<f64, TurtleError> {
    let raw = field(record, idx, name, line)?;
    let value: f64 = raw
        .parse()
        .map_err(|e| data_error(line, format!("invalid {name} value '{raw}': {e}")))?;
    if !value.is_finite() {
        return Err(data_error(line, format!("{name} is not finite")));
    }
    Ok(value)
}

fn parse_record(record: &StringRecord, line: u64) -> Result<Bar, TurtleError> {
    let date_str = field(record, 0, "date", line)?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| data_error(line, format!("invalid date format '{date_str}': {e}")))?;

    let open = price(record, 1, "open", line)?;
    let high = price(record, 2, "high", line)?;
    let low = price(record, 3, "low", line)?;
    let close = price(record, 4, "close", line)?;
    if high < low {
        return Err(data_error(line, format!("high {high} below low {low}")));
    }

    let volume_str = field(record, 5, "volume", line)?;
    let volume = match volume_str.parse::<i64>() {
        Ok(v) => v,
        // Some exports write volume as a float.
        Err(_) => volume_str
            .parse::<f64>()
            .map(|v| v as i64)
            .map_err(|e| data_error(line, format!("invalid volume value '{volume_str}': {e}")))?,
    };

    Ok(Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TurtleError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| TurtleError::Data {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| TurtleError::Data {
                reason: format!("CSV parse error in {}: {}", self.path.display(), e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let bar = parse_record(&record, line)?;
            if bar.date < start_date || bar.date > end_date {
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(TurtleError::Data {
                reason: format!("duplicate bar for {} in {}", pair[0].date, self.path.display()),
            });
        }

        debug!(
            path = %self.path.display(),
            bars = bars.len(),
            %start_date,
            %end_date,
            "loaded bars"
        );
        Ok(bars)
    }
}
