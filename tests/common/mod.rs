#![allow(dead_code)]

use chrono::NaiveDate;
pub use turtlebt::domain::ohlcv::Bar;
use turtlebt::domain::error::TurtleError;
use turtlebt::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TurtleError> {
        if let Some(reason) = &self.error {
            return Err(TurtleError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> Bar {
    Bar {
        date: date(date_str),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day starting at `start`.
pub fn generate_bars(start: &str, closes: &[f64]) -> Vec<Bar> {
    let start = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: start + chrono::Duration::days(i as i64),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + i as i64,
        })
        .collect()
}

/// Close rises by `step` each bar from 100.
pub fn uptrend(n: usize, step: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + step * i as f64).collect();
    generate_bars("2000-01-03", &closes)
}

/// Close falls by `step` each bar from `start_close`.
pub fn downtrend(n: usize, start_close: f64, step: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n).map(|i| start_close - step * i as f64).collect();
    generate_bars("2000-01-03", &closes)
}

/// Deterministic saw-tooth around a drifting mean.
pub fn choppy(n: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let cycle = (i % 40) as f64;
            let swing = if cycle < 20.0 { cycle } else { 40.0 - cycle };
            200.0 + 0.3 * i as f64 + 3.0 * swing
        })
        .collect();
    generate_bars("2001-06-01", &closes)
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
