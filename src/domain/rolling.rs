//! Streaming rolling-window primitives.
//!
//! Every type here consumes one value per bar through `update` and keeps only
//! O(period) state, so indicators never rescan history:
//! - `RollingExtreme`: highest/lowest over a trailing window (monotonic deque,
//!   amortised O(1) per update)
//! - `Ema`: SMA-seeded exponential moving average, k = 2/(n+1)
//! - `WilderAverage`: SMA-seeded smoothed average, avg = (avg*(n-1) + v)/n
//! - `Atr`: Wilder-smoothed true range
//!
//! `update` returns `None` while fewer than `period` values have been seen.

use std::collections::VecDeque;

use super::error::TurtleError;
use super::ohlcv::Bar;

fn check_period(key: &str, period: usize) -> Result<(), TurtleError> {
    if period == 0 {
        return Err(TurtleError::invalid(key, "period must be positive"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Highest,
    Lowest,
}

impl Extreme {
    /// True when `incoming` makes `existing` irrelevant for the rest of its life.
    fn dominates(self, incoming: f64, existing: f64) -> bool {
        match self {
            Extreme::Highest => incoming >= existing,
            Extreme::Lowest => incoming <= existing,
        }
    }
}

/// Highest or lowest value over the last `period` updates.
///
/// The deque holds `(sequence, value)` pairs whose values are monotonic from
/// front to back; the front is always the current extreme.
#[derive(Debug, Clone)]
pub struct RollingExtreme {
    period: usize,
    kind: Extreme,
    seen: usize,
    window: VecDeque<(usize, f64)>,
}

impl RollingExtreme {
    pub fn new(kind: Extreme, period: usize) -> Result<Self, TurtleError> {
        check_period("period", period)?;
        Ok(RollingExtreme {
            period,
            kind,
            seen: 0,
            window: VecDeque::with_capacity(period),
        })
    }

    pub fn highest(period: usize) -> Result<Self, TurtleError> {
        Self::new(Extreme::Highest, period)
    }

    pub fn lowest(period: usize) -> Result<Self, TurtleError> {
        Self::new(Extreme::Lowest, period)
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        let seq = self.seen;
        self.seen += 1;

        while let Some(&(_, back)) = self.window.back() {
            if self.kind.dominates(value, back) {
                self.window.pop_back();
            } else {
                break;
            }
        }
        self.window.push_back((seq, value));

        while let Some(&(front_seq, _)) = self.window.front() {
            if front_seq + self.period <= seq {
                self.window.pop_front();
            } else {
                break;
            }
        }

        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.seen < self.period {
            return None;
        }
        self.window.front().map(|&(_, v)| v)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn observed(&self) -> usize {
        self.seen
    }
}

/// Running sum used to seed the recursive averages with a simple mean.
#[derive(Debug, Clone, Default)]
struct Seed {
    sum: f64,
    count: usize,
}

impl Seed {
    /// Adds `value`; returns the mean once exactly `period` values are in.
    fn push(&mut self, value: f64, period: usize) -> Option<f64> {
        self.sum += value;
        self.count += 1;
        (self.count == period).then(|| self.sum / period as f64)
    }
}

/// Exponential moving average.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    k: f64,
    seed: Seed,
    observed: usize,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, TurtleError> {
        check_period("period", period)?;
        Ok(Ema {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seed: Seed::default(),
            observed: 0,
            value: None,
        })
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.observed += 1;
        self.value = match self.value {
            Some(prev) => Some(value * self.k + prev * (1.0 - self.k)),
            None => self.seed.push(value, self.period),
        };
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn observed(&self) -> usize {
        self.observed
    }
}

/// Wilder's smoothed moving average (the reference ATR smoothing).
#[derive(Debug, Clone)]
pub struct WilderAverage {
    period: usize,
    seed: Seed,
    value: Option<f64>,
}

impl WilderAverage {
    pub fn new(period: usize) -> Result<Self, TurtleError> {
        check_period("period", period)?;
        Ok(WilderAverage {
            period,
            seed: Seed::default(),
            value: None,
        })
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        let n = self.period as f64;
        self.value = match self.value {
            Some(prev) => Some((prev * (n - 1.0) + value) / n),
            None => self.seed.push(value, self.period),
        };
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// Average true range.
///
/// The first bar has no previous close, so its true range is high - low.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    observed: usize,
    smoother: WilderAverage,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, TurtleError> {
        Ok(Atr {
            period,
            prev_close: None,
            observed: 0,
            smoother: WilderAverage::new(period)?,
        })
    }

    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        let tr = match self.prev_close {
            Some(pc) => bar.true_range(pc),
            None => bar.high - bar.low,
        };
        self.prev_close = Some(bar.close);
        self.observed += 1;
        self.smoother.update(tr.max(0.0))
    }

    pub fn value(&self) -> Option<f64> {
        self.smoother.value()
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn observed(&self) -> usize {
        self.observed
    }
}
