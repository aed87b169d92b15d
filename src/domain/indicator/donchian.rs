//! Donchian channel: highest high / lowest low over a trailing window.
//!
//! `lookback = 1` shifts the window one bar into the past, so the current
//! bar's own high/low is excluded and price can break out of the channel.
//! `lookback = 0` includes the current bar, so close can never exceed it.
//! Ready after `period + lookback` bars.

use std::collections::VecDeque;

use crate::domain::error::TurtleError;
use crate::domain::ohlcv::Bar;
use crate::domain::rolling::RollingExtreme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonchianValue {
    pub high: f64,
    pub mid: f64,
    pub low: f64,
}

#[derive(Debug, Clone)]
pub struct DonchianChannel {
    period: usize,
    lookback: usize,
    delayed: VecDeque<(f64, f64)>,
    highest: RollingExtreme,
    lowest: RollingExtreme,
    observed: usize,
}

impl DonchianChannel {
    pub fn new(period: usize, lookback: usize) -> Result<Self, TurtleError> {
        if lookback > 1 {
            return Err(TurtleError::invalid(
                "donchian_lookback",
                "lookback must be 0 or 1",
            ));
        }
        Ok(DonchianChannel {
            period,
            lookback,
            delayed: VecDeque::with_capacity(lookback + 1),
            highest: RollingExtreme::highest(period)?,
            lowest: RollingExtreme::lowest(period)?,
            observed: 0,
        })
    }

    pub fn update(&mut self, bar: &Bar) -> Option<DonchianValue> {
        self.observed += 1;
        self.delayed.push_back((bar.high, bar.low));
        if self.delayed.len() <= self.lookback {
            return None;
        }
        let (high, low) = self.delayed.pop_front()?;
        let high = self.highest.update(high);
        let low = self.lowest.update(low);
        match (high, low) {
            (Some(high), Some(low)) => Some(DonchianValue {
                high,
                mid: (high + low) / 2.0,
                low,
            }),
            _ => None,
        }
    }

    /// Bars needed before the first value.
    pub fn required(&self) -> usize {
        self.period + self.lookback
    }

    pub fn observed(&self) -> usize {
        self.observed
    }
}
