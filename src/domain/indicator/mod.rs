//! Indicator set consumed by the Turtle strategy.
//!
//! `IndicatorSet` advances every indicator by one bar and returns either a
//! complete `IndicatorSnapshot` or `TurtleError::InsufficientData` naming the
//! first indicator still warming up.

pub mod donchian;

use crate::domain::config::TurtleConfig;
use crate::domain::error::TurtleError;
use crate::domain::ohlcv::Bar;
use crate::domain::rolling::{Atr, Ema};

use self::donchian::{DonchianChannel, DonchianValue};

/// Indicator values for one bar, all ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub donchian: DonchianValue,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub atr: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorSet {
    donchian: DonchianChannel,
    ema_fast: Ema,
    ema_slow: Ema,
    atr: Atr,
}

impl IndicatorSet {
    pub fn new(
        donchian_period: usize,
        donchian_lookback: usize,
        fast_ema_period: usize,
        slow_ema_period: usize,
        atr_period: usize,
    ) -> Result<Self, TurtleError> {
        Ok(IndicatorSet {
            donchian: DonchianChannel::new(donchian_period, donchian_lookback)?,
            ema_fast: Ema::new(fast_ema_period)?,
            ema_slow: Ema::new(slow_ema_period)?,
            atr: Atr::new(atr_period)?,
        })
    }

    pub fn from_config(config: &TurtleConfig) -> Result<Self, TurtleError> {
        Self::new(
            config.donchian_period,
            config.donchian_lookback,
            config.fast_ema_period,
            config.slow_ema_period,
            config.atr_period,
        )
    }

    /// Bars needed before every indicator is ready.
    pub fn warmup(&self) -> usize {
        self.donchian
            .required()
            .max(self.ema_fast.period())
            .max(self.ema_slow.period())
            .max(self.atr.period())
    }

    pub fn update(&mut self, bar: &Bar) -> Result<IndicatorSnapshot, TurtleError> {
        let donchian = self.donchian.update(bar);
        let ema_fast = self.ema_fast.update(bar.close);
        let ema_slow = self.ema_slow.update(bar.close);
        let atr = self.atr.update(bar);

        let donchian = donchian.ok_or_else(|| TurtleError::InsufficientData {
            indicator: "donchian",
            observed: self.donchian.observed(),
            required: self.donchian.required(),
        })?;
        let ema_fast = ema_fast.ok_or_else(|| TurtleError::InsufficientData {
            indicator: "ema_fast",
            observed: self.ema_fast.observed(),
            required: self.ema_fast.period(),
        })?;
        let ema_slow = ema_slow.ok_or_else(|| TurtleError::InsufficientData {
            indicator: "ema_slow",
            observed: self.ema_slow.observed(),
            required: self.ema_slow.period(),
        })?;
        let atr = atr.ok_or_else(|| TurtleError::InsufficientData {
            indicator: "atr",
            observed: self.atr.observed(),
            required: self.atr.period(),
        })?;

        Ok(IndicatorSnapshot {
            donchian,
            ema_fast,
            ema_slow,
            atr,
        })
    }
}
