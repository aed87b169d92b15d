//! Backtest configuration.
//!
//! INI layout read through [`ConfigPort`]:
//!
//! ```ini
//! [strategy]
//! fast_ema_period = 25
//! slow_ema_period = 350
//! donchian_period = 20
//! donchian_lookback = 1
//! atr_period = 20
//! atr_distance = 2.0
//!
//! [broker]
//! starting_cash = 500000
//! commission_rate = 5.0
//! margin_per_unit = 5000
//! sizer_perc = 0.01
//! fill_policy = next_open
//!
//! [data]
//! fromdate = 2000-01-01
//! todate = 2020-08-31
//! ```

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use super::config_validation::validate_config;
use super::error::TurtleError;
use crate::ports::config_port::ConfigPort;

/// When a submitted order is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPolicy {
    /// Fill at the open of the bar after submission.
    #[default]
    NextOpen,
    /// Fill at the close of the submitting bar.
    CurrentClose,
}

impl FromStr for FillPolicy {
    type Err = TurtleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next_open" | "open" => Ok(FillPolicy::NextOpen),
            "current_close" | "close" => Ok(FillPolicy::CurrentClose),
            other => Err(TurtleError::invalid(
                "fill_policy",
                format!("unknown fill policy '{other}', expected next_open or current_close"),
            )),
        }
    }
}

impl fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillPolicy::NextOpen => write!(f, "next_open"),
            FillPolicy::CurrentClose => write!(f, "current_close"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurtleConfig {
    pub fast_ema_period: usize,
    pub slow_ema_period: usize,
    pub donchian_period: usize,
    pub donchian_lookback: usize,
    pub atr_period: usize,
    pub atr_distance: f64,
    pub sizer_perc: f64,
    pub margin_per_unit: f64,
    pub starting_cash: f64,
    pub commission_rate: f64,
    pub fill_policy: FillPolicy,
    pub fromdate: NaiveDate,
    pub todate: NaiveDate,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        TurtleConfig {
            fast_ema_period: 25,
            slow_ema_period: 350,
            donchian_period: 20,
            donchian_lookback: 1,
            atr_period: 20,
            atr_distance: 2.0,
            sizer_perc: 0.01,
            margin_per_unit: 5000.0,
            starting_cash: 500_000.0,
            commission_rate: 5.0,
            fill_policy: FillPolicy::NextOpen,
            fromdate: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            todate: NaiveDate::from_ymd_opt(2020, 8, 31).unwrap_or_default(),
        }
    }
}

impl TurtleConfig {
    /// Build from a config source, falling back to defaults for missing keys,
    /// then validate.
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self, TurtleError> {
        let d = TurtleConfig::default();

        let fill_policy = match port.get_string("broker", "fill_policy") {
            Some(s) => s.parse()?,
            None => d.fill_policy,
        };

        let config = TurtleConfig {
            fast_ema_period: get_period(port, "fast_ema_period", d.fast_ema_period)?,
            slow_ema_period: get_period(port, "slow_ema_period", d.slow_ema_period)?,
            donchian_period: get_period(port, "donchian_period", d.donchian_period)?,
            donchian_lookback: get_period(port, "donchian_lookback", d.donchian_lookback)?,
            atr_period: get_period(port, "atr_period", d.atr_period)?,
            atr_distance: get_double(port, "strategy", "atr_distance", d.atr_distance)?,
            sizer_perc: get_double(port, "broker", "sizer_perc", d.sizer_perc)?,
            margin_per_unit: get_double(port, "broker", "margin_per_unit", d.margin_per_unit)?,
            starting_cash: get_double(port, "broker", "starting_cash", d.starting_cash)?,
            commission_rate: get_double(port, "broker", "commission_rate", d.commission_rate)?,
            fill_policy,
            fromdate: get_date(port, "fromdate", d.fromdate)?,
            todate: get_date(port, "todate", d.todate)?,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

fn get_period(port: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, TurtleError> {
    match port.get_int("strategy", key)? {
        None => Ok(default),
        Some(value) => {
            usize::try_from(value).map_err(|_| TurtleError::invalid(key, "must not be negative"))
        }
    }
}

fn get_double(
    port: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TurtleError> {
    Ok(port.get_double(section, key)?.unwrap_or(default))
}

fn get_date(
    port: &dyn ConfigPort,
    key: &str,
    default: NaiveDate,
) -> Result<NaiveDate, TurtleError> {
    match port.get_string("data", key) {
        None => Ok(default),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| TurtleError::invalid(key, "invalid date format (expected YYYY-MM-DD)")),
    }
}
