//! Configuration validation.
//!
//! Runs before any bar is processed; the first failing field aborts the run.

use super::config::TurtleConfig;
use super::error::TurtleError;

pub fn validate_config(config: &TurtleConfig) -> Result<(), TurtleError> {
    validate_periods(config)?;
    validate_lookback(config)?;
    validate_atr_distance(config)?;
    validate_sizer(config)?;
    validate_broker(config)?;
    validate_dates(config)?;
    Ok(())
}

fn validate_periods(config: &TurtleConfig) -> Result<(), TurtleError> {
    let periods = [
        ("fast_ema_period", config.fast_ema_period),
        ("slow_ema_period", config.slow_ema_period),
        ("donchian_period", config.donchian_period),
        ("atr_period", config.atr_period),
    ];
    for (key, value) in periods {
        if value == 0 {
            return Err(TurtleError::invalid(key, format!("{key} must be positive")));
        }
    }
    Ok(())
}

fn validate_lookback(config: &TurtleConfig) -> Result<(), TurtleError> {
    if config.donchian_lookback > 1 {
        return Err(TurtleError::invalid(
            "donchian_lookback",
            "donchian_lookback must be 0 or 1",
        ));
    }
    Ok(())
}

fn validate_atr_distance(config: &TurtleConfig) -> Result<(), TurtleError> {
    if !config.atr_distance.is_finite() {
        return Err(TurtleError::invalid(
            "atr_distance",
            "atr_distance must be a finite number",
        ));
    }
    Ok(())
}

// A non-positive perc is accepted and sizes every order to zero.
fn validate_sizer(config: &TurtleConfig) -> Result<(), TurtleError> {
    if !config.sizer_perc.is_finite() {
        return Err(TurtleError::invalid(
            "sizer_perc",
            "sizer_perc must be a finite number",
        ));
    }
    Ok(())
}

fn validate_broker(config: &TurtleConfig) -> Result<(), TurtleError> {
    if !(config.starting_cash > 0.0) {
        return Err(TurtleError::invalid(
            "starting_cash",
            "starting_cash must be positive",
        ));
    }
    if !(config.margin_per_unit > 0.0) {
        return Err(TurtleError::invalid(
            "margin_per_unit",
            "margin_per_unit must be positive",
        ));
    }
    if !(config.commission_rate >= 0.0) {
        return Err(TurtleError::invalid(
            "commission_rate",
            "commission_rate must be non-negative",
        ));
    }
    Ok(())
}

fn validate_dates(config: &TurtleConfig) -> Result<(), TurtleError> {
    if config.fromdate > config.todate {
        return Err(TurtleError::invalid(
            "fromdate",
            "fromdate must not be after todate",
        ));
    }
    Ok(())
}
