//! Domain error types.

use chrono::NaiveDate;
use std::fmt;

/// Why the broker refused to fill an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Cash cannot cover margin plus commission.
    Margin,
    /// Requested size was zero.
    ZeroSize,
    /// A close order arrived while flat.
    NoPosition,
    /// Buy/sell only open from flat; exits go through a close order.
    PositionOpen,
    /// Another order is still pending.
    OrderPending,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Margin => write!(f, "insufficient cash for margin"),
            RejectReason::ZeroSize => write!(f, "zero order size"),
            RejectReason::NoPosition => write!(f, "no open position to close"),
            RejectReason::PositionOpen => write!(f, "a position is already open"),
            RejectReason::OrderPending => write!(f, "an order is already pending"),
        }
    }
}

/// Top-level error type for turtlebt.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    #[error("{indicator} not ready: observed {observed} bars, need {required}")]
    InsufficientData {
        indicator: &'static str,
        observed: usize,
        required: usize,
    },

    #[error("order rejected: {reason}")]
    OrderRejected { reason: RejectReason },

    #[error("invalid configuration {key}: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("bar feed out of order: {current} does not follow {previous}")]
    UnorderedFeed {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TurtleError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        TurtleError::InvalidConfiguration {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TurtleError> for std::process::ExitCode {
    fn from(err: &TurtleError) -> Self {
        let code: u8 = match err {
            TurtleError::Io(_) => 1,
            TurtleError::ConfigParse { .. } | TurtleError::InvalidConfiguration { .. } => 2,
            TurtleError::InsufficientData { .. } | TurtleError::OrderRejected { .. } => 3,
            TurtleError::Data { .. } => 5,
            TurtleError::UnorderedFeed { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = TurtleError::InsufficientData {
            indicator: "ema_slow",
            observed: 12,
            required: 350,
        };
        assert_eq!(
            err.to_string(),
            "ema_slow not ready: observed 12 bars, need 350"
        );
    }

    #[test]
    fn invalid_configuration_message() {
        let err = TurtleError::invalid("atr_period", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration atr_period: must be positive"
        );
    }

    #[test]
    fn order_rejected_message() {
        let err = TurtleError::OrderRejected {
            reason: RejectReason::Margin,
        };
        assert_eq!(err.to_string(), "order rejected: insufficient cash for margin");
    }

    #[test]
    fn unordered_feed_message() {
        let err = TurtleError::UnorderedFeed {
            previous: NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            current: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "bar feed out of order: 2020-01-02 does not follow 2020-01-03"
        );
    }
}
