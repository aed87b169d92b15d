//! Core domain types and logic.

pub mod ohlcv;
pub mod rolling;
pub mod indicator;
pub mod sizer;
pub mod position;
pub mod portfolio;
pub mod broker;
pub mod event;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config;
pub mod config_validation;
pub mod error;
