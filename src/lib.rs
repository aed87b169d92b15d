//! turtlebt: Turtle trend-following strategy backtester.
//!
//! Hexagonal architecture: the replay core (indicators, strategy state machine,
//! broker simulator) lives in [`domain`], port traits in [`ports`], concrete
//! CSV/INI/console implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
