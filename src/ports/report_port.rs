//! Run reporting port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TurtleError;
use crate::domain::event::Event;

/// Receives a finished run: `on_start`, then every recorded event in order
/// (`replay` drives this after the engine returns), then the summary.
pub trait ReportPort {
    fn on_start(&mut self, starting_value: f64) -> Result<(), TurtleError>;

    fn on_event(&mut self, event: &Event) -> Result<(), TurtleError>;

    fn on_finish(&mut self, result: &BacktestResult) -> Result<(), TurtleError>;

    /// Default implementation: replays the recorded events, then the summary.
    fn replay(&mut self, result: &BacktestResult) -> Result<(), TurtleError> {
        result.events.iter().try_for_each(|e| self.on_event(e))?;
        self.on_finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::PortfolioState;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl ReportPort for Recorder {
        fn on_start(&mut self, starting_value: f64) -> Result<(), TurtleError> {
            self.calls.push(format!("start {starting_value}"));
            Ok(())
        }

        fn on_event(&mut self, event: &Event) -> Result<(), TurtleError> {
            self.calls.push(format!("event {}", event.date()));
            Ok(())
        }

        fn on_finish(&mut self, result: &BacktestResult) -> Result<(), TurtleError> {
            self.calls.push(format!("finish {}", result.final_value));
            Ok(())
        }
    }

    fn close(day: u32) -> Event {
        Event::Close {
            date: NaiveDate::from_ymd_opt(2020, 8, day).unwrap(),
            close: 100.0,
        }
    }

    #[test]
    fn replay_sends_recorded_events_then_summary() {
        let result = BacktestResult {
            portfolio: PortfolioState::new(1000.0),
            events: vec![close(3), close(4)],
            bars_processed: 2,
            final_value: 1000.0,
            last_date: None,
        };
        let mut recorder = Recorder::default();
        recorder.replay(&result).unwrap();
        assert_eq!(
            recorder.calls,
            vec!["event 2020-08-03", "event 2020-08-04", "finish 1000"]
        );
    }
}
