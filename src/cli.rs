//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::ConsoleReporter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{Backtest, BacktestResult};
use crate::domain::config::TurtleConfig;
use crate::domain::error::TurtleError;
use crate::logging::init_logging;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "turtlebt", about = "Turtle trend-following backtester")]
pub struct Cli {
    /// Diagnostic level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a CSV bar file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        /// First bar date (overrides [data] fromdate)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last bar date (overrides [data] todate)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Print only the portfolio values and summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range of a CSV bar file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(&cli.log_level);
    match cli.command {
        Command::Backtest {
            config,
            data,
            from,
            to,
            quiet,
        } => run_backtest(&config, &data, from, to, quiet),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

fn report_error(err: &TurtleError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<TurtleConfig, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| report_error(&e))?;
    TurtleConfig::from_port(&adapter).map_err(|e| report_error(&e))
}

/// Apply date overrides to a loaded config.
pub fn with_date_range(
    mut config: TurtleConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<TurtleConfig, TurtleError> {
    if let Some(from) = from {
        config.fromdate = from;
    }
    if let Some(to) = to {
        config.todate = to;
    }
    if config.fromdate > config.todate {
        return Err(TurtleError::InvalidConfiguration {
            key: "fromdate".into(),
            reason: format!("{} is after todate {}", config.fromdate, config.todate),
        });
    }
    Ok(config)
}

/// Load bars for the configured range and replay them.
pub fn execute_backtest(
    config: &TurtleConfig,
    data: &dyn DataPort,
) -> Result<BacktestResult, TurtleError> {
    let bars = data.fetch_bars(config.fromdate, config.todate)?;
    info!(bars = bars.len(), from = %config.fromdate, to = %config.todate, "bars loaded");
    Backtest::new(config)?.run(bars)
}

fn run_backtest(
    config_path: &PathBuf,
    data_path: &PathBuf,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    quiet: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let config = match with_date_range(config, from, to) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    // Stage 2: Load bars and run
    eprintln!(
        "Loading bars from {} ({} to {})",
        data_path.display(),
        config.fromdate,
        config.todate
    );
    let data = CsvAdapter::new(data_path);
    let result = match execute_backtest(&config, &data) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };

    // Stage 3: Report
    let mut reporter = ConsoleReporter::stdout();
    let reported = reporter.on_start(config.starting_cash).and_then(|()| {
        if quiet {
            reporter.on_finish(&result)
        } else {
            reporter.replay(&result)
        }
    });
    match reported {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("\nStrategy:");
    eprintln!(
        "  EMA fast/slow:    {} / {}",
        config.fast_ema_period, config.slow_ema_period
    );
    eprintln!(
        "  Donchian:         period {}, lookback {}",
        config.donchian_period, config.donchian_lookback
    );
    eprintln!(
        "  ATR:              period {}, distance {}",
        config.atr_period, config.atr_distance
    );
    eprintln!("\nBroker:");
    eprintln!("  Starting cash:    {:.2}", config.starting_cash);
    eprintln!("  Commission/unit:  {:.2}", config.commission_rate);
    eprintln!("  Margin/unit:      {:.2}", config.margin_per_unit);
    eprintln!("  Sizer perc:       {}", config.sizer_perc);
    eprintln!("  Fill policy:      {}", config.fill_policy);
    eprintln!("\nData: {} to {}", config.fromdate, config.todate);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(data_path: &PathBuf) -> ExitCode {
    let data = CsvAdapter::new(data_path);
    match data.data_range() {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", data_path.display(), count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("No bars found in {}", data_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}
