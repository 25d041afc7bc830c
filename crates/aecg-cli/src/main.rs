//! Annotated ECG command-line tool.

use clap::{ColorChoice, Parser};
use aecg_cli::logging::{LogConfig, LogFormat, init_logging};
use aecg_validate::ValidationOutcome;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_format, run_inspect, run_validate};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CANCELLED: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILURE);
    }
    let result = match &cli.command {
        Command::Validate(args) => run_validate(args).map(|outcome| match outcome {
            ValidationOutcome::Valid => EXIT_OK,
            ValidationOutcome::Invalid(_) => EXIT_FAILURE,
            ValidationOutcome::Cancelled => EXIT_CANCELLED,
        }),
        Command::Inspect(args) => run_inspect(args).map(|()| EXIT_OK),
        Command::Format(args) => run_format(args).map(|()| EXIT_OK),
    };
    let exit_code = result.unwrap_or_else(|error| {
        eprintln!("error: {error:#}");
        EXIT_FAILURE
    });
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
