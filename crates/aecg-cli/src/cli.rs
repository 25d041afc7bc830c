//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "aecg",
    version,
    about = "Inspect, validate and reformat HL7 annotated ECG documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow subject identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a document for conformance defects.
    Validate(ValidateArgs),

    /// Print identifiers, series, leads and heart rate.
    Inspect(InspectArgs),

    /// Decode and re-encode a document with canonical formatting.
    Format(FormatArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Cancel validation after this many milliseconds.
    #[arg(long = "timeout-ms", value_name = "N")]
    pub timeout_ms: Option<u64>,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the summary as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct FormatArgs {
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Destination file (stdout when omitted).
    #[arg(long = "output", short = 'o', value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Spaces per nesting level; 0 writes a single line.
    #[arg(long = "indent", default_value_t = 2)]
    pub indent: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
