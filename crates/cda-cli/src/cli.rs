//! CLI argument definitions for the CDA extractor.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use cda_core::TimestampPolicy;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "cda",
    version,
    about = "Extract clinical facts from CDA/CCD documents",
    long_about = "Extract structured clinical facts from CDA/CCD documents.\n\n\
                  Sections are located by template identifier; results are\n\
                  printed as JSON with codes, values and units passed through verbatim."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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

    /// Allow clinical values (codes, results) to appear in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Prefix log lines with timestamps.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path of each log event.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Omit span close events from JSON logs.
    #[arg(long = "no-log-spans", global = true)]
    pub no_log_spans: bool,
}

impl Cli {
    /// Build logging configuration from CLI flags with consistent precedence.
    ///
    /// `--log-level` beats `-v`/`-q`; either one disables `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let level_filter = match self.log_level {
            Some(LogLevelArg::Error) => LevelFilter::ERROR,
            Some(LogLevelArg::Warn) => LevelFilter::WARN,
            Some(LogLevelArg::Info) => LevelFilter::INFO,
            Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
            Some(LogLevelArg::Trace) => LevelFilter::TRACE,
            None => self.verbosity.tracing_level_filter(),
        };
        let format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        let with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        let mut config = LogConfig::default()
            .with_level(level_filter)
            .with_format(format)
            .with_log_file(self.log_file.clone())
            .with_log_data(self.log_data)
            .with_timestamps(self.log_timestamps)
            .with_target(self.log_target)
            .with_spans(!self.no_log_spans)
            .with_ansi(with_ansi);
        config.use_env_filter = !(self.verbosity.is_present() || self.log_level.is_some());
        config
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract a section from a document and print it as JSON.
    Extract(ExtractArgs),

    /// Report whether a document is C32, C-CDA or unknown.
    Detect(DetectArgs),

    /// List the built-in section mappings.
    Sections,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Path to the CDA XML document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Built-in section mapping to use (see `cda sections`).
    #[arg(long = "section", default_value = "vitals")]
    pub section: String,

    /// Override the section template identifier (OID) of the mapping.
    #[arg(long = "template-id", value_name = "OID")]
    pub template_id: Option<String>,

    /// What to do with an entry whose effectiveTime is malformed.
    #[arg(long = "on-malformed", value_enum, default_value = "fail")]
    pub on_malformed: MalformedArg,

    /// Print compact single-line JSON.
    #[arg(long = "compact")]
    pub compact: bool,
}

#[derive(Parser)]
pub struct DetectArgs {
    /// Path to the CDA XML document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// CLI choices for malformed timestamps.
#[derive(Clone, Copy, ValueEnum)]
pub enum MalformedArg {
    /// Abort with an error.
    Fail,
    /// Drop the entry.
    Skip,
    /// Keep the entry without a date.
    Absent,
}

impl From<MalformedArg> for TimestampPolicy {
    fn from(arg: MalformedArg) -> Self {
        match arg {
            MalformedArg::Fail => TimestampPolicy::Fail,
            MalformedArg::Skip => TimestampPolicy::SkipEntry,
            MalformedArg::Absent => TimestampPolicy::TreatAsAbsent,
        }
    }
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
