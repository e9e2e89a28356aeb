//! CLI argument definitions for the lab report pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use crate::config::ExtractorKind;

#[derive(Parser)]
#[command(
    name = "medlabs",
    version,
    about = "MedLabs - Turn lab report text into validated panel payloads",
    long_about = "Extract, normalize and map lab report results onto a canonical panel.\n\n\
                  Supports CBC, biochemistry and urinalysis panels. Payloads are\n\
                  validated against the bundled v0.1 JSON schemas."
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

    /// Allow lab values in trace-level logs (patient data).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Configuration file (default: $MEDLABS_CONFIG, then ./medlabs.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline on a text report.
    Parse(ParseArgs),

    /// Validate a stored panel payload.
    Validate(ValidateArgs),

    /// List the known panels.
    Panels,
}

#[derive(Parser)]
pub struct ParseArgs {
    /// Lab report text file (form feeds separate pages).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Panel code or name, e.g. CBC or "Общий анализ крови".
    #[arg(long = "panel", value_name = "PANEL")]
    pub panel: Option<String>,

    /// Document metadata entry (repeatable), e.g. --meta lab_name="City Lab".
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Field extractor to use.
    #[arg(long = "extractor", value_enum)]
    pub extractor: Option<ExtractorArg>,

    /// Stored structured output replayed by the structured-json extractor.
    #[arg(long = "extractor-output", value_name = "PATH")]
    pub extractor_output: Option<PathBuf>,

    /// Schema file to validate against (overrides panel-based selection).
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Directory of schema documents replacing the bundled set.
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Standard version written into the payload.
    #[arg(long = "standard-version", value_name = "VERSION")]
    pub standard_version: Option<String>,

    /// Write the payload JSON here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Panel payload JSON file.
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Panel whose schema applies (default: the payload's panel_code.code).
    #[arg(long = "panel", value_name = "PANEL")]
    pub panel: Option<String>,

    /// Schema file to validate against (overrides panel-based selection).
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Directory of schema documents replacing the bundled set.
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtractorArg {
    Regex,
    StructuredJson,
}

impl From<ExtractorArg> for ExtractorKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Regex => Self::Regex,
            ExtractorArg::StructuredJson => Self::StructuredJson,
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

/// Parses `key=value`; the key must be non-empty.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
