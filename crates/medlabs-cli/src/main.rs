//! MedLabs CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use medlabs_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use medlabs_cli::commands::{run_panels, run_parse, run_validate};
use medlabs_cli::config::MedlabsConfig;
use medlabs_cli::logging::{LogConfig, LogFormat, init_logging};
use medlabs_cli::summary::{parse_summary, step_table, validation_summary};
use medlabs_core::StageFailure;
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = match MedlabsConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let exit_code = match &cli.command {
        Command::Parse(args) => match run_parse(args, &config) {
            Ok(result) => {
                // The payload owns stdout unless it was written to a file.
                if args.output.is_some() {
                    print!("{}", parse_summary(&result));
                } else {
                    eprint!("{}", parse_summary(&result));
                }
                if result.is_valid() { 0 } else { 1 }
            }
            Err(error) => {
                if let Some(failure) = error.downcast_ref::<StageFailure>() {
                    eprintln!("{}", step_table(&failure.steps));
                }
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Validate(args) => match run_validate(args, &config) {
            Ok(result) => {
                print!("{}", validation_summary(&result));
                if result.is_valid { 0 } else { 1 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Panels => {
            println!("{}", run_panels());
            0
        }
    };
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
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config.log_data = cli.log_data;
    config
}
