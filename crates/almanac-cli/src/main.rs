//! almanac CLI entry point.

use std::process::ExitCode;

use almanac_core::{TracingConfig, init_tracing};
use clap::Parser;

use almanac_cli::cli::{Cli, Command, ConfigAction};
use almanac_cli::commands::expand::ExpandArgs;
use almanac_cli::commands::{agenda, config, expand};
use almanac_cli::config::CliConfig;
use almanac_cli::error::CliResult;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::from_verbosity(cli.verbose)) {
        eprintln!("warning: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    match cli.command {
        Command::Expand {
            rule,
            start,
            from,
            to,
            json,
        } => expand::run(
            &config,
            ExpandArgs {
                rule: &rule,
                start: &start,
                from: from.as_deref(),
                to: to.as_deref(),
            },
            json,
        ),
        Command::Agenda {
            events,
            date,
            days,
            json,
        } => agenda::run(&config, &events, date, days, json),
        Command::Config { action } => match action {
            ConfigAction::Dump => config::dump(&config),
            ConfigAction::Path => config::path(),
        },
    }
}
