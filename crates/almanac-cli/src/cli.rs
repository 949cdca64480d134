//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// almanac - Recurring event expansion and day agendas
#[derive(Debug, Parser)]
#[command(name = "almanac")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ALMANAC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the occurrences of a recurrence rule
    Expand {
        /// Rule in wire JSON form, e.g. '{"frequency":"weekly","count":4}'
        #[arg(long)]
        rule: String,

        /// Series start as YYYY-MM-DDTHH:MM:SS
        #[arg(long)]
        start: String,

        /// Only list occurrences at or after this local time
        #[arg(long)]
        from: Option<String>,

        /// Only list occurrences before this local time
        #[arg(long)]
        to: Option<String>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the events of one or more days
    Agenda {
        /// JSON file holding an array of events
        #[arg(long)]
        events: PathBuf,

        /// First day to show
        #[arg(long)]
        date: NaiveDate,

        /// Number of days to show
        #[arg(long, default_value = "1")]
        days: u32,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expand() {
        let cli = Cli::try_parse_from([
            "almanac",
            "-vv",
            "expand",
            "--rule",
            r#"{"frequency":"daily","count":3}"#,
            "--start",
            "2024-01-01T09:00:00",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Expand {
                start, from, to, ..
            } => {
                assert_eq!(start, "2024-01-01T09:00:00");
                assert!(from.is_none());
                assert!(to.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_agenda_date() {
        let cli = Cli::try_parse_from([
            "almanac",
            "agenda",
            "--events",
            "events.json",
            "--date",
            "2024-03-05",
            "--days",
            "7",
        ])
        .unwrap();
        match cli.command {
            Command::Agenda { date, days, .. } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
                assert_eq!(days, 7);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_date() {
        assert!(
            Cli::try_parse_from(["almanac", "agenda", "--events", "e.json", "--date", "soon"])
                .is_err()
        );
    }
}
