//! `almanac expand`: list the occurrences of a single rule.

use almanac_core::date_key::parse_local;
use almanac_core::{DateKey, OccurrenceExpander, RuleSpec};
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliResult;

/// Arguments of `almanac expand`, as given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct ExpandArgs<'a> {
    pub rule: &'a str,
    pub start: &'a str,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

/// Expands the rule and prints one date-key per line, or a JSON array.
pub fn run(config: &CliConfig, args: ExpandArgs<'_>, json: bool) -> CliResult<()> {
    let keys = occurrences(config, args)?;
    println!("{}", render(&keys, json)?);
    Ok(())
}

/// Date-keys of the rule's occurrences within `[from, to)`.
pub fn occurrences(config: &CliConfig, args: ExpandArgs<'_>) -> CliResult<Vec<DateKey>> {
    let rule = RuleSpec::from_json(args.rule)?;
    let start = parse_local(args.start)?;
    let from = args.from.map(parse_local).transpose()?;
    let to = args.to.map(parse_local).transpose()?;

    let expander = OccurrenceExpander::new(config.expansion.clone());
    let keys: Vec<DateKey> = expander
        .expand(&rule, start, from, to)
        .into_iter()
        .map(DateKey::from_datetime)
        .collect();
    debug!(occurrences = keys.len(), "Expanded rule");
    Ok(keys)
}

fn render(keys: &[DateKey], json: bool) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(keys)?);
    }
    Ok(keys
        .iter()
        .map(DateKey::as_str)
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    fn args<'a>(rule: &'a str, start: &'a str) -> ExpandArgs<'a> {
        ExpandArgs {
            rule,
            start,
            from: None,
            to: None,
        }
    }

    #[test]
    fn biweekly_window() {
        let keys = occurrences(
            &CliConfig::default(),
            ExpandArgs {
                from: Some("2024-01-01T00:00:00"),
                to: Some("2024-02-01T00:00:00"),
                ..args(
                    r#"{"frequency":"weekly","interval":2,"byDay":[{"day":"mo"},{"day":"we"}]}"#,
                    "2024-01-01T09:00:00",
                )
            },
        )
        .unwrap();
        assert_eq!(
            render(&keys, false).unwrap(),
            "2024-01-01T09:00:00\n2024-01-03T09:00:00\n2024-01-15T09:00:00\n\
             2024-01-17T09:00:00\n2024-01-29T09:00:00\n2024-01-31T09:00:00"
        );
    }

    #[test]
    fn unbounded_without_window_uses_config_count() {
        let mut config = CliConfig::default();
        config.expansion = config.expansion.with_unbounded_count(Some(3));
        let keys = occurrences(
            &config,
            args(r#"{"frequency":"daily"}"#, "2024-01-01T09:00:00"),
        )
        .unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(
            render(&keys[..1], true).unwrap(),
            "[\n  \"2024-01-01T09:00:00\"\n]"
        );
    }

    #[test]
    fn bad_inputs() {
        let config = CliConfig::default();
        assert!(matches!(
            occurrences(&config, args("{", "2024-01-01T09:00:00")),
            Err(CliError::Core(almanac_core::Error::Json(_)))
        ));
        assert!(matches!(
            occurrences(&config, args(r#"{"frequency":"daily"}"#, "2024-01-01")),
            Err(CliError::Core(almanac_core::Error::InvalidDateKey { .. }))
        ));
    }
}
