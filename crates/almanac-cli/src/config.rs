//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/almanac/config.toml` by default:
//!
//! ```toml
//! view_time_zone = "Europe/Paris"
//!
//! [expansion]
//! result_cap = 16384
//! unbounded_count = 2
//!
//! [index]
//! margin_before_days = 60
//! margin_after_days = 120
//!
//! [visibility]
//! hidden_calendars = ["holidays"]
//! show_declined = false
//! ```

use std::path::{Path, PathBuf};

use almanac_core::{Calendar, ExpansionConfig, IndexConfig, ViewZone, VisibilityFilter};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Configuration for the almanac CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// IANA zone agendas are shown in. Unset means floating local time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_time_zone: Option<String>,

    /// Expansion limits.
    pub expansion: ExpansionConfig,

    /// Recurring window margins.
    pub index: IndexConfig,

    /// Which occurrences agendas show.
    pub visibility: VisibilityFilter,
}

impl CliConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("almanac")
    }

    /// Resolves `view_time_zone`.
    pub fn view_zone(&self) -> CliResult<ViewZone> {
        match self.view_time_zone.as_deref() {
            Some(name) => Ok(ViewZone::parse(name)?),
            None => Ok(ViewZone::floating()),
        }
    }

    /// An empty calendar set up with these settings.
    pub fn calendar(&self) -> CliResult<Calendar> {
        let mut calendar = Calendar::new(self.expansion.clone(), self.index.clone());
        calendar.set_visibility(self.visibility.clone());
        calendar.set_view_zone(self.view_zone()?);
        Ok(calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = CliConfig::load_from(file.path()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.expansion.result_cap, 16384);
        assert_eq!(config.index.margin_after_days, 120);
        assert!(config.visibility.show_all_day);
    }

    #[test]
    fn partial_sections() {
        let file = write_config(
            r#"
view_time_zone = "Asia/Tokyo"

[expansion]
unbounded_count = 5

[visibility]
hidden_calendars = ["holidays"]
show_declined = true
"#,
        );
        let config = CliConfig::load_from(file.path()).unwrap();
        assert_eq!(config.view_time_zone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(config.expansion.unbounded_count, Some(5));
        assert_eq!(config.expansion.result_cap, 16384);
        assert!(config.visibility.hidden_calendars.contains("holidays"));
        assert!(config.visibility.show_declined);
        assert_eq!(config.index, IndexConfig::default());
        assert_eq!(config.view_zone().unwrap().name(), Some("Asia/Tokyo"));
    }

    #[test]
    fn missing_file_errors_when_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn invalid_toml() {
        let file = write_config("[expansion\nresult_cap = 1");
        assert!(matches!(
            CliConfig::load_from(file.path()),
            Err(CliError::Toml(_))
        ));
    }

    #[test]
    fn unknown_zone_rejected() {
        let config = CliConfig {
            view_time_zone: Some("Mars/Olympus".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.calendar(),
            Err(CliError::Core(almanac_core::Error::InvalidTimeZone { .. }))
        ));
    }

    #[test]
    fn dump_reloads() {
        let config = CliConfig {
            view_time_zone: Some("Europe/Paris".to_string()),
            visibility: VisibilityFilter::default().with_hidden_calendar("holidays"),
            ..Default::default()
        };
        let rendered = toml::to_string_pretty(&config).unwrap();
        let reloaded: CliConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        let path = CliConfig::default_path();
        assert!(path.ends_with("almanac/config.toml"));
    }
}
