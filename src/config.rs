//! Runtime configuration.
//!
//! Everything comes from environment variables, optionally seeded from a
//! dotenv file in the user's config directory and from `.env` in the
//! working directory. Unset or unparseable values fall back to defaults.

use std::env;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::drag::DropMode;
use crate::timeline::{SentinelLabels, TimelineOptions};
use crate::utils;

pub const LOG_VAR: &str = "CASEBOOK_LOG";
pub const DROP_MODE_VAR: &str = "CASEBOOK_DROP_MODE";
pub const UNKNOWN_DATE_LAST_VAR: &str = "CASEBOOK_UNKNOWN_DATE_LAST";
pub const UNKNOWN_DATE_LABEL_VAR: &str = "CASEBOOK_UNKNOWN_DATE_LABEL";
pub const UNKNOWN_TIME_LABEL_VAR: &str = "CASEBOOK_UNKNOWN_TIME_LABEL";
pub const UNKNOWN_CHARACTER_LABEL_VAR: &str = "CASEBOOK_UNKNOWN_CHARACTER_LABEL";
pub const UNKNOWN_PLACE_LABEL_VAR: &str = "CASEBOOK_UNKNOWN_PLACE_LABEL";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// `tracing` filter directive for the binary's subscriber.
    pub log_filter: String,
    pub drop_mode: DropMode,
    /// Move the unknown-date bucket after every known date.
    pub unknown_date_last: bool,
    pub labels: SentinelLabels,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            drop_mode: DropMode::default(),
            unknown_date_last: false,
            labels: SentinelLabels::default(),
        }
    }
}

impl Config {
    /// Loads dotenv files, then reads the environment.
    ///
    /// The file at [`utils::config_file_path`] is loaded first if it exists,
    /// then `.env` from the working directory. Variables already set in the
    /// process win over both.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        if let Ok(path) = utils::config_file_path()
            && path.is_file()
        {
            dotenvy::from_path(&path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            debug!(path = %path.display(), "loaded config file");
        }
        dotenvy::dotenv().ok();

        Ok(Self::from_env())
    }

    /// Reads configuration from environment variables only.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::config::Config;
    ///
    /// let config = Config::from_env();
    /// assert!(!config.labels.date.is_empty());
    /// ```
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let log_filter = env::var(LOG_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let drop_mode = env::var(DROP_MODE_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.drop_mode);

        let unknown_date_last = env::var(UNKNOWN_DATE_LAST_VAR)
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.unknown_date_last);

        let labels = SentinelLabels {
            date: label_var(UNKNOWN_DATE_LABEL_VAR, defaults.labels.date),
            time: label_var(UNKNOWN_TIME_LABEL_VAR, defaults.labels.time),
            character: label_var(UNKNOWN_CHARACTER_LABEL_VAR, defaults.labels.character),
            place: label_var(UNKNOWN_PLACE_LABEL_VAR, defaults.labels.place),
        };

        Self {
            log_filter,
            drop_mode,
            unknown_date_last,
            labels,
        }
    }

    /// Timeline options derived from this configuration.
    pub fn timeline_options(&self) -> TimelineOptions {
        TimelineOptions {
            labels: self.labels.clone(),
            unknown_date_last: self.unknown_date_last,
        }
    }
}

fn label_var(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 7] = [
        LOG_VAR,
        DROP_MODE_VAR,
        UNKNOWN_DATE_LAST_VAR,
        UNKNOWN_DATE_LABEL_VAR,
        UNKNOWN_TIME_LABEL_VAR,
        UNKNOWN_CHARACTER_LABEL_VAR,
        UNKNOWN_PLACE_LABEL_VAR,
    ];

    fn clear_env() {
        for name in ALL_VARS {
            unsafe { env::remove_var(name) };
        }
    }

    #[test]
    #[serial]
    fn defaults_when_nothing_is_set() {
        clear_env();

        let config = Config::from_env();

        assert_eq!(config, Config::default());
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.labels.time, "--:--");
    }

    #[test]
    #[serial]
    fn reads_every_variable() {
        clear_env();
        unsafe {
            env::set_var(LOG_VAR, "casebook=debug");
            env::set_var(DROP_MODE_VAR, "toggle");
            env::set_var(UNKNOWN_DATE_LAST_VAR, "yes");
            env::set_var(UNKNOWN_DATE_LABEL_VAR, "no date");
            env::set_var(UNKNOWN_TIME_LABEL_VAR, "??");
            env::set_var(UNKNOWN_CHARACTER_LABEL_VAR, "nobody");
            env::set_var(UNKNOWN_PLACE_LABEL_VAR, "nowhere");
        }

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.log_filter, "casebook=debug");
        assert_eq!(config.drop_mode, DropMode::Toggle);
        assert!(config.unknown_date_last);
        assert_eq!(config.labels.date, "no date");
        assert_eq!(config.labels.time, "??");
        assert_eq!(config.labels.character, "nobody");
        assert_eq!(config.labels.place, "nowhere");
    }

    #[test]
    #[serial]
    fn unparseable_values_fall_back() {
        clear_env();
        unsafe {
            env::set_var(DROP_MODE_VAR, "sideways");
            env::set_var(UNKNOWN_DATE_LAST_VAR, "maybe");
            env::set_var(UNKNOWN_PLACE_LABEL_VAR, "   ");
        }

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.drop_mode, DropMode::Overwrite);
        assert!(!config.unknown_date_last);
        assert_eq!(config.labels.place, "場所不明");
    }

    #[test]
    fn timeline_options_carry_labels_and_placement() {
        let config = Config {
            unknown_date_last: true,
            ..Config::default()
        };

        let options = config.timeline_options();

        assert!(options.unknown_date_last);
        assert_eq!(options.labels, config.labels);
    }
}
