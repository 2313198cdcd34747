//! Application configuration types.

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::event::EventCategory;

/// Application configuration loaded from config file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Date phrase normalization settings.
    pub normalizer: NormalizerConfig,
}

/// Load configuration from disk.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    log::debug!(
        "Checking if configuration file exists at {}...",
        path.display()
    );
    if !path.exists() {
        log::warn!(
            "Could not find configuration at {}, so creating and using an empty configuration...",
            path.display()
        );
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create path to configuration file")?;
        }
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .context("could not create configuration file")?;
    }

    log::debug!("Loading configuration from {}...", path.display());
    let config = parse(&fs::read_to_string(path).context("could not read configuration file")?)?;
    log::trace!("Loaded configuration: {config:#?}");
    Ok(config)
}

/// Parse configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not a valid configuration.
pub fn parse(text: &str) -> anyhow::Result<Config> {
    toml::from_str(text).context("could not deserialize configuration file")
}

/// Time defaults used when a phrase carries a date but no time.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Time applied when no time is present (HH:MM format).
    #[serde(with = "time_format")]
    pub default_time: NaiveTime,
    /// Whether a known event category overrides `default_time`.
    pub category_default_times: bool,
    /// Default time for evening and social events.
    #[serde(with = "time_format")]
    pub evening_time: NaiveTime,
    /// Default time for morning and daytime events.
    #[serde(with = "time_format")]
    pub morning_time: NaiveTime,
    /// Default time for business events.
    #[serde(with = "time_format")]
    pub business_time: NaiveTime,
}

impl NormalizerConfig {
    /// The configured default time for an event category.
    #[must_use]
    pub fn time_for(&self, category: EventCategory) -> NaiveTime {
        match category {
            EventCategory::Evening => self.evening_time,
            EventCategory::Morning => self.morning_time,
            EventCategory::Business => self.business_time,
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_time: hour(19),
            category_default_times: false,
            evening_time: hour(19),
            morning_time: hour(10),
            business_time: hour(9),
        }
    }
}

fn hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("default hours are valid times")
}

pub mod time_format {
    //! Serde adapter for `HH:MM` times of day.

    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    /// Serialize as `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    /// Deserialize from `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid `HH:MM` time.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
