//! # Engine Settings
//!
//! Optional YAML file tuning how pending medications are evaluated.
//!
//! ## YAML Format
//!
//! ```yaml
//! timezone: "+02:00"          # local | utc | fixed offset
//! pending_horizon: end_of_day # end_of_day | now
//! overdue_grace_minutes: 15
//! child: "child::1700000000000"
//! ```
//!
//! Every field is optional. A missing file yields the defaults.

use anyhow::Result;
use chrono::{Duration, FixedOffset};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::domain::pending_service::{PendingHorizon, PendingPolicy};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid timezone '{0}': expected local, utc or an offset such as +02:00")]
    InvalidTimezone(String),
}

/// Zone used for "today" and for times of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ZoneSetting {
    /// The host's local timezone
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl FromStr for ZoneSetting {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ZoneSetting::Local),
            "utc" | "z" => Ok(ZoneSetting::Utc),
            other => other
                .parse::<FixedOffset>()
                .map(ZoneSetting::Fixed)
                .map_err(|_| SettingsError::InvalidTimezone(s.to_string())),
        }
    }
}

impl TryFrom<String> for ZoneSetting {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZoneSetting> for String {
    fn from(zone: ZoneSetting) -> Self {
        zone.to_string()
    }
}

impl fmt::Display for ZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSetting::Local => f.write_str("local"),
            ZoneSetting::Utc => f.write_str("utc"),
            ZoneSetting::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Settings of the medication engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub timezone: ZoneSetting,
    pub pending_horizon: PendingHorizon,
    pub overdue_grace_minutes: u32,
    /// Child shown when none is requested explicitly
    pub child: Option<String>,
}

impl EngineSettings {
    /// Load settings from a YAML file. No path, or a path that does not
    /// exist, gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No settings file given, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!("Settings file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(path)?;
        let settings = Self::from_yaml_str(&yaml_content)?;
        debug!("Loaded engine settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_policy(&self) -> PendingPolicy {
        PendingPolicy {
            horizon: self.pending_horizon,
            overdue_grace: Duration::minutes(i64::from(self.overdue_grace_minutes)),
        }
    }
}
