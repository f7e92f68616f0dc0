//! # YAML Storage Module
//!
//! File formats read by the medication engine: the optional engine settings
//! and the household snapshot exported by the record layer. Both are plain
//! YAML documents parsed with `serde_yaml`.

pub mod settings;
pub mod snapshot;

pub use settings::{EngineSettings, SettingsError, ZoneSetting};
pub use snapshot::{load_household, HouseholdSnapshot, SnapshotError};
