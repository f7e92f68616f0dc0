//! # Household Snapshot
//!
//! Read-only export of the record layer: children, their medication
//! schedules and the dose log, in one YAML document. Schedules keep the flat
//! column layout of the record layer and are converted into a [`Recurrence`]
//! on load.
//!
//! ## YAML Format
//!
//! ```yaml
//! children:
//!   - id: "child::1"
//!     first_name: "Emma"
//!     last_name: "Smith"
//! schedules:
//!   - id: "medication_schedule::child::1::1"
//!     child_id: "child::1"
//!     name: "Amoxicillin"
//!     amount: 5
//!     amount_unit: "ml"
//!     frequency: "weekly"        # daily | interval | weekly
//!     schedule_time: "23:00"     # HH:MM or HH:MM:SS
//!     interval_hours: null
//!     friday: true
//! doses:
//!   - child_id: "child::1"
//!     schedule_id: "medication_schedule::child::1::1"
//!     name: "Amoxicillin"
//!     time: "2024-03-16T00:01:00+02:00"
//! ```

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::domain::models::child::Child;
use crate::domain::models::dose::Dose;
use crate::domain::models::medication_schedule::{
    AmountUnit, MedicationSchedule, Recurrence, UnknownAmountUnit, WeekdaySet,
};
use crate::storage::memory::MemoryConnection;
use crate::storage::traits::{ChildStorage, Connection, DoseStorage, MedicationScheduleStorage};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Schedule '{schedule}' has an invalid time of day '{value}'")]
    InvalidTimeOfDay { schedule: String, value: String },
    #[error("Schedule '{schedule}' has an unknown frequency '{value}'")]
    UnknownFrequency { schedule: String, value: String },
    #[error(transparent)]
    UnknownAmountUnit(#[from] UnknownAmountUnit),
    #[error("{record} references unknown child '{child_id}'")]
    UnknownChild { record: String, child_id: String },
}

fn default_active() -> bool {
    true
}

/// Schedule row as exported by the record layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    pub child_id: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub amount_unit: Option<String>,
    pub frequency: String,
    #[serde(default)]
    pub schedule_time: Option<String>,
    #[serde(default)]
    pub interval_hours: Option<f64>,
    #[serde(default)]
    pub monday: bool,
    #[serde(default)]
    pub tuesday: bool,
    #[serde(default)]
    pub wednesday: bool,
    #[serde(default)]
    pub thursday: bool,
    #[serde(default)]
    pub friday: bool,
    #[serde(default)]
    pub saturday: bool,
    #[serde(default)]
    pub sunday: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScheduleRecord {
    fn time_of_day(&self) -> Result<Option<NaiveTime>, SnapshotError> {
        let Some(value) = self.schedule_time.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if value.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .map(Some)
            .map_err(|_| SnapshotError::InvalidTimeOfDay {
                schedule: self.id.clone(),
                value: value.to_string(),
            })
    }

    fn days(&self) -> WeekdaySet {
        WeekdaySet::from_flags([
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ])
    }
}

impl TryFrom<ScheduleRecord> for MedicationSchedule {
    type Error = SnapshotError;

    fn try_from(record: ScheduleRecord) -> Result<Self, Self::Error> {
        let recurrence = match record.frequency.trim().to_lowercase().as_str() {
            "daily" => Recurrence::Daily {
                at: record.time_of_day()?,
            },
            "interval" => Recurrence::Interval {
                hours: record.interval_hours,
            },
            "weekly" => Recurrence::Weekly {
                at: record.time_of_day()?,
                days: record.days(),
            },
            _ => {
                return Err(SnapshotError::UnknownFrequency {
                    schedule: record.id.clone(),
                    value: record.frequency.clone(),
                })
            }
        };
        let amount_unit = parse_unit(record.amount_unit.as_deref())?;

        Ok(MedicationSchedule {
            id: record.id,
            child_id: record.child_id,
            name: record.name,
            amount: record.amount,
            amount_unit,
            recurrence,
            active: record.active,
            notes: record.notes,
        })
    }
}

/// Dose row as exported by the record layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub child_id: String,
    #[serde(default)]
    pub schedule_id: Option<String>,
    pub name: String,
    pub time: DateTime<FixedOffset>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub amount_unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<DoseRecord> for Dose {
    type Error = SnapshotError;

    fn try_from(record: DoseRecord) -> Result<Self, Self::Error> {
        let amount_unit = parse_unit(record.amount_unit.as_deref())?;
        Ok(Dose {
            id: record.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            child_id: record.child_id,
            schedule_id: record.schedule_id.filter(|id| !id.is_empty()),
            time: record.time,
            name: record.name,
            amount: record.amount,
            amount_unit,
            notes: record.notes,
        })
    }
}

fn parse_unit(value: Option<&str>) -> Result<Option<AmountUnit>, UnknownAmountUnit> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(unit) => unit.parse().map(Some),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdSnapshot {
    pub children: Vec<Child>,
    pub schedules: Vec<ScheduleRecord>,
    pub doses: Vec<DoseRecord>,
}

impl HouseholdSnapshot {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the snapshot into a fresh in-memory store
    pub fn into_connection(self) -> Result<MemoryConnection> {
        let connection = MemoryConnection::new();
        let child_repository = connection.create_child_repository();
        let schedule_repository = connection.create_schedule_repository();
        let dose_repository = connection.create_dose_repository();

        let child_ids: HashSet<String> = self.children.iter().map(|c| c.id.clone()).collect();
        let require_child = |record: &str, child_id: &str| -> Result<(), SnapshotError> {
            if child_ids.contains(child_id) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownChild {
                    record: record.to_string(),
                    child_id: child_id.to_string(),
                })
            }
        };

        for child in &self.children {
            child_repository.store_child(child)?;
        }

        for record in self.schedules {
            require_child(&format!("Schedule '{}'", record.id), &record.child_id)?;
            let schedule = MedicationSchedule::try_from(record)?;
            schedule_repository.store_schedule(&schedule)?;
        }

        for record in self.doses {
            require_child(&format!("Dose '{}'", record.name), &record.child_id)?;
            let dose = Dose::try_from(record)?;
            dose_repository.store_dose(&dose)?;
        }

        Ok(connection)
    }
}

/// Read a household snapshot file into an in-memory store
pub fn load_household(path: &Path) -> Result<MemoryConnection> {
    let yaml_content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read household file {:?}: {}", path, e))?;
    let snapshot = HouseholdSnapshot::from_yaml_str(&yaml_content)?;
    debug!(
        "Parsed household snapshot with {} children, {} schedules, {} doses",
        snapshot.children.len(),
        snapshot.schedules.len(),
        snapshot.doses.len()
    );

    let connection = snapshot.into_connection()?;
    info!("Loaded household snapshot from {:?}", path);
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use tempfile::TempDir;

    const HOUSEHOLD: &str = r#"
children:
  - id: "child::1"
    first_name: "Emma"
    last_name: "Smith"
    birth_date: "2019-06-01"
  - id: "child::2"
    first_name: "Liam"
schedules:
  - id: "schedule-weekly"
    child_id: "child::1"
    name: "Amoxicillin"
    amount: 5
    amount_unit: "ml"
    frequency: "weekly"
    schedule_time: "23:00"
    monday: true
    friday: true
  - id: "schedule-interval"
    child_id: "child::1"
    name: "Ibuprofen"
    frequency: "interval"
    interval_hours: 6
  - id: "schedule-daily"
    child_id: "child::2"
    name: "Vitamin D"
    amount_unit: "IU"
    frequency: "daily"
    schedule_time: "09:00:30"
    active: false
doses:
  - id: "dose-1"
    child_id: "child::1"
    schedule_id: "schedule-weekly"
    name: "Amoxicillin"
    time: "2024-03-16T00:01:00+02:00"
  - child_id: "child::2"
    name: "Tylenol"
    time: "2024-03-15T10:00:00+02:00"
"#;

    #[test]
    fn test_snapshot_loads_into_store() {
        let connection = HouseholdSnapshot::from_yaml_str(HOUSEHOLD)
            .unwrap()
            .into_connection()
            .unwrap();

        let children = connection.create_child_repository().list_children().unwrap();
        assert_eq!(children.len(), 2);

        let schedules = connection.create_schedule_repository();
        let weekly = schedules.get_schedule("schedule-weekly").unwrap().unwrap();
        assert_eq!(weekly.amount_unit, Some(AmountUnit::Milliliter));
        assert_eq!(
            weekly.recurrence,
            Recurrence::Weekly {
                at: NaiveTime::from_hms_opt(23, 0, 0),
                days: WeekdaySet::from_days([Weekday::Mon, Weekday::Fri]),
            }
        );

        let interval = schedules.get_schedule("schedule-interval").unwrap().unwrap();
        assert_eq!(interval.recurrence, Recurrence::Interval { hours: Some(6.0) });
        assert!(interval.active);

        let daily = schedules.get_schedule("schedule-daily").unwrap().unwrap();
        assert_eq!(daily.recurrence.time_of_day(), NaiveTime::from_hms_opt(9, 0, 30));
        assert!(!daily.active);

        let doses = connection.create_dose_repository();
        let latest = doses.latest_dose_for_schedule("schedule-weekly").unwrap().unwrap();
        assert_eq!(latest.id, "dose-1");

        let unscheduled = doses.latest_dose_for_child("child::2").unwrap().unwrap();
        assert!(Uuid::parse_str(&unscheduled.id).is_ok());
        assert_eq!(unscheduled.schedule_id, None);
    }

    fn schedule_record(frequency: &str, schedule_time: Option<&str>) -> ScheduleRecord {
        ScheduleRecord {
            id: "schedule-1".to_string(),
            child_id: "child::1".to_string(),
            name: "Test Med".to_string(),
            amount: None,
            amount_unit: None,
            frequency: frequency.to_string(),
            schedule_time: schedule_time.map(str::to_string),
            interval_hours: None,
            monday: false,
            tuesday: false,
            wednesday: false,
            thursday: false,
            friday: false,
            saturday: false,
            sunday: false,
            active: true,
            notes: None,
        }
    }

    #[test]
    fn test_schedule_record_errors() {
        assert_eq!(
            MedicationSchedule::try_from(schedule_record("daily", Some("25:00"))).unwrap_err(),
            SnapshotError::InvalidTimeOfDay {
                schedule: "schedule-1".to_string(),
                value: "25:00".to_string(),
            }
        );
        assert_eq!(
            MedicationSchedule::try_from(schedule_record("monthly", None)).unwrap_err(),
            SnapshotError::UnknownFrequency {
                schedule: "schedule-1".to_string(),
                value: "monthly".to_string(),
            }
        );

        let mut record = schedule_record("daily", None);
        record.amount_unit = Some("cups".to_string());
        assert_eq!(
            MedicationSchedule::try_from(record).unwrap_err(),
            SnapshotError::UnknownAmountUnit(UnknownAmountUnit("cups".to_string()))
        );
    }

    #[test]
    fn test_blank_schedule_time_means_any_time() {
        let schedule = MedicationSchedule::try_from(schedule_record("Daily", Some(" "))).unwrap();
        assert_eq!(schedule.recurrence, Recurrence::Daily { at: None });
    }

    #[test]
    fn test_unknown_child_reference() {
        let yaml = r#"
schedules:
  - id: "schedule-1"
    child_id: "child::ghost"
    name: "Vitamin D"
    frequency: "daily"
"#;
        let err = HouseholdSnapshot::from_yaml_str(yaml)
            .unwrap()
            .into_connection()
            .unwrap_err();
        assert!(err.to_string().contains("unknown child 'child::ghost'"));
    }

    #[test]
    fn test_dose_for_unknown_schedule_is_rejected() {
        let yaml = r#"
children:
  - id: "child::1"
    first_name: "Emma"
doses:
  - child_id: "child::1"
    schedule_id: "schedule-missing"
    name: "Vitamin D"
    time: "2024-03-15T10:00:00Z"
"#;
        let result = HouseholdSnapshot::from_yaml_str(yaml)
            .unwrap()
            .into_connection();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_household_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("household.yaml");
        fs::write(&path, HOUSEHOLD).unwrap();

        let connection = load_household(&path).unwrap();
        let schedules = connection
            .create_schedule_repository()
            .list_schedules("child::1")
            .unwrap();
        assert_eq!(schedules.len(), 2);

        let missing = temp_dir.path().join("missing.yaml");
        assert!(load_household(&missing).is_err());
    }
}
