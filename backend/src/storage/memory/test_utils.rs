/// Test utilities for consistent storage fixtures
///
/// Every helper owns a fresh in-memory connection, so tests never share state.
use chrono::{DateTime, NaiveTime};
use uuid::Uuid;

use super::child_repository::ChildRepository;
use super::connection::MemoryConnection;
use super::dose_repository::DoseRepository;
use super::schedule_repository::ScheduleRepository;
use crate::domain::models::child::Child as DomainChild;
use crate::domain::models::dose::Dose as DomainDose;
use crate::domain::models::medication_schedule::{MedicationSchedule, Recurrence};
use crate::storage::traits::{ChildStorage, DoseStorage, MedicationScheduleStorage};

/// Test helper that provides repository instances sharing one connection
pub struct TestHelper {
    pub connection: MemoryConnection,
    pub child_repo: ChildRepository,
    pub schedule_repo: ScheduleRepository,
    pub dose_repo: DoseRepository,
}

impl TestHelper {
    pub fn new() -> Self {
        let connection = MemoryConnection::new();
        Self {
            child_repo: ChildRepository::new(connection.clone()),
            schedule_repo: ScheduleRepository::new(connection.clone()),
            dose_repo: DoseRepository::new(connection.clone()),
            connection,
        }
    }

    pub fn child(id: &str, first_name: &str, last_name: Option<&str>) -> DomainChild {
        DomainChild {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            birth_date: None,
        }
    }

    pub fn daily_schedule(
        child_id: &str,
        id: &str,
        name: &str,
        at: Option<NaiveTime>,
    ) -> MedicationSchedule {
        MedicationSchedule {
            id: id.to_string(),
            child_id: child_id.to_string(),
            name: name.to_string(),
            amount: None,
            amount_unit: None,
            recurrence: Recurrence::Daily { at },
            active: true,
            notes: None,
        }
    }

    /// Dose at an RFC 3339 timestamp
    pub fn dose(child_id: &str, schedule_id: Option<&str>, time: &str) -> DomainDose {
        let time = DateTime::parse_from_rfc3339(time).expect("Invalid test timestamp");
        DomainDose {
            id: Uuid::new_v4().to_string(),
            child_id: child_id.to_string(),
            schedule_id: schedule_id.map(str::to_string),
            time,
            name: "Test Dose".to_string(),
            amount: None,
            amount_unit: None,
            notes: None,
        }
    }

    /// Store a child named "Test Child" with the given ID
    pub fn create_child(&self, id: &str) -> DomainChild {
        let child = Self::child(id, "Test", Some("Child"));
        self.child_repo
            .store_child(&child)
            .expect("Failed to store test child");
        child
    }

    pub fn create_schedule(&self, schedule: MedicationSchedule) -> MedicationSchedule {
        self.schedule_repo
            .store_schedule(&schedule)
            .expect("Failed to store test schedule");
        schedule
    }

    pub fn create_daily_schedule(
        &self,
        child_id: &str,
        id: &str,
        name: &str,
        at: Option<NaiveTime>,
    ) -> MedicationSchedule {
        self.create_schedule(Self::daily_schedule(child_id, id, name, at))
    }

    pub fn log_dose(&self, child_id: &str, schedule_id: Option<&str>, time: &str) -> DomainDose {
        let dose = Self::dose(child_id, schedule_id, time);
        self.dose_repo
            .store_dose(&dose)
            .expect("Failed to store test dose");
        dose
    }
}
