//! Shared in-process store behind the memory repositories.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::models::child::Child;
use crate::domain::models::dose::Dose;
use crate::domain::models::medication_schedule::MedicationSchedule;
use crate::storage::traits::Connection;

use super::child_repository::ChildRepository;
use super::dose_repository::DoseRepository;
use super::schedule_repository::ScheduleRepository;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub children: BTreeMap<String, Child>,
    pub schedules: BTreeMap<String, MedicationSchedule>,
    /// Dose log in insertion order
    pub doses: Vec<Dose>,
}

/// Connection handle to an in-process store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStore>> {
        self.store
            .read()
            .map_err(|_| anyhow!("Medication store lock poisoned"))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStore>> {
        self.store
            .write()
            .map_err(|_| anyhow!("Medication store lock poisoned"))
    }
}

impl Connection for MemoryConnection {
    type ChildRepository = ChildRepository;
    type ScheduleRepository = ScheduleRepository;
    type DoseRepository = DoseRepository;

    fn create_child_repository(&self) -> Self::ChildRepository {
        ChildRepository::new(self.clone())
    }

    fn create_schedule_repository(&self) -> Self::ScheduleRepository {
        ScheduleRepository::new(self.clone())
    }

    fn create_dose_repository(&self) -> Self::DoseRepository {
        DoseRepository::new(self.clone())
    }
}
