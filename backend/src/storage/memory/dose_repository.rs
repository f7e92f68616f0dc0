use anyhow::Result;
use log::{debug, info};

use super::connection::MemoryConnection;
use crate::domain::models::dose::Dose as DomainDose;
use crate::storage::traits::DoseStorage;

/// In-memory dose log
#[derive(Clone)]
pub struct DoseRepository {
    connection: MemoryConnection,
}

impl DoseRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

impl DoseStorage for DoseRepository {
    fn store_dose(&self, dose: &DomainDose) -> Result<()> {
        let mut store = self.connection.write()?;
        if !store.children.contains_key(&dose.child_id) {
            return Err(anyhow::anyhow!(
                "Cannot log dose: child with ID '{}' not found",
                dose.child_id
            ));
        }

        if let Some(schedule_id) = dose.schedule_id.as_deref() {
            match store.schedules.get(schedule_id) {
                Some(schedule) if schedule.child_id == dose.child_id => {}
                Some(schedule) => {
                    return Err(anyhow::anyhow!(
                        "Cannot log dose: schedule '{}' belongs to child '{}', not '{}'",
                        schedule_id,
                        schedule.child_id,
                        dose.child_id
                    ));
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "Cannot log dose: medication schedule '{}' not found",
                        schedule_id
                    ));
                }
            }
        }

        store.doses.push(dose.clone());
        info!(
            "Logged dose '{}' for child {} at {}",
            dose.name,
            dose.child_id,
            dose.time.to_rfc3339()
        );
        Ok(())
    }

    fn latest_dose_for_schedule(&self, schedule_id: &str) -> Result<Option<DomainDose>> {
        let store = self.connection.read()?;
        let latest = store
            .doses
            .iter()
            .filter(|d| d.satisfies(schedule_id))
            .max_by_key(|d| d.time)
            .cloned();
        debug!(
            "Latest dose for schedule {}: {:?}",
            schedule_id,
            latest.as_ref().map(|d| d.time)
        );
        Ok(latest)
    }

    fn latest_dose_for_child(&self, child_id: &str) -> Result<Option<DomainDose>> {
        let store = self.connection.read()?;
        Ok(store
            .doses
            .iter()
            .filter(|d| d.child_id == child_id)
            .max_by_key(|d| d.time)
            .cloned())
    }
}
