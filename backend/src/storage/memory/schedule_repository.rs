use anyhow::Result;
use log::{debug, info};

use super::connection::MemoryConnection;
use crate::domain::models::medication_schedule::MedicationSchedule as DomainMedicationSchedule;
use crate::storage::traits::MedicationScheduleStorage;

/// In-memory medication schedule repository
#[derive(Clone)]
pub struct ScheduleRepository {
    connection: MemoryConnection,
}

impl ScheduleRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }

    fn sorted_by_name(mut schedules: Vec<DomainMedicationSchedule>) -> Vec<DomainMedicationSchedule> {
        schedules.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        schedules
    }
}

impl MedicationScheduleStorage for ScheduleRepository {
    fn store_schedule(&self, schedule: &DomainMedicationSchedule) -> Result<()> {
        let mut store = self.connection.write()?;
        if !store.children.contains_key(&schedule.child_id) {
            return Err(anyhow::anyhow!(
                "Cannot store medication schedule: child with ID '{}' not found. Create the child first.",
                schedule.child_id
            ));
        }

        if let Some(existing) = store.schedules.get(&schedule.id) {
            if existing.child_id != schedule.child_id {
                return Err(anyhow::anyhow!(
                    "Cannot store medication schedule '{}': it belongs to child '{}', not '{}'",
                    schedule.id,
                    existing.child_id,
                    schedule.child_id
                ));
            }
        }

        store.schedules.insert(schedule.id.clone(), schedule.clone());
        info!(
            "Stored {} medication schedule '{}' for child {}",
            schedule.frequency(),
            schedule.name,
            schedule.child_id
        );
        Ok(())
    }

    fn get_schedule(&self, schedule_id: &str) -> Result<Option<DomainMedicationSchedule>> {
        let store = self.connection.read()?;
        Ok(store.schedules.get(schedule_id).cloned())
    }

    fn list_schedules(&self, child_id: &str) -> Result<Vec<DomainMedicationSchedule>> {
        let store = self.connection.read()?;
        let schedules = store
            .schedules
            .values()
            .filter(|s| s.child_id == child_id)
            .cloned()
            .collect();
        Ok(Self::sorted_by_name(schedules))
    }

    fn list_active_schedules(&self, child_id: &str) -> Result<Vec<DomainMedicationSchedule>> {
        let store = self.connection.read()?;
        let schedules: Vec<DomainMedicationSchedule> = store
            .schedules
            .values()
            .filter(|s| s.child_id == child_id && s.active)
            .cloned()
            .collect();
        debug!(
            "Found {} active medication schedules for child {}",
            schedules.len(),
            child_id
        );
        Ok(Self::sorted_by_name(schedules))
    }

    fn delete_schedule(&self, schedule_id: &str) -> Result<bool> {
        let mut store = self.connection.write()?;
        if store.schedules.remove(schedule_id).is_none() {
            debug!("No medication schedule found to delete: {}", schedule_id);
            return Ok(false);
        }

        let mut detached = 0;
        for dose in store.doses.iter_mut() {
            if dose.satisfies(schedule_id) {
                dose.schedule_id = None;
                detached += 1;
            }
        }

        info!(
            "Deleted medication schedule {} ({} doses kept without schedule)",
            schedule_id, detached
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::test_utils::TestHelper;
    use crate::storage::traits::DoseStorage;

    #[test]
    fn test_store_schedule_requires_child() {
        let helper = TestHelper::new();
        let schedule = TestHelper::daily_schedule("child::missing", "schedule-1", "Vitamin D", None);

        let result = helper.schedule_repo.store_schedule(&schedule);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_store_schedule_cannot_change_child() {
        let helper = TestHelper::new();
        let child = helper.create_child("child::1");
        let other = helper.create_child("child::2");
        let schedule = helper.create_daily_schedule(&child.id, "schedule-1", "Vitamin D", None);

        let mut moved = schedule.clone();
        moved.child_id = other.id.clone();
        let err = helper.schedule_repo.store_schedule(&moved).unwrap_err();
        assert!(err.to_string().contains("belongs to child 'child::1'"));

        let stored = helper.schedule_repo.get_schedule(&schedule.id).unwrap().unwrap();
        assert_eq!(stored.child_id, child.id);

        // Replacing with the same owner is still allowed
        let mut renamed = schedule.clone();
        renamed.name = "Vitamin D3".to_string();
        helper.schedule_repo.store_schedule(&renamed).unwrap();
        let stored = helper.schedule_repo.get_schedule(&schedule.id).unwrap().unwrap();
        assert_eq!(stored.name, "Vitamin D3");
    }

    #[test]
    fn test_list_schedules_ordered_by_name() {
        let helper = TestHelper::new();
        let child = helper.create_child("child::1");
        helper.create_daily_schedule(&child.id, "schedule-1", "vitamin D", None);
        helper.create_daily_schedule(&child.id, "schedule-2", "Ibuprofen", None);
        helper.create_daily_schedule(&child.id, "schedule-3", "Amoxicillin", None);

        let names: Vec<String> = helper
            .schedule_repo
            .list_schedules(&child.id)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Amoxicillin", "Ibuprofen", "vitamin D"]);
    }

    #[test]
    fn test_list_active_schedules_excludes_inactive_and_other_children() {
        let helper = TestHelper::new();
        let child = helper.create_child("child::1");
        let other = helper.create_child("child::2");
        helper.create_daily_schedule(&child.id, "schedule-1", "Vitamin D", None);
        helper.create_daily_schedule(&other.id, "schedule-2", "Iron", None);

        let mut inactive = TestHelper::daily_schedule(&child.id, "schedule-3", "Old Med", None);
        inactive.active = false;
        helper.schedule_repo.store_schedule(&inactive).unwrap();

        let active = helper.schedule_repo.list_active_schedules(&child.id).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "schedule-1");

        assert_eq!(helper.schedule_repo.list_schedules(&child.id).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_schedule_keeps_doses_without_reference() {
        let helper = TestHelper::new();
        let child = helper.create_child("child::1");
        let schedule = helper.create_daily_schedule(&child.id, "schedule-1", "Vitamin D", None);
        helper.log_dose(&child.id, Some(&schedule.id), "2024-03-15T08:00:00+00:00");

        assert!(helper.schedule_repo.delete_schedule(&schedule.id).unwrap());
        assert!(!helper.schedule_repo.delete_schedule(&schedule.id).unwrap());

        let dose = helper.dose_repo.latest_dose_for_child(&child.id).unwrap().unwrap();
        assert_eq!(dose.schedule_id, None);
        assert!(helper.dose_repo.latest_dose_for_schedule(&schedule.id).unwrap().is_none());
    }
}
