//! # Medication Tracker Backend
//!
//! Scheduling engine for the medication card of the child care tracker.
//! Given a child's medication schedules and the doses logged so far, it
//! computes when each schedule is next due and which ones are pending.
//!
//! The engine runs synchronously and never reads the clock itself; callers
//! pass the evaluation time, and its timezone is the local zone for all
//! calendar arithmetic.

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use log::info;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod io;
pub mod storage;

use domain::commands::pending::{MedicationCardQuery, PendingMedicationsQuery};
use io::MedicationMapper;
use shared::{MedicationCardResponse, PendingMedicationsResponse};
use storage::yaml::{load_household, EngineSettings};

// Re-export commonly used types
pub use domain::{PendingHorizon, PendingMedicationService, PendingPolicy};
pub use storage::memory::MemoryConnection;
pub use storage::traits::{ChildStorage, Connection};

/// Main backend struct wiring the services to a loaded household
pub struct Backend {
    pub settings: EngineSettings,
    pub pending_service: PendingMedicationService<MemoryConnection>,
    connection: Arc<MemoryConnection>,
}

impl Backend {
    pub fn new(connection: Arc<MemoryConnection>, settings: EngineSettings) -> Self {
        let pending_service = PendingMedicationService::new(connection.clone(), settings.to_policy());
        Self {
            settings,
            pending_service,
            connection,
        }
    }

    /// Load a household snapshot and optional settings file
    pub fn from_files(data: &Path, settings: Option<&Path>) -> Result<Self> {
        let settings = EngineSettings::load(settings)?;
        let connection = Arc::new(load_household(data)?);
        info!(
            "Backend ready (timezone: {}, horizon: {:?})",
            settings.timezone, settings.pending_horizon
        );
        Ok(Self::new(connection, settings))
    }

    fn requested_child<'a>(&'a self, child_id: Option<&'a str>) -> Option<&'a str> {
        child_id.or(self.settings.child.as_deref())
    }

    /// Medication cards for one child, or for every child when `child_id` is
    /// `None` and no default child is configured
    pub fn medication_cards<Tz: TimeZone>(
        &self,
        child_id: Option<&str>,
        now: &DateTime<Tz>,
    ) -> Result<Vec<MedicationCardResponse>> {
        let child_ids = match self.requested_child(child_id) {
            Some(id) => vec![id.to_string()],
            None => self
                .connection
                .create_child_repository()
                .list_children()?
                .into_iter()
                .map(|c| c.id)
                .collect(),
        };

        child_ids
            .into_iter()
            .map(|child_id| {
                let query = MedicationCardQuery {
                    child_id,
                    now: now.clone(),
                };
                self.pending_service
                    .medication_card(query)
                    .map(MedicationMapper::to_card_dto)
            })
            .collect()
    }

    /// Pending medications for one child, or for every child when no child is
    /// requested or configured
    pub fn pending_medications<Tz: TimeZone>(
        &self,
        child_id: Option<&str>,
        now: &DateTime<Tz>,
    ) -> Result<Vec<PendingMedicationsResponse>> {
        let results = match self.requested_child(child_id) {
            Some(id) => vec![self.pending_service.pending_medications(PendingMedicationsQuery {
                child_id: id.to_string(),
                now: now.clone(),
            })?],
            None => self.pending_service.pending_for_all_children(now)?,
        };

        Ok(results
            .into_iter()
            .map(MedicationMapper::to_pending_response_dto)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::yaml::HouseholdSnapshot;
    use chrono::FixedOffset;

    const HOUSEHOLD: &str = r#"
children:
  - id: "child::1"
    first_name: "Emma"
  - id: "child::2"
    first_name: "Liam"
schedules:
  - id: "schedule-1"
    child_id: "child::1"
    name: "Late Night Med"
    frequency: "daily"
    schedule_time: "23:59"
doses:
  - child_id: "child::1"
    schedule_id: "schedule-1"
    name: "Late Night Med"
    time: "2024-03-15T00:01:00+02:00"
"#;

    fn backend(settings: EngineSettings) -> Backend {
        let connection = HouseholdSnapshot::from_yaml_str(HOUSEHOLD)
            .unwrap()
            .into_connection()
            .unwrap();
        Backend::new(Arc::new(connection), settings)
    }

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-15T10:00:00+02:00").unwrap()
    }

    #[test]
    fn test_cards_for_all_children() {
        let cards = backend(EngineSettings::default())
            .medication_cards(None, &now())
            .unwrap();

        assert_eq!(cards.len(), 2);
        let emma = cards.iter().find(|c| c.child.id == "child::1").unwrap();
        assert_eq!(emma.pending.len(), 1);
        assert_eq!(emma.pending[0].next_due_time, "2024-03-15T23:59:00+02:00");
        assert!(!emma.empty);

        let liam = cards.iter().find(|c| c.child.id == "child::2").unwrap();
        assert!(liam.empty);
    }

    #[test]
    fn test_default_child_from_settings() {
        let settings = EngineSettings {
            child: Some("child::2".to_string()),
            ..EngineSettings::default()
        };
        let backend = backend(settings);

        let cards = backend.medication_cards(None, &now()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].child.id, "child::2");

        let cards = backend.medication_cards(Some("child::1"), &now()).unwrap();
        assert_eq!(cards[0].child.id, "child::1");
    }

    #[test]
    fn test_strict_horizon_from_settings() {
        let settings = EngineSettings {
            pending_horizon: PendingHorizon::Now,
            ..EngineSettings::default()
        };
        let cards = backend(settings)
            .medication_cards(Some("child::1"), &now())
            .unwrap();
        assert!(cards[0].pending.is_empty());
    }

    #[test]
    fn test_pending_medications_for_all_children() {
        let responses = backend(EngineSettings::default())
            .pending_medications(None, &now())
            .unwrap();

        let counts: Vec<(&str, usize)> = responses
            .iter()
            .map(|r| (r.child_id.as_str(), r.pending.len()))
            .collect();
        assert_eq!(counts, vec![("child::1", 1), ("child::2", 0)]);
        assert_eq!(responses[0].evaluated_at, "2024-03-15T10:00:00+02:00");
        assert_eq!(responses[0].pending[0].schedule.frequency_label, "Daily at 23:59");
    }

    #[test]
    fn test_pending_medications_for_one_child() {
        let responses = backend(EngineSettings::default())
            .pending_medications(Some("child::2"), &now())
            .unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].child_id, "child::2");
        assert!(responses[0].pending.is_empty());
    }

    #[test]
    fn test_unknown_child() {
        let backend = backend(EngineSettings::default());
        assert!(backend.medication_cards(Some("child::9"), &now()).is_err());
        assert!(backend.pending_medications(Some("child::9"), &now()).is_err());
    }
}
