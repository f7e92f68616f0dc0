//! # Storage Traits
//!
//! The medication engine does not own persistence. These traits describe what
//! it needs from the record layer: the child's identity, the child's
//! schedules and the log of past doses. Any backend implementing them can
//! drive the domain services.

use anyhow::Result;

use crate::domain::models::child::Child as DomainChild;
use crate::domain::models::dose::Dose as DomainDose;
use crate::domain::models::medication_schedule::MedicationSchedule as DomainMedicationSchedule;

/// Trait defining the interface for child storage operations
pub trait ChildStorage: Send + Sync {
    /// Store a new child, or replace an existing one with the same ID
    fn store_child(&self, child: &DomainChild) -> Result<()>;

    /// Retrieve a specific child by ID
    fn get_child(&self, child_id: &str) -> Result<Option<DomainChild>>;

    /// List all children ordered by last name, then first name
    fn list_children(&self) -> Result<Vec<DomainChild>>;

    /// Delete a child together with its schedules and doses.
    /// Returns true if the child was found and deleted
    fn delete_child(&self, child_id: &str) -> Result<bool>;
}

/// Trait defining the interface for medication schedule storage operations
pub trait MedicationScheduleStorage: Send + Sync {
    /// Store a new schedule, or replace an existing one with the same ID.
    /// The owning child must exist
    fn store_schedule(&self, schedule: &DomainMedicationSchedule) -> Result<()>;

    /// Retrieve a specific schedule by ID
    fn get_schedule(&self, schedule_id: &str) -> Result<Option<DomainMedicationSchedule>>;

    /// List all schedules of a child ordered by name
    fn list_schedules(&self, child_id: &str) -> Result<Vec<DomainMedicationSchedule>>;

    /// List the active schedules of a child ordered by name
    fn list_active_schedules(&self, child_id: &str) -> Result<Vec<DomainMedicationSchedule>>;

    /// Delete a schedule. Doses logged against it are kept but lose their
    /// schedule reference. Returns true if the schedule was found and deleted
    fn delete_schedule(&self, schedule_id: &str) -> Result<bool>;
}

/// Trait defining the interface for the dose log
pub trait DoseStorage: Send + Sync {
    /// Append a dose to the log. The child, and the schedule if referenced,
    /// must exist
    fn store_dose(&self, dose: &DomainDose) -> Result<()>;

    /// Most recent dose logged against a schedule
    fn latest_dose_for_schedule(&self, schedule_id: &str) -> Result<Option<DomainDose>>;

    /// Most recent dose of any medication for a child
    fn latest_dose_for_child(&self, child_id: &str) -> Result<Option<DomainDose>>;
}

/// Trait defining the interface for storage connections
///
/// Abstracts away the specific connection type and provides factory methods
/// for creating repositories, so the domain layer works with any storage
/// backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    type ChildRepository: ChildStorage + Clone;
    type ScheduleRepository: MedicationScheduleStorage + Clone;
    type DoseRepository: DoseStorage + Clone;

    fn create_child_repository(&self) -> Self::ChildRepository;

    fn create_schedule_repository(&self) -> Self::ScheduleRepository;

    fn create_dose_repository(&self) -> Self::DoseRepository;
}
