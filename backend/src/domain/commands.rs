//! Domain-level query and result types
//! These structs are used by services inside the domain layer and are **not**
//! exposed to the presentation layer. `io::mappers` turns results into the
//! DTOs defined in the `shared` crate.

pub mod pending {
    use chrono::{DateTime, TimeZone};

    use crate::domain::models::child::Child;
    use crate::domain::models::dose::Dose;
    use crate::domain::pending_service::PendingEntry;

    /// Query for the schedules currently due for a child.
    #[derive(Debug, Clone)]
    pub struct PendingMedicationsQuery<Tz: TimeZone> {
        pub child_id: String,
        /// Evaluation time; its zone is the local zone for all date arithmetic
        pub now: DateTime<Tz>,
    }

    /// Result of a pending medications query, ordered by due time.
    #[derive(Debug, Clone)]
    pub struct PendingMedicationsResult<Tz: TimeZone> {
        pub child: Child,
        pub now: DateTime<Tz>,
        pub pending: Vec<PendingEntry<Tz>>,
    }

    /// Query for the medication dashboard card of a child.
    #[derive(Debug, Clone)]
    pub struct MedicationCardQuery<Tz: TimeZone> {
        pub child_id: String,
        pub now: DateTime<Tz>,
    }

    /// Result of a medication card query.
    #[derive(Debug, Clone)]
    pub struct MedicationCardResult<Tz: TimeZone> {
        pub child: Child,
        pub now: DateTime<Tz>,
        /// Most recent dose of any medication for the child
        pub last_dose: Option<Dose>,
        pub pending: Vec<PendingEntry<Tz>>,
        /// No dose has ever been logged and nothing is pending
        pub empty: bool,
    }
}
