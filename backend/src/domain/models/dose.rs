//! Domain model for a logged medication dose.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::medication_schedule::AmountUnit;

/// A record that a medication was actually given.
///
/// Doses are read-only to the scheduling engine. A dose may point back at the
/// schedule it satisfies; doses given outside any schedule have no back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dose {
    pub id: String,
    pub child_id: String,
    pub schedule_id: Option<String>,
    pub time: DateTime<FixedOffset>,
    pub name: String,
    pub amount: Option<f64>,
    pub amount_unit: Option<AmountUnit>,
    pub notes: Option<String>,
}

impl Dose {
    /// True when this dose was logged against the given schedule
    pub fn satisfies(&self, schedule_id: &str) -> bool {
        self.schedule_id.as_deref() == Some(schedule_id)
    }
}
