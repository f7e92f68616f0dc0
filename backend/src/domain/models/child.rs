//! Domain model for a child.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Domain model representing a child in the system.
/// Medication schedules and doses belong to exactly one child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl Child {
    /// Display name. With `reverse` the last name comes first ("Last, First").
    pub fn name(&self, reverse: bool) -> String {
        match self.last_name.as_deref() {
            None | Some("") => self.first_name.clone(),
            Some(last) if reverse => format!("{}, {}", last, self.first_name),
            Some(last) => format!("{} {}", self.first_name, last),
        }
    }

    /// Sort key used for listing children (last name, then first name)
    pub fn sort_key(&self) -> (String, String) {
        (
            self.last_name.clone().unwrap_or_default().to_lowercase(),
            self.first_name.to_lowercase(),
        )
    }
}
