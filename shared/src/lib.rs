use serde::{Deserialize, Serialize};

/// Represents a child in the medication tracking system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    /// Display name ("First Last", or just "First" without a last name)
    pub name: String,
}

/// A medication schedule as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationSchedule {
    pub id: String,
    pub child_id: String,
    pub name: String,
    pub amount: Option<f64>,
    pub amount_unit: Option<String>,
    /// One of "daily", "interval" or "weekly"
    pub frequency: String,
    /// Human readable recurrence, e.g. "Every 6 hours" or "Mon, Fri at 23:00"
    pub frequency_label: String,
    /// Time of day (HH:MM) for daily and weekly schedules
    pub schedule_time: Option<String>,
    pub interval_hours: Option<f64>,
    /// Weekday numbers, 0 = Monday ... 6 = Sunday
    pub scheduled_days: Vec<u8>,
    pub active: bool,
}

/// A logged medication dose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationDose {
    pub id: String,
    pub child_id: String,
    pub schedule_id: Option<String>,
    pub name: String,
    /// When the dose was given (RFC 3339)
    pub time: String,
    pub amount: Option<f64>,
    pub amount_unit: Option<String>,
}

/// A schedule that is currently due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMedication {
    pub schedule: MedicationSchedule,
    /// Next due time (RFC 3339, in the configured local timezone)
    pub next_due_time: String,
    pub overdue: bool,
}

/// Response containing the pending medications of a child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMedicationsResponse {
    pub child_id: String,
    pub evaluated_at: String,
    pub pending: Vec<PendingMedication>,
}

/// Data for the "medications" dashboard card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationCardResponse {
    pub child: Child,
    pub evaluated_at: String,
    /// Most recent dose of any medication for the child
    pub last_dose: Option<MedicationDose>,
    pub pending: Vec<PendingMedication>,
    /// True when there is nothing to show (no dose logged and nothing due)
    pub empty: bool,
}

impl MedicationCardResponse {
    /// Number of pending entries flagged overdue
    pub fn overdue_count(&self) -> usize {
        self.pending.iter().filter(|p| p.overdue).count()
    }
}

/// Short weekday name for a weekday number (0 = Monday ... 6 = Sunday)
pub fn weekday_short_name(day: u8) -> &'static str {
    match day {
        0 => "Mon",
        1 => "Tue",
        2 => "Wed",
        3 => "Thu",
        4 => "Fri",
        5 => "Sat",
        6 => "Sun",
        _ => "Invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(overdue: bool) -> PendingMedication {
        PendingMedication {
            schedule: MedicationSchedule {
                id: "schedule-1".to_string(),
                child_id: "child-1".to_string(),
                name: "Vitamin D".to_string(),
                amount: Some(400.0),
                amount_unit: Some("IU".to_string()),
                frequency: "daily".to_string(),
                frequency_label: "Daily at 09:00".to_string(),
                schedule_time: Some("09:00".to_string()),
                interval_hours: None,
                scheduled_days: Vec::new(),
                active: true,
            },
            next_due_time: "2024-03-15T09:00:00+00:00".to_string(),
            overdue,
        }
    }

    #[test]
    fn test_weekday_short_names() {
        let days = [
            (0, "Mon"),
            (1, "Tue"),
            (2, "Wed"),
            (3, "Thu"),
            (4, "Fri"),
            (5, "Sat"),
            (6, "Sun"),
            (7, "Invalid"),
        ];

        for (day_num, expected_name) in days {
            assert_eq!(weekday_short_name(day_num), expected_name);
        }
    }

    #[test]
    fn test_overdue_count() {
        let card = MedicationCardResponse {
            child: Child {
                id: "child-1".to_string(),
                name: "Test Child".to_string(),
            },
            evaluated_at: "2024-03-15T10:00:00+00:00".to_string(),
            last_dose: None,
            pending: vec![pending(true), pending(false), pending(true)],
            empty: false,
        };

        assert_eq!(card.overdue_count(), 2);
    }

    #[test]
    fn test_pending_medication_json_shape() {
        let json = serde_json::to_value(pending(false)).unwrap();

        assert_eq!(json["schedule"]["frequency"], "daily");
        assert_eq!(json["next_due_time"], "2024-03-15T09:00:00+00:00");
        assert_eq!(json["overdue"], false);
    }
}
