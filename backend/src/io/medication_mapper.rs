use chrono::{NaiveTime, Timelike, TimeZone};
use shared::{
    Child as SharedChild, MedicationCardResponse, MedicationDose, MedicationSchedule as SharedSchedule,
    PendingMedication, PendingMedicationsResponse,
};

use crate::domain::commands::pending::{MedicationCardResult, PendingMedicationsResult};
use crate::domain::models::child::Child as DomainChild;
use crate::domain::models::dose::Dose as DomainDose;
use crate::domain::models::medication_schedule::{MedicationSchedule, Recurrence};
use crate::domain::pending_service::PendingEntry;

/// Mapper from medication domain results to shared DTOs.
pub struct MedicationMapper;

impl MedicationMapper {
    pub fn to_child_dto(domain: &DomainChild) -> SharedChild {
        SharedChild {
            id: domain.id.clone(),
            name: domain.name(false),
        }
    }

    pub fn to_schedule_dto(domain: MedicationSchedule) -> SharedSchedule {
        let frequency_label = Self::frequency_label(&domain.recurrence);
        SharedSchedule {
            frequency: domain.frequency().to_string(),
            schedule_time: domain.recurrence.time_of_day().map(format_time_of_day),
            interval_hours: match domain.recurrence {
                Recurrence::Interval { hours } => hours,
                _ => None,
            },
            scheduled_days: domain.scheduled_days(),
            frequency_label,
            id: domain.id,
            child_id: domain.child_id,
            name: domain.name,
            amount: domain.amount,
            amount_unit: domain.amount_unit.map(|u| u.to_string()),
            active: domain.active,
        }
    }

    pub fn to_dose_dto(domain: DomainDose) -> MedicationDose {
        MedicationDose {
            id: domain.id,
            child_id: domain.child_id,
            schedule_id: domain.schedule_id,
            name: domain.name,
            time: domain.time.to_rfc3339(),
            amount: domain.amount,
            amount_unit: domain.amount_unit.map(|u| u.to_string()),
        }
    }

    pub fn to_pending_dto<Tz: TimeZone>(entry: PendingEntry<Tz>) -> PendingMedication {
        PendingMedication {
            next_due_time: entry.next_due_time.fixed_offset().to_rfc3339(),
            overdue: entry.overdue,
            schedule: Self::to_schedule_dto(entry.schedule),
        }
    }

    pub fn to_pending_response_dto<Tz: TimeZone>(
        result: PendingMedicationsResult<Tz>,
    ) -> PendingMedicationsResponse {
        PendingMedicationsResponse {
            child_id: result.child.id,
            evaluated_at: result.now.fixed_offset().to_rfc3339(),
            pending: result.pending.into_iter().map(Self::to_pending_dto).collect(),
        }
    }

    pub fn to_card_dto<Tz: TimeZone>(result: MedicationCardResult<Tz>) -> MedicationCardResponse {
        MedicationCardResponse {
            child: Self::to_child_dto(&result.child),
            evaluated_at: result.now.fixed_offset().to_rfc3339(),
            last_dose: result.last_dose.map(Self::to_dose_dto),
            pending: result.pending.into_iter().map(Self::to_pending_dto).collect(),
            empty: result.empty,
        }
    }

    /// Human readable recurrence, e.g. "Every 6 hours" or "Mon, Fri at 23:00"
    pub fn frequency_label(recurrence: &Recurrence) -> String {
        match recurrence {
            Recurrence::Interval { .. } => match recurrence.interval_hours() {
                Some(hours) if hours == 1.0 => "Every hour".to_string(),
                Some(hours) => format!("Every {} hours", hours),
                None => "Interval".to_string(),
            },
            Recurrence::Daily { at: Some(at) } => format!("Daily at {}", format_time_of_day(*at)),
            Recurrence::Daily { at: None } => "Daily".to_string(),
            Recurrence::Weekly { at, days } => {
                if days.is_empty() {
                    return "Weekly".to_string();
                }
                let names: Vec<&str> = days
                    .numbers()
                    .into_iter()
                    .map(shared::weekday_short_name)
                    .collect();
                match at {
                    Some(at) => format!("{} at {}", names.join(", "), format_time_of_day(*at)),
                    None => names.join(", "),
                }
            }
        }
    }
}

fn format_time_of_day(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}
