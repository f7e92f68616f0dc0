//! Pending medication aggregation.
//!
//! Decides which of a child's active schedules are due, based on each
//! schedule's most recent dose and an injected "now".

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::commands::pending::{
    MedicationCardQuery, MedicationCardResult, PendingMedicationsQuery, PendingMedicationsResult,
};
use crate::domain::models::child::Child;
use crate::domain::models::dose::Dose;
use crate::domain::models::medication_schedule::{Frequency, MedicationSchedule};
use crate::storage::traits::{ChildStorage, Connection, DoseStorage, MedicationScheduleStorage};

/// How far ahead a due time may lie and still count as pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingHorizon {
    /// Due at any point today (local calendar date) or earlier
    #[default]
    EndOfDay,
    /// Due at or before the evaluation instant
    Now,
}

/// Rules turning a due time into pending/overdue flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPolicy {
    pub horizon: PendingHorizon,
    /// How long past its due time an entry must be before it is overdue
    pub overdue_grace: Duration,
}

impl Default for PendingPolicy {
    fn default() -> Self {
        Self {
            horizon: PendingHorizon::EndOfDay,
            overdue_grace: Duration::zero(),
        }
    }
}

impl PendingPolicy {
    /// Interval schedules are always listed; the horizon applies to daily
    /// and weekly schedules only
    pub fn is_pending<Tz: TimeZone>(
        &self,
        frequency: Frequency,
        due: &DateTime<Tz>,
        now: &DateTime<Tz>,
    ) -> bool {
        if frequency == Frequency::Interval {
            return true;
        }
        match self.horizon {
            PendingHorizon::EndOfDay => due.date_naive() <= now.date_naive(),
            PendingHorizon::Now => due <= now,
        }
    }

    pub fn is_overdue<Tz: TimeZone>(&self, due: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        match due.clone().checked_add_signed(self.overdue_grace) {
            Some(threshold) => *now >= threshold,
            None => false,
        }
    }
}

/// A schedule that is currently due
#[derive(Debug, Clone)]
pub struct PendingEntry<Tz: TimeZone> {
    pub schedule: MedicationSchedule,
    pub next_due_time: DateTime<Tz>,
    pub overdue: bool,
}

/// Evaluate `(schedule, most recent dose)` pairs against `now`.
///
/// Inactive schedules are skipped. The result is ordered by due time, then by
/// schedule name and ID.
pub fn evaluate_pending<Tz, I>(
    schedules: I,
    now: &DateTime<Tz>,
    policy: &PendingPolicy,
) -> Vec<PendingEntry<Tz>>
where
    Tz: TimeZone,
    I: IntoIterator<Item = (MedicationSchedule, Option<Dose>)>,
{
    let tz = now.timezone();
    let mut pending: Vec<PendingEntry<Tz>> = schedules
        .into_iter()
        .filter(|(schedule, _)| schedule.active)
        .filter_map(|(schedule, last_dose)| {
            let reference = last_dose.map(|dose| dose.time.with_timezone(&tz));
            let next_due_time = schedule.next_due_time(reference, now);

            if !policy.is_pending(schedule.frequency(), &next_due_time, now) {
                debug!("Schedule '{}' is not pending yet", schedule.name);
                return None;
            }

            let overdue = policy.is_overdue(&next_due_time, now);
            Some(PendingEntry {
                schedule,
                next_due_time,
                overdue,
            })
        })
        .collect();

    pending.sort_by(|a, b| {
        a.next_due_time
            .cmp(&b.next_due_time)
            .then_with(|| a.schedule.name.cmp(&b.schedule.name))
            .then_with(|| a.schedule.id.cmp(&b.schedule.id))
    });
    pending
}

/// Service computing pending medications from the record layer
#[derive(Clone)]
pub struct PendingMedicationService<C: Connection> {
    child_repository: C::ChildRepository,
    schedule_repository: C::ScheduleRepository,
    dose_repository: C::DoseRepository,
    policy: PendingPolicy,
}

impl<C: Connection> PendingMedicationService<C> {
    /// Create a new PendingMedicationService
    pub fn new(connection: Arc<C>, policy: PendingPolicy) -> Self {
        Self {
            child_repository: connection.create_child_repository(),
            schedule_repository: connection.create_schedule_repository(),
            dose_repository: connection.create_dose_repository(),
            policy,
        }
    }

    /// Schedules currently due for a child
    pub fn pending_medications<Tz: TimeZone>(
        &self,
        query: PendingMedicationsQuery<Tz>,
    ) -> Result<PendingMedicationsResult<Tz>> {
        info!("Getting pending medications for child: {}", query.child_id);

        let child = self.require_child(&query.child_id)?;
        let pending = self.collect_pending(&child.id, &query.now)?;

        info!(
            "Found {} pending medications for child: {}",
            pending.len(),
            child.id
        );

        Ok(PendingMedicationsResult {
            child,
            now: query.now,
            pending,
        })
    }

    /// Data for the medication dashboard card: last dose plus pending schedules
    pub fn medication_card<Tz: TimeZone>(
        &self,
        query: MedicationCardQuery<Tz>,
    ) -> Result<MedicationCardResult<Tz>> {
        info!("Building medication card for child: {}", query.child_id);

        let child = self.require_child(&query.child_id)?;
        let last_dose = self.dose_repository.latest_dose_for_child(&child.id)?;
        let pending = self.collect_pending(&child.id, &query.now)?;
        let empty = last_dose.is_none() && pending.is_empty();

        Ok(MedicationCardResult {
            child,
            now: query.now,
            last_dose,
            pending,
            empty,
        })
    }

    /// Pending medications for every child, in child listing order
    pub fn pending_for_all_children<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Vec<PendingMedicationsResult<Tz>>> {
        let children = self.child_repository.list_children()?;
        info!("Getting pending medications for {} children", children.len());

        children
            .into_iter()
            .map(|child| {
                let pending = self.collect_pending(&child.id, now)?;
                Ok(PendingMedicationsResult {
                    child,
                    now: now.clone(),
                    pending,
                })
            })
            .collect()
    }

    fn require_child(&self, child_id: &str) -> Result<Child> {
        self.child_repository
            .get_child(child_id)?
            .ok_or_else(|| anyhow::anyhow!("Child not found: {}", child_id))
    }

    fn collect_pending<Tz: TimeZone>(
        &self,
        child_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<Vec<PendingEntry<Tz>>> {
        let schedules = self.schedule_repository.list_active_schedules(child_id)?;
        let mut pairs = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let last_dose = self.dose_repository.latest_dose_for_schedule(&schedule.id)?;
            pairs.push((schedule, last_dose));
        }
        Ok(evaluate_pending(pairs, now, &self.policy))
    }
}
