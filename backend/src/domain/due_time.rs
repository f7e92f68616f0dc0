//! Next-due-time computation for medication schedules.
//!
//! Wall-clock arithmetic (dates, times of day, "start of the next day") is done
//! in the zone of the injected `now`. Fixed durations, i.e. interval hours and
//! the late-dose buffer, are added on the absolute timeline so that a DST
//! transition never stretches or shrinks them.
//!
//! None of these functions fail: missing or unusable schedule parameters fall
//! back to a well-defined instant instead.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};
use log::debug;

use super::models::medication_schedule::{MedicationSchedule, Recurrence, WeekdaySet};

/// Minimum gap between a dose and the next occurrence of a timed daily or
/// weekly schedule. Half the daily period, so a dose given just after midnight
/// counts towards the previous day's occurrence.
pub const LATE_DOSE_BUFFER_HOURS: i64 = 12;

/// Number of calendar days the weekday search inspects, starting day included
pub const WEEKLY_SEARCH_DAYS: i64 = 8;

impl MedicationSchedule {
    /// Return the next instant this medication is due.
    ///
    /// `reference` is the time of the most recent dose for this schedule, if
    /// any. The result is expressed in `now`'s timezone.
    ///
    /// - Interval: `reference + interval_hours`, or `now` without a reference
    ///   or without usable hours.
    /// - Daily/weekly with a reference and a time of day: the first occurrence
    ///   at least [`LATE_DOSE_BUFFER_HOURS`] after the reference.
    /// - Daily/weekly with a reference but no time of day: the start of the
    ///   next calendar day (next scheduled weekday for weekly).
    /// - No reference: weekly searches from `now`; daily returns today at the
    ///   time of day (even if already passed), or `now` without one.
    pub fn next_due_time<Tz: TimeZone>(
        &self,
        reference: Option<DateTime<Tz>>,
        now: &DateTime<Tz>,
    ) -> DateTime<Tz> {
        let tz = now.timezone();
        let reference = reference.map(|r| r.with_timezone(&tz));

        let due = match &self.recurrence {
            Recurrence::Interval { .. } => {
                match (reference, self.recurrence.interval_hours()) {
                    (Some(reference), Some(hours)) => {
                        add_hours(&reference, hours).unwrap_or_else(|| now.clone())
                    }
                    _ => now.clone(),
                }
            }
            Recurrence::Daily { at } => match (reference, at) {
                (Some(reference), Some(at)) => {
                    let earliest = late_dose_earliest(&reference);
                    let candidate = localize(&tz, earliest.date_naive().and_time(*at));
                    if candidate < earliest {
                        localize(&tz, following_day(earliest.date_naive()).and_time(*at))
                    } else {
                        candidate
                    }
                }
                (Some(reference), None) => start_of_day(&tz, following_day(reference.date_naive())),
                (None, Some(at)) => localize(&tz, now.date_naive().and_time(*at)),
                (None, None) => now.clone(),
            },
            Recurrence::Weekly { at, days } => {
                let earliest = match (reference, at) {
                    (Some(reference), Some(_)) => late_dose_earliest(&reference),
                    (Some(reference), None) => {
                        start_of_day(&tz, following_day(reference.date_naive()))
                    }
                    (None, _) => now.clone(),
                };
                next_weekly_occurrence(*days, *at, &earliest)
            }
        };

        debug!(
            "Next due time for schedule '{}' ({}): {:?}",
            self.name,
            self.frequency(),
            due
        );
        due
    }

    /// First scheduled weekday occurrence on or after `earliest`.
    ///
    /// Daily and interval schedules have no weekday set, so `earliest` is
    /// returned unchanged for them.
    pub fn next_weekly_occurrence<Tz: TimeZone>(&self, earliest: &DateTime<Tz>) -> DateTime<Tz> {
        match &self.recurrence {
            Recurrence::Weekly { at, days } => next_weekly_occurrence(*days, *at, earliest),
            _ => earliest.clone(),
        }
    }
}

/// Scan up to [`WEEKLY_SEARCH_DAYS`] calendar days starting at `earliest`'s
/// date for the first enabled weekday whose occurrence (at `at`, or the start
/// of the day) is `>= earliest`. Falls back to `earliest` when no day is
/// enabled.
pub fn next_weekly_occurrence<Tz: TimeZone>(
    days: WeekdaySet,
    at: Option<NaiveTime>,
    earliest: &DateTime<Tz>,
) -> DateTime<Tz> {
    if days.is_empty() {
        return earliest.clone();
    }

    let tz = earliest.timezone();
    let first_date = earliest.date_naive();
    let time_of_day = at.unwrap_or(NaiveTime::MIN);

    for offset in 0..WEEKLY_SEARCH_DAYS {
        let Some(date) = first_date.checked_add_signed(Duration::days(offset)) else {
            break;
        };
        if !days.contains(date.weekday()) {
            continue;
        }
        let candidate = localize(&tz, date.and_time(time_of_day));
        if candidate >= *earliest {
            return candidate;
        }
    }

    // Unreachable with a non-empty weekday set
    earliest.clone()
}

/// Resolve a local wall-clock time in `tz` to an instant.
///
/// Ambiguous times (clocks falling back) resolve to the earlier instant.
/// Nonexistent times (clocks springing forward) are read with the offset in
/// effect before the gap, which moves them forward by the gap's length.
pub fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => {
            let offset = tz
                .offset_from_local_datetime(&(naive - Duration::days(1)))
                .earliest()
                .map(|o| o.fix())
                .unwrap_or_else(|| tz.offset_from_utc_datetime(&naive).fix());
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Midnight at the start of `date` in `tz`
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    localize(tz, date.and_time(NaiveTime::MIN))
}

fn following_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn late_dose_earliest<Tz: TimeZone>(reference: &DateTime<Tz>) -> DateTime<Tz> {
    reference
        .clone()
        .checked_add_signed(Duration::hours(LATE_DOSE_BUFFER_HOURS))
        .unwrap_or_else(|| reference.clone())
}

/// `start + hours` on the absolute timeline, resolved to the millisecond
fn add_hours<Tz: TimeZone>(start: &DateTime<Tz>, hours: f64) -> Option<DateTime<Tz>> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    let delta = Duration::try_milliseconds(millis as i64)?;
    start.clone().checked_add_signed(delta)
}
