//! Domain model for a recurring medication schedule.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weekdays in flag order, Monday first
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Dosage units a schedule or dose can be measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountUnit {
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "mg")]
    Milligram,
    #[serde(rename = "drops")]
    Drops,
    #[serde(rename = "IU")]
    InternationalUnit,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "puffs")]
    Puffs,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown amount unit: {0}")]
pub struct UnknownAmountUnit(pub String);

impl AmountUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountUnit::Milliliter => "ml",
            AmountUnit::Milligram => "mg",
            AmountUnit::Drops => "drops",
            AmountUnit::InternationalUnit => "IU",
            AmountUnit::Ounce => "oz",
            AmountUnit::Tablespoon => "tbsp",
            AmountUnit::Teaspoon => "tsp",
            AmountUnit::Puffs => "puffs",
        }
    }
}

impl fmt::Display for AmountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmountUnit {
    type Err = UnknownAmountUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ml" => Ok(AmountUnit::Milliliter),
            "mg" => Ok(AmountUnit::Milligram),
            "drops" => Ok(AmountUnit::Drops),
            "IU" => Ok(AmountUnit::InternationalUnit),
            "oz" => Ok(AmountUnit::Ounce),
            "tbsp" => Ok(AmountUnit::Tablespoon),
            "tsp" => Ok(AmountUnit::Teaspoon),
            "puffs" => Ok(AmountUnit::Puffs),
            other => Err(UnknownAmountUnit(other.to_string())),
        }
    }
}

/// Set of weekdays a weekly schedule applies to.
///
/// Bit 0 is Monday, bit 6 is Sunday, matching weekday numbers 0..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_days<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mut set = Self::empty();
        for day in days {
            set.insert(day);
        }
        set
    }

    /// Build from seven day-of-week flags ordered Monday through Sunday
    pub fn from_flags(flags: [bool; 7]) -> Self {
        Self::from_days(
            WEEKDAYS
                .iter()
                .zip(flags)
                .filter(|(_, enabled)| *enabled)
                .map(|(day, _)| *day),
        )
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled weekdays, Monday first
    pub fn iter(&self) -> impl Iterator<Item = Weekday> {
        let set = *self;
        WEEKDAYS.into_iter().filter(move |day| set.contains(*day))
    }

    /// Enabled weekday numbers (0 = Monday ... 6 = Sunday), ascending
    pub fn numbers(&self) -> Vec<u8> {
        self.iter()
            .map(|day| day.num_days_from_monday() as u8)
            .collect()
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }
}

/// Frequency label of a schedule, independent of its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Interval,
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Interval => "interval",
            Frequency::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence rule of a schedule, one payload shape per frequency
#[derive(Debug, Clone, PartialEq)]
pub enum Recurrence {
    /// Once a day, at a time of day or at any point during the day
    Daily { at: Option<NaiveTime> },
    /// A fixed number of hours after the previous dose
    Interval { hours: Option<f64> },
    /// On specific weekdays, at a time of day or at any point during the day
    Weekly {
        at: Option<NaiveTime>,
        days: WeekdaySet,
    },
}

impl Recurrence {
    pub fn frequency(&self) -> Frequency {
        match self {
            Recurrence::Daily { .. } => Frequency::Daily,
            Recurrence::Interval { .. } => Frequency::Interval,
            Recurrence::Weekly { .. } => Frequency::Weekly,
        }
    }

    /// Time of day for daily and weekly schedules
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        match self {
            Recurrence::Daily { at } | Recurrence::Weekly { at, .. } => *at,
            Recurrence::Interval { .. } => None,
        }
    }

    /// Interval length in hours, when present and usable (finite and positive)
    pub fn interval_hours(&self) -> Option<f64> {
        match self {
            Recurrence::Interval { hours: Some(h) } if h.is_finite() && *h > 0.0 => Some(*h),
            _ => None,
        }
    }
}

/// Domain model for a medication schedule
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationSchedule {
    pub id: String,
    pub child_id: String,
    pub name: String,
    pub amount: Option<f64>,
    pub amount_unit: Option<AmountUnit>,
    pub recurrence: Recurrence,
    pub active: bool,
    pub notes: Option<String>,
}

impl MedicationSchedule {
    pub fn frequency(&self) -> Frequency {
        self.recurrence.frequency()
    }

    /// Weekday numbers (0 = Monday ... 6 = Sunday) a weekly schedule applies to.
    /// Empty for daily and interval schedules.
    pub fn scheduled_days(&self) -> Vec<u8> {
        match &self.recurrence {
            Recurrence::Weekly { days, .. } => days.numbers(),
            _ => Vec::new(),
        }
    }

    /// Whether the schedule applies to the given calendar day at all
    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        match &self.recurrence {
            Recurrence::Daily { .. } | Recurrence::Interval { .. } => true,
            Recurrence::Weekly { days, .. } => days.contains(today.weekday()),
        }
    }
}
