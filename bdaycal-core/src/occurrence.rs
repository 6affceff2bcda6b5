//! Next-occurrence computation for yearly dates.
//!
//! Everything here is a pure function of (entry, reference date, policy).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::contact::DateEntry;

/// Where a Feb 29 date lands in a year without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeapDayPolicy {
    #[default]
    Feb28,
    Mar1,
}

/// The next real-world date an entry falls on, relative to a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub entry: DateEntry,
    pub next_date: NaiveDate,
    /// Whole days from the reference date; 0 when it is today
    pub days_until: u32,
    /// Only present when the entry's year is known
    pub age_reached: Option<i32>,
    #[serde(skip)]
    pub leap_day_policy: LeapDayPolicy,
}

/// Next occurrence using the default (Feb 28) leap-day policy.
pub fn next_occurrence(entry: &DateEntry, reference: NaiveDate) -> Occurrence {
    next_occurrence_with(entry, reference, LeapDayPolicy::default())
}

/// Earliest date on or after `reference` with the entry's month/day, looking
/// at the reference year and the one after.
pub fn next_occurrence_with(
    entry: &DateEntry,
    reference: NaiveDate,
    policy: LeapDayPolicy,
) -> Occurrence {
    let this_year = occurrence_in_year(entry, reference.year(), policy);
    let next_date = if this_year >= reference {
        this_year
    } else {
        occurrence_in_year(entry, reference.year() + 1, policy)
    };

    let days_until = u32::try_from((next_date - reference).num_days()).unwrap_or(0);
    let age_reached = entry.year().map(|year| next_date.year() - year);

    Occurrence {
        entry: entry.clone(),
        next_date,
        days_until,
        age_reached,
        leap_day_policy: policy,
    }
}

/// The date an entry is observed on in `year`.
pub fn occurrence_in_year(entry: &DateEntry, year: i32, policy: LeapDayPolicy) -> NaiveDate {
    if let Some(date) = NaiveDate::from_ymd_opt(year, entry.month(), entry.day()) {
        return date;
    }

    // Only Feb 29 can fail for a validated entry
    let fallback = match policy {
        LeapDayPolicy::Feb28 => NaiveDate::from_ymd_opt(year, 2, 28),
        LeapDayPolicy::Mar1 => NaiveDate::from_ymd_opt(year, 3, 1),
    };
    fallback.unwrap_or(NaiveDate::MIN)
}

impl Occurrence {
    /// `YYYY-MM-DD` of the next occurrence.
    pub fn next_date_string(&self) -> String {
        self.next_date.format("%Y-%m-%d").to_string()
    }

    pub fn is_within(&self, days_ahead: u32) -> bool {
        self.days_until <= days_ahead
    }
}
