//! Calendar events projected from date entries.
//!
//! One yearly-recurring, all-day event per [`DateEntry`]. The event starts on
//! the occurrence computed for the current pass; hosts derive later years
//! from the recurrence rule.

mod title;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::contact::{DateEntry, DateKind};
use crate::occurrence::{LeapDayPolicy, Occurrence};

pub use title::{Language, TitleOptions, description, title};

/// Namespace for event UIDs (v5 UUIDs over subject/kind/month/day).
const UID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1d_7c2e_94b3_4e0a_8d55_2b7a_c1e3_f900);
const UID_DOMAIN: &str = "bdaycal";

/// Recurrence rule of a projected event (RRULE value without the `RRULE:` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recurrence {
    pub rrule: String,
}

impl Recurrence {
    /// Yearly on the entry's month/day. Feb 29 entries follow the leap-day
    /// policy: the last day of February, or day 60 of the year (Feb 29 in
    /// leap years, Mar 1 otherwise).
    pub fn yearly_for(entry: &DateEntry, policy: LeapDayPolicy) -> Self {
        let rrule = match (entry.is_leap_day(), policy) {
            (false, _) => "FREQ=YEARLY",
            (true, LeapDayPolicy::Feb28) => "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1",
            (true, LeapDayPolicy::Mar1) => "FREQ=YEARLY;BYYEARDAY=60",
        };
        Recurrence {
            rrule: rrule.to_string(),
        }
    }
}

/// An all-day, yearly-recurring calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Stable across years and refreshes
    pub uid: String,
    pub title: String,
    pub description: String,
    pub kind: DateKind,
    pub start: NaiveDate,
    /// Exclusive: `start + 1 day`
    pub end: NaiveDate,
    pub recurrence: Recurrence,
}

/// Project an entry and its occurrence into a calendar event.
pub fn project(entry: &DateEntry, occurrence: &Occurrence, options: &TitleOptions) -> CalendarEvent {
    let start = occurrence.next_date;

    CalendarEvent {
        uid: event_uid(entry),
        title: title(entry, occurrence, options),
        description: description(entry, options.language),
        kind: entry.kind().clone(),
        start,
        end: start + Duration::days(1),
        recurrence: Recurrence::yearly_for(entry, occurrence.leap_day_policy),
    }
}

/// Identity of an entry's event: a hash of subject, kind, month and day.
/// The year is deliberately left out.
pub fn event_uid(entry: &DateEntry) -> String {
    let name = format!(
        "{}\u{1f}{}\u{1f}{}",
        entry.subject(),
        entry.kind().key(),
        entry.month_day()
    );
    let uuid = Uuid::new_v5(&UID_NAMESPACE, name.as_bytes());
    format!("{}@{}", uuid, UID_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::{next_occurrence, next_occurrence_with};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_project_all_day_yearly() {
        let entry = DateEntry::new("John", DateKind::Birthday, 3, 15, Some(1985)).unwrap();
        let occ = next_occurrence(&entry, date(2025, 1, 1));
        let event = project(&entry, &occ, &TitleOptions::default());

        assert_eq!(event.title, "John turns 40");
        assert_eq!(event.description, "Birthday of John (born 1985)");
        assert_eq!(event.start, date(2025, 3, 15));
        assert_eq!(event.end, date(2025, 3, 16));
        assert_eq!(event.recurrence.rrule, "FREQ=YEARLY");
    }

    #[test]
    fn test_uid_stable_across_years() {
        let entry = DateEntry::new("John", DateKind::Birthday, 3, 15, Some(1985)).unwrap();
        let this_year = project(&entry, &next_occurrence(&entry, date(2025, 1, 1)), &TitleOptions::default());
        let next_year = project(&entry, &next_occurrence(&entry, date(2025, 6, 1)), &TitleOptions::default());

        assert_ne!(this_year.start, next_year.start);
        assert_eq!(this_year.uid, next_year.uid);
    }

    #[test]
    fn test_uid_ignores_year_but_not_kind_or_day() {
        let with_year = DateEntry::new("Ana", DateKind::Birthday, 2, 29, Some(1996)).unwrap();
        let without_year = DateEntry::new("Ana", DateKind::Birthday, 2, 29, None).unwrap();
        let anniversary = DateEntry::new("Ana", DateKind::Anniversary, 2, 29, None).unwrap();
        let other_day = DateEntry::new("Ana", DateKind::Birthday, 2, 28, None).unwrap();

        assert_eq!(event_uid(&with_year), event_uid(&without_year));
        assert_ne!(event_uid(&with_year), event_uid(&anniversary));
        assert_ne!(event_uid(&with_year), event_uid(&other_day));
        assert!(event_uid(&with_year).ends_with("@bdaycal"));
    }

    #[test]
    fn test_leap_day_recurrence() {
        let entry = DateEntry::new("Ana", DateKind::Birthday, 2, 29, None).unwrap();
        let event = project(&entry, &next_occurrence(&entry, date(2025, 6, 1)), &TitleOptions::default());

        assert_eq!(event.start, date(2026, 2, 28));
        assert_eq!(event.end, date(2026, 3, 1));
        assert_eq!(event.recurrence.rrule, "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1");
        assert_eq!(event.title, "Ana's birthday");
    }

    #[test]
    fn test_leap_day_recurrence_mar1() {
        let entry = DateEntry::new("Ana", DateKind::Birthday, 2, 29, None).unwrap();
        let occ = next_occurrence_with(&entry, date(2025, 6, 1), LeapDayPolicy::Mar1);
        let event = project(&entry, &occ, &TitleOptions::default());

        assert_eq!(event.start, date(2026, 3, 1));
        assert_eq!(event.recurrence.rrule, "FREQ=YEARLY;BYYEARDAY=60");
    }
}
