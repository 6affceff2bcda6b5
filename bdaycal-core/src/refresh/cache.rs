//! The result of one successful refresh pass.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::attributes::{AttributeSet, BirthdayAttributes};
use crate::constants::{DEFAULT_DAYS_AHEAD, DEFAULT_TIMEOUT};
use crate::contact::DateEntry;
use crate::event::{CalendarEvent, TitleOptions, event_uid, project};
use crate::occurrence::{LeapDayPolicy, Occurrence, next_occurrence_with};

/// Per-pass settings: horizon, presentation and fetch timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOptions {
    pub days_ahead: u32,
    pub title: TitleOptions,
    pub leap_day_policy: LeapDayPolicy,
    pub timeout: Duration,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        RefreshOptions {
            days_ahead: DEFAULT_DAYS_AHEAD,
            title: TitleOptions::default(),
            leap_day_policy: LeapDayPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Events and attributes produced by one pass. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedResult {
    /// Ordered by days until, then subject
    pub events: Vec<CalendarEvent>,
    pub occurrences: Vec<Occurrence>,
    pub birthdays: Vec<BirthdayAttributes>,
    /// Records within the horizon (`birthdays.len()`)
    pub total_count: usize,
    /// Occurrences computed before the horizon filter
    pub tracked_count: usize,
    pub reference_date: NaiveDate,
    pub last_successful_fetch: DateTime<Utc>,
}

impl CachedResult {
    /// Compute, filter and project a set of entries.
    pub fn build(
        entries: &[DateEntry],
        reference_date: NaiveDate,
        options: &RefreshOptions,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut seen_uids = HashSet::new();
        let mut occurrences: Vec<Occurrence> = entries
            .iter()
            .filter(|entry| {
                let fresh = seen_uids.insert(event_uid(entry));
                if !fresh {
                    debug!(subject = entry.subject(), kind = %entry.kind(), "Dropping duplicate date");
                }
                fresh
            })
            .map(|entry| next_occurrence_with(entry, reference_date, options.leap_day_policy))
            .collect();

        occurrences.sort_by(|a, b| {
            a.days_until
                .cmp(&b.days_until)
                .then_with(|| a.entry.subject().cmp(b.entry.subject()))
        });

        let tracked_count = occurrences.len();
        occurrences.retain(|occ| occ.is_within(options.days_ahead));

        let events = occurrences
            .iter()
            .map(|occ| project(&occ.entry, occ, &options.title))
            .collect();
        let birthdays: Vec<BirthdayAttributes> =
            occurrences.iter().map(BirthdayAttributes::from).collect();

        CachedResult {
            events,
            total_count: birthdays.len(),
            birthdays,
            occurrences,
            tracked_count,
            reference_date,
            last_successful_fetch: fetched_at,
        }
    }

    /// The soonest upcoming event, if any.
    pub fn next_event(&self) -> Option<&CalendarEvent> {
        self.events.first()
    }

    pub fn attributes(&self) -> AttributeSet {
        AttributeSet {
            birthdays: self.birthdays.clone(),
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::DateKind;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn entries() -> Vec<DateEntry> {
        vec![
            DateEntry::new("Zoe", DateKind::Birthday, 1, 10, Some(2000)).unwrap(),
            DateEntry::new("John", DateKind::Birthday, 3, 15, Some(1985)).unwrap(),
            DateEntry::new("Adam", DateKind::Birthday, 1, 10, None).unwrap(),
            DateEntry::new("Late", DateKind::Anniversary, 12, 1, Some(2010)).unwrap(),
        ]
    }

    #[test]
    fn test_sorted_by_days_then_name() {
        let result = CachedResult::build(&entries(), date(2025, 1, 1), &RefreshOptions::default(), fetched_at());

        let names: Vec<&str> = result.birthdays.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Adam", "Zoe", "John", "Late"]);
        assert_eq!(result.next_event().unwrap().title, "Adam's birthday");
    }

    #[test]
    fn test_horizon_filters_lists_but_tracks_everything() {
        let options = RefreshOptions {
            days_ahead: 30,
            ..RefreshOptions::default()
        };
        let result = CachedResult::build(&entries(), date(2025, 1, 1), &options, fetched_at());

        assert_eq!(result.tracked_count, 4);
        assert_eq!(result.total_count, 2);
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.occurrences.len(), 2);
        assert!(result.birthdays.iter().all(|b| b.days_until <= 30));
    }

    #[test]
    fn test_horizon_is_inclusive() {
        let entry = DateEntry::new("Edge", DateKind::Birthday, 1, 31, None).unwrap();
        let options = RefreshOptions {
            days_ahead: 30,
            ..RefreshOptions::default()
        };
        let result = CachedResult::build(&[entry], date(2025, 1, 1), &options, fetched_at());
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_duplicate_uids_collapse() {
        let twice = vec![
            DateEntry::new("John", DateKind::Birthday, 3, 15, Some(1985)).unwrap(),
            DateEntry::new("John", DateKind::Birthday, 3, 15, None).unwrap(),
        ];
        let result = CachedResult::build(&twice, date(2025, 1, 1), &RefreshOptions::default(), fetched_at());

        assert_eq!(result.tracked_count, 1);
        assert_eq!(result.birthdays[0].year_of_birth, Some(1985));
    }

    #[test]
    fn test_attributes_payload() {
        let result = CachedResult::build(&entries(), date(2025, 1, 1), &RefreshOptions::default(), fetched_at());
        let json = serde_json::to_value(result.attributes()).unwrap();

        assert_eq!(json["total_count"], 4);
        assert_eq!(json["birthdays"][2]["next_birthday"], "2025-03-15");
        assert_eq!(json["birthdays"][2]["age_next_birthday"], 40);
    }
}
