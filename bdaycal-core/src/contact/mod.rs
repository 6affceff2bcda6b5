//! Contact records and the yearly dates extracted from them.
//!
//! A [`RawContact`] is what the address-book server hands back. It is parsed
//! into [`DateEntry`] values at the [`parse`] boundary and never travels
//! further down the pipeline.

pub mod parse;
mod vcard;

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

pub use parse::{ParseReport, ParseSkip, ParsedContact, SkippedField, parse, parse_contacts};

/// Leap year used to validate month/day pairs that carry no year.
const PLACEHOLDER_LEAP_YEAR: i32 = 2000;

/// A contact resource as fetched from a CardDAV collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContact {
    pub href: String,
    pub etag: Option<String>,
    /// vCard text (`BEGIN:VCARD` .. `END:VCARD`)
    pub data: String,
}

impl RawContact {
    pub fn new(href: impl Into<String>, data: impl Into<String>) -> Self {
        RawContact {
            href: href.into(),
            etag: None,
            data: data.into(),
        }
    }
}

/// What a yearly date commemorates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateKind {
    Birthday,
    Anniversary,
    /// Free-form label, lower-cased (e.g. "other", "wedding day")
    Custom(String),
}

impl DateKind {
    /// Stable machine key: `birthday`, `anniversary`, or the custom label.
    pub fn key(&self) -> &str {
        match self {
            DateKind::Birthday => "birthday",
            DateKind::Anniversary => "anniversary",
            DateKind::Custom(label) => label,
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A normalized yearly date belonging to one contact.
///
/// Month and day always form a valid calendar day. When the year is known
/// the full date is valid too, so `1985-02-29` cannot exist while a
/// year-less Feb 29 can.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DateEntry {
    subject: String,
    kind: DateKind,
    month: u32,
    day: u32,
    year: Option<i32>,
}

impl DateEntry {
    /// Returns `None` when month/day (or the full date, if a year is given)
    /// is not a real calendar day.
    pub fn new(
        subject: impl Into<String>,
        kind: DateKind,
        month: u32,
        day: u32,
        year: Option<i32>,
    ) -> Option<Self> {
        let check_year = year.unwrap_or(PLACEHOLDER_LEAP_YEAR);
        NaiveDate::from_ymd_opt(check_year, month, day)?;

        Some(DateEntry {
            subject: subject.into(),
            kind,
            month,
            day,
            year,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn kind(&self) -> &DateKind {
        &self.kind
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn is_leap_day(&self) -> bool {
        self.month == 2 && self.day == 29
    }

    /// `MM-DD`
    pub fn month_day(&self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_entry_rejects_invalid_days() {
        assert!(DateEntry::new("A", DateKind::Birthday, 13, 1, None).is_none());
        assert!(DateEntry::new("A", DateKind::Birthday, 4, 31, None).is_none());
        assert!(DateEntry::new("A", DateKind::Birthday, 0, 10, Some(1990)).is_none());
    }

    #[test]
    fn test_leap_day_needs_leap_year_only_when_year_known() {
        assert!(DateEntry::new("A", DateKind::Birthday, 2, 29, None).is_some());
        assert!(DateEntry::new("A", DateKind::Birthday, 2, 29, Some(1988)).is_some());
        assert!(DateEntry::new("A", DateKind::Birthday, 2, 29, Some(1985)).is_none());
    }

    #[test]
    fn test_month_day_is_zero_padded() {
        let entry = DateEntry::new("A", DateKind::Anniversary, 3, 5, None).unwrap();
        assert_eq!(entry.month_day(), "03-05");
    }

    #[test]
    fn test_kind_key() {
        assert_eq!(DateKind::Birthday.key(), "birthday");
        assert_eq!(DateKind::Custom("wedding".into()).to_string(), "wedding");
    }
}
