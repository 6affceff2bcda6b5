//! Flat per-date records for rendering layers.

use serde::Serialize;

use crate::occurrence::Occurrence;

/// One tracked date as exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthdayAttributes {
    pub name: String,
    /// `birthday`, `anniversary`, or the custom label
    pub kind: String,
    /// `MM-DD`
    pub birthday: String,
    /// `YYYY-MM-DD`
    pub next_birthday: String,
    pub days_until: u32,
    pub year_of_birth: Option<i32>,
    pub age_next_birthday: Option<i32>,
}

impl From<&Occurrence> for BirthdayAttributes {
    fn from(occurrence: &Occurrence) -> Self {
        let entry = &occurrence.entry;
        BirthdayAttributes {
            name: entry.subject().to_string(),
            kind: entry.kind().key().to_string(),
            birthday: entry.month_day(),
            next_birthday: occurrence.next_date_string(),
            days_until: occurrence.days_until,
            year_of_birth: entry.year(),
            age_next_birthday: occurrence.age_reached,
        }
    }
}

/// The attribute payload: every record plus the count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSet {
    pub birthdays: Vec<BirthdayAttributes>,
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{DateEntry, DateKind};
    use crate::occurrence::next_occurrence;
    use chrono::NaiveDate;

    #[test]
    fn test_attributes_from_occurrence() {
        let entry = DateEntry::new("John", DateKind::Birthday, 3, 15, Some(1985)).unwrap();
        let occ = next_occurrence(&entry, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let attrs = BirthdayAttributes::from(&occ);

        assert_eq!(attrs.name, "John");
        assert_eq!(attrs.birthday, "03-15");
        assert_eq!(attrs.next_birthday, "2025-03-15");
        assert_eq!(attrs.days_until, 73);
        assert_eq!(attrs.year_of_birth, Some(1985));
        assert_eq!(attrs.age_next_birthday, Some(40));
    }

    #[test]
    fn test_attributes_serialize_missing_year_as_null() {
        let entry = DateEntry::new("Ana", DateKind::Birthday, 2, 29, None).unwrap();
        let occ = next_occurrence(&entry, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let json = serde_json::to_value(BirthdayAttributes::from(&occ)).unwrap();

        assert_eq!(json["birthday"], "02-29");
        assert_eq!(json["next_birthday"], "2026-02-28");
        assert!(json["year_of_birth"].is_null());
        assert!(json["age_next_birthday"].is_null());
    }
}
