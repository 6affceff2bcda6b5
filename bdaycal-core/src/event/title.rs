//! Localized event titles and descriptions.

use serde::{Deserialize, Serialize};

use crate::contact::{DateEntry, DateKind};
use crate::occurrence::Occurrence;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Nl,
}

impl Language {
    /// Pick a language from a POSIX locale string such as `nl_NL.UTF-8`.
    pub fn from_locale(locale: &str) -> Self {
        let lower = locale.to_ascii_lowercase();
        if lower.starts_with("nl") {
            Language::Nl
        } else {
            Language::En
        }
    }

    /// Language of the process locale (`LC_ALL`, `LC_MESSAGES`, `LANG`).
    pub fn detect() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|value| Language::from_locale(&value))
            .unwrap_or_default()
    }
}

/// Presentation options for projected events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleOptions {
    pub language: Language,
    pub show_age: bool,
}

impl Default for TitleOptions {
    fn default() -> Self {
        TitleOptions {
            language: Language::En,
            show_age: true,
        }
    }
}

pub fn title(entry: &DateEntry, occurrence: &Occurrence, options: &TitleOptions) -> String {
    let name = entry.subject();
    let age = occurrence.age_reached.filter(|_| options.show_age);

    match (options.language, entry.kind(), age) {
        (Language::En, DateKind::Birthday, Some(age)) => format!("{name} turns {age}"),
        (Language::En, DateKind::Birthday, None) => format!("{name}'s birthday"),
        (Language::En, DateKind::Anniversary, Some(age)) => {
            format!("{name}'s anniversary ({age} years)")
        }
        (Language::En, DateKind::Anniversary, None) => format!("{name}'s anniversary"),
        (Language::En, DateKind::Custom(label), Some(age)) => {
            format!("{name}: {} ({age} years)", label_text(label, Language::En))
        }
        (Language::En, DateKind::Custom(label), None) => {
            format!("{name}: {}", label_text(label, Language::En))
        }

        (Language::Nl, DateKind::Birthday, Some(age)) => format!("{name} wordt {age}"),
        (Language::Nl, DateKind::Birthday, None) => format!("{name} is jarig"),
        (Language::Nl, DateKind::Anniversary, Some(age)) => format!("Trouwdag {name} ({age} jaar)"),
        (Language::Nl, DateKind::Anniversary, None) => format!("Trouwdag {name}"),
        (Language::Nl, DateKind::Custom(label), Some(age)) => {
            format!("{name}: {} ({age} jaar)", label_text(label, Language::Nl))
        }
        (Language::Nl, DateKind::Custom(label), None) => {
            format!("{name}: {}", label_text(label, Language::Nl))
        }
    }
}

pub fn description(entry: &DateEntry, language: Language) -> String {
    let name = entry.subject();

    let base = match (language, entry.kind()) {
        (Language::En, DateKind::Birthday) => format!("Birthday of {name}"),
        (Language::En, DateKind::Anniversary) => format!("Anniversary of {name}"),
        (Language::En, DateKind::Custom(label)) => {
            format!("{} of {name}", capitalize(&label_text(label, language)))
        }
        (Language::Nl, DateKind::Birthday) => format!("Verjaardag van {name}"),
        (Language::Nl, DateKind::Anniversary) => format!("Trouwdag van {name}"),
        (Language::Nl, DateKind::Custom(label)) => {
            format!("{} van {name}", capitalize(&label_text(label, language)))
        }
    };

    match (entry.year(), language, entry.kind()) {
        (None, _, _) => base,
        (Some(year), Language::En, DateKind::Birthday) => format!("{base} (born {year})"),
        (Some(year), Language::Nl, DateKind::Birthday) => format!("{base} (geboren {year})"),
        (Some(year), Language::En, _) => format!("{base} (since {year})"),
        (Some(year), Language::Nl, _) => format!("{base} (sinds {year})"),
    }
}

/// Built-in Apple labels get a translation; free-form labels are shown as entered.
fn label_text(label: &str, language: Language) -> String {
    match (label, language) {
        ("other", Language::Nl) => "overig".to_string(),
        _ => label.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::next_occurrence;
    use chrono::NaiveDate;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn render(kind: DateKind, year: Option<i32>, language: Language, show_age: bool) -> String {
        let entry = DateEntry::new("John", kind, 3, 15, year).unwrap();
        let occ = next_occurrence(&entry, reference());
        title(&entry, &occ, &TitleOptions { language, show_age })
    }

    #[test]
    fn test_birthday_titles() {
        assert_eq!(render(DateKind::Birthday, Some(1985), Language::En, true), "John turns 40");
        assert_eq!(render(DateKind::Birthday, Some(1985), Language::En, false), "John's birthday");
        assert_eq!(render(DateKind::Birthday, Some(1985), Language::Nl, true), "John wordt 40");
        assert_eq!(render(DateKind::Birthday, None, Language::Nl, true), "John is jarig");
    }

    #[test]
    fn test_missing_year_never_shows_age() {
        for language in [Language::En, Language::Nl] {
            for kind in [DateKind::Birthday, DateKind::Anniversary, DateKind::Custom("x".into())] {
                let title = render(kind, None, language, true);
                assert!(!title.chars().any(|c| c.is_ascii_digit()), "unexpected age in {title}");
            }
        }
    }

    #[test]
    fn test_anniversary_and_custom_titles() {
        assert_eq!(
            render(DateKind::Anniversary, Some(2010), Language::En, true),
            "John's anniversary (15 years)"
        );
        assert_eq!(
            render(DateKind::Anniversary, Some(2010), Language::Nl, true),
            "Trouwdag John (15 jaar)"
        );
        assert_eq!(
            render(DateKind::Custom("other".into()), None, Language::Nl, true),
            "John: overig"
        );
        assert_eq!(
            render(DateKind::Custom("sterfdag".into()), Some(2019), Language::Nl, true),
            "John: sterfdag (6 jaar)"
        );
    }

    #[test]
    fn test_description() {
        let entry = DateEntry::new("John", DateKind::Birthday, 3, 15, Some(1985)).unwrap();
        assert_eq!(description(&entry, Language::En), "Birthday of John (born 1985)");
        assert_eq!(description(&entry, Language::Nl), "Verjaardag van John (geboren 1985)");

        let custom = DateEntry::new("Ann", DateKind::Custom("wedding".into()), 6, 1, None).unwrap();
        assert_eq!(description(&custom, Language::En), "Wedding of Ann");
    }

    #[test]
    fn test_language_from_locale() {
        assert_eq!(Language::from_locale("nl_BE.UTF-8"), Language::Nl);
        assert_eq!(Language::from_locale("en_US.UTF-8"), Language::En);
        assert_eq!(Language::from_locale("C"), Language::En);
    }
}
