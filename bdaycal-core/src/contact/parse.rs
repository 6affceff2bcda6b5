//! Extraction of yearly dates from vCards.
//!
//! Recognized fields:
//! - `BDAY` → birthday
//! - `ANNIVERSARY` → anniversary
//! - `itemN.X-ABDATE` + `itemN.X-ABLabel` → Apple custom dates, classified by label
//!
//! Dates may be `YYYY-MM-DD`, `YYYYMMDD`, `--MM-DD` or `--MMDD`. Apple stores
//! year-less dates with a placeholder year flagged by `X-APPLE-OMIT-YEAR`.

use thiserror::Error;
use tracing::{debug, warn};

use super::vcard::{Property, VCard, split_unescaped, unescape};
use super::{DateEntry, DateKind, RawContact};

const UNKNOWN_SUBJECT: &str = "Unknown";
const DEFAULT_CUSTOM_LABEL: &str = "custom";

/// A field or record dropped during parsing. Never fails a refresh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSkip {
    #[error("malformed vCard: {0}")]
    MalformedRecord(String),

    #[error("unparseable {field} value '{value}'")]
    InvalidDate { field: String, value: String },
}

/// Dates extracted from one contact plus the fields that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContact {
    pub entries: Vec<DateEntry>,
    pub skipped: Vec<ParseSkip>,
}

/// A skip together with the resource it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedField {
    pub href: String,
    pub reason: ParseSkip,
}

/// Outcome of parsing a whole fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub entries: Vec<DateEntry>,
    /// Contacts that contributed at least one entry
    pub contacts_with_dates: usize,
    pub skipped: Vec<SkippedField>,
}

/// Parse one contact into its date entries, logging anything skipped.
pub fn parse(raw: &RawContact) -> Vec<DateEntry> {
    match parse_detailed(raw) {
        Ok(parsed) => {
            for skip in &parsed.skipped {
                warn!(href = %raw.href, %skip, "Skipping contact field");
            }
            parsed.entries
        }
        Err(skip) => {
            warn!(href = %raw.href, %skip, "Skipping contact");
            Vec::new()
        }
    }
}

/// Parse every contact of a fetch. A bad record only ever drops itself.
pub fn parse_contacts(raws: &[RawContact]) -> ParseReport {
    let mut report = ParseReport::default();

    for raw in raws {
        match parse_detailed(raw) {
            Ok(parsed) => {
                for reason in parsed.skipped {
                    warn!(href = %raw.href, skip = %reason, "Skipping contact field");
                    report.skipped.push(SkippedField {
                        href: raw.href.clone(),
                        reason,
                    });
                }
                if !parsed.entries.is_empty() {
                    report.contacts_with_dates += 1;
                    report.entries.extend(parsed.entries);
                }
            }
            Err(reason) => {
                warn!(href = %raw.href, skip = %reason, "Skipping contact");
                report.skipped.push(SkippedField {
                    href: raw.href.clone(),
                    reason,
                });
            }
        }
    }

    debug!(
        contacts = raws.len(),
        with_dates = report.contacts_with_dates,
        entries = report.entries.len(),
        skipped = report.skipped.len(),
        "Parsed contacts"
    );

    report
}

/// Parse one contact, returning `Err` only when the record as a whole is unusable.
pub fn parse_detailed(raw: &RawContact) -> Result<ParsedContact, ParseSkip> {
    let card = VCard::parse(&raw.data)?;
    let subject = display_name(&card);

    let mut parsed = ParsedContact::default();

    if let Some(prop) = card.first("BDAY") {
        let entry = date_entry(prop, subject.as_deref(), DateKind::Birthday, &mut parsed.skipped);
        push_unique(&mut parsed.entries, entry);
    }

    if let Some(prop) = card.first("ANNIVERSARY") {
        let entry = date_entry(prop, subject.as_deref(), DateKind::Anniversary, &mut parsed.skipped);
        push_unique(&mut parsed.entries, entry);
    }

    for prop in card.all("X-ABDATE") {
        let raw_label = prop
            .group
            .as_deref()
            .and_then(|group| card.in_group(group, "X-ABLABEL"))
            .map(|label| label.value.as_str())
            .unwrap_or(DEFAULT_CUSTOM_LABEL);
        let kind = classify_label(raw_label);

        let entry = date_entry(prop, subject.as_deref(), kind, &mut parsed.skipped);
        if let Some(entry) = &entry {
            debug!(subject = entry.subject(), kind = %entry.kind(), "Found custom date");
        }
        push_unique(&mut parsed.entries, entry);
    }

    Ok(parsed)
}

fn push_unique(entries: &mut Vec<DateEntry>, entry: Option<DateEntry>) {
    if let Some(entry) = entry {
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }
}

fn date_entry(
    prop: &Property,
    subject: Option<&str>,
    kind: DateKind,
    skipped: &mut Vec<ParseSkip>,
) -> Option<DateEntry> {
    let omit_year = prop
        .param("X-APPLE-OMIT-YEAR")
        .and_then(|y| y.trim().parse::<i32>().ok());

    let parsed = parse_date_value(&prop.value, omit_year).and_then(|(month, day, year)| {
        DateEntry::new(subject.unwrap_or(UNKNOWN_SUBJECT), kind, month, day, year)
    });

    if parsed.is_none() {
        skipped.push(ParseSkip::InvalidDate {
            field: prop.name.clone(),
            value: prop.value.trim().to_string(),
        });
    }

    parsed
}

/// Parse a vCard date value into (month, day, year).
///
/// The time part of a date-time value is ignored. A year equal to
/// `omit_year` is Apple's placeholder and reported as unknown.
pub(crate) fn parse_date_value(value: &str, omit_year: Option<i32>) -> Option<(u32, u32, Option<i32>)> {
    let value = value.trim();
    if !value.is_ascii() {
        return None;
    }
    let date = match value.find('T') {
        Some(idx) => &value[..idx],
        None => value,
    };

    if let Some(rest) = date.strip_prefix("--") {
        let compact = rest.replace('-', "");
        if compact.len() != 4 {
            return None;
        }
        let month = digits(&compact[..2])?;
        let day = digits(&compact[2..])?;
        return Some((month, day, None));
    }

    let compact = match date.len() {
        10 if date.as_bytes()[4] == b'-' && date.as_bytes()[7] == b'-' => date.replace('-', ""),
        8 => date.to_string(),
        _ => return None,
    };
    if compact.len() != 8 {
        return None;
    }

    let year = digits(&compact[..4])? as i32;
    let month = digits(&compact[4..6])?;
    let day = digits(&compact[6..])?;

    let year = match omit_year {
        Some(placeholder) if placeholder == year => None,
        _ => Some(year),
    };

    Some((month, day, year))
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Map an Apple `X-ABLabel` (built-in `_$!<...>!$_` or free text) to a kind.
pub(crate) fn classify_label(raw: &str) -> DateKind {
    let cleaned = unescape(raw.trim());

    let label = match cleaned
        .strip_prefix("_$!<")
        .and_then(|inner| inner.strip_suffix(">!$_"))
    {
        Some(inner) => inner.to_lowercase(),
        None => cleaned.to_lowercase(),
    };

    match label.as_str() {
        "anniversary" => DateKind::Anniversary,
        "birthday" => DateKind::Birthday,
        "" => DateKind::Custom(DEFAULT_CUSTOM_LABEL.to_string()),
        _ => DateKind::Custom(label),
    }
}

/// First usable display identifier: FN, N, NICKNAME, ORG, EMAIL.
fn display_name(card: &VCard) -> Option<String> {
    let non_empty = |s: String| {
        let trimmed = s.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    if let Some(name) = card.first("FN").and_then(|p| non_empty(unescape(&p.value))) {
        return Some(name);
    }

    if let Some(n) = card.first("N") {
        // N:Family;Given;Additional;Prefix;Suffix
        let parts = split_unescaped(&n.value, ';');
        let family = parts.first().copied().unwrap_or_default();
        let given = parts.get(1).copied().unwrap_or_default();
        let joined = format!("{} {}", unescape(given).trim(), unescape(family).trim());
        if let Some(name) = non_empty(joined) {
            return Some(name);
        }
    }

    if let Some(nick) = card
        .first("NICKNAME")
        .and_then(|p| split_unescaped(&p.value, ',').first().map(|s| unescape(s)))
        .and_then(non_empty)
    {
        return Some(nick);
    }

    if let Some(org) = card
        .first("ORG")
        .and_then(|p| split_unescaped(&p.value, ';').first().map(|s| unescape(s)))
        .and_then(non_empty)
    {
        return Some(org);
    }

    card.first("EMAIL").and_then(|p| non_empty(p.value.clone()))
}
