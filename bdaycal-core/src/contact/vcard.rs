//! Minimal vCard (RFC 6350 / 3.0) content-line reader.
//!
//! Only what date extraction needs: unfolding, group prefixes, parameters
//! and text unescaping. Property values are kept verbatim.

use tracing::debug;

use super::parse::ParseSkip;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Property {
    /// `item1` in `item1.X-ABDATE`
    pub group: Option<String>,
    /// Upper-cased property name
    pub name: String,
    /// Upper-cased parameter names with their raw values
    pub params: Vec<(String, String)>,
    pub value: String,
}

impl Property {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VCard {
    pub properties: Vec<Property>,
}

impl VCard {
    pub fn parse(text: &str) -> Result<Self, ParseSkip> {
        let lines = unfold(text);

        let begin = lines.iter().position(|l| l.trim().eq_ignore_ascii_case("BEGIN:VCARD"));
        let end = lines.iter().rposition(|l| l.trim().eq_ignore_ascii_case("END:VCARD"));
        let (Some(begin), Some(end)) = (begin, end) else {
            return Err(ParseSkip::MalformedRecord(
                "missing BEGIN:VCARD/END:VCARD".into(),
            ));
        };
        if end <= begin {
            return Err(ParseSkip::MalformedRecord("END:VCARD before BEGIN:VCARD".into()));
        }

        // Stray lines (quoted-printable soft breaks, broken exporters) are dropped
        let properties = lines[begin + 1..end]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let property = parse_line(line);
                if property.is_none() {
                    debug!(line = %line, "Ignoring unparseable vCard content line");
                }
                property
            })
            .collect();

        Ok(VCard { properties })
    }

    /// First ungrouped-or-grouped property with this name.
    pub fn first(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Property `name` sharing the given group (`item1.X-ABLabel`).
    pub fn in_group(&self, group: &str, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| {
            p.name.eq_ignore_ascii_case(name)
                && p.group
                    .as_deref()
                    .is_some_and(|g| g.eq_ignore_ascii_case(group))
        })
    }
}

/// Split into logical lines: strip CRs and join folded continuation lines.
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for raw in text.split('\n') {
        let line = raw.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix([' ', '\t']) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(line.to_string());
    }

    lines
}

fn parse_line(line: &str) -> Option<Property> {
    let colon = find_value_separator(line)?;

    let (head, value) = (&line[..colon], &line[colon + 1..]);
    let mut parts = head.split(';');
    let full_name = parts.next().unwrap_or_default().trim();
    if full_name.is_empty() {
        return None;
    }

    let (group, name) = match full_name.rsplit_once('.') {
        Some((group, name)) => (Some(group.to_string()), name),
        None => (None, full_name),
    };

    let params = parts
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((key, value)) => (key.to_ascii_uppercase(), value.trim_matches('"').to_string()),
            // vCard 2.1 bare parameter (`TEL;HOME:`) is a TYPE
            None => ("TYPE".to_string(), p.to_string()),
        })
        .collect();

    Some(Property {
        group,
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Position of the first ':' that is not inside a quoted parameter value.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Split a structured value on `sep`, ignoring escaped separators (`\;`).
/// Components keep their escapes; decode them with [`unescape`].
pub(crate) fn split_unescaped(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (idx, c) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&value[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&value[start..]);

    parts
}

/// Decode vCard text escapes (`\,` `\;` `\n` `\\`).
pub(crate) fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
