//! ICS export of projected events.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::error::{BdayCalError, BdayCalResult};
use crate::event::CalendarEvent;

/// Render events as a single VCALENDAR.
///
/// `stamp` becomes every event's DTSTAMP so output is reproducible.
pub fn generate_ics(
    calendar_name: &str,
    events: &[CalendarEvent],
    stamp: DateTime<Utc>,
) -> BdayCalResult<String> {
    let mut cal = Calendar::new();
    cal.name(calendar_name);

    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    for event in events {
        if event.end <= event.start {
            return Err(BdayCalError::IcsGenerate(format!(
                "Event '{}' ends before it starts",
                event.uid
            )));
        }

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event.uid);
        ics_event.summary(&event.title);
        ics_event.description(&event.description);
        ics_event.add_property("DTSTAMP", &dtstamp);

        add_date_property(&mut ics_event, "DTSTART", event.start);
        add_date_property(&mut ics_event, "DTEND", event.end);

        ics_event.add_property("RRULE", &event.recurrence.rrule);
        ics_event.add_property("CATEGORIES", event.kind.key());

        // Birthdays never block time
        ics_event.add_property("TRANSP", "TRANSPARENT");

        cal.push(ics_event.done());
    }

    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with BDAYCAL
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:BDAYCAL\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: chrono::NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}
