//! ICS generation.

use std::path::Path;

use chrono::{Duration, NaiveDate};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};
use tracing::{debug, warn};

use crate::constants::{MISSING_LOCATION, MISSING_TITLE, MISSING_URL};
use crate::error::{HarvestError, HarvestResult};
use crate::event::EventRecord;

/// Start of a calendar event. Times are floating local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeFloating(chrono::NaiveDateTime),
}

/// A calendar entry derived from one stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub start: EventTime,
    /// Exclusive end day, only set for all-day events
    pub end: Option<NaiveDate>,
    pub location: String,
    pub url: String,
}

impl CalendarEvent {
    /// Map a record to a calendar entry. Records without a date have no place
    /// on a calendar and yield None.
    pub fn from_record(record: &EventRecord) -> Option<Self> {
        let date = record.date?;

        let (start, end) = match record.time {
            Some(time) => (EventTime::DateTimeFloating(date.and_time(time)), None),
            None => (EventTime::Date(date), Some(date + Duration::days(1))),
        };

        Some(CalendarEvent {
            uid: event_uid(record)?,
            summary: record.title.clone().unwrap_or_else(|| MISSING_TITLE.to_string()),
            start,
            end,
            location: record
                .location
                .clone()
                .unwrap_or_else(|| MISSING_LOCATION.to_string()),
            url: record.url.clone().unwrap_or_else(|| MISSING_URL.to_string()),
        })
    }
}

/// UID of a record's calendar event: `"{title}-{YYYY-MM-DD}"`.
///
/// Two events sharing title and date share a UID.
pub fn event_uid(record: &EventRecord) -> Option<String> {
    let date = record.date?;
    let title = record.title.as_deref().unwrap_or(MISSING_TITLE);
    Some(format!("{title}-{date}"))
}

/// Calendar entries for every dated record, in record order.
pub fn calendar_events(records: &[EventRecord]) -> Vec<CalendarEvent> {
    records
        .iter()
        .filter_map(|record| {
            let event = CalendarEvent::from_record(record);
            if event.is_none() {
                warn!(
                    title = record.title.as_deref().unwrap_or(MISSING_TITLE),
                    "Leaving undated event off the calendar"
                );
            }
            event
        })
        .collect()
}

/// Generate .ics content holding one VEVENT per dated record.
pub fn generate_ics(records: &[EventRecord], prodid: &str) -> HarvestResult<String> {
    if prodid.contains(['\r', '\n']) {
        return Err(HarvestError::IcsGenerate(format!(
            "PRODID must be a single line: {prodid:?}"
        )));
    }

    let mut cal = Calendar::new();

    for event in calendar_events(records) {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event.uid);
        ics_event.summary(&event.summary);

        add_datetime_property(&mut ics_event, "DTSTART", &event.start);
        if let Some(end) = event.end {
            add_datetime_property(&mut ics_event, "DTEND", &EventTime::Date(end));
        }

        ics_event.location(&event.location);
        ics_event.add_property("URL", &event.url);

        cal.push(ics_event.done());
    }

    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string(), prodid))
}

/// Generate the calendar for `records` and write it to `path`, replacing any
/// previous file. Returns the number of events written.
pub fn write_calendar(path: &Path, records: &[EventRecord], prodid: &str) -> HarvestResult<usize> {
    let ics = generate_ics(records, prodid)?;
    let count = ics.lines().filter(|l| *l == "BEGIN:VEVENT").count();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, ics)?;

    debug!(path = %path.display(), events = count, "Wrote calendar");
    Ok(count)
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str, prodid: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(prodid);
            result.push_str("\r\n");
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

fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTimeFloating(dt) => {
            // Floating datetime (no Z, no TZID)
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const PRODID: &str = "-//Event Calendar Extractor//aiterhofen.de//";

    fn konzert() -> EventRecord {
        EventRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, 24),
            time: NaiveTime::from_hms_opt(19, 0, 0),
            title: Some("Konzert".to_string()),
            url: Some("https://x/1".to_string()),
            location: Some("Rathausplatz".to_string()),
        }
    }

    fn vevents(ics: &str) -> Vec<String> {
        ics.split("BEGIN:VEVENT")
            .skip(1)
            .map(|s| s.split("END:VEVENT").next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_timed_event() {
        let ics = generate_ics(&[konzert()], PRODID).unwrap();
        let events = vevents(&ics);
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert!(event.contains("DTSTART:20260124T190000\r\n"), "ICS:\n{ics}");
        assert!(!event.contains("DTEND"), "timed events carry no DTEND. ICS:\n{ics}");
        assert!(event.contains("UID:Konzert-2026-01-24\r\n"), "ICS:\n{ics}");
        assert!(event.contains("SUMMARY:Konzert\r\n"));
        assert!(event.contains("LOCATION:Rathausplatz\r\n"));
        assert!(event.contains("URL:https://x/1\r\n"));
    }

    #[test]
    fn test_all_day_event_spans_one_day() {
        let mut record = konzert();
        record.time = None;
        record.date = NaiveDate::from_ymd_opt(2026, 12, 31);

        let ics = generate_ics(&[record], PRODID).unwrap();
        assert!(
            ics.contains("DTSTART;VALUE=DATE:20261231"),
            "DTSTART should have VALUE=DATE parameter. ICS:\n{ics}"
        );
        assert!(
            ics.contains("DTEND;VALUE=DATE:20270101"),
            "DTEND should be the following day. ICS:\n{ics}"
        );
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let record = EventRecord {
            title: None,
            url: None,
            location: None,
            ..konzert()
        };

        let event = CalendarEvent::from_record(&record).unwrap();
        assert_eq!(event.summary, "No Title");
        assert_eq!(event.location, "No Location");
        assert_eq!(event.url, "No URL");
        assert_eq!(event.uid, "No Title-2026-01-24");
    }

    #[test]
    fn test_undated_records_are_skipped() {
        let undated = EventRecord {
            date: None,
            ..konzert()
        };

        assert_eq!(event_uid(&undated), None);
        let events = calendar_events(&[undated, konzert()]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "Konzert-2026-01-24");
    }

    #[test]
    fn test_calendar_header() {
        let ics = generate_ics(&[konzert()], PRODID).unwrap();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains(&format!("PRODID:{PRODID}\r\n")));
        assert!(ics.contains("VERSION:2.0"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn test_empty_dataset_is_a_valid_calendar() {
        let ics = generate_ics(&[], PRODID).unwrap();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("END:VCALENDAR"));
        assert!(vevents(&ics).is_empty());
    }

    #[test]
    fn test_multiline_prodid_rejected() {
        assert!(matches!(
            generate_ics(&[konzert()], "a\nb"),
            Err(HarvestError::IcsGenerate(_))
        ));
    }

    #[test]
    fn test_write_calendar_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_events.ics");
        std::fs::write(&path, "stale").unwrap();

        let count = write_calendar(&path, &[konzert()], PRODID).unwrap();
        assert_eq!(count, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("UID:Konzert-2026-01-24"));
    }
}
