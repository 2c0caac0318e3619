//! Calendar (.ics) output.
//!
//! Stored records are first mapped to [`CalendarEvent`]s, which are then
//! encoded as a single VCALENDAR.

mod generate;

pub use generate::{
    CalendarEvent, EventTime, calendar_events, event_uid, generate_ics, write_calendar,
};
