//! The event record shared by every pipeline stage.
//!
//! Records are created by the listing walker, merged into the store and
//! finally turned into calendar events. They carry naive local dates and
//! times only.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One harvested event occurrence.
///
/// Field order is the column order of the CSV store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// None when the listing's date text could not be parsed.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Local clock time, None for events without a start time.
    #[serde(default, with = "clock_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub title: Option<String>,
    /// Absolute link to the event's detail page
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Deduplication key of the store: the event's date and title.
///
/// URLs are not part of the key since their formatting changes between
/// fetches while date and title stay put.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
}

impl EventRecord {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            date: self.date,
            title: self.title.clone(),
        }
    }

    /// Ordering key of the store. `None` sorts first, so undated records lead
    /// and all-day events precede timed ones on the same date.
    pub fn sort_key(&self) -> (Option<NaiveDate>, Option<NaiveTime>) {
        (self.date, self.time)
    }

    /// Fill in the location if none is known yet. An existing location is
    /// never replaced. Returns true if the record changed.
    pub fn backfill_location(&mut self, location: Option<String>) -> bool {
        if self.location.is_some() {
            return false;
        }
        match location {
            Some(loc) => {
                self.location = Some(loc);
                true
            }
            None => false,
        }
    }
}

/// Parse an `HH:MM` clock time. Single-digit hours and a trailing seconds
/// field are tolerated, and a bare hour ("19") means the full hour.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return text
            .parse()
            .ok()
            .and_then(|hour| NaiveTime::from_hms_opt(hour, 0, 0));
    }

    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

/// Serde adapter storing `Option<NaiveTime>` as `HH:MM` (empty for None).
///
/// Unreadable times load as None so one damaged cell can't sink a row.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;

        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                let time = super::parse_clock_time(text);
                if time.is_none() {
                    warn!(time = text, "Dropping unreadable stored time");
                }
                Ok(time)
            }
        }
    }
}
