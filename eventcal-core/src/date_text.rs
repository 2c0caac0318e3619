//! Parsing of the listing's German date fragments.
//!
//! Fragments look like `"24. Januar | 19:00 Uhr"`: a day with a trailing
//! period, a (possibly abbreviated) German month name and an optional clock
//! time followed by "Uhr". The year never appears and is supplied by the
//! month heading the fragment was found under.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{HarvestError, HarvestResult};

static RE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.").expect("invalid regex: day"));

static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\s*([A-Za-zäöüÄÖÜ\x{0308}]+)").expect("invalid regex: month")
});

static RE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*([\d:]+)\s*Uhr").expect("invalid regex: time"));

/// German month abbreviations after diacritic folding, January first.
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "mai", "jun", "jul", "aug", "sep", "okt", "nov", "dez",
];

/// Parse a date fragment into a date and the raw `HH:MM` time text.
///
/// The time is returned exactly as it appears before "Uhr"; callers decide
/// how strictly to interpret it.
pub fn parse_date_text(text: &str, default_year: i32) -> HarvestResult<(NaiveDate, Option<String>)> {
    let parse_error = || HarvestError::DateParse(text.to_string());

    let day: u32 = RE_DAY
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(parse_error)?;

    let month = RE_MONTH
        .captures(text)
        .and_then(|caps| month_number(&caps[1]))
        .ok_or_else(parse_error)?;

    let date = NaiveDate::from_ymd_opt(default_year, month, day).ok_or_else(parse_error)?;

    let time = RE_TIME.captures(text).map(|caps| caps[1].to_string());

    Ok((date, time))
}

/// Lenient form of [`parse_date_text`]: any failure yields `(None, None)`.
pub fn normalize(text: &str, default_year: i32) -> (Option<NaiveDate>, Option<String>) {
    match parse_date_text(text, default_year) {
        Ok((date, time)) => (Some(date), time),
        Err(_) => (None, None),
    }
}

/// Map a German month name (full or abbreviated) to its number.
///
/// Only the first three letters count. Umlauts are folded to their base
/// letter, whether precomposed or written with a combining diaeresis.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name
        .chars()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ä' => 'a',
            'ö' => 'o',
            'ü' => 'u',
            other => other,
        })
        .take(3)
        .collect();

    MONTHS
        .iter()
        .position(|abbr| *abbr == prefix)
        .map(|idx| idx as u32 + 1)
}
