//! Turning one listing block into an [`EventRecord`].

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};
use url::Url;

use super::stripped_text;
use crate::constants::LISTING_VENUE_PREFIX;
use crate::date_text;
use crate::event::{EventRecord, parse_clock_time};

static SEL_DATE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".events-infos .date p").expect("invalid selector: date")
});

static SEL_PLACE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".events-infos .place").expect("invalid selector: place")
});

static SEL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("invalid selector: link"));

static SEL_PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("invalid selector: paragraph"));

static SEL_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("invalid selector: span"));

static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})").expect("invalid regex: year"));

/// The month heading an event block was listed under, e.g. "Jan. 2026".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthContext {
    pub label: String,
    pub year: i32,
}

impl MonthContext {
    /// Build a context from heading text. Headings without a four-digit year
    /// fall back to `fallback_year`.
    pub fn from_label(label: &str, fallback_year: i32) -> Self {
        let year = RE_YEAR
            .captures(label)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(fallback_year);

        MonthContext {
            label: label.to_string(),
            year,
        }
    }

    /// Read the context from a month heading's `<span>`. Headings with an
    /// empty or missing span yield None.
    pub fn from_heading(heading: ElementRef, fallback_year: i32) -> Option<Self> {
        let span = heading.select(&SEL_SPAN).next()?;
        let label = stripped_text(span, " ");
        if label.is_empty() {
            return None;
        }

        Some(Self::from_label(&label, fallback_year))
    }
}

/// Where a record came from. Kept for diagnostics only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub month_label: String,
    pub raw_date_text: String,
    pub page: u32,
}

#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub record: EventRecord,
    pub provenance: Provenance,
}

/// Extract a record from an event block.
///
/// Blocks seen before any month heading cannot be dated and are skipped.
/// Relative event links are resolved against `page_url`.
pub fn extract_record(
    block: ElementRef,
    context: Option<&MonthContext>,
    page: u32,
    page_url: &Url,
) -> Option<ListingEntry> {
    let Some(context) = context else {
        debug!(page, "Skipping event block without a month heading");
        return None;
    };

    let raw_date_text = block
        .select(&SEL_DATE)
        .next()
        .map(|el| stripped_text(el, " "))
        .unwrap_or_default();

    let (date, time) = date_text::normalize(&raw_date_text, context.year);
    if date.is_none() {
        warn!(page, month = %context.label, "Could not parse date text '{raw_date_text}'");
    }
    let time = time.and_then(|t| clock_time(&t, &raw_date_text));

    let place = block.select(&SEL_PLACE).next();
    let link = place.and_then(|p| p.select(&SEL_LINK).next());

    let title = link
        .map(|a| stripped_text(a, ""))
        .filter(|t| !t.is_empty());

    let url = link
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_href(page_url, href));

    let location = place.and_then(listing_venue);

    Some(ListingEntry {
        record: EventRecord {
            date,
            time,
            title,
            url,
            location,
        },
        provenance: Provenance {
            month_label: context.label.clone(),
            raw_date_text,
            page,
        },
    })
}

/// The venue from the last "Ort:" line of a place block.
fn listing_venue(place: ElementRef) -> Option<String> {
    let mut venue = None;

    for paragraph in place.select(&SEL_PARAGRAPH) {
        let text = stripped_text(paragraph, "");
        if let Some(rest) = text.strip_prefix(LISTING_VENUE_PREFIX) {
            let rest = rest.trim();
            venue = (!rest.is_empty()).then(|| rest.to_string());
        }
    }

    venue
}

fn clock_time(text: &str, raw_date_text: &str) -> Option<NaiveTime> {
    let time = parse_clock_time(text);
    if time.is_none() {
        warn!(time = text, date_text = raw_date_text, "Ignoring unreadable start time");
    }
    time
}

fn resolve_href(page_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match page_url.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!(href, "Ignoring unusable event link: {e}");
            None
        }
    }
}
