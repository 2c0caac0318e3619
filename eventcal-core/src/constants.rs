pub const DEFAULT_LISTING_URL: &str = "https://www.aiterhofen.de/veranstaltungen/";
pub const DEFAULT_PAGE_PARAM: &str = "pno";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_PAGES: u32 = 10;

pub const DEFAULT_STORE_PATH: &str = "events_aiterhofen.csv";
pub const DEFAULT_CALENDAR_PATH: &str = "all_events.ics";
pub const DEFAULT_NEW_EVENTS_CALENDAR_PATH: &str = "events.ics";
pub const DEFAULT_CONFIG_FILE: &str = "eventcal.toml";
pub const DEFAULT_PRODID: &str = "-//Event Calendar Extractor//aiterhofen.de//";

/// Heading text marking the venue block on an event detail page.
pub const VENUE_HEADING: &str = "Veranstaltungsort";
/// Country line dropped from detail-page venues.
pub const VENUE_COUNTRY: &str = "Deutschland";
/// Prefix of the venue line inside a listing block.
pub const LISTING_VENUE_PREFIX: &str = "Ort:";

pub const MISSING_TITLE: &str = "No Title";
pub const MISSING_LOCATION: &str = "No Location";
pub const MISSING_URL: &str = "No URL";
