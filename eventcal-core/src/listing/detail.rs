//! Venue lookup on an event's detail page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::stripped_text;
use crate::constants::{VENUE_COUNTRY, VENUE_HEADING};
use crate::http::HttpClient;

static SEL_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3, h4").expect("invalid selector: heading"));

/// Best-effort venue enrichment. Failures are logged and yield None.
#[derive(Clone)]
pub struct DetailResolver {
    client: HttpClient,
}

impl DetailResolver {
    pub fn new(client: HttpClient) -> Self {
        DetailResolver { client }
    }

    pub async fn resolve(&self, url: &str) -> Option<String> {
        let body = match self.client.get_text(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not fetch venue: {e}");
                return None;
            }
        };

        let venue = extract_venue(&body);
        debug!(url, venue = ?venue, "Resolved venue from detail page");
        venue
    }
}

/// Find the "Veranstaltungsort" heading and join the text of its container,
/// minus the heading itself, the country line and bare punctuation.
pub fn extract_venue(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    document
        .select(&SEL_HEADING)
        .filter(|heading| stripped_text(*heading, "") == VENUE_HEADING)
        .find_map(venue_from_heading)
}

fn venue_from_heading(heading: ElementRef) -> Option<String> {
    let container = heading.parent().and_then(ElementRef::wrap)?;

    let parts: Vec<&str> = container
        .text()
        .map(str::trim)
        .filter(|part| {
            !part.is_empty()
                && *part != VENUE_HEADING
                && *part != VENUE_COUNTRY
                && part.chars().any(char::is_alphanumeric)
        })
        .collect();

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
