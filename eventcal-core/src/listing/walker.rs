//! Page-by-page walk over the event listing.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Local};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};
use url::Url;

use super::detail::DetailResolver;
use super::extract::{ListingEntry, MonthContext, extract_record};
use super::has_class;
use crate::config::HarvestConfig;
use crate::error::{HarvestError, HarvestResult};
use crate::http::HttpClient;

static SEL_CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.em-events-list-grouped").expect("invalid selector: container")
});

static SEL_NEXT_PAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".em-pagination .next.page-numbers").expect("invalid selector: next page")
});

/// Why a walk ended. Every variant is a normal end of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last fetched page had no "next" link.
    NoNextPage,
    /// `max_pages` pages were fetched.
    PageCeiling,
    /// The listing container was missing from the page.
    MissingContainer,
    HttpStatus(u16),
    Transport,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoNextPage => write!(f, "no next page"),
            StopReason::PageCeiling => write!(f, "page limit reached"),
            StopReason::MissingContainer => write!(f, "no event list on page"),
            StopReason::HttpStatus(status) => write!(f, "HTTP {status}"),
            StopReason::Transport => write!(f, "request failed"),
        }
    }
}

/// Everything gathered by one walk.
#[derive(Debug)]
pub struct Harvest {
    pub entries: Vec<ListingEntry>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// The event entries of a single listing page.
#[derive(Debug)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    pub has_next: bool,
}

/// Parse one listing page.
///
/// Children of the event list are visited in document order. A month heading
/// replaces the current context, an event block is extracted under it. The
/// context starts out empty on every page.
pub fn parse_listing_page(
    html: &str,
    page: u32,
    page_url: &Url,
    fallback_year: i32,
) -> HarvestResult<ListingPage> {
    let document = Html::parse_document(html);

    let container = document
        .select(&SEL_CONTAINER)
        .next()
        .ok_or_else(|| HarvestError::MissingElement("div.em-events-list-grouped".into()))?;

    let mut context: Option<MonthContext> = None;
    let mut entries = Vec::new();

    for node in container.children().filter_map(ElementRef::wrap) {
        match node.value().name() {
            "h2" if has_class(node, "month-headline") => {
                if let Some(heading) = MonthContext::from_heading(node, fallback_year) {
                    context = Some(heading);
                }
            }
            "div" if has_class(node, "events-date") => {
                if let Some(entry) = extract_record(node, context.as_ref(), page, page_url) {
                    entries.push(entry);
                }
            }
            _ => {}
        }
    }

    let has_next = document.select(&SEL_NEXT_PAGE).next().is_some();

    Ok(ListingPage { entries, has_next })
}

pub struct ListingWalker {
    client: HttpClient,
    resolver: Option<DetailResolver>,
    listing_url: Url,
    page_param: String,
    max_pages: u32,
}

impl ListingWalker {
    pub fn new(client: HttpClient, config: &HarvestConfig) -> HarvestResult<Self> {
        let listing_url = Url::parse(&config.listing_url)
            .map_err(|e| HarvestError::Config(format!("Invalid listing_url: {e}")))?;

        let resolver = config
            .resolve_locations
            .then(|| DetailResolver::new(client.clone()));

        Ok(ListingWalker {
            client,
            resolver,
            listing_url,
            page_param: config.page_param.clone(),
            max_pages: config.max_pages,
        })
    }

    /// URL of listing page `page`; the first page is the bare listing URL.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.listing_url.clone();
        if page > 1 {
            url.query_pairs_mut()
                .append_pair(&self.page_param, &page.to_string());
        }
        url
    }

    /// Walk the listing until it runs out of pages, a page fails or the page
    /// limit is hit. Whatever was gathered up to that point is returned.
    pub async fn walk(&self) -> Harvest {
        let fallback_year = Local::now().year();
        let mut entries = Vec::new();
        let mut pages_fetched = 0;
        let mut page = 1;

        let stop = loop {
            if page > self.max_pages {
                info!(max_pages = self.max_pages, "Page limit reached");
                break StopReason::PageCeiling;
            }

            let url = self.page_url(page);

            let body = match self.client.get_text(url.as_str()).await {
                Ok(body) => body,
                Err(HarvestError::HttpStatus { status, .. }) => {
                    info!(page, status, "Listing page unavailable, stopping");
                    break StopReason::HttpStatus(status);
                }
                Err(e) => {
                    warn!(page, "Error fetching page: {e}");
                    break StopReason::Transport;
                }
            };
            pages_fetched += 1;

            let listing = match parse_listing_page(&body, page, &url, fallback_year) {
                Ok(listing) => listing,
                Err(e) => {
                    info!(page, "{e}, stopping");
                    break StopReason::MissingContainer;
                }
            };

            let mut page_entries = listing.entries;
            self.fill_locations(&mut page_entries).await;

            info!(page, events = page_entries.len(), "Harvested listing page");
            entries.extend(page_entries);

            if !listing.has_next {
                break StopReason::NoNextPage;
            }
            page += 1;
        };

        info!(
            pages = pages_fetched,
            events = entries.len(),
            stop = %stop,
            "Listing walk finished"
        );

        Harvest {
            entries,
            pages_fetched,
            stop,
        }
    }

    /// Look up venues for entries that link to a detail page but have none.
    async fn fill_locations(&self, entries: &mut [ListingEntry]) {
        let Some(resolver) = &self.resolver else {
            return;
        };

        for entry in entries.iter_mut() {
            if entry.record.location.is_some() {
                continue;
            }
            let Some(url) = entry.record.url.clone() else {
                continue;
            };

            let venue = resolver.resolve(&url).await;
            entry.record.backfill_location(venue);
        }
    }
}
