//! Harvesting of the paginated event listing.
//!
//! The walker fetches listing pages one at a time, hands every event block
//! to the extractor under the month heading it appeared beneath and, for
//! blocks without a venue, asks the detail resolver for one.

mod detail;
mod extract;
mod walker;

pub use detail::{DetailResolver, extract_venue};
pub use extract::{ListingEntry, MonthContext, Provenance, extract_record};
pub use walker::{Harvest, ListingPage, ListingWalker, StopReason, parse_listing_page};

use scraper::ElementRef;

/// Text of an element with each fragment trimmed, empty fragments dropped
/// and the rest joined by `separator`.
pub(crate) fn stripped_text(element: ElementRef, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

pub(crate) fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
