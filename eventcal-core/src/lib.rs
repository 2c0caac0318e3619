//! Core pipeline for eventcal.
//!
//! - `listing` walks the paginated event listing and turns event blocks into records
//! - `date_text` parses the listing's German date/time fragments
//! - `store` persists records as CSV and merges fresh harvests into them
//! - `ics` serializes the stored records into an .ics calendar
//! - `pipeline` wires the stages together for a single run

pub mod config;
pub mod constants;
pub mod date_text;
pub mod error;
pub mod event;
pub mod http;
pub mod ics;
pub mod listing;
pub mod pipeline;
pub mod store;

pub use error::{HarvestError, HarvestResult};
pub use event::{EventRecord, IdentityKey};
