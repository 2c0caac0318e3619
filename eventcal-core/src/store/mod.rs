//! The persisted event dataset.
//!
//! Events live in a single CSV file with the columns
//! `date,time,title,url,location`. The file is always rewritten in full,
//! sorted by date and time.

mod merge;

pub use merge::{MergeOutcome, merge, sort_records};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::HarvestResult;
use crate::event::EventRecord;

pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EventStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record. A store that doesn't exist yet is empty.
    /// Rows that can't be read are skipped with a warning.
    pub fn load(&self) -> HarvestResult<Vec<EventRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No event store yet");
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();

        for row in reader.deserialize::<EventRecord>() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %self.path.display(), "Skipping unreadable row: {e}"),
            }
        }

        debug!(path = %self.path.display(), count = records.len(), "Loaded event store");
        Ok(records)
    }

    /// Replace the store's contents with `records`.
    pub fn save(&self, records: &[EventRecord]) -> HarvestResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!(path = %self.path.display(), count = records.len(), "Saved event store");
        Ok(())
    }
}
