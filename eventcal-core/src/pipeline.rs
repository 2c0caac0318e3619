//! One eventcal run: harvest, merge, store, export.

use tracing::info;

use crate::config::HarvestConfig;
use crate::error::HarvestResult;
use crate::http::HttpClient;
use crate::ics::write_calendar;
use crate::listing::{ListingWalker, StopReason};
use crate::store::{EventStore, MergeOutcome, merge};

/// Counts reported after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub stop: StopReason,
    pub harvested: usize,
    pub added: usize,
    pub updated: usize,
    pub total: usize,
    /// Events in the full calendar, None if no calendar was written.
    pub calendar_events: Option<usize>,
    /// Events in the new-events calendar, None if it was not written.
    pub new_calendar_events: Option<usize>,
}

pub struct Pipeline {
    config: HarvestConfig,
    store: EventStore,
}

impl Pipeline {
    pub fn new(config: HarvestConfig) -> Self {
        let store = EventStore::new(config.store_path.clone());
        Pipeline { config, store }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Walk the listing, merge the result into the store and write both
    /// calendars.
    pub async fn run(&self) -> HarvestResult<RunSummary> {
        let (mut summary, outcome) = self.harvest_and_merge().await?;

        summary.calendar_events = Some(write_calendar(
            &self.config.calendar_path,
            &outcome.dataset,
            &self.config.prodid,
        )?);

        if let Some(path) = &self.config.new_events_calendar_path {
            if outcome.added.is_empty() {
                info!("No new events, leaving {} untouched", path.display());
            } else {
                summary.new_calendar_events =
                    Some(write_calendar(path, &outcome.added, &self.config.prodid)?);
            }
        }

        info!(
            calendar = %self.config.calendar_path.display(),
            events = summary.calendar_events,
            "Calendar written"
        );
        Ok(summary)
    }

    /// Walk the listing and merge the result into the store, without
    /// touching any calendar.
    pub async fn harvest(&self) -> HarvestResult<RunSummary> {
        let (summary, _) = self.harvest_and_merge().await?;
        Ok(summary)
    }

    /// Write the full calendar from the store alone. Returns the number of
    /// events written.
    pub fn export(&self) -> HarvestResult<usize> {
        let records = self.store.load()?;
        let count = write_calendar(&self.config.calendar_path, &records, &self.config.prodid)?;

        info!(
            calendar = %self.config.calendar_path.display(),
            events = count,
            "Calendar written"
        );
        Ok(count)
    }

    async fn harvest_and_merge(&self) -> HarvestResult<(RunSummary, MergeOutcome)> {
        let client = HttpClient::from_config(&self.config)?;
        let walker = ListingWalker::new(client, &self.config)?;

        let harvest = walker.walk().await;
        let harvested: Vec<_> = harvest.entries.into_iter().map(|e| e.record).collect();
        let harvested_count = harvested.len();

        let stored = self.store.load()?;
        let outcome = merge(stored, harvested);
        self.store.save(&outcome.dataset)?;

        info!(
            store = %self.store.path().display(),
            harvested = harvested_count,
            added = outcome.added.len(),
            updated = outcome.updated,
            total = outcome.dataset.len(),
            "Event store updated"
        );

        let summary = RunSummary {
            pages_fetched: harvest.pages_fetched,
            stop: harvest.stop,
            harvested: harvested_count,
            added: outcome.added.len(),
            updated: outcome.updated,
            total: outcome.dataset.len(),
            calendar_events: None,
            new_calendar_events: None,
        };

        Ok((summary, outcome))
    }
}
