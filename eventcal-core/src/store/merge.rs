//! Merging a fresh harvest into the stored dataset.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::event::{EventRecord, IdentityKey};

/// Result of [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The full dataset to persist: one record per identity key, sorted.
    pub dataset: Vec<EventRecord>,
    /// Harvested records whose identity key was not stored before, sorted.
    pub added: Vec<EventRecord>,
    /// Number of stored records replaced by a differing harvested record.
    pub updated: usize,
}

/// Merge `harvested` into `stored`.
///
/// A harvested record is new when its identity key is absent from the store.
/// When a key occurs more than once the later occurrence wins, and harvested
/// records come after stored ones, so a fresh harvest replaces the stored
/// record sharing its key. A harvested record without a location keeps the
/// stored location for its key.
pub fn merge(stored: Vec<EventRecord>, harvested: Vec<EventRecord>) -> MergeOutcome {
    let stored_keys: HashSet<IdentityKey> = stored.iter().map(EventRecord::identity_key).collect();

    let stored_len = stored.len();
    let mut dataset = dedup_last_wins(stored);
    let mut index: HashMap<IdentityKey, usize> = dataset
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.identity_key(), idx))
        .collect();

    let mut updated = 0;
    for mut record in harvested {
        let key = record.identity_key();
        match index.get(&key) {
            Some(&idx) => {
                let existing = &mut dataset[idx];
                record.backfill_location(existing.location.clone());
                if *existing != record {
                    if stored_keys.contains(&key) {
                        updated += 1;
                    }
                    *existing = record;
                }
            }
            None => {
                index.insert(key, dataset.len());
                dataset.push(record);
            }
        }
    }

    sort_records(&mut dataset);

    let added: Vec<EventRecord> = dataset
        .iter()
        .filter(|record| !stored_keys.contains(&record.identity_key()))
        .cloned()
        .collect();

    debug!(
        stored = stored_len,
        added = added.len(),
        updated,
        total = dataset.len(),
        "Merged harvest into store"
    );

    MergeOutcome {
        dataset,
        added,
        updated,
    }
}

/// Sort ascending by date, then time, with missing values first. The sort is
/// stable, so records sharing a date and time keep their relative order.
pub fn sort_records(records: &mut [EventRecord]) {
    records.sort_by_key(EventRecord::sort_key);
}

/// Keep one record per identity key; a later record replaces an earlier one
/// in the earlier one's position.
fn dedup_last_wins(records: impl IntoIterator<Item = EventRecord>) -> Vec<EventRecord> {
    let mut out: Vec<EventRecord> = Vec::new();
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    for record in records {
        match index.get(&record.identity_key()) {
            Some(&idx) => out[idx] = record,
            None => {
                index.insert(record.identity_key(), out.len());
                out.push(record);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn event(day: u32, time: Option<(u32, u32)>, title: &str) -> EventRecord {
        EventRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, day),
            time: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            title: Some(title.to_string()),
            url: Some(format!("https://www.aiterhofen.de/events/{}/", title.to_lowercase())),
            location: None,
        }
    }

    fn with_location(mut record: EventRecord, location: &str) -> EventRecord {
        record.location = Some(location.to_string());
        record
    }

    fn is_sorted(records: &[EventRecord]) -> bool {
        records.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key())
    }

    #[test]
    fn test_empty_store_takes_whole_harvest() {
        let harvested = vec![event(24, Some((19, 0)), "Konzert"), event(3, None, "Markt")];

        let outcome = merge(Vec::new(), harvested);
        assert_eq!(outcome.added.len(), 2);
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.dataset[0].title.as_deref(), Some("Markt"));
        assert_eq!(outcome.added, outcome.dataset);
    }

    #[test]
    fn test_known_keys_leave_store_unchanged() {
        let stored = vec![
            event(3, None, "Markt"),
            with_location(event(24, Some((19, 0)), "Konzert"), "Rathausplatz"),
        ];
        let harvested = vec![event(24, Some((19, 0)), "Konzert"), event(3, None, "Markt")];

        let outcome = merge(stored.clone(), harvested);
        assert!(outcome.added.is_empty());
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.dataset, stored);
    }

    #[test]
    fn test_new_key_grows_store_by_one_in_order() {
        let stored = vec![event(3, None, "Markt"), event(24, Some((19, 0)), "Konzert")];
        let harvested = vec![event(24, Some((10, 30)), "Lesung"), event(3, None, "Markt")];

        let outcome = merge(stored, harvested);
        assert_eq!(outcome.dataset.len(), 3);
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.added[0].title.as_deref(), Some("Lesung"));

        let titles: Vec<_> = outcome
            .dataset
            .iter()
            .map(|r| r.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["Markt", "Lesung", "Konzert"]);
    }

    #[test]
    fn test_harvested_location_wins_on_collision() {
        let stored = vec![with_location(event(24, Some((19, 0)), "Konzert"), "Turnhalle")];
        let harvested = vec![with_location(event(24, Some((19, 0)), "Konzert"), "Rathausplatz")];

        let outcome = merge(stored, harvested);
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.dataset[0].location.as_deref(), Some("Rathausplatz"));
        assert_eq!(outcome.updated, 1);
        assert!(outcome.added.is_empty());
    }

    #[test]
    fn test_missing_harvested_location_keeps_stored_one() {
        let stored = vec![with_location(event(24, Some((19, 0)), "Konzert"), "Turnhalle")];
        let mut harvested = event(24, Some((20, 0)), "Konzert");
        harvested.url = Some("https://www.aiterhofen.de/?p=123".to_string());

        let outcome = merge(stored, vec![harvested]);
        assert_eq!(outcome.dataset.len(), 1);
        let merged = &outcome.dataset[0];
        assert_eq!(merged.location.as_deref(), Some("Turnhalle"));
        assert_eq!(merged.time, NaiveTime::from_hms_opt(20, 0, 0));
        assert_eq!(merged.url.as_deref(), Some("https://www.aiterhofen.de/?p=123"));
    }

    #[test]
    fn test_duplicates_within_harvest_collapse() {
        let harvested = vec![
            event(24, Some((19, 0)), "Konzert"),
            with_location(event(24, Some((19, 0)), "Konzert"), "Rathausplatz"),
        ];

        let outcome = merge(vec![event(1, None, "Neujahr")], harvested);
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.added[0].location.as_deref(), Some("Rathausplatz"));
        assert_eq!(outcome.dataset[1].location.as_deref(), Some("Rathausplatz"));
    }

    #[test]
    fn test_added_matches_dataset_when_later_copy_lacks_location() {
        let harvested = vec![
            with_location(event(24, Some((19, 0)), "Konzert"), "Rathausplatz"),
            event(24, Some((19, 0)), "Konzert"),
        ];

        let outcome = merge(Vec::new(), harvested);
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.dataset[0].location.as_deref(), Some("Rathausplatz"));
        assert_eq!(outcome.added, outcome.dataset);
    }

    #[test]
    fn test_stale_duplicates_in_store_collapse() {
        let stored = vec![
            with_location(event(5, None, "Markt"), "Alt"),
            with_location(event(5, None, "Markt"), "Neu"),
        ];

        let outcome = merge(stored, Vec::new());
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.dataset[0].location.as_deref(), Some("Neu"));
    }

    #[test]
    fn test_same_title_different_date_are_distinct() {
        let stored = vec![event(5, None, "Stammtisch")];
        let outcome = merge(stored, vec![event(12, None, "Stammtisch")]);

        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.added.len(), 1);
    }

    #[test]
    fn test_undated_records_sort_first() {
        let mut undated = event(1, None, "Irgendwann");
        undated.date = None;

        let outcome = merge(vec![event(2, Some((9, 0)), "Frühstück")], vec![undated]);
        assert_eq!(outcome.dataset[0].title.as_deref(), Some("Irgendwann"));
        assert!(is_sorted(&outcome.dataset));
    }

    #[test]
    fn test_merge_is_idempotent_and_sorted() {
        let stored = vec![
            event(20, Some((18, 0)), "Theater"),
            event(2, None, "Markt"),
            event(2, Some((8, 0)), "Frühschoppen"),
        ];
        let harvested = vec![
            event(15, Some((14, 0)), "Kinderfest"),
            event(2, None, "Markt"),
            with_location(event(20, Some((18, 0)), "Theater"), "Pfarrsaal"),
        ];

        let first = merge(stored.clone(), harvested.clone());
        let second = merge(stored, harvested.clone());
        assert_eq!(first, second);
        assert!(is_sorted(&first.dataset));

        let again = merge(first.dataset.clone(), harvested);
        assert_eq!(again.dataset, first.dataset);
        assert!(again.added.is_empty());
        assert_eq!(again.updated, 0);
    }
}
