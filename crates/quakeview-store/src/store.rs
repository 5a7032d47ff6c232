//! The event catalogue and its query operations.
//!
//! Queries are linear scans in store order with no result caching; the
//! geometry pipeline is the caching layer. The catalogue size in scope does
//! not call for a spatial index.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quakeview_filter::Filter;
use quakeview_types::Event;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::parse::event_from_row;
use crate::playback::Playback;
use crate::stats::EventStats;

/// Read-only, ordered collection of events plus their aggregate extrema.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    stats: Option<EventStats>,
}

impl EventStore {
    /// Build a store from already-parsed events, keeping their order.
    pub fn from_events(events: Vec<Event>) -> Self {
        let stats = EventStats::from_events(&events);
        if let Some(stats) = stats {
            debug!(
                time_min = %stats.time_min,
                time_max = %stats.time_max,
                depth_min = stats.depth_min,
                depth_max = stats.depth_max,
                magnitude_min = stats.magnitude_min,
                magnitude_max = stats.magnitude_max,
                "Catalogue extrema computed"
            );
        }
        Self { events, stats }
    }

    /// Parse tabular rows. The first row is a header and is skipped.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] encountered; nothing is loaded
    /// partially.
    pub fn parse_rows<I, R, S>(rows: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let events = rows
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| event_from_row(idx.saturating_add(1), row.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::loaded(events))
    }

    /// Parse a CSV catalogue. The header row is skipped; quoted fields may
    /// contain commas.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] for unreadable records and the row-level
    /// errors of [`event_from_row`] otherwise.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut events = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            // Row 1 is the header.
            let row = idx.saturating_add(2);
            let record = record.map_err(|source| StoreError::Csv { row, source })?;
            let fields: Vec<&str> = record.iter().collect();
            events.push(event_from_row(row, &fields)?);
        }
        Ok(Self::loaded(events))
    }

    /// Open and parse a CSV catalogue file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened, otherwise as
    /// [`EventStore::from_reader`].
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let store = Self::from_reader(file)?;
        info!(path = %path.display(), events = store.len(), "Event catalogue opened");
        Ok(store)
    }

    fn loaded(events: Vec<Event>) -> Self {
        let store = Self::from_events(events);
        info!(events = store.len(), "Event catalogue loaded");
        store
    }

    /// All events in file order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Aggregate extrema, or `None` for an empty catalogue.
    pub const fn stats(&self) -> Option<EventStats> {
        self.stats
    }

    /// Every event accepted by `filter`, in store order.
    ///
    /// An empty result is a normal outcome, not an error.
    pub fn query_by_predicate<F: Filter + ?Sized>(&self, filter: &F) -> Vec<Event> {
        self.events
            .iter()
            .filter(|event| filter.evaluate(event))
            .cloned()
            .collect()
    }

    /// Every event whose place description contains `needle`
    /// (case-sensitive), in store order.
    pub fn query_by_text(&self, needle: &str) -> Vec<Event> {
        self.events
            .iter()
            .filter(|event| event.place().contains(needle))
            .cloned()
            .collect()
    }

    /// Start a day-by-day walk from the last stored event backwards.
    pub fn init_playback(&self) -> Playback<'_> {
        Playback::new(&self.events)
    }
}
