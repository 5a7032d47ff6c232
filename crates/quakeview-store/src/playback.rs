//! Day-by-day walk over the catalogue, newest day first.

use chrono::NaiveDate;
use quakeview_types::Event;

/// Cursor that yields the catalogue one UTC calendar day at a time,
/// walking backwards from the last stored event.
///
/// The cursor borrows the store; restarting playback means asking the
/// store for a fresh cursor. With a time-ascending catalogue the batches
/// partition the events, each batch holds a single date, and dates strictly
/// decrease from one batch to the next.
#[derive(Debug, Clone)]
pub struct Playback<'a> {
    events: &'a [Event],
    /// Events not yet handed out; the next one is `events[remaining - 1]`.
    remaining: usize,
    current_day: Option<NaiveDate>,
}

impl<'a> Playback<'a> {
    pub(crate) fn new(events: &'a [Event]) -> Self {
        Self {
            events,
            remaining: events.len(),
            current_day: events.last().map(Event::date),
        }
    }

    /// Collect every consecutive event (walking backwards) whose date is
    /// the current day.
    ///
    /// The first event with a different date becomes the new current day
    /// and is left for the next call. Returns an empty batch once the
    /// catalogue is exhausted.
    pub fn next_day_batch(&mut self) -> Vec<Event> {
        let mut batch = Vec::new();
        while let Some(idx) = self.remaining.checked_sub(1) {
            let Some(event) = self.events.get(idx) else {
                break;
            };
            let date = event.date();
            if self.current_day != Some(date) {
                self.current_day = Some(date);
                break;
            }
            batch.push(event.clone());
            self.remaining = idx;
        }
        batch
    }

    /// The day the next batch will cover, or `None` for an empty catalogue.
    pub const fn current_day(&self) -> Option<NaiveDate> {
        self.current_day
    }

    /// Number of events not yet returned.
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether every event has been returned.
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for Playback<'_> {
    type Item = Vec<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.next_day_batch();
        if batch.is_empty() { None } else { Some(batch) }
    }
}
