//! Day-by-day replay of the catalogue.
//!
//! The player walks the store from the newest day backwards. For every day
//! it centres the view on the day's events, submits them to the pipeline as
//! a build of their own, and waits one day interval before moving on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use quakeview_store::EventStore;
use quakeview_types::{Event, GeoPoint};
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

use crate::pipeline::BarPipeline;
use crate::registry::{ConfigRegistry, ViewLocation};

/// Totals reported when playback ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    /// Days played.
    pub days: usize,
    /// Events across all played days.
    pub events: usize,
}

/// Replays the catalogue one day at a time.
#[derive(Debug)]
pub struct HistoryPlayer {
    store: Arc<EventStore>,
    registry: Arc<ConfigRegistry>,
    pipeline: Arc<BarPipeline>,
    day_interval: Duration,
}

impl HistoryPlayer {
    /// Player that shows each day for `day_interval`.
    pub const fn new(
        store: Arc<EventStore>,
        registry: Arc<ConfigRegistry>,
        pipeline: Arc<BarPipeline>,
        day_interval: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            pipeline,
            day_interval,
        }
    }

    /// Start playback on the current tokio runtime.
    ///
    /// Scale and show-by-magnitude are captured now and used for every day.
    pub fn spawn(self) -> HistoryHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(self.run(Arc::clone(&stop)));
        HistoryHandle { stop, task }
    }

    async fn run(self, stop: Arc<AtomicBool>) -> HistorySummary {
        let params = self.pipeline.capture_params();
        let mut playback = self.store.init_playback();
        let mut summary = HistorySummary::default();
        info!(events = self.store.len(), "History playback started");

        while !stop.load(Ordering::Acquire) {
            let batch = playback.next_day_batch();
            let Some(day) = batch.first().map(Event::date) else {
                break;
            };
            let Some(centre) = mean_location(&batch) else {
                break;
            };
            let count = batch.len();

            self.registry.set::<ViewLocation>(centre);
            let generation = self.pipeline.submit(batch, params);
            summary.days = summary.days.saturating_add(1);
            summary.events = summary.events.saturating_add(count);
            info!(%day, events = count, %centre, %generation, "Playing back day");

            tokio::time::sleep(self.day_interval).await;
        }

        info!(days = summary.days, events = summary.events, "History playback finished");
        summary
    }
}

/// Planar mean of the events' latitudes and longitudes.
pub fn mean_location(events: &[Event]) -> Option<GeoPoint> {
    if events.is_empty() {
        return None;
    }
    let (lat, lon, count) = events.iter().fold((0.0, 0.0, 0.0), |(lat, lon, count), event| {
        let location = event.location();
        (lat + location.lat, lon + location.lon, count + 1.0)
    });
    Some(GeoPoint::new(lat / count, lon / count))
}

/// Control over a running playback.
#[derive(Debug)]
pub struct HistoryHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<HistorySummary>,
}

impl HistoryHandle {
    /// Ask playback to stop after the current day.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Whether playback has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for playback to end.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the playback task panicked or was
    /// cancelled.
    pub async fn join(self) -> Result<HistorySummary, JoinError> {
        self.task.await
    }
}
