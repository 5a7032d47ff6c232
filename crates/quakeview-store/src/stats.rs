//! Aggregate extrema over the loaded catalogue.

use chrono::{DateTime, Utc};
use quakeview_types::Event;

/// Minimum and maximum time, depth and magnitude across all events.
///
/// Computed once when the store is built. Depths are in the normalized
/// unit used by [`Event::depth`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventStats {
    /// Earliest origin time.
    pub time_min: DateTime<Utc>,
    /// Latest origin time.
    pub time_max: DateTime<Utc>,
    /// Shallowest normalized depth.
    pub depth_min: f64,
    /// Deepest normalized depth.
    pub depth_max: f64,
    /// Smallest magnitude.
    pub magnitude_min: f64,
    /// Largest magnitude.
    pub magnitude_max: f64,
}

impl EventStats {
    /// Compute extrema in one pass. Returns `None` for an empty slice.
    ///
    /// Every extremum is seeded from the first event, so no sentinel value
    /// can leak into the result.
    pub fn from_events(events: &[Event]) -> Option<Self> {
        let (first, rest) = events.split_first()?;
        let seed = Self {
            time_min: first.time(),
            time_max: first.time(),
            depth_min: first.depth(),
            depth_max: first.depth(),
            magnitude_min: first.magnitude(),
            magnitude_max: first.magnitude(),
        };
        Some(rest.iter().fold(seed, |acc, event| Self {
            time_min: acc.time_min.min(event.time()),
            time_max: acc.time_max.max(event.time()),
            depth_min: acc.depth_min.min(event.depth()),
            depth_max: acc.depth_max.max(event.depth()),
            magnitude_min: acc.magnitude_min.min(event.magnitude()),
            magnitude_max: acc.magnitude_max.max(event.magnitude()),
        }))
    }
}
