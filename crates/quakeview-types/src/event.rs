//! The seismic event record.
//!
//! An [`Event`] is immutable once constructed. Its unit-sphere direction
//! and normalized depth are derived in [`Event::new`] and never touched
//! again, so every consumer (filters, geometry builders, playback) sees the
//! same values no matter which thread it runs on.

use chrono::{DateTime, NaiveDate, Utc};
use glam::DVec3;
use serde::Serialize;

use crate::geo::{EARTH_RADIUS_KM, GeoPoint};

/// Passthrough catalogue fields carried alongside each event.
///
/// None of these participate in filtering or geometry; they are kept so
/// query output can show the full catalogue row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMetadata {
    /// Magnitude scale (`mb`, `mw`, `ml`, ...).
    pub magnitude_type: String,
    /// Number of seismic stations used to locate the event.
    pub nst: Option<u32>,
    /// Largest azimuthal gap between stations, in degrees.
    pub gap: Option<f64>,
    /// Horizontal distance to the nearest station, in degrees.
    pub dmin: Option<f64>,
    /// Root-mean-square travel time residual, in seconds.
    pub rms: Option<f64>,
    /// Contributing network identifier.
    pub network: String,
    /// Catalogue identifier.
    pub id: String,
    /// When the catalogue entry was last updated.
    pub updated: DateTime<Utc>,
    /// Human-readable place description (e.g. `"80km E of Hachinohe, Japan"`).
    pub place: String,
    /// Event type (`earthquake`, `explosion`, ...).
    pub event_type: String,
}

/// One seismic record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    time: DateTime<Utc>,
    location: GeoPoint,
    #[serde(skip)]
    direction: DVec3,
    depth: f64,
    magnitude: f64,
    metadata: EventMetadata,
}

impl Event {
    /// Build an event, deriving its unit direction and normalized depth.
    ///
    /// `depth_km` is the hypocentre depth in kilometres; it is stored
    /// divided by [`EARTH_RADIUS_KM`].
    pub fn new(
        time: DateTime<Utc>,
        location: GeoPoint,
        depth_km: f64,
        magnitude: f64,
        metadata: EventMetadata,
    ) -> Self {
        Self {
            time,
            location,
            direction: location.unit_direction(),
            depth: depth_km / EARTH_RADIUS_KM,
            magnitude,
            metadata,
        }
    }

    /// Origin time (UTC, second precision).
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// UTC calendar date of the origin time.
    pub fn date(&self) -> NaiveDate {
        self.time.date_naive()
    }

    /// Epicentre coordinates.
    pub const fn location(&self) -> GeoPoint {
        self.location
    }

    /// Unit-sphere direction of the epicentre.
    pub const fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Depth normalized to the Earth radius.
    pub const fn depth(&self) -> f64 {
        self.depth
    }

    /// Depth in kilometres.
    pub fn depth_km(&self) -> f64 {
        self.depth * EARTH_RADIUS_KM
    }

    /// Event magnitude.
    pub const fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Place description.
    pub fn place(&self) -> &str {
        &self.metadata.place
    }

    /// Passthrough catalogue fields.
    pub const fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
