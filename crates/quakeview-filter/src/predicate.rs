//! Single-axis predicates.
//!
//! Every variant answers one question about an [`Event`]. Bounds are
//! inclusive on both ends. An inverted range (low above high) is allowed
//! and simply matches nothing.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use quakeview_types::{Event, GeoPoint};

use crate::error::FilterError;

/// Anything that can accept or reject an event.
///
/// Implemented by [`Predicate`] and [`Composite`](crate::Composite) so the
/// event store can query with either.
pub trait Filter {
    /// Return `true` if the event passes.
    fn evaluate(&self, event: &Event) -> bool;
}

/// Inclusive range on the event origin time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range from explicit timestamps.
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range covering whole calendar years, from January 1 00:00:00 of
    /// `start_year` through December 31 23:59:59 of `end_year`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidYearRange`] if `start_year` is after
    /// `end_year` or either year cannot be represented.
    pub fn years(start_year: i32, end_year: i32) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidYearRange {
            start: start_year,
            end: end_year,
        };
        if start_year > end_year {
            return Err(invalid());
        }
        let start = Utc
            .with_ymd_and_hms(start_year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(invalid)?;
        let end = Utc
            .with_ymd_and_hms(end_year, 12, 31, 23, 59, 59)
            .single()
            .ok_or_else(invalid)?;
        Ok(Self { start, end })
    }

    /// Lower bound.
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Upper bound.
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn contains(&self, event: &Event) -> bool {
        let time = event.time();
        self.start <= time && time <= self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.year(), self.end.year())
    }
}

/// Inclusive range on the event magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeRange {
    low: f64,
    high: f64,
}

impl MagnitudeRange {
    /// Create a magnitude range.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Lower bound.
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound.
    pub const fn high(&self) -> f64 {
        self.high
    }

    fn contains(&self, event: &Event) -> bool {
        let magnitude = event.magnitude();
        self.low <= magnitude && magnitude <= self.high
    }
}

impl fmt::Display for MagnitudeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Planar proximity to a named centre point.
///
/// Distance is the Euclidean norm of the (lat, lon) difference in degrees.
/// This is a coarse approximation rather than a great-circle distance; it is
/// good enough at the resolution of the region presets. When the naive
/// distance exceeds 180 degrees both points are shifted by (180, 360) and
/// wrapped modulo (180, 360) before measuring again, which brings pairs that
/// straddle the antimeridian back together.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationProximity {
    name: String,
    center: GeoPoint,
    radius_degrees: f64,
}

impl LocationProximity {
    /// Create a proximity predicate.
    pub fn new(name: impl Into<String>, center: GeoPoint, radius_degrees: f64) -> Self {
        Self {
            name: name.into(),
            center,
            radius_degrees,
        }
    }

    /// Display name of the region.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Centre point.
    pub const fn center(&self) -> GeoPoint {
        self.center
    }

    /// Acceptance radius in degrees.
    pub const fn radius_degrees(&self) -> f64 {
        self.radius_degrees
    }

    /// Planar distance in degrees between the centre and `point`, with the
    /// wrap-around correction applied.
    pub fn distance_to(&self, point: GeoPoint) -> f64 {
        let direct = planar_distance(self.center, point);
        if direct <= 180.0 {
            return direct;
        }
        planar_distance(wrap(self.center), wrap(point))
    }

    fn contains(&self, event: &Event) -> bool {
        self.distance_to(event.location()) <= self.radius_degrees
    }
}

impl fmt::Display for LocationProximity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} within {} degrees",
            self.name, self.center, self.radius_degrees
        )
    }
}

fn planar_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    (a.lat - b.lat).hypot(a.lon - b.lon)
}

fn wrap(point: GeoPoint) -> GeoPoint {
    GeoPoint::new(
        (point.lat + 180.0).rem_euclid(180.0),
        (point.lon + 360.0).rem_euclid(360.0),
    )
}

/// A single-axis predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Predicate {
    /// Accepts every event.
    #[default]
    PassThrough,
    /// Origin time inside an inclusive range.
    Time(TimeRange),
    /// Magnitude inside an inclusive range.
    Magnitude(MagnitudeRange),
    /// Epicentre within a planar radius of a centre point.
    Location(LocationProximity),
}

impl Predicate {
    /// Shorthand for [`Predicate::Time`].
    pub const fn time(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::Time(TimeRange::new(start, end))
    }

    /// Shorthand for [`Predicate::Magnitude`].
    pub const fn magnitude(low: f64, high: f64) -> Self {
        Self::Magnitude(MagnitudeRange::new(low, high))
    }

    /// Shorthand for [`Predicate::Location`].
    pub fn location(name: impl Into<String>, center: GeoPoint, radius_degrees: f64) -> Self {
        Self::Location(LocationProximity::new(name, center, radius_degrees))
    }

    /// Whether this is [`Predicate::PassThrough`].
    pub const fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }
}

impl Filter for Predicate {
    fn evaluate(&self, event: &Event) -> bool {
        match self {
            Self::PassThrough => true,
            Self::Time(range) => range.contains(event),
            Self::Magnitude(range) => range.contains(event),
            Self::Location(proximity) => proximity.contains(event),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassThrough => f.write_str("Any"),
            Self::Time(range) => range.fmt(f),
            Self::Magnitude(range) => range.fmt(f),
            Self::Location(proximity) => proximity.fmt(f),
        }
    }
}
