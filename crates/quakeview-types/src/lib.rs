//! Shared type definitions for the QuakeView workspace.
//!
//! Every crate downstream (filtering, the event store, the geometry
//! pipeline) works with the same immutable [`Event`] record and the
//! [`GeoPoint`] coordinate pair defined here.
//!
//! # Modules
//!
//! - [`event`] -- The seismic [`Event`] record and its passthrough
//!   [`EventMetadata`].
//! - [`geo`] -- Latitude/longitude pairs, unit-sphere projection, and the
//!   Earth radius used to normalize depths.

pub mod event;
pub mod geo;

// Re-export all public types at crate root for convenience.
pub use event::{Event, EventMetadata};
pub use geo::{EARTH_RADIUS_KM, GeoPoint};
