//! Composable boolean predicates over seismic events.
//!
//! Filters are small immutable values. A [`Composite`] holds one
//! [`Predicate`] per [`Axis`] (location, time, magnitude) and is replaced,
//! never mutated, when the user changes one axis. A background query that
//! captured the previous composite therefore keeps evaluating exactly what
//! it started with.
//!
//! # Modules
//!
//! - [`predicate`] -- The [`Predicate`] variants and the [`Filter`] trait.
//! - [`composite`] -- The three-slot [`Composite`] conjunction.
//! - [`region`] -- Named [`Region`] presets for the location axis.
//! - [`error`] -- Errors raised while constructing filters.

pub mod composite;
pub mod error;
pub mod predicate;
pub mod region;

pub use composite::{Axis, Composite};
pub use error::FilterError;
pub use predicate::{Filter, LocationProximity, MagnitudeRange, Predicate, TimeRange};
pub use region::Region;
