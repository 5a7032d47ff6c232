//! In-memory seismic event catalogue for QuakeView.
//!
//! The [`EventStore`] is built once at startup from a CSV catalogue and is
//! read-only afterwards, so it can be shared behind an `Arc` by any number
//! of background geometry builds without locking.
//!
//! # Modules
//!
//! - [`error`] -- [`StoreError`], raised when the catalogue cannot be loaded.
//! - [`parse`] -- Row and timestamp parsing into typed events.
//! - [`stats`] -- Aggregate extrema computed at load time.
//! - [`store`] -- The [`EventStore`] and its query operations.
//! - [`playback`] -- Day-by-day [`Playback`] cursor over the catalogue.

pub mod error;
pub mod parse;
pub mod playback;
pub mod stats;
pub mod store;

pub use error::StoreError;
pub use playback::Playback;
pub use stats::EventStats;
pub use store::EventStore;
