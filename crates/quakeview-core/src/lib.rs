//! Settings, change propagation, and background geometry builds for
//! QuakeView.
//!
//! A settings change on the [`ConfigRegistry`] fires observers; the
//! [`BarPipeline`] reacts by querying the event store and building bar
//! geometry on tokio's blocking pool. Finished artifacts land in a
//! [`CandidateQueue`], and the frame loop's [`BarPresenter`] periodically
//! picks the newest one and hands it to the renderer.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `quakeview-config.yaml` into
//!   strongly-typed structs.
//! - [`registry`] -- [`ConfigRegistry`], typed observable settings slots.
//! - [`geometry`] -- [`GeometryBuilder`] trait and the [`BarBuilder`] that
//!   turns events into triangle-strip prisms.
//! - [`pipeline`] -- [`BarPipeline`] build triggering and the
//!   [`CandidateQueue`].
//! - [`presenter`] -- [`BarPresenter`] frame-driven polling and
//!   [`SceneParent`] handoff.
//! - [`history`] -- [`HistoryPlayer`], day-by-day replay of the catalogue.
//!
//! [`ConfigRegistry`]: registry::ConfigRegistry
//! [`GeometryBuilder`]: geometry::GeometryBuilder
//! [`BarBuilder`]: geometry::BarBuilder
//! [`BarPipeline`]: pipeline::BarPipeline
//! [`CandidateQueue`]: pipeline::CandidateQueue
//! [`BarPresenter`]: presenter::BarPresenter
//! [`SceneParent`]: presenter::SceneParent
//! [`HistoryPlayer`]: history::HistoryPlayer

pub mod config;
pub mod geometry;
pub mod history;
pub mod pipeline;
pub mod presenter;
pub mod registry;
