//! Background geometry builds triggered by settings changes.
//!
//! Whenever the scale, the active filter, or the show-by-magnitude flag
//! changes, the [`BarPipeline`] captures the current settings, assigns the
//! next build generation and spawns a build on tokio's blocking pool. Builds
//! are never cancelled; several may be in flight at once and may finish in
//! any order. Each finished mesh is stamped with its completion time and
//! pushed to the [`CandidateQueue`]; the presenter later keeps only the most
//! recently completed candidate.
//!
//! The queue mutex is held only for a push or a swap-and-clear. The
//! presenter side never blocks on it: it uses `try_lock` and an atomic
//! pending count to skip the lock entirely when nothing is waiting.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use chrono::Utc;
use quakeview_filter::Composite;
use quakeview_store::EventStore;
use quakeview_types::Event;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::geometry::{ArtifactId, BuildParams, GeometryArtifact, GeometryBuilder};
use crate::registry::{
    ActiveFilter, ConfigKey, ConfigRegistry, MagnitudeMax, MagnitudeMin, Scale, ShowByMagnitude,
};

/// Result of trying to take the queued candidates.
#[derive(Debug)]
pub enum TakeOutcome {
    /// Nothing was queued.
    Empty,
    /// A builder held the lock; try again on a later frame.
    Contended,
    /// Every queued candidate, oldest push first. The queue is now empty.
    Taken(Vec<GeometryArtifact>),
}

/// Finished artifacts waiting for the presenter.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    pub(crate) candidates: Mutex<Vec<GeometryArtifact>>,
    pending: AtomicUsize,
}

impl CandidateQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished artifact.
    pub fn push(&self, artifact: GeometryArtifact) {
        let mut candidates = self
            .candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        candidates.push(artifact);
        self.pending.store(candidates.len(), Ordering::Release);
    }

    /// Number of queued artifacts, read without locking.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Whether nothing is queued, read without locking.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every queued artifact without blocking.
    pub fn try_take(&self) -> TakeOutcome {
        let mut candidates = match self.candidates.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return TakeOutcome::Contended,
        };
        if candidates.is_empty() {
            return TakeOutcome::Empty;
        }
        let taken = mem::take(&mut *candidates);
        self.pending.store(0, Ordering::Release);
        TakeOutcome::Taken(taken)
    }
}

/// Coarse pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// No build running and nothing queued.
    Idle,
    /// At least one build is running and nothing is queued yet.
    Building,
    /// At least one artifact awaits the presenter.
    CandidateReady,
}

/// What a build works on.
enum BuildSource {
    /// Query the store with this filter when the build runs.
    Query(Composite),
    /// Use these events as they are.
    Events(Vec<Event>),
}

/// Rebuilds bar geometry whenever a geometry-relevant setting changes.
pub struct BarPipeline {
    store: Arc<EventStore>,
    registry: Arc<ConfigRegistry>,
    builder: Arc<dyn GeometryBuilder>,
    queue: Arc<CandidateQueue>,
    runtime: Handle,
    next_generation: AtomicU64,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
    magnitude_scale_factor: f64,
}

impl std::fmt::Debug for BarPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarPipeline")
            .field("events", &self.store.len())
            .field("queued", &self.queue.len())
            .field("next_generation", &self.next_generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl BarPipeline {
    /// Create a pipeline. Nothing is built until [`BarPipeline::start`].
    ///
    /// Builds are spawned on `runtime`'s blocking pool, so triggers may fire
    /// from any thread.
    pub fn new(
        store: Arc<EventStore>,
        registry: Arc<ConfigRegistry>,
        builder: Arc<dyn GeometryBuilder>,
        config: &PipelineConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            registry,
            builder,
            queue: Arc::new(CandidateQueue::new()),
            runtime,
            next_generation: AtomicU64::new(1),
            in_flight: Mutex::new(Vec::new()),
            magnitude_scale_factor: config.magnitude_scale_factor,
        }
    }

    /// Watch the geometry-relevant settings and run the initial build.
    ///
    /// The registry observers hold only a weak reference, so dropping the
    /// last `Arc` to the pipeline silences them.
    pub fn start(self: &Arc<Self>) -> ArtifactId {
        self.watch::<Scale>();
        self.watch::<ActiveFilter>();
        self.watch::<ShowByMagnitude>();
        info!(events = self.store.len(), "Bar pipeline started");
        self.trigger()
    }

    fn watch<K: ConfigKey>(self: &Arc<Self>) {
        let pipeline = Arc::downgrade(self);
        self.registry.add_callback::<K, _>(move |_| {
            if let Some(pipeline) = pipeline.upgrade() {
                debug!(key = K::NAME, "Rebuild triggered");
                pipeline.trigger();
            }
        });
    }

    /// Spawn a build of the active filter with the current settings.
    pub fn trigger(&self) -> ArtifactId {
        let filter = self.registry.get::<ActiveFilter>();
        let params = self.capture_params();
        self.spawn_build(BuildSource::Query(filter), params)
    }

    /// Spawn a build of exactly `events` with `params`.
    pub fn submit(&self, events: Vec<Event>, params: BuildParams) -> ArtifactId {
        self.spawn_build(BuildSource::Events(events), params)
    }

    /// Snapshot the build settings from the registry.
    ///
    /// When sizing by magnitude the scale is divided by the largest
    /// magnitude and multiplied by the configured factor.
    pub fn capture_params(&self) -> BuildParams {
        let scale = self.registry.get::<Scale>();
        let show_by_magnitude = self.registry.get::<ShowByMagnitude>();
        let magnitude_min = self.registry.get::<MagnitudeMin>();
        let magnitude_max = self.registry.get::<MagnitudeMax>();

        let scale = if show_by_magnitude && magnitude_max > 0.0 {
            scale / magnitude_max * self.magnitude_scale_factor
        } else {
            if show_by_magnitude {
                warn!(magnitude_max, "Non-positive magnitude ceiling, scale left unnormalized");
            }
            scale
        };

        BuildParams {
            scale,
            show_by_magnitude,
            magnitude_min,
            magnitude_max,
        }
    }

    fn spawn_build(&self, source: BuildSource, params: BuildParams) -> ArtifactId {
        let id = ArtifactId(self.next_generation.fetch_add(1, Ordering::Relaxed));
        let store = Arc::clone(&self.store);
        let builder = Arc::clone(&self.builder);
        let queue = Arc::clone(&self.queue);
        debug!(generation = %id, scale = params.scale, "Spawning geometry build");

        let handle = self.runtime.spawn_blocking(move || {
            let events = match source {
                BuildSource::Query(filter) => store.query_by_predicate(&filter),
                BuildSource::Events(events) => events,
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| builder.build(&events, &params)));
            match result {
                Ok(Ok(mesh)) => {
                    debug!(generation = %id, events = events.len(), "Geometry build finished");
                    queue.push(GeometryArtifact::new(id, Utc::now(), events.len(), mesh));
                }
                Ok(Err(err)) => {
                    warn!(generation = %id, error = %err, "Geometry build failed");
                }
                Err(_) => {
                    warn!(generation = %id, "Geometry build panicked");
                }
            }
        });
        self.track(handle);
        id
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);
    }

    /// The queue finished artifacts are pushed to.
    pub fn queue(&self) -> Arc<CandidateQueue> {
        Arc::clone(&self.queue)
    }

    /// Number of builds still running.
    pub fn in_flight(&self) -> usize {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.len()
    }

    /// Current coarse state.
    pub fn status(&self) -> PipelineStatus {
        if !self.queue.is_empty() {
            return PipelineStatus::CandidateReady;
        }
        if self.in_flight() > 0 {
            PipelineStatus::Building
        } else {
            PipelineStatus::Idle
        }
    }

    /// Wait for every spawned build, including ones spawned while waiting.
    ///
    /// Returns how many builds were awaited.
    pub async fn join_builds(&self) -> usize {
        let mut joined = 0_usize;
        loop {
            let handles = mem::take(
                &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if handles.is_empty() {
                return joined;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "Geometry build task did not complete");
                }
                joined = joined.saturating_add(1);
            }
        }
    }
}
