//! Frame-driven handoff of finished geometry to the renderer.

use std::sync::Arc;

use tracing::{debug, info};

use crate::geometry::{ArtifactId, GeometryArtifact};
use crate::pipeline::{CandidateQueue, TakeOutcome};

/// The renderer-side owner of displayed geometry.
pub trait SceneParent {
    /// Start displaying `artifact`.
    fn attach(&mut self, artifact: &Arc<GeometryArtifact>);

    /// Stop displaying `artifact`.
    fn detach(&mut self, artifact: &Arc<GeometryArtifact>);
}

/// What a single [`BarPresenter::poll`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not yet time to look at the queue.
    Skipped,
    /// Time to look, but nothing was queued.
    Idle,
    /// A builder held the queue lock; retried on the next frame.
    Deferred,
    /// The displayed geometry was replaced.
    Swapped(ArtifactId),
}

/// Moves the most recently completed build onto the scene, once per poll
/// interval.
///
/// Builds are never cancelled, so a slow build may complete after a faster
/// one that started later. Whichever completed last is shown.
///
/// Owned by the frame loop; [`BarPresenter::poll`] never blocks.
#[derive(Debug)]
pub struct BarPresenter<P> {
    queue: Arc<CandidateQueue>,
    parent: P,
    current: Option<Arc<GeometryArtifact>>,
    tick_count: u32,
    poll_interval: u32,
}

impl<P: SceneParent> BarPresenter<P> {
    /// Presenter draining `queue` into `parent` every `poll_interval`
    /// frames.
    pub const fn new(queue: Arc<CandidateQueue>, parent: P, poll_interval: u32) -> Self {
        Self {
            queue,
            parent,
            current: None,
            tick_count: 0,
            poll_interval,
        }
    }

    /// Call once per frame.
    ///
    /// The tick counter resets only after the queue has actually been
    /// drained, so a contended or empty poll is retried on the very next
    /// frame.
    pub fn poll(&mut self) -> PollOutcome {
        self.tick_count = self.tick_count.saturating_add(1);
        if self.tick_count < self.poll_interval {
            return PollOutcome::Skipped;
        }
        if self.queue.is_empty() {
            return PollOutcome::Idle;
        }

        let candidates = match self.queue.try_take() {
            TakeOutcome::Taken(candidates) => candidates,
            TakeOutcome::Empty => return PollOutcome::Idle,
            TakeOutcome::Contended => {
                debug!("Candidate queue busy, deferring");
                return PollOutcome::Deferred;
            }
        };
        self.tick_count = 0;

        let taken = candidates.len();
        // Equal completion times go to the later push.
        let Some(newest) = candidates.into_iter().max_by_key(GeometryArtifact::completed_at) else {
            return PollOutcome::Idle;
        };
        let id = newest.id();
        if taken > 1 {
            debug!(kept = %id, dropped = taken.saturating_sub(1), "Superseded candidates dropped");
        }

        let newest = Arc::new(newest);
        if let Some(previous) = self.current.take() {
            self.parent.detach(&previous);
        }
        self.parent.attach(&newest);
        info!(
            generation = %id,
            bars = newest.mesh().bar_count(),
            "Bar geometry swapped"
        );
        self.current = Some(newest);
        PollOutcome::Swapped(id)
    }

    /// The artifact on display, if any.
    pub const fn current(&self) -> Option<&Arc<GeometryArtifact>> {
        self.current.as_ref()
    }

    /// The scene the presenter attaches to.
    pub const fn parent(&self) -> &P {
        &self.parent
    }

    /// Frames counted since the last drain.
    pub const fn tick_count(&self) -> u32 {
        self.tick_count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::geometry::BarMesh;

    #[derive(Debug, Default)]
    struct Recorder {
        log: Vec<(&'static str, ArtifactId)>,
    }

    impl SceneParent for Recorder {
        fn attach(&mut self, artifact: &Arc<GeometryArtifact>) {
            self.log.push(("attach", artifact.id()));
        }

        fn detach(&mut self, artifact: &Arc<GeometryArtifact>) {
            self.log.push(("detach", artifact.id()));
        }
    }

    fn artifact(generation: u64) -> GeometryArtifact {
        GeometryArtifact::new(ArtifactId(generation), Utc::now(), 0, BarMesh::default())
    }

    fn finished_at(generation: u64, millis: i64) -> GeometryArtifact {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        GeometryArtifact::new(
            ArtifactId(generation),
            base + Duration::milliseconds(millis),
            0,
            BarMesh::default(),
        )
    }

    fn presenter(poll_interval: u32) -> (Arc<CandidateQueue>, BarPresenter<Recorder>) {
        let queue = Arc::new(CandidateQueue::new());
        let presenter = BarPresenter::new(Arc::clone(&queue), Recorder::default(), poll_interval);
        (queue, presenter)
    }

    #[test]
    fn polls_only_every_interval() {
        let (queue, mut presenter) = presenter(100);
        queue.push(artifact(1));
        for _ in 1..100 {
            assert_eq!(presenter.poll(), PollOutcome::Skipped);
        }
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(1)));
        assert_eq!(presenter.tick_count(), 0);
    }

    #[test]
    fn empty_queue_keeps_counter_primed() {
        let (queue, mut presenter) = presenter(3);
        for _ in 0..5 {
            presenter.poll();
        }
        assert_eq!(presenter.poll(), PollOutcome::Idle);
        queue.push(artifact(1));
        // No second wait of three frames.
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(1)));
    }

    #[test]
    fn latest_completion_wins_and_old_one_is_detached() {
        let (queue, mut presenter) = presenter(1);
        queue.push(finished_at(1, 0));
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(1)));

        queue.push(finished_at(3, 10));
        queue.push(finished_at(4, 30));
        queue.push(finished_at(2, 20));
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(4)));
        assert!(queue.is_empty());
        assert_eq!(
            presenter.parent().log,
            [
                ("attach", ArtifactId(1)),
                ("detach", ArtifactId(1)),
                ("attach", ArtifactId(4)),
            ]
        );
    }

    #[test]
    fn slow_older_build_replaces_faster_newer_one() {
        let (queue, mut presenter) = presenter(1);
        // Generation 2 started later but finished first.
        queue.push(finished_at(2, 10));
        queue.push(finished_at(1, 50));
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(1)));

        // Displayed generation does not block a later completion either.
        queue.push(finished_at(5, 60));
        presenter.poll();
        queue.push(finished_at(3, 70));
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(3)));
        assert_eq!(presenter.current().unwrap().id(), ArtifactId(3));
    }

    #[test]
    fn equal_completion_times_go_to_later_push() {
        let (queue, mut presenter) = presenter(1);
        queue.push(finished_at(7, 5));
        queue.push(finished_at(6, 5));
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(6)));
    }

    #[test]
    fn contended_queue_defers_without_resetting() {
        let (queue, mut presenter) = presenter(1);
        queue.push(artifact(1));
        {
            let _guard = queue.candidates.lock().unwrap();
            assert_eq!(presenter.poll(), PollOutcome::Deferred);
        }
        assert_eq!(presenter.poll(), PollOutcome::Swapped(ArtifactId(1)));
    }
}
