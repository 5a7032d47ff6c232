//! Scene parent used when no window is attached.
//!
//! Keeps the displayed artifact alive exactly as a renderer would and logs
//! every swap, which is all a headless run needs.

use std::sync::Arc;

use quakeview_core::geometry::{ArtifactId, GeometryArtifact};
use quakeview_core::presenter::SceneParent;
use tracing::{debug, info};

/// Holds whatever bar geometry is on display.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    displayed: Option<Arc<GeometryArtifact>>,
    swaps: usize,
}

impl HeadlessScene {
    /// Generation on display, if any.
    pub fn displayed(&self) -> Option<ArtifactId> {
        self.displayed.as_ref().map(|artifact| artifact.id())
    }

    /// Number of bars on display.
    pub fn bars(&self) -> usize {
        self.displayed
            .as_ref()
            .map_or(0, |artifact| artifact.mesh().bar_count())
    }

    /// How many artifacts have been attached so far.
    pub const fn swaps(&self) -> usize {
        self.swaps
    }
}

impl SceneParent for HeadlessScene {
    fn attach(&mut self, artifact: &Arc<GeometryArtifact>) {
        self.swaps = self.swaps.saturating_add(1);
        info!(
            generation = %artifact.id(),
            events = artifact.event_count(),
            bars = artifact.mesh().bar_count(),
            vertices = artifact.mesh().positions().len(),
            "Scene showing bars"
        );
        self.displayed = Some(Arc::clone(artifact));
    }

    fn detach(&mut self, artifact: &Arc<GeometryArtifact>) {
        debug!(generation = %artifact.id(), "Scene released bars");
        if self.displayed() == Some(artifact.id()) {
            self.displayed = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use quakeview_core::geometry::BarMesh;

    use super::*;

    fn artifact(generation: u64) -> Arc<GeometryArtifact> {
        Arc::new(GeometryArtifact::new(
            ArtifactId(generation),
            Utc::now(),
            0,
            BarMesh::default(),
        ))
    }

    #[test]
    fn swap_replaces_displayed_generation() {
        let mut scene = HeadlessScene::default();
        let first = artifact(1);
        let second = artifact(2);

        scene.attach(&first);
        scene.detach(&first);
        scene.attach(&second);

        assert_eq!(scene.displayed(), Some(ArtifactId(2)));
        assert_eq!(scene.swaps(), 2);
        assert_eq!(scene.bars(), 0);
    }

    #[test]
    fn detaching_something_else_keeps_display() {
        let mut scene = HeadlessScene::default();
        scene.attach(&artifact(3));
        scene.detach(&artifact(1));
        assert_eq!(scene.displayed(), Some(ArtifactId(3)));
    }
}
