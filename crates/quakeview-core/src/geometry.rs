//! Bar geometry built from filtered events.
//!
//! Every event becomes a thin square prism standing on the unit sphere at
//! the event's direction and pointing radially outwards. Its length is the
//! event's normalized depth (or magnitude) times the display scale, and its
//! color runs from the low color at the weakest magnitude in range to the
//! high color at the strongest.
//!
//! A prism is emitted as one 14-vertex triangle strip, so a renderer can
//! draw each bar with a single strip call over [`BarMesh::strips`].

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use glam::{DMat4, DQuat, DVec3, Vec3, Vec4};
use quakeview_types::Event;
use serde::Serialize;

use crate::config::PipelineConfig;

/// Vertices per bar.
pub const STRIP_VERTICES: usize = 14;

/// Order in which the eight prism corners are visited by the strip.
///
/// Corners 0-7 are, in bar-local space with half-thickness `t`:
/// `(-t,0,t) (-t,1,t) (t,0,t) (t,1,t) (t,0,-t) (t,1,-t) (-t,0,-t) (-t,1,-t)`.
const STRIP_ORDER: [usize; STRIP_VERTICES] = [0, 1, 6, 7, 4, 5, 2, 3, 0, 1, 7, 5, 3, 1];

/// Errors raised while building geometry.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An event produced a bar length that is NaN or infinite.
    #[error("event {event_id}: bar length {length} is not finite")]
    NonFiniteLength {
        /// Catalogue id of the offending event.
        event_id: String,
        /// The computed length.
        length: f64,
    },

    /// The scale handed to the builder is unusable.
    #[error("invalid bar scale {scale}")]
    InvalidScale {
        /// The rejected scale.
        scale: f64,
    },
}

/// Monotonic build generation. Later-started builds compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renderer-ready bar vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarMesh {
    positions: Vec<Vec3>,
    colors: Vec<Vec4>,
    strips: Vec<Range<usize>>,
}

impl BarMesh {
    fn with_capacity(bars: usize) -> Self {
        let vertices = bars.saturating_mul(STRIP_VERTICES);
        Self {
            positions: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            strips: Vec::with_capacity(bars),
        }
    }

    /// Vertex positions in globe space (unit sphere radius).
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-vertex RGBA colors, parallel to [`BarMesh::positions`].
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// One vertex range per bar, each drawn as a triangle strip.
    pub fn strips(&self) -> &[Range<usize>] {
        &self.strips
    }

    /// Number of bars.
    pub fn bar_count(&self) -> usize {
        self.strips.len()
    }

    /// Whether the mesh holds no bars.
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}

/// A finished build, ready for the candidate queue.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryArtifact {
    id: ArtifactId,
    completed_at: DateTime<Utc>,
    event_count: usize,
    mesh: BarMesh,
}

impl GeometryArtifact {
    /// Assemble an artifact from a finished mesh.
    pub const fn new(
        id: ArtifactId,
        completed_at: DateTime<Utc>,
        event_count: usize,
        mesh: BarMesh,
    ) -> Self {
        Self {
            id,
            completed_at,
            event_count,
            mesh,
        }
    }

    /// Build generation.
    pub const fn id(&self) -> ArtifactId {
        self.id
    }

    /// When the build finished. The presenter shows the candidate with the
    /// latest completion.
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Number of events the artifact was built from.
    pub const fn event_count(&self) -> usize {
        self.event_count
    }

    /// The bar geometry.
    pub const fn mesh(&self) -> &BarMesh {
        &self.mesh
    }
}

/// Settings captured when a build is spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildParams {
    /// Effective length multiplier.
    pub scale: f64,
    /// Size bars by magnitude instead of depth.
    pub show_by_magnitude: bool,
    /// Bottom of the color ramp.
    pub magnitude_min: f64,
    /// Top of the color ramp.
    pub magnitude_max: f64,
}

impl BuildParams {
    /// Position of `magnitude` on the color ramp, in `[0, 1]`.
    ///
    /// A degenerate (empty or inverted) range puts everything at the top.
    pub fn color_weight(&self, magnitude: f64) -> f64 {
        let span = self.magnitude_max - self.magnitude_min;
        if span > 0.0 && span.is_finite() {
            ((magnitude - self.magnitude_min) / span).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Turns a set of events into a [`BarMesh`].
///
/// Implementations run on tokio's blocking pool and must be shareable
/// between concurrent builds. The pipeline wraps the mesh into a
/// [`GeometryArtifact`] once the build returns.
pub trait GeometryBuilder: Send + Sync {
    /// Build bar geometry for `events`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if any bar cannot be produced; a failed build
    /// yields no artifact at all.
    fn build(&self, events: &[Event], params: &BuildParams) -> Result<BarMesh, BuildError>;
}

/// The default builder: one colored square prism per event.
#[derive(Debug, Clone, PartialEq)]
pub struct BarBuilder {
    half_thickness: f64,
    high_color: DVec3,
    low_color: DVec3,
}

impl BarBuilder {
    /// Builder using the bar size and colors from `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            half_thickness: f64::from(config.bar_thickness),
            high_color: Vec3::from_array(config.high_color).as_dvec3(),
            low_color: Vec3::from_array(config.low_color).as_dvec3(),
        }
    }

    fn corners(&self) -> [DVec3; 8] {
        let t = self.half_thickness;
        [
            DVec3::new(-t, 0.0, t),
            DVec3::new(-t, 1.0, t),
            DVec3::new(t, 0.0, t),
            DVec3::new(t, 1.0, t),
            DVec3::new(t, 0.0, -t),
            DVec3::new(t, 1.0, -t),
            DVec3::new(-t, 0.0, -t),
            DVec3::new(-t, 1.0, -t),
        ]
    }

    fn push_bar(
        &self,
        mesh: &mut BarMesh,
        corners: &[DVec3; 8],
        event: &Event,
        length: f64,
        params: &BuildParams,
    ) {
        let direction = event.direction();
        let rotation = DQuat::from_rotation_arc(DVec3::Y, direction);
        let stretch = DVec3::new(1.0, length, 1.0);
        let transform = DMat4::from_scale_rotation_translation(stretch, rotation, direction);
        let color = self
            .low_color
            .lerp(self.high_color, params.color_weight(event.magnitude()))
            .as_vec3()
            .extend(1.0);

        let start = mesh.positions.len();
        for corner in STRIP_ORDER.iter().filter_map(|&idx| corners.get(idx)) {
            mesh.positions.push(transform.transform_point3(*corner).as_vec3());
            mesh.colors.push(color);
        }
        mesh.strips.push(start..mesh.positions.len());
    }
}

impl Default for BarBuilder {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl GeometryBuilder for BarBuilder {
    fn build(&self, events: &[Event], params: &BuildParams) -> Result<BarMesh, BuildError> {
        if !params.scale.is_finite() {
            return Err(BuildError::InvalidScale {
                scale: params.scale,
            });
        }

        let corners = self.corners();
        let mut mesh = BarMesh::with_capacity(events.len());
        for event in events {
            let quantity = if params.show_by_magnitude {
                event.magnitude()
            } else {
                event.depth()
            };
            let length = quantity * params.scale;
            if !length.is_finite() {
                return Err(BuildError::NonFiniteLength {
                    event_id: event.metadata().id.clone(),
                    length,
                });
            }
            self.push_bar(&mut mesh, &corners, event, length, params);
        }

        Ok(mesh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use quakeview_types::{EARTH_RADIUS_KM, EventMetadata, GeoPoint};

    use super::*;

    pub(crate) fn quake(id: &str, lat: f64, lon: f64, depth_km: f64, magnitude: f64) -> Event {
        let time = Utc.with_ymd_and_hms(2011, 3, 11, 5, 46, 24).unwrap();
        Event::new(
            time,
            GeoPoint::new(lat, lon),
            depth_km,
            magnitude,
            EventMetadata {
                magnitude_type: "mw".to_owned(),
                nst: None,
                gap: None,
                dmin: None,
                rms: None,
                network: "us".to_owned(),
                id: id.to_owned(),
                updated: time,
                place: String::new(),
                event_type: "earthquake".to_owned(),
            },
        )
    }

    fn params(show_by_magnitude: bool) -> BuildParams {
        BuildParams {
            scale: 5.0,
            show_by_magnitude,
            magnitude_min: 6.0,
            magnitude_max: 9.0,
        }
    }

    fn build(events: &[Event], params: &BuildParams) -> Result<BarMesh, BuildError> {
        BarBuilder::default().build(events, params)
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn each_event_becomes_one_strip() {
        let events = [quake("a", 0.0, 0.0, 10.0, 6.0), quake("b", 35.0, 135.0, 400.0, 8.0)];
        let mesh = build(&events, &params(false)).unwrap();

        assert_eq!(mesh.bar_count(), 2);
        assert_eq!(mesh.positions().len(), 2 * STRIP_VERTICES);
        assert_eq!(mesh.colors().len(), mesh.positions().len());
        assert_eq!(mesh.strips(), [0..14, 14..28]);
    }

    #[test]
    fn north_pole_bar_stands_straight_up() {
        let mesh = build(&[quake("n", 90.0, 0.0, 637.1, 7.0)], &params(false)).unwrap();
        let positions = mesh.positions();
        // Normalized depth 0.1 times scale 5 gives a bar of length 0.5.
        let t = 0.005;
        assert!(close(positions[0], Vec3::new(-t, 1.0, t)));
        assert!(close(positions[1], Vec3::new(-t, 1.5, t)));
        assert!(close(positions[2], Vec3::new(-t, 1.0, -t)));
    }

    #[test]
    fn south_pole_bar_is_finite_and_points_down() {
        let pole = quake("s", -90.0, 0.0, EARTH_RADIUS_KM, 7.0);
        let mesh = build(&[pole], &params(false)).unwrap();
        let positions = mesh.positions();
        assert!(positions.iter().all(|p| p.is_finite()));
        // Base corner sits just off (0, -1, 0); the top is one scale further out.
        assert!((positions[0].y + 1.0).abs() < 1e-5);
        assert!((positions[1].y + 6.0).abs() < 1e-4);
    }

    #[test]
    fn bars_extrude_along_the_event_direction() {
        let event = quake("eq", 0.0, 90.0, 0.0, 6.0);
        let mesh = build(&[event], &params(true)).unwrap();
        let positions = mesh.positions();
        // Magnitude 6 times scale 5: the far end lies at x = 31.
        let top_centre = (positions[1] + positions[5]) * 0.5;
        assert!(close(top_centre, Vec3::new(31.0, 0.0, 0.0)));
    }

    #[test]
    fn color_ramps_from_low_to_high() {
        let events = [quake("weak", 0.0, 0.0, 10.0, 6.0), quake("strong", 0.0, 0.0, 10.0, 9.0)];
        let mesh = build(&events, &params(false)).unwrap();
        let colors = mesh.colors();
        assert_eq!(colors[0], Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(colors[STRIP_VERTICES], Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn degenerate_magnitude_range_uses_high_color() {
        let flat = BuildParams {
            magnitude_min: 7.0,
            magnitude_max: 7.0,
            ..params(false)
        };
        assert!((flat.color_weight(7.0) - 1.0).abs() < f64::EPSILON);
        assert!((params(false).color_weight(7.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_scale_fails_the_build() {
        let bad = BuildParams {
            scale: f64::NAN,
            ..params(false)
        };
        let err = build(&[quake("a", 0.0, 0.0, 10.0, 6.0)], &bad).unwrap_err();
        assert!(matches!(err, BuildError::InvalidScale { .. }));
    }

    #[test]
    fn overflowing_length_fails_the_build() {
        let huge = BuildParams {
            scale: f64::MAX,
            ..params(true)
        };
        let err = build(&[quake("big", 0.0, 0.0, 10.0, 9.0)], &huge).unwrap_err();
        assert!(matches!(
            err,
            BuildError::NonFiniteLength { ref event_id, .. } if event_id == "big"
        ));
    }

    #[test]
    fn empty_input_builds_empty_mesh() {
        let mesh = build(&[], &params(false)).unwrap();
        assert!(mesh.is_empty());
        assert!(mesh.positions().is_empty());
    }

    #[test]
    fn artifact_reports_its_build() {
        let mesh = build(&[quake("a", 0.0, 0.0, 10.0, 6.0)], &params(false)).unwrap();
        let finished = Utc::now();
        let artifact = GeometryArtifact::new(ArtifactId(4), finished, 1, mesh);
        assert_eq!(artifact.id().to_string(), "#4");
        assert_eq!(artifact.completed_at(), finished);
        assert_eq!(artifact.mesh().bar_count(), artifact.event_count());
    }
}
