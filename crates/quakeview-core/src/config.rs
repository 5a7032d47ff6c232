//! Configuration loading and typed config structures for QuakeView.
//!
//! The canonical configuration lives in `quakeview-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file at
//! all) yields a working setup: the 2010-2014 catalogue window, bar scale 5,
//! depth-driven bar heights, and a poll every 100 frames.

use std::path::{Path, PathBuf};

use quakeview_filter::{Composite, FilterError, Predicate, Region, TimeRange};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level application configuration.
///
/// Mirrors the structure of `quakeview-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Where the event catalogue is read from.
    #[serde(default)]
    pub data: DataConfig,

    /// Initial display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Initial active filter.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Geometry build and polling parameters.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Frame loop timing.
    #[serde(default)]
    pub frame: FrameConfig,

    /// History playback timing.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `QUAKEVIEW_EVENTS` overrides `data.events_path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as a unit value rather than an
        // empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.data.apply_env_overrides();
        Ok(config)
    }
}

/// Event catalogue location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Path to the CSV catalogue.
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,
}

impl DataConfig {
    /// Override the catalogue path with `QUAKEVIEW_EVENTS` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("QUAKEVIEW_EVENTS") {
            self.events_path = PathBuf::from(val);
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
        }
    }
}

/// Initial display settings, copied into the registry at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisplayConfig {
    /// Bar length multiplier.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Camera zoom factor.
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Size bars by magnitude instead of depth.
    #[serde(default)]
    pub show_by_magnitude: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            zoom: default_zoom(),
            show_by_magnitude: false,
        }
    }
}

/// Initial active filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterConfig {
    /// First year of the time window (inclusive).
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last year of the time window (inclusive).
    #[serde(default = "default_end_year")]
    pub end_year: i32,

    /// Named region preset (`japan`, `chile`, ...). Absent means anywhere.
    #[serde(default)]
    pub region: Option<String>,

    /// Inclusive magnitude window as `[low, high]`. Absent means any.
    #[serde(default)]
    pub magnitude: Option<[f64; 2]>,
}

impl FilterConfig {
    /// Build the composite predicate this section describes.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidYearRange`] if the years are inverted
    /// or [`FilterError::UnknownRegion`] for an unrecognised preset.
    pub fn composite(&self) -> Result<Composite, FilterError> {
        let time = Predicate::Time(TimeRange::years(self.start_year, self.end_year)?);
        let location = match &self.region {
            Some(name) => Region::from_name(name)?.predicate(),
            None => Predicate::PassThrough,
        };
        let magnitude = self
            .magnitude
            .map_or(Predicate::PassThrough, |[low, high]| Predicate::magnitude(low, high));
        Ok(Composite::new(location, time, magnitude))
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            region: None,
            magnitude: None,
        }
    }
}

/// Geometry build and polling parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// Frames between candidate-queue inspections.
    #[serde(default = "default_poll_interval_ticks")]
    pub poll_interval_ticks: u32,

    /// Half-width of each bar's square cross-section, in globe radii.
    #[serde(default = "default_bar_thickness")]
    pub bar_thickness: f32,

    /// RGB color of the strongest event in range.
    #[serde(default = "default_high_color")]
    pub high_color: [f32; 3],

    /// RGB color of the weakest event in range.
    #[serde(default = "default_low_color")]
    pub low_color: [f32; 3],

    /// Extra factor applied to the scale when sizing bars by magnitude.
    #[serde(default = "default_magnitude_scale_factor")]
    pub magnitude_scale_factor: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ticks: default_poll_interval_ticks(),
            bar_thickness: default_bar_thickness(),
            high_color: default_high_color(),
            low_color: default_low_color(),
            magnitude_scale_factor: default_magnitude_scale_factor(),
        }
    }
}

/// Frame loop timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrameConfig {
    /// Milliseconds between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// History playback timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds each day stays on screen.
    #[serde(default = "default_day_interval_ms")]
    pub day_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            day_interval_ms: default_day_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_events_path() -> PathBuf {
    PathBuf::from("data/query1950.csv")
}

const fn default_scale() -> f64 {
    5.0
}

const fn default_zoom() -> f64 {
    1.0
}

const fn default_start_year() -> i32 {
    2010
}

const fn default_end_year() -> i32 {
    2014
}

const fn default_poll_interval_ticks() -> u32 {
    100
}

const fn default_bar_thickness() -> f32 {
    0.005
}

const fn default_high_color() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

const fn default_low_color() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

const fn default_magnitude_scale_factor() -> f64 {
    0.1
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_day_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quakeview_filter::Axis;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!((config.display.scale - 5.0).abs() < f64::EPSILON);
        assert!((config.display.zoom - 1.0).abs() < f64::EPSILON);
        assert!(!config.display.show_by_magnitude);
        assert_eq!(config.pipeline.poll_interval_ticks, 100);
        assert_eq!(config.playback.day_interval_ms, 1000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(DataConfig::default().events_path, PathBuf::from("data/query1950.csv"));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
display:
  scale: 2.5
  zoom: 1.5
  show_by_magnitude: true

filter:
  start_year: 2011
  end_year: 2011
  region: "japan"
  magnitude: [6.0, 9.5]

pipeline:
  poll_interval_ticks: 10
  bar_thickness: 0.01
  high_color: [1.0, 1.0, 0.0]
  low_color: [0.0, 0.0, 1.0]
  magnitude_scale_factor: 0.2

frame:
  frame_interval_ms: 33

playback:
  day_interval_ms: 250

logging:
  level: "debug"
"#;

        let config = AppConfig::parse(yaml).unwrap();
        assert!((config.display.scale - 2.5).abs() < f64::EPSILON);
        assert!(config.display.show_by_magnitude);
        assert_eq!(config.filter.region.as_deref(), Some("japan"));
        assert_eq!(config.pipeline.poll_interval_ticks, 10);
        assert_eq!(config.pipeline.low_color, [0.0, 0.0, 1.0]);
        assert_eq!(config.frame.frame_interval_ms, 33);
        assert_eq!(config.playback.day_interval_ms, 250);
        assert_eq!(config.logging.level, "debug");

        let composite = config.filter.composite().unwrap();
        assert!(!composite.filter(Axis::Location).is_pass_through());
        assert_eq!(composite.filter(Axis::Time).to_string(), "2011-2011");
        assert_eq!(composite.filter(Axis::Magnitude).to_string(), "6-9.5");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = AppConfig::parse("display:\n  scale: 7\n").unwrap();
        assert!((config.display.scale - 7.0).abs() < f64::EPSILON);
        // Everything else uses defaults
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = AppConfig::parse("display: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn default_filter_is_the_five_year_window() {
        let composite = FilterConfig::default().composite().unwrap();
        assert!(composite.filter(Axis::Location).is_pass_through());
        assert!(composite.filter(Axis::Magnitude).is_pass_through());
        assert_eq!(composite.filter(Axis::Time).to_string(), "2010-2014");
        assert_eq!(Composite::by_time(composite.filter(Axis::Time).clone()), composite);
    }

    #[test]
    fn bad_filter_section_is_rejected() {
        let inverted = FilterConfig {
            start_year: 2014,
            end_year: 2010,
            ..FilterConfig::default()
        };
        assert!(matches!(
            inverted.composite(),
            Err(FilterError::InvalidYearRange { .. })
        ));

        let unknown = FilterConfig {
            region: Some("atlantis".to_owned()),
            ..FilterConfig::default()
        };
        assert!(matches!(unknown.composite(), Err(FilterError::UnknownRegion(_))));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("quakeview-config.yaml");
        if path.exists() {
            let config = AppConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().filter.composite().is_ok());
        }
    }
}
