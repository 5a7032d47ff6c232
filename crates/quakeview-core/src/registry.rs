//! Typed, observable application settings.
//!
//! The [`ConfigRegistry`] holds a fixed set of slots, one per setting. Each
//! slot is addressed by a zero-sized marker type implementing
//! [`ConfigKey`], so the value type of every setting is checked at compile
//! time:
//!
//! ```ignore
//! registry.set::<Scale>(7.5);
//! let filter = registry.get::<ActiveFilter>();
//! ```
//!
//! Writing a value that differs from the current one notifies the slot's
//! observers synchronously, in registration order, on the writing thread.
//! No lock is held while observers run, so an observer may freely read or
//! write other settings (or the same one).

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use quakeview_filter::{Composite, FilterError, TimeRange};
use quakeview_store::EventStats;
use quakeview_types::{EARTH_RADIUS_KM, GeoPoint};
use tracing::debug;

use crate::config::AppConfig;

/// Observer invoked with the new value after a setting changes.
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// One setting: its current value and the observers watching it.
pub struct Slot<T> {
    value: RwLock<T>,
    observers: Mutex<Vec<Observer<T>>>,
}

impl<T> Slot<T> {
    fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
            observers: Mutex::new(Vec::new()),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Slot")
            .field("value", &*self.value.read().unwrap_or_else(PoisonError::into_inner))
            .field("observers", &observers)
            .finish()
    }
}

/// A setting stored in the [`ConfigRegistry`].
pub trait ConfigKey: 'static {
    /// Type of the stored value.
    type Value: Clone + PartialEq + Send + Sync + 'static;

    /// Name used in logs.
    const NAME: &'static str;

    /// Locate this setting's slot.
    fn slot(registry: &ConfigRegistry) -> &Slot<Self::Value>;
}

/// Generates a marker type and its [`ConfigKey`] implementation.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident: $value:ty => $field:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;

        impl ConfigKey for $name {
            type Value = $value;
            const NAME: &'static str = stringify!($name);

            fn slot(registry: &ConfigRegistry) -> &Slot<Self::Value> {
                &registry.$field
            }
        }
    };
}

define_key! {
    /// Bar length multiplier.
    Scale: f64 => scale
}

define_key! {
    /// Camera zoom factor.
    Zoom: f64 => zoom
}

define_key! {
    /// The filter applied to the catalogue before building geometry.
    ActiveFilter: Composite => active_filter
}

define_key! {
    /// Size bars by magnitude instead of depth.
    ShowByMagnitude: bool => show_by_magnitude
}

define_key! {
    /// Deepest event, in normalized depth units.
    DepthMax: f64 => depth_max
}

define_key! {
    /// Shallowest event, in normalized depth units.
    DepthMin: f64 => depth_min
}

define_key! {
    /// Largest magnitude; top of the color ramp.
    MagnitudeMax: f64 => magnitude_max
}

define_key! {
    /// Smallest magnitude; bottom of the color ramp.
    MagnitudeMin: f64 => magnitude_min
}

define_key! {
    /// Latest event time.
    TimeMax: DateTime<Utc> => time_max
}

define_key! {
    /// Earliest event time.
    TimeMin: DateTime<Utc> => time_min
}

define_key! {
    /// Point on the globe the view is centred on.
    ViewLocation: GeoPoint => view_location
}

/// Depth ceiling used before a catalogue is loaded.
const DEFAULT_DEPTH_MAX_KM: f64 = 500.0;
/// Magnitude ceiling used before a catalogue is loaded.
const DEFAULT_MAGNITUDE_MAX: f64 = 9.0;
/// Magnitude floor used before a catalogue is loaded.
const DEFAULT_MAGNITUDE_MIN: f64 = 6.0;

/// The application's settings table.
///
/// Built explicitly at startup and shared behind an `Arc`; there is no
/// global instance.
#[derive(Debug)]
pub struct ConfigRegistry {
    scale: Slot<f64>,
    zoom: Slot<f64>,
    active_filter: Slot<Composite>,
    show_by_magnitude: Slot<bool>,
    depth_max: Slot<f64>,
    depth_min: Slot<f64>,
    magnitude_max: Slot<f64>,
    magnitude_min: Slot<f64>,
    time_max: Slot<DateTime<Utc>>,
    time_min: Slot<DateTime<Utc>>,
    view_location: Slot<GeoPoint>,
}

impl ConfigRegistry {
    /// Build the table from configuration.
    ///
    /// Display settings and the active filter come from `config`. The time
    /// extrema start as the configured year window and the remaining
    /// extrema use fixed defaults until [`ConfigRegistry::seed_extrema`]
    /// replaces them with values from the loaded catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the configured filter is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, FilterError> {
        let window = TimeRange::years(config.filter.start_year, config.filter.end_year)?;
        Ok(Self {
            scale: Slot::new(config.display.scale),
            zoom: Slot::new(config.display.zoom),
            active_filter: Slot::new(config.filter.composite()?),
            show_by_magnitude: Slot::new(config.display.show_by_magnitude),
            depth_max: Slot::new(DEFAULT_DEPTH_MAX_KM / EARTH_RADIUS_KM),
            depth_min: Slot::new(0.0),
            magnitude_max: Slot::new(DEFAULT_MAGNITUDE_MAX),
            magnitude_min: Slot::new(DEFAULT_MAGNITUDE_MIN),
            time_max: Slot::new(window.end()),
            time_min: Slot::new(window.start()),
            view_location: Slot::new(GeoPoint::default()),
        })
    }

    /// Current value of setting `K`.
    pub fn get<K: ConfigKey>(&self) -> K::Value {
        K::slot(self)
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store `value` under `K` and notify observers.
    ///
    /// Returns `false` without notifying anyone when `value` equals the
    /// current value.
    pub fn set<K: ConfigKey>(&self, value: K::Value) -> bool {
        let slot = K::slot(self);
        {
            let mut current = slot.value.write().unwrap_or_else(PoisonError::into_inner);
            if *current == value {
                return false;
            }
            current.clone_from(&value);
        }

        let observers = slot
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        debug!(key = K::NAME, observers = observers.len(), "Setting changed");
        for observer in &observers {
            observer(&value);
        }
        true
    }

    /// Register `observer` to run after every change to `K`.
    pub fn add_callback<K, F>(&self, observer: F)
    where
        K: ConfigKey,
        F: Fn(&K::Value) + Send + Sync + 'static,
    {
        K::slot(self)
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    /// Replace all six extrema with values measured from the catalogue.
    pub fn seed_extrema(&self, stats: &EventStats) {
        self.set::<TimeMin>(stats.time_min);
        self.set::<TimeMax>(stats.time_max);
        self.set::<DepthMin>(stats.depth_min);
        self.set::<DepthMax>(stats.depth_max);
        self.set::<MagnitudeMin>(stats.magnitude_min);
        self.set::<MagnitudeMax>(stats.magnitude_max);
        debug!(
            magnitude_min = stats.magnitude_min,
            magnitude_max = stats.magnitude_max,
            "Extrema seeded from catalogue"
        );
    }
}
