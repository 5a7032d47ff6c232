//! Named location presets.
//!
//! These are the regions offered by the location selector. [`Region::World`]
//! clears the location axis back to a pass-through.

use std::fmt;

use quakeview_types::GeoPoint;

use crate::error::FilterError;
use crate::predicate::{LocationProximity, Predicate};

/// A selectable region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// No location restriction.
    World,
    /// Japan, centred at (35, 135), 20 degrees.
    Japan,
    /// Indonesia, centred at (0, 120), 25 degrees.
    Indonesia,
    /// Mexico and Latin America, centred at (20, -100), 25 degrees.
    LatinAmerica,
    /// Chile, centred at (-33, -75), 20 degrees.
    Chile,
    /// West Polynesia, centred at (-19.235, -177.935), 30 degrees.
    WestPolynesia,
}

impl Region {
    /// Every preset, in selector order.
    pub const ALL: [Self; 6] = [
        Self::World,
        Self::Japan,
        Self::Indonesia,
        Self::LatinAmerica,
        Self::Chile,
        Self::WestPolynesia,
    ];

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::World => "World",
            Self::Japan => "Japan",
            Self::Indonesia => "Indonesia",
            Self::LatinAmerica => "Mexico & Latin America",
            Self::Chile => "Chile",
            Self::WestPolynesia => "West Polynesia",
        }
    }

    /// Command-line slug (`latin-america`, `west-polynesia`, ...).
    pub const fn slug(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Japan => "japan",
            Self::Indonesia => "indonesia",
            Self::LatinAmerica => "latin-america",
            Self::Chile => "chile",
            Self::WestPolynesia => "west-polynesia",
        }
    }

    /// Look a region up by slug or display name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownRegion`] if nothing matches.
    pub fn from_name(name: &str) -> Result<Self, FilterError> {
        Self::ALL
            .into_iter()
            .find(|region| {
                region.slug().eq_ignore_ascii_case(name) || region.name().eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| FilterError::UnknownRegion(name.to_owned()))
    }

    /// Centre and radius, or `None` for [`Region::World`].
    pub fn proximity(self) -> Option<LocationProximity> {
        let (center, radius) = match self {
            Self::World => return None,
            Self::Japan => (GeoPoint::new(35.0, 135.0), 20.0),
            Self::Indonesia => (GeoPoint::new(0.0, 120.0), 25.0),
            Self::LatinAmerica => (GeoPoint::new(20.0, -100.0), 25.0),
            Self::Chile => (GeoPoint::new(-33.0, -75.0), 20.0),
            Self::WestPolynesia => (GeoPoint::new(-19.235, -177.935), 30.0),
        };
        Some(LocationProximity::new(self.name(), center, radius))
    }

    /// Predicate for the location axis.
    pub fn predicate(self) -> Predicate {
        self.proximity()
            .map_or(Predicate::PassThrough, Predicate::Location)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::predicate::Filter;
    use crate::predicate::tests::event_at;

    #[test]
    fn lookup_by_slug_and_name() {
        assert_eq!(Region::from_name("japan").unwrap(), Region::Japan);
        assert_eq!(Region::from_name("West-Polynesia").unwrap(), Region::WestPolynesia);
        assert_eq!(Region::from_name("Mexico & Latin America").unwrap(), Region::LatinAmerica);
        assert!(matches!(
            Region::from_name("atlantis"),
            Err(FilterError::UnknownRegion(name)) if name == "atlantis"
        ));
    }

    #[test]
    fn world_clears_location_axis() {
        assert!(Region::World.predicate().is_pass_through());
        assert!(Region::World.proximity().is_none());
    }

    #[test]
    fn presets_accept_their_own_centre() {
        for region in Region::ALL {
            if let Some(proximity) = region.proximity() {
                let center = proximity.center();
                let event = event_at(center.lat, center.lon, 5.0, 2012);
                assert!(region.predicate().evaluate(&event), "{region} rejects its centre");
            }
        }
    }

    #[test]
    fn west_polynesia_reaches_across_dateline() {
        // Tonga trench, east of the antimeridian; Fiji, west of it.
        let pred = Region::WestPolynesia.predicate();
        assert!(pred.evaluate(&event_at(-21.0, -175.0, 6.0, 2009)));
        assert!(pred.evaluate(&event_at(-17.8, 178.0, 6.0, 2009)));
    }
}
