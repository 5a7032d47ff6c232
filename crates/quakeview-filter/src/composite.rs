//! Three-slot conjunction of per-axis predicates.

use std::fmt;

use quakeview_types::Event;

use crate::predicate::{Filter, Predicate};

/// The filter axes a [`Composite`] has one slot for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Epicentre proximity.
    Location,
    /// Origin time.
    Time,
    /// Magnitude.
    Magnitude,
}

impl Axis {
    /// All axes in slot order.
    pub const ALL: [Self; 3] = [Self::Location, Self::Time, Self::Magnitude];
}

/// Conjunction of one location, one time and one magnitude predicate.
///
/// A composite is a value: [`Composite::replace`] returns a new composite
/// and leaves the receiver untouched, so a clone handed to a background
/// build keeps its meaning even if the active filter changes meanwhile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composite {
    location: Predicate,
    time: Predicate,
    magnitude: Predicate,
}

impl Composite {
    /// Create a composite from one predicate per axis.
    pub const fn new(location: Predicate, time: Predicate, magnitude: Predicate) -> Self {
        Self {
            location,
            time,
            magnitude,
        }
    }

    /// Filter on time only.
    pub const fn by_time(time: Predicate) -> Self {
        Self::new(Predicate::PassThrough, time, Predicate::PassThrough)
    }

    /// Filter on location only.
    pub const fn by_location(location: Predicate) -> Self {
        Self::new(location, Predicate::PassThrough, Predicate::PassThrough)
    }

    /// Filter on magnitude only.
    pub const fn by_magnitude(magnitude: Predicate) -> Self {
        Self::new(Predicate::PassThrough, Predicate::PassThrough, magnitude)
    }

    /// The predicate in the given slot.
    pub const fn filter(&self, axis: Axis) -> &Predicate {
        match axis {
            Axis::Location => &self.location,
            Axis::Time => &self.time,
            Axis::Magnitude => &self.magnitude,
        }
    }

    /// Return a copy with one slot substituted.
    #[must_use]
    pub fn replace(&self, axis: Axis, predicate: Predicate) -> Self {
        let mut next = self.clone();
        match axis {
            Axis::Location => next.location = predicate,
            Axis::Time => next.time = predicate,
            Axis::Magnitude => next.magnitude = predicate,
        }
        next
    }
}

impl Filter for Composite {
    fn evaluate(&self, event: &Event) -> bool {
        Axis::ALL
            .iter()
            .all(|axis| self.filter(*axis).evaluate(event))
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "location: {}, years: {}, magnitude: {}",
            self.location, self.time, self.magnitude
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quakeview_types::GeoPoint;

    use super::*;
    use crate::predicate::TimeRange;
    use crate::predicate::tests::event_at;

    #[test]
    fn empty_composite_accepts_everything() {
        assert!(Composite::default().evaluate(&event_at(-60.0, 100.0, 2.0, 1975)));
    }

    #[test]
    fn all_slots_must_pass() {
        let composite = Composite::new(
            Predicate::location("Japan", GeoPoint::new(35.0, 135.0), 20.0),
            Predicate::Time(TimeRange::years(2010, 2014).unwrap()),
            Predicate::magnitude(6.0, 9.5),
        );

        assert!(composite.evaluate(&event_at(38.0, 142.0, 9.0, 2011)));
        // Wrong magnitude.
        assert!(!composite.evaluate(&event_at(38.0, 142.0, 5.0, 2011)));
        // Wrong year.
        assert!(!composite.evaluate(&event_at(38.0, 142.0, 9.0, 1995)));
        // Wrong place.
        assert!(!composite.evaluate(&event_at(-33.0, -72.0, 8.8, 2010)));
    }

    #[test]
    fn replace_leaves_original_untouched() {
        let original = Composite::by_time(Predicate::Time(TimeRange::years(2010, 2014).unwrap()));
        let snapshot = original.clone();

        let replaced = original.replace(Axis::Magnitude, Predicate::magnitude(5.0, 9.0));

        assert_eq!(original, snapshot);
        assert!(original.filter(Axis::Magnitude).is_pass_through());
        assert_eq!(replaced.filter(Axis::Magnitude), &Predicate::magnitude(5.0, 9.0));
        assert_eq!(replaced.filter(Axis::Time), original.filter(Axis::Time));
        assert_ne!(replaced, original);
    }

    #[test]
    fn replace_with_same_predicate_is_equal() {
        let original = Composite::by_magnitude(Predicate::magnitude(5.0, 9.0));
        let replaced = original.replace(Axis::Magnitude, Predicate::magnitude(5.0, 9.0));
        assert_eq!(original, replaced);
    }

    #[test]
    fn old_version_keeps_semantics_on_another_thread() {
        let before = Composite::by_magnitude(Predicate::magnitude(5.0, 9.0));
        let captured = before.clone();
        let worker = std::thread::spawn(move || captured.evaluate(&event_at(0.0, 0.0, 6.0, 2000)));

        let after = before.replace(Axis::Magnitude, Predicate::magnitude(8.0, 9.0));
        assert!(!after.evaluate(&event_at(0.0, 0.0, 6.0, 2000)));
        assert!(worker.join().unwrap());
    }

    #[test]
    fn display_lists_each_axis() {
        let composite = Composite::by_magnitude(Predicate::magnitude(5.0, 9.0));
        assert_eq!(composite.to_string(), "location: Any, years: Any, magnitude: 5-9");
    }
}
