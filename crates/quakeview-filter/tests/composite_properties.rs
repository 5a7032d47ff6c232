//! Randomized checks of composite filter semantics.
//!
//! Events and predicates are drawn from a seeded RNG so failures reproduce.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]

use chrono::{DateTime, TimeZone, Utc};
use quakeview_filter::{Axis, Composite, Filter, Predicate, Region, TimeRange};
use quakeview_types::{Event, EventMetadata, GeoPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_time(rng: &mut StdRng) -> DateTime<Utc> {
    Utc.timestamp_opt(rng.random_range(0..1_600_000_000), 0).unwrap()
}

fn random_event(rng: &mut StdRng) -> Event {
    let time = random_time(rng);
    Event::new(
        time,
        GeoPoint::new(rng.random_range(-90.0..90.0), rng.random_range(-180.0..180.0)),
        rng.random_range(0.0..700.0),
        rng.random_range(2.0..9.5),
        EventMetadata {
            magnitude_type: "mww".to_owned(),
            nst: None,
            gap: None,
            dmin: None,
            rms: None,
            network: "us".to_owned(),
            id: format!("ev{}", time.timestamp()),
            updated: time,
            place: "somewhere".to_owned(),
            event_type: "earthquake".to_owned(),
        },
    )
}

fn random_predicate(rng: &mut StdRng, axis: Axis) -> Predicate {
    if rng.random_bool(0.25) {
        return Predicate::PassThrough;
    }
    match axis {
        Axis::Location => {
            let region = Region::ALL[rng.random_range(0..Region::ALL.len())];
            region.predicate()
        }
        Axis::Time => {
            let a = random_time(rng);
            let b = random_time(rng);
            Predicate::Time(TimeRange::new(a.min(b), a.max(b)))
        }
        Axis::Magnitude => {
            let low = rng.random_range(2.0..9.0);
            Predicate::magnitude(low, low + rng.random_range(0.0..3.0))
        }
    }
}

fn random_composite(rng: &mut StdRng) -> Composite {
    Composite::new(
        random_predicate(rng, Axis::Location),
        random_predicate(rng, Axis::Time),
        random_predicate(rng, Axis::Magnitude),
    )
}

#[test]
fn composite_is_conjunction_of_slots() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let composite = random_composite(&mut rng);
        for _ in 0..20 {
            let event = random_event(&mut rng);
            let expected = Axis::ALL
                .into_iter()
                .all(|axis| composite.filter(axis).evaluate(&event));
            assert_eq!(composite.evaluate(&event), expected, "{composite} on {event:?}");
        }
    }
}

#[test]
fn replace_touches_only_its_axis() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let original = random_composite(&mut rng);
        let snapshot = original.clone();
        let axis = Axis::ALL[rng.random_range(0..Axis::ALL.len())];
        let predicate = random_predicate(&mut rng, axis);

        let replaced = original.replace(axis, predicate.clone());

        assert_eq!(original, snapshot);
        assert_eq!(replaced.filter(axis), &predicate);
        for other in Axis::ALL.into_iter().filter(|other| *other != axis) {
            assert_eq!(replaced.filter(other), original.filter(other));
        }
    }
}

#[test]
fn every_region_contains_its_centre() {
    for region in Region::ALL {
        let Some(proximity) = region.proximity() else {
            assert_eq!(region, Region::World);
            continue;
        };
        let mut rng = StdRng::seed_from_u64(3);
        let base = random_event(&mut rng);
        let event = Event::new(
            base.time(),
            proximity.center(),
            base.depth_km(),
            base.magnitude(),
            base.metadata().clone(),
        );
        assert!(region.predicate().evaluate(&event), "{region}");
        assert_eq!(Region::from_name(region.slug()).unwrap(), region);
    }
}

#[test]
fn world_region_accepts_everything() {
    let mut rng = StdRng::seed_from_u64(5);
    let composite = Composite::by_location(Region::World.predicate());
    assert!((0..500).all(|_| composite.evaluate(&random_event(&mut rng))));
}
