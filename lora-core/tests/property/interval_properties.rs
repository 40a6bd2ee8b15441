//! Property tests for the interval algebra.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use lora_core::models::{Interval, TimeBound};

fn instant(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_500_000_000 + secs, 0).unwrap()
}

fn bound() -> impl Strategy<Value = TimeBound> {
    prop_oneof![
        1 => Just(TimeBound::NegInfinity),
        1 => Just(TimeBound::PosInfinity),
        6 => (0i64..1_000).prop_map(|s| TimeBound::At(instant(s))),
    ]
}

fn interval() -> impl Strategy<Value = Interval> {
    (bound(), bound())
        .prop_filter("from < to", |(a, b)| a != b)
        .prop_map(|(a, b)| if a < b { Interval::new(a, b) } else { Interval::new(b, a) })
        .prop_map(|r| r.unwrap())
}

proptest! {
    #[test]
    fn overlaps_is_reflexive(a in interval()) {
        prop_assert!(a.overlaps(&a));
    }

    #[test]
    fn intersect_is_commutative(a in interval(), b in interval()) {
        prop_assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    #[test]
    fn intersect_agrees_with_overlaps(a in interval(), b in interval()) {
        prop_assert_eq!(a.intersect(&b).is_some(), a.overlaps(&b));
    }

    #[test]
    fn subtract_leaves_nothing_overlapping(a in interval(), b in interval()) {
        for piece in a.subtract(&b) {
            prop_assert!(!piece.overlaps(&b));
            prop_assert!(a.covers(&piece));
        }
    }

    #[test]
    fn subtract_plus_intersection_rebuilds(a in interval(), b in interval()) {
        let mut pieces = a.subtract(&b);
        if let Some(common) = a.intersect(&b) {
            pieces.push(common);
        }
        pieces.sort_by_key(|p| p.from());
        let rebuilt = pieces
            .iter()
            .skip(1)
            .try_fold(pieces[0], |acc, p| acc.merge(p));
        prop_assert_eq!(rebuilt, Some(a));
    }

    #[test]
    fn adjacency_is_symmetric(a in interval(), b in interval()) {
        prop_assert_eq!(a.is_adjacent(&b), b.is_adjacent(&a));
    }

    #[test]
    fn contains_matches_half_open_bounds(a in interval(), s in 0i64..1_000) {
        let t = instant(s);
        let expected = a.from() <= TimeBound::At(t) && TimeBound::At(t) < a.to();
        prop_assert_eq!(a.contains(t), expected);
    }
}
