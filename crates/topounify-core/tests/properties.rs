//! Property tests: random topologies built from copies of a few distinct
//! polylines, laid out forward or reversed in the buffer and traversed in
//! either direction.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use topounify_core::{Arc, ArcAlias, ArcId, Topology, unify};

/// One occurrence of a base polyline in the topology.
#[derive(Debug, Clone, Copy)]
struct Occurrence {
    base: usize,
    /// Points are written to the buffer last-to-first.
    stored_reversed: bool,
    /// The arc walks its range from the high index to the low one.
    backward: bool,
}

impl Occurrence {
    /// Whether the arc reads the base polyline last-to-first.
    const fn reads_reversed(self) -> bool {
        self.stored_reversed != self.backward
    }
}

/// Point `j` of base polyline `b`. Every point is unique across all bases.
#[allow(clippy::cast_precision_loss)]
fn base_point(b: usize, j: usize) -> (f64, f64) {
    (b as f64 * 100.0 + j as f64, (j * j) as f64)
}

fn build(lengths: &[usize], copies: &[Occurrence]) -> Topology {
    let mut coordinates = Vec::new();
    let mut arcs = Vec::new();
    for copy in copies {
        let len = lengths[copy.base];
        let first = coordinates.len() / 2;
        let order: Vec<usize> = if copy.stored_reversed {
            (0..len).rev().collect()
        } else {
            (0..len).collect()
        };
        for j in order {
            let (x, y) = base_point(copy.base, j);
            coordinates.push(x);
            coordinates.push(y);
        }
        let last = first + len - 1;
        arcs.push(if copy.backward {
            Arc::new(last, first)
        } else {
            Arc::new(first, last)
        });
    }
    Topology::new(coordinates, arcs)
}

fn scenario() -> impl Strategy<Value = (Vec<usize>, Vec<Occurrence>)> {
    prop::collection::vec(2_usize..6, 1..5).prop_flat_map(|lengths| {
        let base_count = lengths.len();
        let copy = (0..base_count, any::<bool>(), any::<bool>()).prop_map(
            |(base, stored_reversed, backward)| Occurrence {
                base,
                stored_reversed,
                backward,
            },
        );
        (Just(lengths), prop::collection::vec(copy, 1..12))
    })
}

proptest! {
    #[test]
    fn copies_collapse_onto_first_occurrence((lengths, copies) in scenario()) {
        let mut topology = build(&lengths, &copies);
        let original = topology.clone();
        let unification = unify(&mut topology).unwrap();

        for (k, copy) in copies.iter().enumerate() {
            let first = copies.iter().position(|c| c.base == copy.base).unwrap();
            let expected = if first == k {
                ArcAlias::Canonical
            } else if copies[first].reads_reversed() == copy.reads_reversed() {
                ArcAlias::Forward(ArcId(first))
            } else {
                ArcAlias::Reversed(ArcId(first))
            };
            prop_assert_eq!(unification.alias(ArcId(k)), Some(expected));

            let canonical = original.arcs[first];
            let range = topology.arcs[k];
            match expected {
                ArcAlias::Canonical => prop_assert_eq!(range, original.arcs[k]),
                ArcAlias::Forward(_) => prop_assert_eq!(range, canonical),
                ArcAlias::Reversed(_) => prop_assert_eq!(range, canonical.reversed()),
            }
        }
    }

    #[test]
    fn unified_arcs_are_never_degenerate((lengths, copies) in scenario()) {
        let mut topology = build(&lengths, &copies);
        unify(&mut topology).unwrap();
        for arc in &topology.arcs {
            let s = arc.start * 2;
            let e = arc.end * 2;
            prop_assert!(
                topology.coordinates[s] != topology.coordinates[e]
                    || topology.coordinates[s + 1] != topology.coordinates[e + 1]
            );
        }
    }

    #[test]
    fn second_pass_changes_nothing((lengths, copies) in scenario()) {
        let mut topology = build(&lengths, &copies);
        let first = unify(&mut topology).unwrap();
        let once = topology.clone();
        let second = unify(&mut topology).unwrap();
        prop_assert_eq!(&topology, &once);
        prop_assert_eq!(first.canonical_count(), second.canonical_count());
    }

    #[test]
    fn coordinates_are_never_touched((lengths, copies) in scenario()) {
        let mut topology = build(&lengths, &copies);
        let coordinates = topology.coordinates.clone();
        unify(&mut topology).unwrap();
        prop_assert_eq!(topology.coordinates, coordinates);
    }
}
