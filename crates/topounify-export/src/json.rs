//! Shared-arc JSON export.
//!
//! Each canonical arc is written once as a list of `[x, y]` positions, in
//! the order the canonical arcs first appear in the input. Every input arc
//! is then expressed as a reference into that list: `i` when it follows
//! canonical arc `i` forward, or `!i` (that is, `-i - 1`) when it follows
//! it in reverse. This is the arc-reference convention TopoJSON uses for
//! geometry rings.
//!
//! ```json
//! {
//!   "arcs": [[[1, 0], [1, 1]], [[1, 1], [0, 1], [0, 0], [1, 0]]],
//!   "references": [0, 1, -1]
//! }
//! ```
//!
//! This is a pure function with no I/O -- it returns data or a `String`.

use serde::{Deserialize, Serialize};
use topounify_core::points::Points;
use topounify_core::{ArcAlias, Topology, Unification};

use crate::ExportError;

/// A topology with every shared boundary stored once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedArcs {
    /// Positions of each canonical arc, in traversal order.
    pub arcs: Vec<Vec<[f64; 2]>>,
    /// One reference per input arc: `i` for canonical arc `i` forward,
    /// `!i` for canonical arc `i` reversed.
    pub references: Vec<i64>,
}

impl SharedArcs {
    /// Number of positions stored across all canonical arcs.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.arcs.iter().map(Vec::len).sum()
    }
}

/// Build the shared-arc form of a unified topology.
///
/// `topology` should be the arcs as they were before unification or after;
/// only canonical arcs are read, and unification never changes those.
///
/// # Errors
///
/// Returns [`ExportError::ArcCountMismatch`] if `unification` was produced
/// for a different number of arcs, or [`ExportError::Topology`] if the
/// topology references points outside its buffer.
pub fn to_shared_arcs(
    topology: &Topology,
    unification: &Unification,
) -> Result<SharedArcs, ExportError> {
    if unification.len() != topology.arcs.len() {
        return Err(ExportError::ArcCountMismatch {
            unified: unification.len(),
            arcs: topology.arcs.len(),
        });
    }
    let points = Points::try_from(topology)?;

    // Canonical arcs always precede their aliases, so a single pass can
    // assign slots and resolve references.
    let mut slots = vec![0_i64; topology.arcs.len()];
    let mut arcs = Vec::with_capacity(unification.canonical_count());
    let mut references = Vec::with_capacity(topology.arcs.len());

    for (id, alias) in unification.iter() {
        let reference = match alias {
            ArcAlias::Canonical => {
                let slot = i64::try_from(arcs.len()).unwrap_or(i64::MAX);
                arcs.push(
                    points
                        .along(topology.arcs[id.index()])
                        .map(|p| [p.x, p.y])
                        .collect(),
                );
                slots[id.index()] = slot;
                slot
            }
            ArcAlias::Forward(c) => slots[c.index()],
            ArcAlias::Reversed(c) => !slots[c.index()],
        };
        references.push(reference);
    }

    Ok(SharedArcs { arcs, references })
}

/// Split a reference into its canonical arc index and whether it is
/// traversed in reverse.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn split_reference(reference: i64) -> (u64, bool) {
    if reference < 0 {
        (!reference as u64, true)
    } else {
        (reference as u64, false)
    }
}

/// Serialize a [`SharedArcs`] document.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails (for example on a
/// non-finite coordinate).
pub fn to_json(shared: &SharedArcs, pretty: bool) -> Result<String, ExportError> {
    let json = if pretty {
        serde_json::to_string_pretty(shared)?
    } else {
        serde_json::to_string(shared)?
    };
    Ok(json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use topounify_core::{Arc, unify};

    use super::*;

    /// Triangle edge (0,0)-(1,0)-(1,1) stored once, then referenced backward.
    fn reversed_pair() -> (Topology, Unification) {
        let mut topology = Topology::new(
            vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            vec![Arc::new(0, 2), Arc::new(2, 0)],
        );
        let unification = unify(&mut topology).unwrap();
        (topology, unification)
    }

    #[test]
    fn reversed_alias_uses_complement() {
        let (topology, unification) = reversed_pair();
        let shared = to_shared_arcs(&topology, &unification).unwrap();
        assert_eq!(shared.arcs, vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]);
        assert_eq!(shared.references, vec![0, -1]);
        assert_eq!(shared.position_count(), 3);
    }

    #[test]
    fn canonical_slots_skip_aliases() {
        // Arc 1 duplicates arc 0; arc 2 is new and gets slot 1.
        let mut topology = Topology::new(
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 6.0, 6.0],
            vec![Arc::new(0, 1), Arc::new(2, 3), Arc::new(4, 5)],
        );
        let unification = unify(&mut topology).unwrap();
        let shared = to_shared_arcs(&topology, &unification).unwrap();
        assert_eq!(shared.references, vec![0, 0, 1]);
        assert_eq!(shared.arcs.len(), 2);
        assert_eq!(shared.arcs[1], vec![[5.0, 5.0], [6.0, 6.0]]);
    }

    #[test]
    fn backward_canonical_arc_is_written_in_traversal_order() {
        let mut topology = Topology::new(vec![0.0, 0.0, 1.0, 0.0], vec![Arc::new(1, 0)]);
        let unification = unify(&mut topology).unwrap();
        let shared = to_shared_arcs(&topology, &unification).unwrap();
        assert_eq!(shared.arcs, vec![vec![[1.0, 0.0], [0.0, 0.0]]]);
    }

    #[test]
    fn mismatched_unification_is_rejected() {
        let (mut topology, unification) = reversed_pair();
        topology.arcs.pop();
        assert!(matches!(
            to_shared_arcs(&topology, &unification),
            Err(ExportError::ArcCountMismatch {
                unified: 2,
                arcs: 1
            }),
        ));
    }

    #[test]
    fn deserialized_unification_exports_like_a_fresh_one() {
        let (topology, unification) = reversed_pair();
        let json = serde_json::to_string(&unification).unwrap();
        let loaded: Unification = serde_json::from_str(&json).unwrap();
        assert_eq!(
            to_shared_arcs(&topology, &loaded).unwrap(),
            to_shared_arcs(&topology, &unification).unwrap(),
        );
    }

    #[test]
    fn dangling_alias_never_reaches_the_exporter() {
        // One arc aliasing arc 7 is refused when the document is loaded.
        let loaded = serde_json::from_str::<Unification>(r#"{"aliases":[{"Forward":7}]}"#);
        assert!(loaded.is_err());
    }

    #[test]
    fn split_reference_decodes_both_directions() {
        assert_eq!(split_reference(0), (0, false));
        assert_eq!(split_reference(3), (3, false));
        assert_eq!(split_reference(-1), (0, true));
        assert_eq!(split_reference(!4), (4, true));
    }

    #[test]
    fn to_json_compact_shape() {
        let (topology, unification) = reversed_pair();
        let shared = to_shared_arcs(&topology, &unification).unwrap();
        let json = to_json(&shared, false).unwrap();
        assert_eq!(
            json,
            r#"{"arcs":[[[0.0,0.0],[1.0,0.0],[1.0,1.0]]],"references":[0,-1]}"#,
        );
        let back: SharedArcs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shared);
    }

    #[test]
    fn to_json_pretty_is_multiline() {
        let (topology, unification) = reversed_pair();
        let shared = to_shared_arcs(&topology, &unification).unwrap();
        assert!(to_json(&shared, true).unwrap().contains('\n'));
    }
}
