//! Arc unification: redirect every arc that exactly coincides with an
//! earlier arc onto that earlier arc's index range.
//!
//! Arcs are processed strictly in input order, and the first arc of each
//! coincidence class survives. For each arc:
//!
//! 1. Reject it if its start and end points are equal.
//! 2. Look up the arcs already registered at its start point.
//! 3. For each candidate, scan forward, then backward. A full match
//!    aliases the arc to the candidate (provided both have the same number
//!    of points); a match of more than one point that stops short is a
//!    partial overlap and aborts the pass.
//! 4. If nothing matched, register the arc at both of its endpoints.
//!
//! Merged arcs are never registered, so every candidate is itself
//! canonical and its index range never changes during the pass. That lets
//! the pass run against an immutable topology and write the redirected
//! ranges back only once every arc has been accepted.

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointIndex;
use crate::points::Points;
use crate::scan::{Coincidence, follow_backward, follow_forward};
use crate::types::{Arc, ArcId, Topology, UnifyConfig, UnifyError};

/// How an arc relates to the canonical arcs after unification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcAlias {
    /// The arc is the survivor of its coincidence class.
    Canonical,
    /// The arc traverses the given canonical arc in the same direction.
    Forward(ArcId),
    /// The arc traverses the given canonical arc in the opposite direction.
    Reversed(ArcId),
}

/// Outcome of a successful unification pass: one [`ArcAlias`] per input
/// arc.
///
/// Every alias points at an earlier arc that is itself canonical.
/// Deserialization checks this and rejects documents that break it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UnificationDocument")]
pub struct Unification {
    aliases: Vec<ArcAlias>,
}

/// A deserialized alias that does not name an earlier canonical arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("arc {arc} aliases arc {target}, which is not an earlier canonical arc")]
pub struct InvalidAlias {
    /// Position of the offending arc.
    pub arc: usize,
    /// The arc it claims to alias.
    pub target: usize,
}

/// Unchecked serialized form of [`Unification`].
#[derive(Deserialize)]
struct UnificationDocument {
    aliases: Vec<ArcAlias>,
}

impl TryFrom<UnificationDocument> for Unification {
    type Error = InvalidAlias;

    fn try_from(document: UnificationDocument) -> Result<Self, Self::Error> {
        let aliases = document.aliases;
        for (arc, alias) in aliases.iter().enumerate() {
            let (ArcAlias::Forward(target) | ArcAlias::Reversed(target)) = *alias else {
                continue;
            };
            let canonical = target.0 < arc && aliases[target.0] == ArcAlias::Canonical;
            if !canonical {
                return Err(InvalidAlias {
                    arc,
                    target: target.0,
                });
            }
        }
        Ok(Self { aliases })
    }
}

impl Unification {
    /// Number of arcs covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns `true` if the topology had no arcs.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// How arc `id` was resolved, or `None` if it is out of range.
    #[must_use]
    pub fn alias(&self, id: ArcId) -> Option<ArcAlias> {
        self.aliases.get(id.0).copied()
    }

    /// The canonical arc that `id` resolves to (itself when canonical).
    #[must_use]
    pub fn canonical(&self, id: ArcId) -> Option<ArcId> {
        self.alias(id).map(|alias| match alias {
            ArcAlias::Canonical => id,
            ArcAlias::Forward(c) | ArcAlias::Reversed(c) => c,
        })
    }

    /// Returns `true` if `id` was redirected onto an earlier arc.
    #[must_use]
    pub fn is_merged(&self, id: ArcId) -> bool {
        matches!(
            self.alias(id),
            Some(ArcAlias::Forward(_) | ArcAlias::Reversed(_))
        )
    }

    /// Canonical arcs, in input order.
    pub fn canonical_ids(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.iter()
            .filter(|(_, alias)| *alias == ArcAlias::Canonical)
            .map(|(id, _)| id)
    }

    /// Number of canonical arcs.
    #[must_use]
    pub fn canonical_count(&self) -> usize {
        self.canonical_ids().count()
    }

    /// Number of arcs redirected onto an earlier arc.
    #[must_use]
    pub fn merged_count(&self) -> usize {
        self.len() - self.canonical_count()
    }

    /// Number of arcs redirected onto an earlier arc in reverse.
    #[must_use]
    pub fn reversed_count(&self) -> usize {
        self.aliases
            .iter()
            .filter(|alias| matches!(alias, ArcAlias::Reversed(_)))
            .count()
    }

    /// Every arc with its alias, in input order.
    pub fn iter(&self) -> impl Iterator<Item = (ArcId, ArcAlias)> + '_ {
        self.aliases
            .iter()
            .enumerate()
            .map(|(i, alias)| (ArcId(i), *alias))
    }

    /// Write the redirected ranges into `arcs`.
    ///
    /// Canonical arcs keep their range; aliases copy their canonical arc's
    /// range, swapped for reversed aliases.
    fn apply(&self, arcs: &mut [Arc]) {
        for (i, alias) in self.aliases.iter().enumerate() {
            arcs[i] = match *alias {
                ArcAlias::Canonical => continue,
                ArcAlias::Forward(c) => arcs[c.0],
                ArcAlias::Reversed(c) => arcs[c.0].reversed(),
            };
        }
    }
}

/// Counters gathered while unifying, consumed by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ScanStats {
    /// Candidate arcs examined across all lookups.
    pub candidates_examined: usize,
    /// Forward plus backward scans performed.
    pub scans: usize,
    /// Distinct endpoints in the index at the end of the pass.
    pub endpoint_count: usize,
    /// Slot count of the endpoint table at the end of the pass.
    pub endpoint_capacity: usize,
    /// Longest candidate list.
    pub max_candidates: usize,
}

/// Unify `topology` with the default configuration.
///
/// Duplicate arcs are rewritten in place to reference their canonical arc's
/// range; the returned [`Unification`] records which arc each one aliases.
///
/// # Errors
///
/// Returns the first [`UnifyError`] encountered. On error the topology is
/// left unchanged.
pub fn unify(topology: &mut Topology) -> Result<Unification, UnifyError> {
    unify_with_config(topology, &UnifyConfig::default())
}

/// Unify `topology` with an explicit configuration.
///
/// # Errors
///
/// See [`unify`].
pub fn unify_with_config(
    topology: &mut Topology,
    config: &UnifyConfig,
) -> Result<Unification, UnifyError> {
    let (unification, _) = resolve(topology, config)?;
    unification.apply(&mut topology.arcs);
    Ok(unification)
}

/// Run the full pass and apply it, also returning scan counters.
pub(crate) fn unify_with_stats(
    topology: &mut Topology,
    config: &UnifyConfig,
) -> Result<(Unification, ScanStats), UnifyError> {
    let (unification, stats) = resolve(topology, config)?;
    unification.apply(&mut topology.arcs);
    Ok((unification, stats))
}

/// Decide an alias for every arc without modifying the topology.
fn resolve(
    topology: &Topology,
    config: &UnifyConfig,
) -> Result<(Unification, ScanStats), UnifyError> {
    let points = Points::try_from(topology)?;
    let arcs = &topology.arcs;
    let mut index = EndpointIndex::with_capacity_hint(config.endpoint_capacity_for(arcs.len()));
    let mut stats = ScanStats::default();
    let mut aliases = Vec::with_capacity(arcs.len());

    for (i, &arc) in arcs.iter().enumerate() {
        let id = ArcId(i);
        let start = points.get(arc.start);
        let end = points.get(arc.end);
        if start == end {
            return Err(UnifyError::DegenerateArc {
                arc: i,
                start: arc.start,
                end: arc.end,
                point: start,
            });
        }

        let alias = find_alias(&points, arcs, id, index.candidates(start), &mut stats)?;
        if alias == ArcAlias::Canonical {
            index.register(start, id);
            index.register(end, id);
        }
        aliases.push(alias);
    }

    stats.endpoint_count = index.endpoint_count();
    stats.endpoint_capacity = index.capacity();
    stats.max_candidates = index.max_candidates();
    Ok((Unification { aliases }, stats))
}

/// Scan `candidates` in registration order for an arc that `id` exactly
/// coincides with.
fn find_alias(
    points: &Points<'_>,
    arcs: &[Arc],
    id: ArcId,
    candidates: &[ArcId],
    stats: &mut ScanStats,
) -> Result<ArcAlias, UnifyError> {
    let arc = arcs[id.0];
    for &coarc_id in candidates {
        let coarc = arcs[coarc_id.0];
        stats.candidates_examined += 1;

        for reversed in [false, true] {
            stats.scans += 1;
            let matched = if reversed {
                follow_backward(points, arc, coarc)
            } else {
                follow_forward(points, arc, coarc)
            };
            match Coincidence::classify(arc, matched) {
                Coincidence::Full => {
                    if coarc.point_count() != arc.point_count() {
                        return Err(UnifyError::LengthMismatch {
                            arc: id.0,
                            coarc: coarc_id.0,
                            arc_points: arc.point_count(),
                            coarc_points: coarc.point_count(),
                        });
                    }
                    return Ok(if reversed {
                        ArcAlias::Reversed(coarc_id)
                    } else {
                        ArcAlias::Forward(coarc_id)
                    });
                }
                Coincidence::Partial(matched) => {
                    return Err(UnifyError::PartialOverlap {
                        arc: id.0,
                        coarc: coarc_id.0,
                        matched,
                        point_count: arc.point_count(),
                        reversed,
                    });
                }
                Coincidence::Disjoint => {}
            }
        }
    }
    Ok(ArcAlias::Canonical)
}
