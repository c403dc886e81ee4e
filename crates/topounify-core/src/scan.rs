//! Coincidence scanning between two arcs.
//!
//! Both scanners walk arc `a` from its start in its own direction and
//! compare it point by point against arc `b`, stopping at the first
//! mismatch or when either arc runs out. They return the number of leading
//! points of `a` that coincide. In buffer terms a result of `m` is the
//! index `a.start + step * m` where `a` deviates; `m == a.point_count()`
//! means `a` was consumed entirely (the deviation lands one step past
//! `a.end`).

use crate::points::Points;
use crate::types::Arc;

/// How far arc `a` coincides with arc `b` when both are read from their
/// start points.
///
/// Stops early when `b` is exhausted, so a shorter `b` never reads past
/// its own end. An index outside the buffer counts as a mismatch.
#[must_use]
pub fn follow_forward(points: &Points<'_>, a: Arc, b: Arc) -> usize {
    let limit = a.point_count().min(b.point_count());
    (0..limit)
        .take_while(|&offset| {
            match (
                points.try_get(a.index_at(offset)),
                points.try_get(b.index_at(offset)),
            ) {
                (Some(p), Some(q)) => p == q,
                _ => false,
            }
        })
        .count()
}

/// How far arc `a` coincides with arc `b` read backward, from `b.end`
/// toward `b.start`.
#[must_use]
pub fn follow_backward(points: &Points<'_>, a: Arc, b: Arc) -> usize {
    follow_forward(points, a, b.reversed())
}

/// Classification of a scan result against the scanned arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coincidence {
    /// At most the shared starting point coincides.
    Disjoint,
    /// More than one point coincides, but `a` deviates before its end.
    Partial(usize),
    /// Every point of `a` coincides.
    Full,
}

impl Coincidence {
    /// Classify `matched` leading points of `a`.
    #[must_use]
    pub const fn classify(a: Arc, matched: usize) -> Self {
        if matched == a.point_count() {
            Self::Full
        } else if matched > 1 {
            Self::Partial(matched)
        } else {
            Self::Disjoint
        }
    }
}
