//! Shared types for arc unification.

use serde::{Deserialize, Serialize};

/// A 2D point read from the coordinate buffer.
///
/// Equality is exact floating-point equality of both components; there is
/// no tolerance. `-0.0 == 0.0` holds, and a point containing `NaN` never
/// equals anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An inclusive range of point indices into the coordinate buffer.
///
/// The arc runs forward (step `+1`) when `start <= end` and backward
/// (step `-1`) otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arc {
    /// Index of the first point.
    pub start: usize,
    /// Index of the last point (inclusive).
    pub end: usize,
}

impl Arc {
    /// Create a new arc.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns `true` if the arc walks the buffer in increasing index order.
    #[must_use]
    pub const fn is_forward(self) -> bool {
        self.start <= self.end
    }

    /// Number of points the arc covers, endpoints included.
    #[must_use]
    pub const fn point_count(self) -> usize {
        self.start.abs_diff(self.end) + 1
    }

    /// The same span traversed in the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// Buffer index of the `offset`-th point along the arc.
    ///
    /// `offset` must be less than [`point_count`](Self::point_count).
    #[must_use]
    pub const fn index_at(self, offset: usize) -> usize {
        if self.is_forward() {
            self.start + offset
        } else {
            self.start - offset
        }
    }

    /// Buffer indices of every point, in traversal order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..self.point_count()).map(move |offset| self.index_at(offset))
    }
}

/// Identifies an arc by its position in [`Topology::arcs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArcId(pub usize);

impl ArcId {
    /// Position of the arc in the topology's arc list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arc {}", self.0)
    }
}

/// A coordinate buffer plus the arcs cut from it.
///
/// Produced by an upstream arc-cutting stage. Unification rewrites
/// `arcs` in place and never touches `coordinates`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Topology {
    /// Interleaved `x, y` pairs.
    pub coordinates: Vec<f64>,
    /// Arcs over `coordinates`, in the order they were cut.
    pub arcs: Vec<Arc>,
}

impl Topology {
    /// Create a topology from its parts.
    #[must_use]
    pub const fn new(coordinates: Vec<f64>, arcs: Vec<Arc>) -> Self {
        Self { coordinates, arcs }
    }

    /// Number of points in the coordinate buffer.
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.coordinates.len() / 2
    }
}

/// Configuration for a unification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifyConfig {
    /// Expected number of distinct endpoints, used to size the endpoint
    /// table. `None` derives it from the arc count (two per arc).
    pub endpoint_capacity: Option<usize>,
}

impl UnifyConfig {
    /// Default for [`endpoint_capacity`](Self::endpoint_capacity).
    pub const DEFAULT_ENDPOINT_CAPACITY: Option<usize> = None;

    /// Capacity hint for the endpoint table of a topology with `arc_count`
    /// arcs.
    ///
    /// A topology never has more distinct endpoints than two per arc, so an
    /// explicit hint is clamped to that.
    #[must_use]
    pub fn endpoint_capacity_for(&self, arc_count: usize) -> usize {
        let endpoints = arc_count.saturating_mul(2);
        self.endpoint_capacity
            .map_or(endpoints, |hint| hint.min(endpoints))
    }
}

impl Default for UnifyConfig {
    fn default() -> Self {
        Self {
            endpoint_capacity: Self::DEFAULT_ENDPOINT_CAPACITY,
        }
    }
}

/// Errors that abort a unification pass.
///
/// None of these are recoverable: they indicate that the upstream
/// arc-cutting stage produced input this algorithm cannot resolve.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum UnifyError {
    /// The coordinate buffer does not hold whole `x, y` pairs.
    #[error("coordinate buffer has odd length {0}")]
    OddCoordinateCount(usize),

    /// An arc references a point past the end of the buffer.
    #[error("arc {arc} references point {index} but the buffer holds {point_count} points")]
    ArcOutOfBounds {
        /// Position of the offending arc.
        arc: usize,
        /// The out-of-range point index.
        index: usize,
        /// Number of points in the buffer.
        point_count: usize,
    },

    /// An arc starts and ends at the same point.
    #[error(
        "arc {arc} ({start}..={end}) starts and ends at the same point ({}, {})",
        .point.x,
        .point.y
    )]
    DegenerateArc {
        /// Position of the offending arc.
        arc: usize,
        /// Start index of the arc.
        start: usize,
        /// End index of the arc.
        end: usize,
        /// The shared start/end point.
        point: Point,
    },

    /// An arc coincides with an earlier arc over more than one point but
    /// not over its whole length.
    #[error(
        "arc {arc} partially overlaps arc {coarc}{}: {matched} of {point_count} points coincide",
        direction_note(.reversed)
    )]
    PartialOverlap {
        /// Position of the arc being unified.
        arc: usize,
        /// Position of the earlier arc it overlaps.
        coarc: usize,
        /// Number of leading points that coincide.
        matched: usize,
        /// Number of points in `arc`.
        point_count: usize,
        /// Whether the overlap runs against `coarc`'s direction.
        reversed: bool,
    },

    /// An arc matches a prefix of a longer earlier arc.
    #[error(
        "arc {arc} ({arc_points} points) matches the start of arc {coarc}, which keeps going ({coarc_points} points)"
    )]
    LengthMismatch {
        /// Position of the arc being unified.
        arc: usize,
        /// Position of the longer earlier arc.
        coarc: usize,
        /// Number of points in `arc`.
        arc_points: usize,
        /// Number of points in `coarc`.
        coarc_points: usize,
    },
}

const fn direction_note(reversed: &bool) -> &'static str {
    if *reversed { " (reversed)" } else { "" }
}
