//! Endpoint index: which arcs start or end at a given point.

use crate::table::PointHashTable;
use crate::types::{ArcId, Point};

/// Maps each arc endpoint to the arcs registered there, in registration
/// order.
///
/// Only endpoints are indexed. Lists grow as arcs are registered and are
/// never rebuilt.
#[derive(Debug, Clone)]
pub struct EndpointIndex {
    table: PointHashTable<Vec<ArcId>>,
}

impl EndpointIndex {
    /// Create an index sized for about `capacity_hint` distinct endpoints.
    #[must_use]
    pub fn with_capacity_hint(capacity_hint: usize) -> Self {
        Self {
            table: PointHashTable::with_capacity_hint(capacity_hint),
        }
    }

    /// Arcs registered at `point`, oldest first. Empty when none are.
    #[must_use]
    pub fn candidates(&self, point: Point) -> &[ArcId] {
        self.table.get(point).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append `arc` to the list at `point`.
    pub fn register(&mut self, point: Point, arc: ArcId) {
        self.table.get_or_insert_with(point, Vec::new).push(arc);
    }

    /// Number of distinct endpoints seen.
    #[must_use]
    pub const fn endpoint_count(&self) -> usize {
        self.table.len()
    }

    /// Slot count of the underlying table.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Length of the longest candidate list.
    #[must_use]
    pub fn max_candidates(&self) -> usize {
        self.table.iter().map(|(_, arcs)| arcs.len()).max().unwrap_or(0)
    }
}
