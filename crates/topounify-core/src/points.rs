//! Point access over an interleaved coordinate buffer.

use crate::types::{Arc, Point, Topology, UnifyError};

/// Read-only view of a coordinate buffer as a sequence of points.
///
/// Construction checks that the buffer holds whole pairs, so indexing a
/// point below [`len`](Self::len) never goes out of range.
#[derive(Debug, Clone, Copy)]
pub struct Points<'a> {
    coordinates: &'a [f64],
}

impl<'a> Points<'a> {
    /// Wrap a coordinate buffer.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::OddCoordinateCount`] if the buffer length is
    /// odd.
    pub const fn new(coordinates: &'a [f64]) -> Result<Self, UnifyError> {
        if coordinates.len() % 2 != 0 {
            return Err(UnifyError::OddCoordinateCount(coordinates.len()));
        }
        Ok(Self { coordinates })
    }

    /// Number of points in the buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.coordinates.len() / 2
    }

    /// Returns `true` if the buffer holds no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// The point at `index`.
    ///
    /// Callers pass indices from arcs already accepted by
    /// [`check_arcs`](Self::check_arcs); anything else goes through
    /// [`try_get`](Self::try_get).
    #[must_use]
    pub(crate) fn get(&self, index: usize) -> Point {
        let i = index * 2;
        Point::new(self.coordinates[i], self.coordinates[i + 1])
    }

    /// The point at `index`, or `None` when it lies outside the buffer.
    #[must_use]
    pub fn try_get(&self, index: usize) -> Option<Point> {
        (index < self.len()).then(|| self.get(index))
    }

    /// Every point of `arc`, in traversal order.
    ///
    /// Stops at the first index outside the buffer, so an unchecked arc
    /// yields a truncated sequence.
    pub fn along(&self, arc: Arc) -> impl Iterator<Item = Point> + '_ {
        arc.indices().map_while(|i| self.try_get(i))
    }

    /// Verify that every arc references points inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::ArcOutOfBounds`] for the first arc with an
    /// endpoint past the end of the buffer. Arcs are contiguous ranges, so
    /// checking both endpoints covers every interior index.
    pub fn check_arcs(&self, arcs: &[Arc]) -> Result<(), UnifyError> {
        let point_count = self.len();
        for (arc_idx, arc) in arcs.iter().enumerate() {
            let index = arc.start.max(arc.end);
            if index >= point_count {
                return Err(UnifyError::ArcOutOfBounds {
                    arc: arc_idx,
                    index,
                    point_count,
                });
            }
        }
        Ok(())
    }
}

impl<'a> TryFrom<&'a Topology> for Points<'a> {
    type Error = UnifyError;

    fn try_from(topology: &'a Topology) -> Result<Self, Self::Error> {
        let points = Self::new(&topology.coordinates)?;
        points.check_arcs(&topology.arcs)?;
        Ok(points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reads_interleaved_pairs() {
        let coords = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let points = Points::new(&coords).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points.get(0), Point::new(0.0, 1.0));
        assert_eq!(points.get(2), Point::new(4.0, 5.0));
        assert_eq!(points.try_get(3), None);
    }

    #[test]
    fn rejects_odd_buffer() {
        let coords = [0.0, 1.0, 2.0];
        assert_eq!(
            Points::new(&coords).unwrap_err(),
            UnifyError::OddCoordinateCount(3),
        );
    }

    #[test]
    fn empty_buffer() {
        let points = Points::new(&[]).unwrap();
        assert!(points.is_empty());
        assert_eq!(points.len(), 0);
    }

    #[test]
    fn along_follows_arc_direction() {
        let coords = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        let points = Points::new(&coords).unwrap();
        let backward: Vec<Point> = points.along(Arc::new(2, 0)).collect();
        assert_eq!(
            backward,
            vec![
                Point::new(1.0, 1.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 0.0),
            ],
        );
    }

    #[test]
    fn along_stops_at_the_buffer_end() {
        let coords = [0.0, 0.0, 1.0, 0.0];
        let points = Points::new(&coords).unwrap();
        let forward: Vec<Point> = points.along(Arc::new(0, 5)).collect();
        assert_eq!(forward, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_eq!(points.along(Arc::new(4, 0)).count(), 0);
    }

    #[test]
    fn check_arcs_reports_first_out_of_range_arc() {
        let coords = [0.0, 0.0, 1.0, 0.0];
        let points = Points::new(&coords).unwrap();
        assert!(points.check_arcs(&[Arc::new(0, 1), Arc::new(1, 0)]).is_ok());
        assert_eq!(
            points.check_arcs(&[Arc::new(0, 1), Arc::new(5, 1)]),
            Err(UnifyError::ArcOutOfBounds {
                arc: 1,
                index: 5,
                point_count: 2,
            }),
        );
    }

    #[test]
    fn try_from_topology_validates_everything() {
        let topology = Topology::new(vec![0.0, 0.0, 1.0, 0.0], vec![Arc::new(0, 2)]);
        assert!(matches!(
            Points::try_from(&topology),
            Err(UnifyError::ArcOutOfBounds { index: 2, .. }),
        ));
    }
}
