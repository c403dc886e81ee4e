//! Unification diagnostics: timing and counts for a single pass.
//!
//! The library never logs. Callers that want to see what a pass did ask
//! for a [`UnifyDiagnostics`] alongside the result and print or serialize
//! it themselves.
//!
//! Timing goes through the [`Clock`] trait so this crate stays free of
//! platform time sources; the CLI supplies one backed by
//! [`std::time::Instant`].
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Topology, UnifyConfig, UnifyError};
use crate::unify::{Unification, unify_with_stats};

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single unification pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifyDiagnostics {
    /// Wall-clock duration of the pass (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Points in the coordinate buffer.
    pub point_count: usize,
    /// Arcs in the topology.
    pub arc_count: usize,
    /// Arcs that survived as canonical.
    pub canonical_count: usize,
    /// Arcs redirected onto an earlier arc in the same direction.
    pub forward_merges: usize,
    /// Arcs redirected onto an earlier arc in reverse.
    pub reversed_merges: usize,
    /// Distinct endpoints registered in the endpoint index.
    pub endpoint_count: usize,
    /// Slot count of the endpoint table after the pass.
    pub endpoint_capacity: usize,
    /// Longest candidate list at any endpoint.
    pub max_candidates: usize,
    /// Candidate arcs examined across all lookups.
    pub candidates_examined: usize,
    /// Coincidence scans run (forward and backward).
    pub scans: usize,
}

impl UnifyDiagnostics {
    /// Fraction of arcs that were merged away (`0.0` for no arcs).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn merge_ratio(&self) -> f64 {
        if self.arc_count == 0 {
            0.0
        } else {
            (self.forward_merges + self.reversed_merges) as f64 / self.arc_count as f64
        }
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Unification Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Input: {} arcs over {} points",
            self.arc_count, self.point_count,
        ));
        lines.push(format!("Duration: {:.3}ms", duration_ms(self.duration)));
        lines.push(String::new());

        lines.push(format!("{:<24} {:>10}", "Metric", "Value"));
        lines.push("-".repeat(40));
        let rows: [(&str, usize); 9] = [
            ("Canonical arcs", self.canonical_count),
            ("Forward merges", self.forward_merges),
            ("Reversed merges", self.reversed_merges),
            ("Endpoints", self.endpoint_count),
            ("Endpoint capacity", self.endpoint_capacity),
            ("Max candidates", self.max_candidates),
            ("Candidates examined", self.candidates_examined),
            ("Scans", self.scans),
            ("Arcs", self.arc_count),
        ];
        for (name, value) in rows {
            lines.push(format!("{name:<24} {value:>10}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Shared: {:.1}% of arcs alias an earlier arc",
            self.merge_ratio() * 100.0,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Unify `topology` and collect diagnostics for the pass.
///
/// # Errors
///
/// Same as [`unify`](crate::unify); no diagnostics are produced for a
/// failed pass.
pub fn unify_with_diagnostics<C: Clock>(
    topology: &mut Topology,
    config: &UnifyConfig,
    clock: &C,
) -> Result<(Unification, UnifyDiagnostics), UnifyError> {
    let started = clock.now();
    let (unification, stats) = unify_with_stats(topology, config)?;
    let duration = clock.elapsed(&started);

    let reversed_merges = unification.reversed_count();
    let diagnostics = UnifyDiagnostics {
        duration,
        point_count: topology.point_count(),
        arc_count: topology.arcs.len(),
        canonical_count: unification.canonical_count(),
        forward_merges: unification.merged_count() - reversed_merges,
        reversed_merges,
        endpoint_count: stats.endpoint_count,
        endpoint_capacity: stats.endpoint_capacity,
        max_candidates: stats.max_candidates,
        candidates_examined: stats.candidates_examined,
        scans: stats.scans,
    };
    Ok((unification, diagnostics))
}
