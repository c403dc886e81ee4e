//! topounify-export: Pure format serializers (sans-IO)
//!
//! Converts a unified topology into output formats. Currently supports
//! a shared-arc JSON document (each canonical arc stored once, every input
//! arc expressed as a reference) and an SVG preview.

pub mod json;
pub mod svg;

pub use crate::json::{SharedArcs, split_reference, to_json, to_shared_arcs};
pub use crate::svg::{SvgMetadata, to_svg};

use topounify_core::UnifyError;

/// Errors that can occur while exporting a unified topology.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The topology itself is malformed (odd buffer, out-of-range arc).
    #[error("invalid topology: {0}")]
    Topology(#[from] UnifyError),

    /// The unification does not describe this topology's arcs.
    #[error("unification covers {unified} arcs but the topology has {arcs}")]
    ArcCountMismatch {
        /// Arcs covered by the unification.
        unified: usize,
        /// Arcs in the topology.
        arcs: usize,
    },

    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
