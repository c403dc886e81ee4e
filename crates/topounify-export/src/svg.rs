//! SVG preview of a unified topology.
//!
//! Each canonical arc becomes one `<path>` element built with the [`svg`]
//! crate. Arcs that more than one input arc resolves to are drawn with a
//! highlight stroke, so shared boundaries stand out from arcs used once.
//!
//! Topology coordinates are y-up; the document flips y so the preview is
//! not upside down. The `viewBox` is the padded bounding rectangle of all
//! canonical arcs, computed with [`geo`].
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use geo::{BoundingRect, Coord, LineString, MultiLineString, Rect};
use svg::Document;
use svg::node::Text;
use svg::node::element::path::Data;
use svg::node::element::{Description, Path, Title};
use topounify_core::points::Points;
use topounify_core::{Topology, Unification};

use crate::ExportError;

/// Stroke for arcs referenced by more than one input arc.
pub const SHARED_STROKE: &str = "#d62728";
/// Stroke for arcs referenced once.
pub const SINGLE_STROKE: &str = "#1f77b4";

/// Fraction of the larger bounding-box side added as padding on each edge.
const PADDING_RATIO: f64 = 0.02;

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,
    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Render the canonical arcs of a unified topology as an SVG document.
///
/// Every path carries `data-arc` (the canonical arc's index in the
/// topology) and `data-refs` (how many input arcs resolve to it).
///
/// # Errors
///
/// Returns [`ExportError::ArcCountMismatch`] if `unification` was produced
/// for a different number of arcs, or [`ExportError::Topology`] if the
/// topology references points outside its buffer.
///
/// # Examples
///
/// ```
/// use topounify_core::{Arc, Topology, unify};
/// use topounify_export::{SvgMetadata, to_svg};
///
/// let mut topology = Topology::new(
///     vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
///     vec![Arc::new(0, 2), Arc::new(2, 0)],
/// );
/// let unification = unify(&mut topology).unwrap();
/// let metadata = SvgMetadata {
///     title: Some("triangle"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&topology, &unification, &metadata).unwrap();
/// assert!(svg.contains("<title>triangle</title>"));
/// assert!(svg.contains(r#"data-refs="2""#));
/// ```
pub fn to_svg(
    topology: &Topology,
    unification: &Unification,
    metadata: &SvgMetadata<'_>,
) -> Result<String, ExportError> {
    if unification.len() != topology.arcs.len() {
        return Err(ExportError::ArcCountMismatch {
            unified: unification.len(),
            arcs: topology.arcs.len(),
        });
    }
    let points = Points::try_from(topology)?;

    let mut refs = vec![0_usize; topology.arcs.len()];
    for (id, _) in unification.iter() {
        if let Some(canonical) = unification.canonical(id) {
            refs[canonical.index()] += 1;
        }
    }

    let lines: Vec<(usize, LineString<f64>)> = unification
        .canonical_ids()
        .map(|id| {
            let line = points
                .along(topology.arcs[id.index()])
                .map(|p| Coord { x: p.x, y: p.y })
                .collect();
            (id.index(), line)
        })
        .collect();

    let bounds = MultiLineString::new(lines.iter().map(|(_, line)| line.clone()).collect())
        .bounding_rect()
        .unwrap_or_else(|| Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }));
    let (x, y, width, height) = view_box(bounds);

    let mut doc = Document::new()
        .set("viewBox", (x, y, width, height))
        .set("preserveAspectRatio", "xMidYMid meet");

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    for (index, line) in &lines {
        let count = refs[*index];
        let stroke = if count > 1 {
            SHARED_STROKE
        } else {
            SINGLE_STROKE
        };
        let path = Path::new()
            .set("d", path_data(line))
            .set("fill", "none")
            .set("stroke", stroke)
            .set("stroke-width", 1)
            .set("vector-effect", "non-scaling-stroke")
            .set("data-arc", index.to_string())
            .set("data-refs", count.to_string());
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n"))
}

/// Path data for one line, with y negated into SVG's y-down space.
fn path_data(line: &LineString<f64>) -> Data {
    let mut coords = line.coords();
    let Some(first) = coords.next() else {
        return Data::new();
    };
    let mut data = Data::new().move_to((first.x, flip(first.y)));
    for c in coords {
        data = data.line_to((c.x, flip(c.y)));
    }
    data
}

/// Negate `y`, mapping `0.0` to `0.0` rather than `-0.0`.
const fn flip(y: f64) -> f64 {
    0.0 - y
}

/// `(min_x, min_y, width, height)` of the padded, y-flipped bounds.
///
/// A zero-size box (a single point, or nothing at all) still gets a
/// padding of one unit so the document has a usable viewport.
fn view_box(bounds: Rect<f64>) -> (f64, f64, f64, f64) {
    let side = bounds.width().max(bounds.height());
    let pad = if side > 0.0 { side * PADDING_RATIO } else { 1.0 };
    (
        bounds.min().x - pad,
        -bounds.max().y - pad,
        2.0f64.mul_add(pad, bounds.width()),
        2.0f64.mul_add(pad, bounds.height()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use topounify_core::{Arc, unify};

    use super::*;

    fn triangle() -> (Topology, Unification) {
        let mut topology = Topology::new(
            vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 5.0, 5.0],
            vec![Arc::new(0, 2), Arc::new(2, 0), Arc::new(3, 4)],
        );
        let unification = unify(&mut topology).unwrap();
        (topology, unification)
    }

    #[test]
    fn one_path_per_canonical_arc() {
        let (topology, unification) = triangle();
        let svg = to_svg(&topology, &unification, &SvgMetadata::default()).unwrap();
        assert_eq!(svg.matches("<path").count(), 2);
    }

    #[test]
    fn shared_arcs_are_highlighted() {
        let (topology, unification) = triangle();
        let svg = to_svg(&topology, &unification, &SvgMetadata::default()).unwrap();
        assert_eq!(svg.matches(SHARED_STROKE).count(), 1);
        assert_eq!(svg.matches(SINGLE_STROKE).count(), 1);
        assert!(svg.contains(r#"data-arc="0""#));
        assert!(svg.contains(r#"data-refs="2""#));
        assert!(svg.contains(r#"data-arc="2""#));
        assert!(svg.contains(r#"data-refs="1""#));
    }

    #[test]
    fn y_axis_is_flipped() {
        let (topology, unification) = triangle();
        let svg = to_svg(&topology, &unification, &SvgMetadata::default()).unwrap();
        assert!(svg.contains("M0,0 L1,0 L1,-1"));
    }

    #[test]
    fn flip_never_produces_negative_zero() {
        assert!(flip(0.0).is_sign_positive());
        assert!((flip(2.5) + 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn view_box_pads_and_flips_bounds() {
        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 50.0, y: 10.0 });
        let (x, y, w, h) = view_box(bounds);
        assert!((x + 1.0).abs() < 1e-9);
        assert!((y + 11.0).abs() < 1e-9);
        assert!((w - 52.0).abs() < 1e-9);
        assert!((h - 12.0).abs() < 1e-9);
    }

    #[test]
    fn view_box_of_a_point_is_not_empty() {
        let p = Coord { x: 3.0, y: 4.0 };
        let (x, y, w, h) = view_box(Rect::new(p, p));
        assert!((x - 2.0).abs() < 1e-9);
        assert!((y + 5.0).abs() < 1e-9);
        assert!((w - 2.0).abs() < 1e-9);
        assert!((h - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_topology_renders_empty_document() {
        let mut topology = Topology::default();
        let unification = unify(&mut topology).unwrap();
        let svg = to_svg(&topology, &unification, &SvgMetadata::default()).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn metadata_is_embedded_and_escaped() {
        let (topology, unification) = triangle();
        let metadata = SvgMetadata {
            title: Some("a & b"),
            description: Some("3 arcs <unified>"),
        };
        let svg = to_svg(&topology, &unification, &metadata).unwrap();
        assert!(svg.contains("<title>a &amp; b</title>"));
        assert!(svg.contains("<desc>3 arcs &lt;unified&gt;</desc>"));
    }

    #[test]
    fn mismatched_unification_is_rejected() {
        let (mut topology, unification) = triangle();
        topology.arcs.push(Arc::new(0, 1));
        assert!(matches!(
            to_svg(&topology, &unification, &SvgMetadata::default()),
            Err(ExportError::ArcCountMismatch {
                unified: 3,
                arcs: 4
            }),
        ));
    }
}
