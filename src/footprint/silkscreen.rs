//! Silkscreen visibility engine.
//!
//! The body outline (with the pin 1 gap and marker) is built in millimetres,
//! every existing pad contributes one clearance rectangle, and the outline
//! minus the union of all clearances is what gets printed.

use serde::Serialize;
use tracing::trace;

use super::layout::PlacedPad;
use super::outline::{notched_rectangle, rectangle};
use super::{path_segments, Layer, MarkerStyle, PathKind, VisibleSegment};
use crate::geometry::{BooleanDifference, GridClipper, Orientation, Path64, Rect, Vec2};

/// Area around a pad that must stay free of silkscreen ink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClearanceShape {
    /// Clearance rectangle.
    pub rect: Rect,
}

/// Clearance of one placed pad.
///
/// The bounding box of copper and drill grows by half the stroke width plus
/// `clearance` on every side, so the edge of a printed line keeps
/// `clearance` away from the pad. Suppressed pads and pads without copper
/// or drill have no clearance.
#[must_use]
pub fn clearance_shape(pad: &PlacedPad, stroke: f64, clearance: f64) -> Option<ClearanceShape> {
    if !pad.exists {
        return None;
    }
    pad.extent().map(|extent| ClearanceShape {
        rect: extent.expanded(stroke * 0.5 + clearance),
    })
}

/// Clearances of all pads, in pad order.
#[must_use]
pub fn clearance_shapes<'a>(
    pads: impl IntoIterator<Item = &'a PlacedPad>,
    stroke: f64,
    clearance: f64,
) -> Vec<ClearanceShape> {
    pads.into_iter()
        .filter_map(|pad| clearance_shape(pad, stroke, clearance))
        .collect()
}

/// Silkscreen outline before clipping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlineGeometry {
    /// Open polylines.
    pub open: Vec<Vec<Vec2>>,
    /// Closed rings.
    pub closed: Vec<Vec<Vec2>>,
}

/// Builds the body outline.
///
/// With a dot marker the rectangle is left open for `gap_factor * stroke`
/// along both edges at the pin 1 corner and a closed square with side
/// `stroke` sits on the corner. Without a marker the rectangle is closed.
#[must_use]
pub fn outline_geometry(
    center: Vec2,
    size: Vec2,
    orientation: Orientation,
    marker: MarkerStyle,
    stroke: f64,
    gap_factor: f64,
) -> OutlineGeometry {
    match marker {
        MarkerStyle::None => OutlineGeometry {
            open: Vec::new(),
            closed: vec![rectangle(center, size)],
        },
        MarkerStyle::Dot => {
            let signs = orientation.corner_signs();
            let corner = Vec2::new(
                center.x + signs.x * size.x.abs() * 0.5,
                center.y + signs.y * size.y.abs() * 0.5,
            );
            OutlineGeometry {
                open: vec![notched_rectangle(center, size, orientation, gap_factor * stroke)],
                closed: vec![rectangle(corner, Vec2::splat(stroke))],
            }
        }
    }
}

/// Subtracts the clearances from the outline and splits the result into
/// segments on the silkscreen layer.
///
/// `grid` maps millimetres onto the integer grid `clipper` works on. The
/// segments of each closed result wrap around; open results do not.
#[must_use]
pub fn visible_outline<B: BooleanDifference + ?Sized>(
    outline: &OutlineGeometry,
    clearances: &[ClearanceShape],
    grid: &GridClipper,
    clipper: &B,
    width: f64,
) -> Vec<VisibleSegment> {
    let open: Vec<Path64> = outline.open.iter().map(|p| grid.quantize_path(p)).collect();
    let closed: Vec<Path64> = outline.closed.iter().map(|p| grid.quantize_path(p)).collect();
    let clips: Vec<_> = clearances.iter().map(|c| grid.quantize_rect(&c.rect)).collect();

    let result = clipper.subtract(&open, &closed, &clips);
    trace!(
        clearances = clips.len(),
        closed = result.closed.len(),
        open = result.open.len(),
        "Clipped silkscreen outline"
    );

    let to_mm = |path: &Path64| -> Vec<Vec2> { path.iter().map(|p| grid.dequantize(*p)).collect() };
    let layer = Layer::Silkscreen;
    let mut segments = Vec::new();
    for path in &result.closed {
        segments.extend(path_segments(&to_mm(path), PathKind::Closed, width, &layer));
    }
    for path in &result.open {
        segments.extend(path_segments(&to_mm(path), PathKind::Open, width, &layer));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::layout::PadLayers;
    use crate::footprint::Side;

    const STROKE: f64 = 0.15;

    fn pad(position: Vec2, size: Vec2) -> PlacedPad {
        PlacedPad {
            index: 0,
            name: "1".to_string(),
            exists: true,
            position,
            size,
            drill_size: Vec2::ZERO,
            pad_offset: Vec2::ZERO,
            shape: 0.0,
            clearance: 0.0,
            mask_margin: 0.0,
            side: Side::Front,
            layers: PadLayers::COPPER,
        }
    }

    fn body_outline() -> OutlineGeometry {
        outline_geometry(
            Vec2::ZERO,
            Vec2::new(4.0, 3.0),
            Orientation::BottomLeft,
            MarkerStyle::Dot,
            STROKE,
            4.0,
        )
    }

    #[test]
    fn clearance_contains_copper_and_drill() {
        let mut p = pad(Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0));
        p.drill_size = Vec2::splat(0.8);
        p.pad_offset = Vec2::new(0.8, 0.0);
        let shape = clearance_shape(&p, STROKE, 0.1).unwrap();
        assert!(shape.rect.contains_rect(&p.copper_rect().unwrap()));
        assert!(shape.rect.contains_rect(&p.drill_rect().unwrap()));
        let margin = STROKE * 0.5 + 0.1;
        assert!((shape.rect.min.x - (0.6 - margin)).abs() < 1e-12);
        assert!((shape.rect.max.x - (2.8 + margin)).abs() < 1e-12);
    }

    #[test]
    fn suppressed_pad_has_no_clearance() {
        let mut p = pad(Vec2::ZERO, Vec2::splat(1.0));
        p.exists = false;
        assert_eq!(clearance_shape(&p, STROKE, 0.1), None);
        assert_eq!(clearance_shape(&pad(Vec2::ZERO, Vec2::ZERO), STROKE, 0.1), None);
    }

    #[test]
    fn marker_none_is_closed_rectangle() {
        let outline = outline_geometry(
            Vec2::ZERO,
            Vec2::new(4.0, 3.0),
            Orientation::BottomLeft,
            MarkerStyle::None,
            STROKE,
            4.0,
        );
        assert!(outline.open.is_empty());
        assert_eq!(outline.closed.len(), 1);
        assert_eq!(outline.closed[0].len(), 4);
    }

    #[test]
    fn uncut_outline_keeps_gap_and_marker() {
        let clipper = GridClipper::default();
        let segments = visible_outline(&body_outline(), &[], &clipper, &clipper, STROKE);
        let open = segments.iter().filter(|s| s.origin == PathKind::Open).count();
        let closed = segments.iter().filter(|s| s.origin == PathKind::Closed).count();
        assert_eq!(open, 4);
        assert_eq!(closed, 4);
        assert!(segments.iter().all(|s| s.layer == Layer::Silkscreen));
    }

    #[test]
    fn pad_on_edge_cuts_notch() {
        let edge_pad = pad(Vec2::new(0.0, 1.5), Vec2::splat(1.0));
        let clearance = clearance_shape(&edge_pad, STROKE, 0.1).unwrap();
        let segments = visible_outline(
            &body_outline(),
            &[clearance],
            &GridClipper::default(),
            &GridClipper::default(),
            STROKE,
        );
        let open = segments.iter().filter(|s| s.origin == PathKind::Open).count();
        // bottom edge split in two
        assert_eq!(open, 5);
        for segment in &segments {
            let mid = (segment.start + segment.end) * 0.5;
            assert!(!clearance.rect.contains_point_strict(mid));
        }
    }

    #[test]
    fn full_coverage_removes_everything() {
        let cover = ClearanceShape {
            rect: Rect::centred(Vec2::ZERO, Vec2::splat(10.0)),
        };
        let segments = visible_outline(
            &body_outline(),
            &[cover],
            &GridClipper::default(),
            &GridClipper::default(),
            STROKE,
        );
        assert!(segments.is_empty());
    }
}
