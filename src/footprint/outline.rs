//! Rectangular outlines derived from the package body.
//!
//! Courtyard and fabrication outlines are plain segment lists. The notched
//! rectangle is also the starting point of the silkscreen outline.

use super::{path_segments, Layer, PathKind, VisibleSegment};
use crate::geometry::{Orientation, Vec2};

/// Corner of a rectangle selected by `orientation`, as `(corner, signs)`.
fn pin1_corner(center: Vec2, size: Vec2, orientation: Orientation) -> (Vec2, Vec2) {
    let signs = orientation.corner_signs();
    let half = Vec2::new(size.x.abs(), size.y.abs()) * 0.5;
    (
        Vec2::new(center.x + signs.x * half.x, center.y + signs.y * half.y),
        signs,
    )
}

/// Closed rectangle corners in drawing order.
#[must_use]
pub fn rectangle(center: Vec2, size: Vec2) -> Vec<Vec2> {
    let half = size * 0.5;
    vec![
        Vec2::new(center.x - half.x, center.y - half.y),
        Vec2::new(center.x + half.x, center.y - half.y),
        Vec2::new(center.x + half.x, center.y + half.y),
        Vec2::new(center.x - half.x, center.y + half.y),
    ]
}

/// Open rectangle that leaves out `gap` along both edges meeting at the
/// pin 1 corner.
///
/// The polyline starts on the first edge `gap` away from the corner, runs
/// around the three other corners and ends on the second edge `gap` away
/// from the corner.
#[must_use]
pub fn notched_rectangle(
    center: Vec2,
    size: Vec2,
    orientation: Orientation,
    gap: f64,
) -> Vec<Vec2> {
    let (corner, signs) = pin1_corner(center, size, orientation);
    let span = Vec2::new(size.x.abs(), size.y.abs());
    let along = Vec2::new(corner.x - signs.x * span.x, corner.y);
    let opposite = Vec2::new(along.x, corner.y - signs.y * span.y);
    let across = Vec2::new(corner.x, opposite.y);
    vec![
        Vec2::new(corner.x - signs.x * gap, corner.y),
        along,
        opposite,
        across,
        Vec2::new(corner.x, corner.y - signs.y * gap),
    ]
}

/// Rectangle with the pin 1 corner cut off diagonally.
#[must_use]
pub fn chamfered_rectangle(center: Vec2, size: Vec2, orientation: Orientation) -> Vec<Vec2> {
    let chamfer = size.x.abs().min(size.y.abs()) * 0.25;
    // closing the notched polyline draws the chamfer
    notched_rectangle(center, size, orientation, chamfer)
}

/// Courtyard: closed rectangle around the body.
#[must_use]
pub fn courtyard(center: Vec2, size: Vec2, width: f64) -> Vec<VisibleSegment> {
    path_segments(
        &rectangle(center, size),
        PathKind::Closed,
        width,
        &Layer::Courtyard,
    )
}

/// Fabrication outline: body rectangle with a pin 1 chamfer of a quarter of
/// the smaller body dimension.
#[must_use]
pub fn fabrication(
    center: Vec2,
    size: Vec2,
    orientation: Orientation,
    width: f64,
) -> Vec<VisibleSegment> {
    path_segments(
        &chamfered_rectangle(center, size, orientation),
        PathKind::Closed,
        width,
        &Layer::Fabrication,
    )
}
