//! Per-footprint generation pipeline.

use serde::Serialize;
use tracing::{debug, trace};

use super::layout::{layout, PlacedPad};
use super::silkscreen::{clearance_shapes, outline_geometry, visible_outline};
use super::{
    outline, path_segments, Attributes, FootprintSpec, FootprintType, Layer, PathKind,
    VisibleSegment,
};
use crate::config::Config;
use crate::error::LayoutError;
use crate::geometry::{Vec2, Vec3};

/// A circle on a drawing layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    /// Centre point.
    pub center: Vec2,
    /// Radius.
    pub radius: f64,
    /// Stroke width.
    pub width: f64,
    /// Filled circle.
    pub fill: bool,
    /// Target layer.
    pub layer: Layer,
}

/// Box approximating the package body in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyBox {
    /// Centre of the bottom face.
    pub center: Vec3,
    /// Box size.
    pub size: Vec3,
}

/// Everything the emitters need to write one footprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFootprint {
    /// Footprint name.
    pub name: String,
    /// Footprint description.
    pub description: String,
    /// Through-hole or SMD, never [`FootprintType::Detect`].
    pub kind: FootprintType,
    /// Attributes.
    pub attributes: Attributes,
    /// Existing pads, in layout order.
    pub pads: Vec<PlacedPad>,
    /// Line segments on all layers.
    pub segments: Vec<VisibleSegment>,
    /// Circles on all layers.
    pub circles: Vec<Circle>,
    /// 3D body, if the footprint has one.
    pub body: Option<BodyBox>,
}

/// Generates one footprint.
///
/// All pad arrays are laid out first; their clearances then go into a
/// single clipping pass over the silkscreen outline.
///
/// # Errors
///
/// Returns [`LayoutError`] if a pad array cannot be laid out.
pub fn generate(
    name: &str,
    spec: &FootprintSpec,
    config: &Config,
) -> Result<GeneratedFootprint, LayoutError> {
    let origin = spec.position;

    let mut placed = Vec::new();
    for array in &spec.pads {
        placed.extend(layout(array, origin, spec.orientation)?);
    }

    let stroke = config.silkscreen.line_width;
    let clearances = clearance_shapes(&placed, stroke, config.silkscreen.pad_clearance);
    let pads: Vec<PlacedPad> = placed.into_iter().filter(|p| p.exists).collect();

    let mut segments = Vec::new();
    let mut body = None;
    if spec.has_body() {
        let offset = spec.body_offset();
        let center = origin + offset.xy();
        let size = spec.body.size.xy() + spec.margin * 2.0;

        // the marker follows pin 1 to the far end of mirrored rows
        let marker_corner = if spec.is_mirrored() {
            spec.orientation.mirrored()
        } else {
            spec.orientation
        };

        if spec.courtyard.enabled {
            segments.extend(outline::courtyard(
                center + spec.courtyard.offset,
                size + spec.courtyard.margin * 2.0,
                config.courtyard.line_width,
            ));
        }

        if spec.fabrication.enabled {
            segments.extend(outline::fabrication(
                center + spec.fabrication.offset,
                size + spec.fabrication.margin * 2.0,
                marker_corner,
                config.fabrication.line_width,
            ));
        }

        if spec.silkscreen.enabled {
            let geometry = outline_geometry(
                center + spec.silkscreen.offset,
                size + spec.silkscreen.margin * 2.0,
                marker_corner,
                spec.silkscreen.marker,
                stroke,
                config.silkscreen.gap_factor,
            );
            let clipper = config.clipper();
            segments.extend(visible_outline(&geometry, &clearances, &clipper, &clipper, stroke));
        } else {
            trace!(footprint = name, "Silkscreen disabled");
        }

        body = Some(BodyBox {
            center: Vec3::new(center.x, center.y, offset.z),
            size: spec.body.size,
        });
    }

    for line in &spec.lines {
        let points: Vec<Vec2> = line.points.iter().map(|p| *p + origin).collect();
        segments.extend(path_segments(
            &points,
            PathKind::Open,
            line.width,
            &Layer::from_name(&line.layer),
        ));
    }

    for rectangle in &spec.rectangles {
        let center = (rectangle.p1 + rectangle.p2) * 0.5 + origin;
        let size = rectangle.p2 - rectangle.p1;
        segments.extend(path_segments(
            &outline::rectangle(center, size),
            PathKind::Closed,
            rectangle.width,
            &Layer::from_name(&rectangle.layer),
        ));
    }

    let circles = spec
        .circles
        .iter()
        .map(|circle| Circle {
            center: circle.center + origin,
            radius: circle.radius,
            width: circle.width,
            fill: circle.fill,
            layer: Layer::from_name(&circle.layer),
        })
        .collect();

    let kind = spec.resolved_kind();
    debug!(
        footprint = name,
        kind = ?kind,
        pads = pads.len(),
        clearances = clearances.len(),
        segments = segments.len(),
        "Generated footprint"
    );

    Ok(GeneratedFootprint {
        name: name.to_string(),
        description: spec.description.clone(),
        kind,
        attributes: spec.attributes(),
        pads,
        segments,
        circles,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::{CircleSpec, LineSpec, PadArraySpec, RectangleSpec, Topology};

    fn pads(count: i64) -> PadArraySpec {
        PadArraySpec {
            count,
            pitch: 2.0,
            size: Vec2::splat(1.0),
            ..PadArraySpec::default()
        }
    }

    #[test]
    fn footprint_without_body_has_only_pads() {
        let spec = FootprintSpec {
            pads: vec![pads(3)],
            ..FootprintSpec::default()
        };
        let fp = generate("R", &spec, &Config::default()).unwrap();
        assert_eq!(fp.pads.len(), 3);
        assert!(fp.segments.is_empty());
        assert_eq!(fp.body, None);
        assert_eq!(fp.kind, FootprintType::Smd);
    }

    #[test]
    fn layers_follow_enable_flags() {
        let mut spec = FootprintSpec {
            body: crate::footprint::Body {
                size: Vec3::new(4.0, 3.0, 1.0),
                offset: Vec3::default(),
            },
            ..FootprintSpec::default()
        };
        let count = |fp: &GeneratedFootprint, layer: Layer| {
            fp.segments.iter().filter(|s| s.layer == layer).count()
        };

        let fp = generate("X", &spec, &Config::default()).unwrap();
        assert_eq!(count(&fp, Layer::Courtyard), 4);
        assert_eq!(count(&fp, Layer::Fabrication), 5);
        assert_eq!(count(&fp, Layer::Silkscreen), 8);
        assert_eq!(fp.body.unwrap().size, Vec3::new(4.0, 3.0, 1.0));

        spec.silkscreen.enabled = false;
        spec.courtyard.enabled = false;
        let fp = generate("X", &spec, &Config::default()).unwrap();
        assert_eq!(count(&fp, Layer::Courtyard), 0);
        assert_eq!(count(&fp, Layer::Silkscreen), 0);
        assert_eq!(count(&fp, Layer::Fabrication), 5);
    }

    #[test]
    fn mirrored_rows_move_the_chamfer() {
        let mut spec = FootprintSpec {
            body: crate::footprint::Body {
                size: Vec3::new(4.0, 3.0, 1.0),
                offset: Vec3::default(),
            },
            pads: vec![pads(3)],
            ..FootprintSpec::default()
        };
        let chamfer = |fp: &GeneratedFootprint| {
            // the closing segment is the chamfer
            let segment = fp
                .segments
                .iter()
                .rev()
                .find(|s| s.layer == Layer::Fabrication)
                .unwrap();
            (segment.start + segment.end) * 0.5
        };

        let fp = generate("X", &spec, &Config::default()).unwrap();
        assert_eq!(fp.pads[0].position, Vec2::new(-2.0, 0.0));
        assert!(chamfer(&fp).x < 0.0);

        spec.pads[0].mirror = true;
        let fp = generate("X", &spec, &Config::default()).unwrap();
        let pin1 = fp.pads.iter().find(|p| p.name == "1").unwrap();
        assert_eq!(pin1.position, Vec2::new(2.0, 0.0));
        let mid = chamfer(&fp);
        assert!(mid.x > 0.0 && mid.y > 0.0, "{mid:?}");
    }

    #[test]
    fn global_margin_and_offset() {
        let spec = FootprintSpec {
            body: crate::footprint::Body {
                size: Vec3::new(4.0, 3.0, 1.0),
                offset: Vec3::new(0.5, 0.0, 0.0),
            },
            offset: Vec3::new(0.0, 1.0, 0.25),
            margin: Vec2::splat(0.5),
            ..FootprintSpec::default()
        };
        let fp = generate("X", &spec, &Config::default()).unwrap();
        let body = fp.body.unwrap();
        assert_eq!(body.center, Vec3::new(0.5, 1.0, 0.25));
        assert_eq!(body.size, Vec3::new(4.0, 3.0, 1.0));

        let courtyard: Vec<&VisibleSegment> =
            fp.segments.iter().filter(|s| s.layer == Layer::Courtyard).collect();
        assert_eq!(courtyard[0].start, Vec2::new(-2.0, -1.0));
        assert_eq!(courtyard[0].end, Vec2::new(3.0, -1.0));
    }

    #[test]
    fn auxiliary_shapes_follow_position() {
        let spec = FootprintSpec {
            position: Vec2::new(1.0, 2.0),
            lines: vec![LineSpec {
                layer: "F.SilkS".to_string(),
                width: 0.1,
                points: vec![Vec2::ZERO, Vec2::new(1.0, 0.0)],
            }],
            rectangles: vec![RectangleSpec {
                layer: "Dwgs.User".to_string(),
                width: 0.1,
                p1: Vec2::ZERO,
                p2: Vec2::new(2.0, 2.0),
            }],
            circles: vec![CircleSpec {
                layer: "F.Fab".to_string(),
                width: 0.1,
                fill: false,
                center: Vec2::ZERO,
                radius: 0.5,
            }],
            ..FootprintSpec::default()
        };
        let fp = generate("X", &spec, &Config::default()).unwrap();
        assert_eq!(fp.segments.len(), 5);
        assert_eq!(fp.segments[0].start, Vec2::new(1.0, 2.0));
        assert_eq!(fp.segments[0].layer, Layer::Silkscreen);
        assert_eq!(fp.segments[1].start, Vec2::new(1.0, 2.0));
        assert_eq!(fp.segments[1].layer, Layer::Named("Dwgs.User".to_string()));
        assert_eq!(fp.circles[0].center, Vec2::new(1.0, 2.0));
        assert_eq!(fp.circles[0].layer, Layer::Fabrication);
    }

    #[test]
    fn grid_array_fails_generation() {
        let spec = FootprintSpec {
            pads: vec![PadArraySpec {
                topology: Topology::Grid,
                ..pads(4)
            }],
            ..FootprintSpec::default()
        };
        assert!(generate("BGA", &spec, &Config::default()).is_err());
    }
}
