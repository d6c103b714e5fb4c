//! KiCad footprint (`.kicad_mod`) writer.
//!
//! # Format
//!
//! ```text
//! (footprint "NAME" (version 20221018) (generator footprint_tool) (layer "F.Cu")
//!   (descr "...")
//!   (attr smd)
//!   (fp_text ...)
//!   (fp_line (start x y) (end x y) (stroke (width w) (type solid)) (layer "F.SilkS"))
//!   (pad "1" smd roundrect (at x y) (size w h) (layers "F.Cu" "F.Paste" "F.Mask") ...)
//!   (model "NAME.wrl" ...)
//! )
//! ```
//!
//! Coordinates are written in millimetres with at most six decimals.

use std::fmt::Write;

use crate::footprint::{
    Circle, FootprintType, GeneratedFootprint, Layer, PadLayers, PlacedPad, Side, VisibleSegment,
    CIRCLE, RECTANGLE, ROUNDRECT,
};
use crate::geometry::{format_number as num, Vec2};

/// File format version written into the header.
const FORMAT_VERSION: u32 = 20_221_018;

/// File extension of KiCad footprints.
pub const EXTENSION: &str = "kicad_mod";

fn xy(v: Vec2) -> String {
    format!("{} {}", num(v.x), num(v.y))
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// KiCad name of a drawing layer.
#[must_use]
pub fn layer_name(layer: &Layer) -> &str {
    match layer {
        Layer::Silkscreen => "F.SilkS",
        Layer::Fabrication => "F.Fab",
        Layer::Courtyard => "F.CrtYd",
        Layer::Named(name) => name,
    }
}

/// Writes a complete footprint.
#[must_use]
pub fn write_footprint(footprint: &GeneratedFootprint) -> String {
    let mut s = String::new();
    let name = quoted(&footprint.name);

    let _ = writeln!(
        s,
        "(footprint {name} (version {FORMAT_VERSION}) (generator footprint_tool) (layer \"F.Cu\")"
    );
    if !footprint.description.is_empty() {
        let _ = writeln!(s, "  (descr {})", quoted(&footprint.description));
    }

    let mut attr = match footprint.kind {
        FootprintType::Smd => "smd".to_string(),
        _ => "through_hole".to_string(),
    };
    if footprint.attributes.exclude_from_pos_files {
        attr.push_str(" exclude_from_pos_files");
    }
    if footprint.attributes.exclude_from_bom {
        attr.push_str(" exclude_from_bom");
    }
    if footprint.attributes.allow_solder_mask_bridges {
        attr.push_str(" allow_soldermask_bridges");
    }
    let _ = writeln!(s, "  (attr {attr})");

    let _ = writeln!(
        s,
        "  (fp_text reference \"REF**\" (at 0 0) (layer \"F.SilkS\") (effects (font (size 1 1) (thickness 0.15))))"
    );
    let _ = writeln!(
        s,
        "  (fp_text value {name} (at 0 0) (layer \"F.Fab\") (effects (font (size 1 1) (thickness 0.15))))"
    );

    for segment in &footprint.segments {
        write_line(&mut s, segment);
    }
    for circle in &footprint.circles {
        write_circle(&mut s, circle);
    }
    for pad in &footprint.pads {
        write_pad(&mut s, pad);
    }

    if footprint.body.is_some() {
        let model = quoted(&format!("{}.{}", footprint.name, crate::vrml::EXTENSION));
        let _ = writeln!(
            s,
            "  (model {model} (offset (xyz 0 0 0)) (scale (xyz 1 1 1)) (rotate (xyz 0 0 0)))"
        );
    }

    s.push_str(")\n");
    s
}

fn write_line(s: &mut String, segment: &VisibleSegment) {
    let _ = writeln!(
        s,
        "  (fp_line (start {}) (end {}) (stroke (width {}) (type solid)) (layer {}))",
        xy(segment.start),
        xy(segment.end),
        num(segment.width),
        quoted(layer_name(&segment.layer)),
    );
}

fn write_circle(s: &mut String, circle: &Circle) {
    let end = circle.center + Vec2::new(circle.radius, 0.0);
    let _ = writeln!(
        s,
        "  (fp_circle (center {}) (end {}) (stroke (width {}) (type solid)) (fill {}) (layer {}))",
        xy(circle.center),
        xy(end),
        num(circle.width),
        if circle.fill { "solid" } else { "none" },
        quoted(layer_name(&circle.layer)),
    );
}

/// Pad shape keyword and optional corner ratio.
fn pad_shape(shape: f64, size: Vec2) -> String {
    if shape <= RECTANGLE {
        "rect".to_string()
    } else if shape >= CIRCLE {
        if (size.x - size.y).abs() < f64::EPSILON {
            "circle".to_string()
        } else {
            "oval".to_string()
        }
    } else if (shape - ROUNDRECT).abs() < f64::EPSILON {
        "roundrect".to_string()
    } else {
        format!("roundrect (roundrect_rratio {})", num(shape))
    }
}

fn pad_layers(pad: &PlacedPad) -> String {
    if pad.layers.contains(PadLayers::THROUGH) {
        return "\"*.Cu\" \"*.Mask\"".to_string();
    }
    let prefix = match pad.side {
        Side::Front => "F",
        Side::Back => "B",
    };
    let mut layers = Vec::new();
    if pad.layers.contains(PadLayers::COPPER) {
        layers.push(format!("\"{prefix}.Cu\""));
    }
    if pad.layers.contains(PadLayers::PASTE) {
        layers.push(format!("\"{prefix}.Paste\""));
    }
    if pad.layers.contains(PadLayers::MASK) {
        layers.push(format!("\"{prefix}.Mask\""));
    }
    layers.join(" ")
}

fn write_pad(s: &mut String, pad: &PlacedPad) {
    let has_drill = pad.has_drill();
    let (name, kind, shape, size) = if pad.has_pad() {
        (
            pad.name.as_str(),
            if has_drill { "thru_hole" } else { "smd" },
            pad_shape(pad.shape, pad.size),
            pad.size,
        )
    } else {
        // hole only
        ("", "np_thru_hole", pad_shape(CIRCLE, pad.drill_size), pad.drill_size)
    };

    let _ = write!(
        s,
        "  (pad {} {kind} {shape} (at {}) (size {})",
        quoted(name),
        xy(pad.position),
        xy(size)
    );

    if has_drill {
        let drill = pad.drill_size;
        if (drill.x - drill.y).abs() < f64::EPSILON {
            let _ = write!(s, " (drill {}", num(drill.x));
        } else {
            let _ = write!(s, " (drill oval {}", xy(drill));
        }
        if !pad.pad_offset.is_zero() {
            let _ = write!(s, " (offset {})", xy(pad.pad_offset));
        }
        s.push(')');
    }

    let _ = write!(s, " (layers {})", pad_layers(pad));

    if pad.clearance > 0.0 {
        let _ = write!(s, " (clearance {})", num(pad.clearance));
    }
    if pad.mask_margin != 0.0 {
        let _ = write!(s, " (solder_mask_margin {})", num(pad.mask_margin));
    }
    s.push_str(")\n");
}
