//! VRML box model of the package body.
//!
//! KiCad scales VRML models by 0.1 inch per unit, so coordinates are
//! divided by 2.54. VRML has +y up, the footprint has +y down.

use std::fmt::Write;

use crate::footprint::BodyBox;
use crate::geometry::{format_number as num, Vec3};

/// File extension of VRML models.
pub const EXTENSION: &str = "wrl";

/// Millimetres per VRML unit.
const MM_PER_UNIT: f64 = 2.54;

/// Triangles of the box, indices into the corner list.
const FACES: &str = "3,0,2,-1,3,1,0,-1,6,5,7,-1,6,4,5,-1,1,4,0,-1,1,5,4,-1,\
                     7,2,6,-1,7,3,2,-1,2,4,6,-1,2,0,4,-1,7,1,3,-1,7,5,1";

const HEADER: &str = "#VRML V2.0 utf8
Shape {
\tappearance Appearance {material DEF mat Material {
\t\tambientIntensity 0.293
\t\tdiffuseColor 0.148 0.145 0.145
\t\tspecularColor 0.18 0.168 0.16
\t\temissiveColor 0.0 0.0 0.0
\t\ttransparency 0.0
\t\tshininess 0.35
\t\t}
\t}
}
";

/// Corner `i` of the box: bit 0 selects +x, bit 1 +y, bit 2 the top face.
fn corner(body: &BodyBox, i: usize) -> Vec3 {
    let center = Vec3::new(body.center.x, -body.center.y, body.center.z);
    let fx = if i & 1 == 0 { -0.5 } else { 0.5 };
    let fy = if i & 2 == 0 { -0.5 } else { 0.5 };
    let fz = if i & 4 == 0 { 0.0 } else { 1.0 };
    Vec3::new(
        (center.x + body.size.x * fx) / MM_PER_UNIT,
        (center.y + body.size.y * fy) / MM_PER_UNIT,
        (center.z + body.size.z * fz) / MM_PER_UNIT,
    )
}

/// Writes a box model for the body.
#[must_use]
pub fn write_box(body: &BodyBox) -> String {
    let points: Vec<String> = (0..8)
        .map(|i| {
            let p = corner(body, i);
            format!("{} {} {}", num(p.x), num(p.y), num(p.z))
        })
        .collect();

    let mut s = String::from(HEADER);
    let _ = write!(
        s,
        "Shape {{\n\tgeometry IndexedFaceSet {{\n\t\tcreaseAngle 0.50\n\t\tcoordIndex [{FACES}]\n\
         \t\tcoord Coordinate {{point [{}]}}\n\t}}\n\tappearance Appearance {{material USE mat}}\n}}\n",
        points.join(",")
    );
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_corners_in_inch_tenths() {
        let body = BodyBox {
            center: Vec3::new(0.0, 2.54, 0.0),
            size: Vec3::new(5.08, 2.54, 2.54),
        };
        let close = |a: Vec3, b: Vec3| {
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 && (a.z - b.z).abs() < 1e-9
        };
        assert!(close(corner(&body, 0), Vec3::new(-1.0, -1.5, 0.0)));
        assert!(close(corner(&body, 7), Vec3::new(1.0, -0.5, 1.0)));
    }

    #[test]
    fn writes_complete_shape() {
        let body = BodyBox {
            center: Vec3::default(),
            size: Vec3::new(2.54, 2.54, 2.54),
        };
        let text = write_box(&body);
        assert!(text.starts_with("#VRML V2.0 utf8\n"));
        assert!(text.contains("coordIndex [3,0,2,-1,"));
        assert!(text.contains("point [-0.5 -0.5 0,0.5 -0.5 0,"));
        assert!(text.contains("appearance Appearance {material USE mat}"));
        assert_eq!(text.matches('{').count(), text.matches('}').count());
    }
}
