//! Footprint description and generated geometry.
//!
//! A [`FootprintSpec`] is the fully resolved, immutable description of one
//! footprint (inheritance already applied). [`generate`] turns it into a
//! [`GeneratedFootprint`]: placed pads plus drawable segments per layer.
//!
//! # Pipeline
//!
//! 1. [`layout`] places every pad array ([`PlacedPad`])
//! 2. [`silkscreen`] cuts the pad clearances out of the body outline
//! 3. [`outline`] adds the courtyard and fabrication rectangles
//!
//! All lengths are millimetres in KiCad footprint space (+y down).

pub mod generate;
pub mod layout;
pub mod numbering;
pub mod outline;
pub mod silkscreen;

pub use generate::{generate, BodyBox, Circle, GeneratedFootprint};
pub use layout::{layout, PadLayers, PlacedPad};
pub use numbering::{logical_index, Slot};
pub use silkscreen::{ClearanceShape, OutlineGeometry};

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{Orientation, Vec2, Vec3};

/// Rectangular pad.
pub const RECTANGLE: f64 = 0.0;
/// Rounded rectangle with 5% corner radius.
pub const ROUNDRECT5: f64 = 0.05;
/// Rounded rectangle with 10% corner radius.
pub const ROUNDRECT10: f64 = 0.1;
/// Rounded rectangle with 25% corner radius (KiCad default).
pub const ROUNDRECT: f64 = 0.25;
/// Circle, or oval if width and height differ.
pub const CIRCLE: f64 = 0.5;

/// Through-hole or SMD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FootprintType {
    /// Through-hole if at least one pad array has copper and a drill.
    #[default]
    Detect,
    /// Through-hole footprint.
    #[serde(alias = "through hole")]
    ThroughHole,
    /// Surface-mount footprint.
    Smd,
}

/// Package body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Body {
    /// Body size. The z component is the height of the 3D model.
    pub size: Vec3,
    /// Body offset from the footprint position.
    pub offset: Vec3,
}

/// Accepts `[x, y, z]` or `{ "size": [x, y, z], "offset": [x, y, z] }`.
impl<'de> Deserialize<'de> for Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Full {
            #[serde(default)]
            size: Vec3,
            #[serde(default)]
            offset: Vec3,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Size(Vec3),
            Full(Full),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Size(size) => Self {
                size,
                offset: Vec3::default(),
            },
            Repr::Full(full) => Self {
                size: full.size,
                offset: full.offset,
            },
        })
    }
}

/// Pin 1 marker style on the silkscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerStyle {
    /// Closed body outline, no marker.
    None,
    /// Gap in the outline plus a dot at the pin 1 corner.
    #[default]
    Dot,
}

/// Silkscreen settings of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SilkscreenSpec {
    /// Generate a silkscreen outline.
    pub enabled: bool,
    /// Pin 1 marker.
    pub marker: MarkerStyle,
    /// Margin around the body.
    pub margin: Vec2,
    /// Offset of the outline.
    pub offset: Vec2,
}

impl Default for SilkscreenSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            marker: MarkerStyle::Dot,
            margin: Vec2::ZERO,
            offset: Vec2::ZERO,
        }
    }
}

/// Courtyard or fabrication outline settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineSpec {
    /// Generate the outline.
    pub enabled: bool,
    /// Margin around the body.
    pub margin: Vec2,
    /// Offset of the outline.
    pub offset: Vec2,
}

impl Default for OutlineSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            margin: Vec2::ZERO,
            offset: Vec2::ZERO,
        }
    }
}

/// Footprint attributes passed through to the emitters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// Exclude from bill of materials.
    pub exclude_from_bom: bool,
    /// Exclude from position files.
    pub exclude_from_pos_files: bool,
    /// Allow solder mask bridges between pads.
    pub allow_solder_mask_bridges: bool,
}

/// Pad-array topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// One row of pads.
    #[default]
    Single,
    /// Two parallel rows (DIP, SOIC).
    Dual,
    /// Four rows around a rectangle (QFP, QFN).
    Quad,
    /// Matrix of pads (BGA). Not supported by the layout engine.
    Grid,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Dual => write!(f, "dual"),
            Self::Quad => write!(f, "quad"),
            Self::Grid => write!(f, "grid"),
        }
    }
}

/// Pad numbering scheme of multi-row arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberingScheme {
    /// Counter-clockwise around the package.
    #[default]
    Circular,
    /// Both rows of a column before the next column (zig-zag).
    #[serde(alias = "zigzag")]
    Columns,
    /// All of row 1, then all of row 2.
    Rows,
    /// Circular with two neighbouring pads sharing one number, same as
    /// setting [`PadArraySpec::double`].
    Double,
}

/// Board side of SMD pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// Top side.
    #[default]
    Front,
    /// Bottom side.
    Back,
}

/// A pad or a procedurally generated group of pads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PadArraySpec {
    /// Array topology.
    #[serde(rename = "type")]
    pub topology: Topology,

    /// Centre of the array relative to the footprint position.
    pub position: Vec2,

    /// Distance between pad rows. `x` separates dual rows and quad rows
    /// 1/3, `y` separates quad rows 2/4.
    pub distance: Vec2,

    /// Pitch between neighbouring pads.
    pub pitch: f64,

    /// Shift of row 2 along the pitch axis (staggered dual rows).
    pub shift: f64,

    /// Copper size.
    pub size: Vec2,

    /// Copper offset relative to the array position.
    pub offset: Vec2,

    /// Shape factor, see [`RECTANGLE`], [`ROUNDRECT`] and [`CIRCLE`].
    #[serde(deserialize_with = "deserialize_shape")]
    pub shape: f64,

    /// Drill size. Zero means no drill (SMD pad).
    pub drill_size: Vec2,

    /// Drill offset relative to the array position.
    pub drill_offset: Vec2,

    /// Copper clearance.
    pub clearance: f64,

    /// Solder mask margin.
    pub mask_margin: f64,

    /// Board side of SMD pads. Also accepts `"back": true`.
    #[serde(alias = "back", deserialize_with = "deserialize_side")]
    pub side: Side,

    /// Open the solder mask.
    pub mask: bool,

    /// Apply solder paste.
    pub paste: bool,

    /// Total number of pads in the array.
    pub count: i64,

    /// Pin 1 on the other end of the rows.
    pub mirror: bool,

    /// Numbering scheme for multi-row arrays.
    pub numbering: NumberingScheme,

    /// Two neighbouring pads share one number.
    pub double: bool,

    /// Number of the first pad.
    pub number: i64,

    /// Number increment between pads.
    pub increment: i64,

    /// Explicit pad names indexed by logical pad index. An empty name
    /// removes the pad.
    pub names: Vec<String>,
}

impl Default for PadArraySpec {
    fn default() -> Self {
        Self {
            topology: Topology::Single,
            position: Vec2::ZERO,
            distance: Vec2::ZERO,
            pitch: 0.0,
            shift: 0.0,
            size: Vec2::ZERO,
            offset: Vec2::ZERO,
            shape: ROUNDRECT,
            drill_size: Vec2::ZERO,
            drill_offset: Vec2::ZERO,
            clearance: 0.0,
            mask_margin: 0.0,
            side: Side::Front,
            mask: true,
            paste: true,
            count: 1,
            mirror: false,
            numbering: NumberingScheme::Circular,
            double: false,
            number: 1,
            increment: 1,
            names: Vec::new(),
        }
    }
}

impl PadArraySpec {
    /// True if the pads have copper.
    #[must_use]
    pub fn has_pad(&self) -> bool {
        self.size.is_positive()
    }

    /// True if the pads are drilled.
    #[must_use]
    pub fn has_drill(&self) -> bool {
        self.drill_size.is_positive()
    }

    /// Name of the pad with the given logical index, `None` if the pad does
    /// not exist.
    #[must_use]
    pub fn pad_name(&self, index: usize) -> Option<String> {
        match self.names.get(index) {
            Some(name) if name.is_empty() => None,
            Some(name) => Some(name.clone()),
            None => {
                let index = i64::try_from(index).unwrap_or(i64::MAX);
                let number = self
                    .number
                    .saturating_add(index.saturating_mul(self.increment));
                Some(number.to_string())
            }
        }
    }
}

/// Accepts a side name or the `back` flag.
fn deserialize_side<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Side, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Back(bool),
        Side(Side),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Back(true) => Side::Back,
        Repr::Back(false) => Side::Front,
        Repr::Side(side) => side,
    })
}

/// Accepts the settings object or a plain on/off flag.
fn deserialize_silkscreen<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SilkscreenSpec, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Enabled(bool),
        Full(SilkscreenSpec),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Enabled(enabled) => SilkscreenSpec {
            enabled,
            ..SilkscreenSpec::default()
        },
        Repr::Full(spec) => spec,
    })
}

fn deserialize_shape<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Factor(f64),
        Name(String),
    }

    match Shape::deserialize(deserializer)? {
        Shape::Factor(factor) => Ok(factor),
        Shape::Name(name) => match name.as_str() {
            "rect" | "rectangle" => Ok(RECTANGLE),
            "roundrect" => Ok(ROUNDRECT),
            "roundrect10" => Ok(ROUNDRECT10),
            "roundrect5" => Ok(ROUNDRECT5),
            "circle" | "oval" => Ok(CIRCLE),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["rect", "roundrect", "roundrect10", "roundrect5", "circle", "oval"],
            )),
        },
    }
}

/// Accepts a flat `[x0, y0, x1, y1, ...]` list. A trailing odd value is
/// ignored.
fn deserialize_points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec2>, D::Error> {
    let values = Vec::<f64>::deserialize(deserializer)?;
    Ok(values
        .chunks_exact(2)
        .map(|xy| Vec2::new(xy[0], xy[1]))
        .collect())
}

const fn default_shape_width() -> f64 {
    0.1
}

/// Auxiliary line or polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineSpec {
    /// Target layer name, e.g. `F.SilkS`.
    pub layer: String,
    /// Stroke width.
    #[serde(default = "default_shape_width")]
    pub width: f64,
    /// Polyline points.
    #[serde(default, deserialize_with = "deserialize_points")]
    pub points: Vec<Vec2>,
}

/// Auxiliary rectangle given by two corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectangleSpec {
    /// Target layer name.
    pub layer: String,
    /// Stroke width.
    #[serde(default = "default_shape_width")]
    pub width: f64,
    /// First corner.
    pub p1: Vec2,
    /// Opposite corner.
    pub p2: Vec2,
}

/// Auxiliary circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircleSpec {
    /// Target layer name.
    pub layer: String,
    /// Stroke width.
    #[serde(default = "default_shape_width")]
    pub width: f64,
    /// Fill the circle.
    #[serde(default)]
    pub fill: bool,
    /// Centre point.
    #[serde(default)]
    pub center: Vec2,
    /// Radius.
    #[serde(default = "default_circle_radius")]
    pub radius: f64,
}

const fn default_circle_radius() -> f64 {
    0.5
}

/// Fully resolved description of one footprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FootprintSpec {
    /// Templates are only inherited from, never generated.
    #[serde(rename = "template")]
    pub is_template: bool,

    /// Footprint description.
    pub description: String,

    /// Through-hole or SMD.
    #[serde(rename = "type")]
    pub kind: FootprintType,

    /// Global position, applies to everything.
    pub position: Vec2,

    /// Package body.
    pub body: Body,

    /// Additional body offset, added to the offset given with the body.
    pub offset: Vec3,

    /// Margin added around the body by all three outlines, on top of
    /// their own margins.
    pub margin: Vec2,

    /// Position of the pin 1 marker.
    pub orientation: Orientation,

    /// Silkscreen outline. `false` disables it.
    #[serde(deserialize_with = "deserialize_silkscreen")]
    pub silkscreen: SilkscreenSpec,

    /// Courtyard outline.
    pub courtyard: OutlineSpec,

    /// Fabrication layer outline.
    pub fabrication: OutlineSpec,

    /// Exclude from bill of materials.
    pub exclude_from_bom: bool,

    /// Exclude from position files.
    pub exclude_from_pos_files: bool,

    /// Allow solder mask bridges between pads.
    pub allow_solder_mask_bridges: bool,

    /// Pad arrays.
    pub pads: Vec<PadArraySpec>,

    /// Auxiliary lines.
    pub lines: Vec<LineSpec>,

    /// Auxiliary rectangles.
    pub rectangles: Vec<RectangleSpec>,

    /// Auxiliary circles.
    pub circles: Vec<CircleSpec>,
}

impl FootprintSpec {
    /// True if the body has a positive footprint area.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.size.xy().is_positive()
    }

    /// Body offset from the footprint position.
    #[must_use]
    pub fn body_offset(&self) -> Vec3 {
        Vec3::new(
            self.body.offset.x + self.offset.x,
            self.body.offset.y + self.offset.y,
            self.body.offset.z + self.offset.z,
        )
    }

    /// True if pin 1 sits at the far end of the first pad array's rows.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.pads.first().is_some_and(|pads| pads.mirror)
    }

    /// Attributes passed through to the emitters.
    #[must_use]
    pub const fn attributes(&self) -> Attributes {
        Attributes {
            exclude_from_bom: self.exclude_from_bom,
            exclude_from_pos_files: self.exclude_from_pos_files,
            allow_solder_mask_bridges: self.allow_solder_mask_bridges,
        }
    }

    /// Resolves [`FootprintType::Detect`].
    #[must_use]
    pub fn resolved_kind(&self) -> FootprintType {
        match self.kind {
            FootprintType::Detect => {
                if self.pads.iter().any(|p| p.has_pad() && p.has_drill()) {
                    FootprintType::ThroughHole
                } else {
                    FootprintType::Smd
                }
            }
            kind => kind,
        }
    }
}

/// Drawing layer of a generated segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Layer {
    /// Front silkscreen.
    Silkscreen,
    /// Front fabrication layer.
    Fabrication,
    /// Front courtyard.
    Courtyard,
    /// Any other layer, by name.
    Named(String),
}

impl Layer {
    /// Maps a KiCad layer name onto a layer.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "F.SilkS" | "F.Silkscreen" => Self::Silkscreen,
            "F.Fab" => Self::Fabrication,
            "F.CrtYd" | "F.Courtyard" => Self::Courtyard,
            other => Self::Named(other.to_string()),
        }
    }
}

/// Whether a segment came from a closed or an open path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PathKind {
    /// Open polyline.
    Open,
    /// Closed ring; its last segment returns to the first point.
    Closed,
}

/// A drawable line segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleSegment {
    /// Start point.
    pub start: Vec2,
    /// End point.
    pub end: Vec2,
    /// Stroke width.
    pub width: f64,
    /// Target layer.
    pub layer: Layer,
    /// Kind of the path the segment belongs to.
    pub origin: PathKind,
}

/// Splits a path into segments. Closed paths wrap from the last point back
/// to the first.
#[must_use]
pub fn path_segments(
    points: &[Vec2],
    kind: PathKind,
    width: f64,
    layer: &Layer,
) -> Vec<VisibleSegment> {
    let count = points.len();
    let segment_count = match kind {
        PathKind::Open => count.saturating_sub(1),
        PathKind::Closed if count >= 2 => count,
        PathKind::Closed => 0,
    };
    (0..segment_count)
        .map(|i| VisibleSegment {
            start: points[i],
            end: points[(i + 1) % count],
            width,
            layer: layer.clone(),
            origin: kind,
        })
        .collect()
}
