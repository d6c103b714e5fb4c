//! Pad-array layout engine.
//!
//! Every array is laid out in a local frame where pads advance along +x and
//! rows are offset along y. The local frame is then rotated by the footprint
//! orientation and moved to the array position.
//!
//! # Topologies
//!
//! - **Single**: `count` pads centred on the array position.
//! - **Dual**: two rows of `count / 2` pads, `distance.x` apart. Row 2 is the
//!   point mirror of row 1 (offsets negated) and may be shifted along the
//!   pitch axis.
//! - **Quad**: four rows of `count / 4` pads; side `s` is side 0 turned by
//!   `s` quarter turns, so pads on the left and right sides are rotated too.
//! - **Grid**: unsupported.
//!
//! With a drill the array tracks drill centres and the copper is placed at
//! `offset - drill_offset` relative to the drill; without a drill it tracks
//! the copper centres directly.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::numbering::{logical_index, Slot};
use super::{PadArraySpec, Side, Topology};
use crate::error::LayoutError;
use crate::geometry::{Orientation, Rect, Vec2};

bitflags! {
    /// Layers a pad is present on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PadLayers: u8 {
        /// Copper.
        const COPPER = 0b0001;
        /// Solder mask opening.
        const MASK = 0b0010;
        /// Solder paste.
        const PASTE = 0b0100;
        /// Drilled through all layers.
        const THROUGH = 0b1000;
    }
}

/// One pad slot produced by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPad {
    /// Logical pad index.
    pub index: usize,

    /// Pad name, empty for suppressed slots.
    pub name: String,

    /// False if the slot was suppressed (empty name, or neither copper nor
    /// drill).
    pub exists: bool,

    /// Global position: drill centre if drilled, otherwise copper centre.
    pub position: Vec2,

    /// Copper size.
    pub size: Vec2,

    /// Drill size, zero for SMD pads.
    pub drill_size: Vec2,

    /// Copper centre relative to the drill centre.
    pub pad_offset: Vec2,

    /// Shape factor.
    pub shape: f64,

    /// Copper clearance.
    pub clearance: f64,

    /// Solder mask margin.
    pub mask_margin: f64,

    /// Board side.
    pub side: Side,

    /// Layer set.
    pub layers: PadLayers,
}

impl PlacedPad {
    /// True if the pad has copper.
    #[must_use]
    pub fn has_pad(&self) -> bool {
        self.size.is_positive()
    }

    /// True if the pad is drilled.
    #[must_use]
    pub fn has_drill(&self) -> bool {
        self.drill_size.is_positive()
    }

    /// Copper extent.
    #[must_use]
    pub fn copper_rect(&self) -> Option<Rect> {
        self.has_pad()
            .then(|| Rect::centred(self.position + self.pad_offset, self.size))
    }

    /// Drill extent.
    #[must_use]
    pub fn drill_rect(&self) -> Option<Rect> {
        self.has_drill()
            .then(|| Rect::centred(self.position, self.drill_size))
    }

    /// Union of copper and drill extents.
    #[must_use]
    pub fn extent(&self) -> Option<Rect> {
        match (self.copper_rect(), self.drill_rect()) {
            (Some(copper), Some(drill)) => Some(copper.union(drill)),
            (copper, drill) => copper.or(drill),
        }
    }
}

/// One row of an array in the local frame.
struct Row {
    start: Vec2,
    advance: Vec2,
    /// Rotation of pad size and offsets relative to row 0.
    turn: Orientation,
}

/// Lays out one pad array.
///
/// `origin` is the global footprint position. Returns one [`PlacedPad`] per
/// slot, suppressed slots included (`exists == false`), ordered column by
/// column and row by row within a column.
///
/// # Errors
///
/// Returns [`LayoutError::UnsupportedTopology`] for grid arrays.
#[allow(clippy::cast_precision_loss)]
pub fn layout(
    array: &PadArraySpec,
    origin: Vec2,
    orientation: Orientation,
) -> Result<Vec<PlacedPad>, LayoutError> {
    let total = usize::try_from(array.count).unwrap_or(0);
    let rows_per_array = match array.topology {
        Topology::Single => 1,
        Topology::Dual => 2,
        Topology::Quad => 4,
        Topology::Grid => {
            return Err(LayoutError::UnsupportedTopology {
                topology: array.topology,
            })
        }
    };
    let per_row = total / rows_per_array;
    let half_span = array.pitch * (per_row as f64 - 1.0) * 0.5;
    let rows = rows(array, rows_per_array, half_span);

    let has_pad = array.has_pad();
    let has_drill = array.has_drill();
    let track = if has_drill {
        array.drill_offset
    } else {
        array.offset
    };
    let copper_offset = if has_drill && has_pad {
        array.offset - array.drill_offset
    } else {
        Vec2::ZERO
    };
    let layers = if has_drill {
        PadLayers::THROUGH | PadLayers::COPPER | PadLayers::MASK
    } else {
        let mut layers = PadLayers::COPPER;
        layers.set(PadLayers::MASK, array.mask);
        layers.set(PadLayers::PASTE, array.paste);
        layers
    };

    let center = origin + array.position;
    let mut pads = Vec::with_capacity(per_row * rows.len());
    for column in 0..per_row {
        for (r, row) in rows.iter().enumerate() {
            let local = row.start + row.advance * column as f64 + row.turn.apply(track);
            let index = logical_index(
                Slot::new(r, column),
                rows.len(),
                total,
                array.numbering,
                array.mirror,
                array.double,
            );
            let name = array.pad_name(index);
            let exists = name.is_some() && (has_pad || has_drill);

            pads.push(PlacedPad {
                index,
                name: name.unwrap_or_default(),
                exists,
                position: center + orientation.apply(local),
                size: orientation.apply_size(row.turn.apply_size(array.size)),
                drill_size: orientation.apply_size(row.turn.apply_size(array.drill_size)),
                pad_offset: orientation.apply(row.turn.apply(copper_offset)),
                shape: array.shape,
                clearance: array.clearance,
                mask_margin: array.mask_margin,
                side: array.side,
                layers,
            });
        }
    }

    debug!(
        topology = %array.topology,
        count = total,
        placed = pads.iter().filter(|p| p.exists).count(),
        "Laid out pad array"
    );
    Ok(pads)
}

fn rows(array: &PadArraySpec, count: usize, half_span: f64) -> Vec<Row> {
    let advance = Vec2::new(array.pitch, 0.0);
    match count {
        1 => vec![Row {
            start: Vec2::new(-half_span, 0.0),
            advance,
            turn: Orientation::BottomLeft,
        }],
        2 => {
            let d = array.distance.x * 0.5;
            vec![
                Row {
                    start: Vec2::new(-half_span, d),
                    advance,
                    turn: Orientation::BottomLeft,
                },
                Row {
                    start: Vec2::new(-half_span + array.shift, -d),
                    advance,
                    turn: Orientation::TopRight,
                },
            ]
        }
        _ => (0..4)
            .map(|side| {
                let turn = Orientation::from_quarter_turns(side);
                let d = if side % 2 == 0 {
                    array.distance.x
                } else {
                    array.distance.y
                };
                Row {
                    start: turn.apply(Vec2::new(-half_span, d * 0.5)),
                    advance: turn.apply(advance),
                    turn,
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::NumberingScheme;

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-9
    }

    fn single(count: i64, pitch: f64) -> PadArraySpec {
        PadArraySpec {
            count,
            pitch,
            size: Vec2::splat(1.0),
            ..PadArraySpec::default()
        }
    }

    #[test]
    fn single_row_centred() {
        let pads = layout(&single(3, 2.0), Vec2::ZERO, Orientation::BottomLeft).unwrap();
        let xs: Vec<f64> = pads.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![-2.0, 0.0, 2.0]);
        let names: Vec<&str> = pads.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3"]);
        assert!(pads.iter().all(|p| p.exists));
    }

    #[test]
    fn smd_layers_follow_flags() {
        let mut array = single(1, 1.0);
        array.paste = false;
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert_eq!(pads[0].layers, PadLayers::COPPER | PadLayers::MASK);
    }

    #[test]
    fn drilled_pad_tracks_drill_centre() {
        let array = PadArraySpec {
            size: Vec2::new(2.0, 1.0),
            offset: Vec2::new(0.5, 0.0),
            drill_size: Vec2::splat(0.8),
            drill_offset: Vec2::new(0.2, 0.0),
            ..PadArraySpec::default()
        };
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert!(approx(pads[0].position, Vec2::new(0.2, 0.0)));
        assert!(approx(pads[0].pad_offset, Vec2::new(0.3, 0.0)));
        assert!(pads[0].layers.contains(PadLayers::THROUGH));
        let extent = pads[0].extent().unwrap();
        assert!((extent.min.x - -0.5).abs() < 1e-9);
        assert!((extent.max.x - 1.5).abs() < 1e-9);
    }

    #[test]
    fn dual_rows_are_point_mirrored() {
        let array = PadArraySpec {
            topology: Topology::Dual,
            count: 4,
            pitch: 2.54,
            distance: Vec2::new(7.62, 0.0),
            size: Vec2::splat(1.6),
            offset: Vec2::new(0.0, 0.3),
            ..PadArraySpec::default()
        };
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert_eq!(pads.len(), 4);
        // column 0: row 1 then row 2
        assert!(approx(pads[0].position, Vec2::new(-1.27, 3.81 + 0.3)));
        assert!(approx(pads[1].position, Vec2::new(-1.27, -3.81 - 0.3)));
        let names: Vec<&str> = pads.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn dual_shift_moves_second_row() {
        let array = PadArraySpec {
            topology: Topology::Dual,
            count: 4,
            pitch: 2.0,
            distance: Vec2::new(4.0, 0.0),
            shift: 1.0,
            size: Vec2::splat(1.0),
            numbering: NumberingScheme::Columns,
            ..PadArraySpec::default()
        };
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert!(approx(pads[0].position, Vec2::new(-1.0, 2.0)));
        assert!(approx(pads[1].position, Vec2::new(0.0, -2.0)));
        let names: Vec<&str> = pads.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn quad_sides_rotate_pads() {
        let array = PadArraySpec {
            topology: Topology::Quad,
            count: 8,
            pitch: 1.0,
            distance: Vec2::new(6.0, 4.0),
            size: Vec2::new(0.5, 1.5),
            ..PadArraySpec::default()
        };
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert_eq!(pads.len(), 8);

        let by_name = |name: &str| pads.iter().find(|p| p.name == name).unwrap();
        // bottom side, left to right
        assert!(approx(by_name("1").position, Vec2::new(-0.5, 3.0)));
        assert!(approx(by_name("2").position, Vec2::new(0.5, 3.0)));
        // right side, bottom to top, rotated pads
        assert!(approx(by_name("3").position, Vec2::new(2.0, 0.5)));
        assert!(approx(by_name("4").position, Vec2::new(2.0, -0.5)));
        assert_eq!(by_name("3").size, Vec2::new(1.5, 0.5));
        // top side, right to left
        assert!(approx(by_name("5").position, Vec2::new(0.5, -3.0)));
        // left side, top to bottom
        assert!(approx(by_name("7").position, Vec2::new(-2.0, -0.5)));
        assert!(approx(by_name("8").position, Vec2::new(-2.0, 0.5)));
    }

    #[test]
    fn orientation_rotates_array() {
        let array = single(3, 2.0);
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomRight).unwrap();
        let ys: Vec<f64> = pads.iter().map(|p| p.position.y).collect();
        assert_eq!(ys, vec![2.0, 0.0, -2.0]);
        assert!(pads.iter().all(|p| p.position.x.abs() < 1e-12));
    }

    #[test]
    fn grid_is_unsupported() {
        let array = PadArraySpec {
            topology: Topology::Grid,
            count: 16,
            ..PadArraySpec::default()
        };
        assert_eq!(
            layout(&array, Vec2::ZERO, Orientation::BottomLeft),
            Err(LayoutError::UnsupportedTopology {
                topology: Topology::Grid
            })
        );
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        assert!(layout(&single(0, 1.0), Vec2::ZERO, Orientation::TopLeft)
            .unwrap()
            .is_empty());
        assert!(layout(&single(-3, 1.0), Vec2::ZERO, Orientation::TopLeft)
            .unwrap()
            .is_empty());
        let pads = layout(&single(3, -1.0), Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert_eq!(pads.len(), 3);
        assert!((pads[0].position.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_sized_pad_is_suppressed() {
        let array = PadArraySpec {
            count: 2,
            pitch: 1.0,
            ..PadArraySpec::default()
        };
        let pads = layout(&array, Vec2::ZERO, Orientation::BottomLeft).unwrap();
        assert_eq!(pads.len(), 2);
        assert!(pads.iter().all(|p| !p.exists));
    }
}
