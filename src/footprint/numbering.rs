//! Mapping from physical pad slots to logical pad indices.
//!
//! The logical index selects the pad name (explicit name table entry or
//! `number + index * increment`). It is a pure function of the slot, the
//! array shape and the numbering options, so it can be tested without any
//! geometry.

use super::NumberingScheme;

/// Physical position of a pad inside an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Row (0 for single rows, 0..2 for dual rows, 0..4 for quad sides).
    pub row: usize,
    /// Position along the row, in advance direction.
    pub column: usize,
}

impl Slot {
    /// Creates a new slot.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Logical pad index of a slot.
///
/// `rows` is the number of rows of the array (1, 2 or 4) and `count` the
/// total number of pads. Each row holds `count / rows` pads.
///
/// - one row: sequential
/// - two rows: `scheme` decides (circular, columns or rows)
/// - four rows: sequential around the perimeter
///
/// `mirror` reverses the column order before numbering. `double` (or the
/// [`NumberingScheme::Double`] scheme) lets two neighbouring slots share one
/// index: consecutive indices in single and quad arrays, the two pads of a
/// column in dual arrays.
#[must_use]
pub fn logical_index(
    slot: Slot,
    rows: usize,
    count: usize,
    scheme: NumberingScheme,
    mirror: bool,
    double: bool,
) -> usize {
    let double = double || scheme == NumberingScheme::Double;
    let per_row = count / rows.max(1);
    let k = if mirror {
        per_row.saturating_sub(1).saturating_sub(slot.column)
    } else {
        slot.column
    };

    if rows == 2 {
        if double {
            return k;
        }
        return match (scheme, slot.row) {
            (NumberingScheme::Columns, 0) => 2 * k,
            (NumberingScheme::Columns, _) => 2 * k + 1,
            (_, 0) => k,
            (NumberingScheme::Circular | NumberingScheme::Double, _) => {
                count.saturating_sub(1).saturating_sub(k)
            }
            (NumberingScheme::Rows, _) => per_row + k,
        };
    }

    let index = slot.row * per_row + k;
    if double {
        index / 2
    } else {
        index
    }
}
