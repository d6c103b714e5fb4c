//! Footprint orientation (position of the pin 1 marker).
//!
//! Each orientation is a quarter-turn remap of the footprint axes. The
//! identity places pin 1 at the bottom-left corner; the other three move it
//! clockwise or counter-clockwise around the body. No orientation mirrors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Vec2;

/// Corner of the body that carries the pin 1 marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Pin 1 at the bottom-left corner, `(x, y) -> (x, y)`.
    #[default]
    BottomLeft,
    /// Pin 1 at the bottom-right corner, `(x, y) -> (y, -x)`.
    BottomRight,
    /// Pin 1 at the top-left corner, `(x, y) -> (-y, x)`.
    TopLeft,
    /// Pin 1 at the top-right corner, `(x, y) -> (-x, -y)`.
    TopRight,
}

impl Orientation {
    /// All orientations, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopLeft,
        Self::TopRight,
    ];

    /// Maps a vector from the local (bottom-left) frame into this orientation.
    #[must_use]
    pub fn apply(self, v: Vec2) -> Vec2 {
        match self {
            Self::BottomLeft => v,
            Self::BottomRight => Vec2::new(v.y, -v.x),
            Self::TopLeft => Vec2::new(-v.y, v.x),
            Self::TopRight => Vec2::new(-v.x, -v.y),
        }
    }

    /// Maps an extent (width, height). Quarter turns swap the axes.
    #[must_use]
    pub const fn apply_size(self, size: Vec2) -> Vec2 {
        if self.is_quarter_turn() {
            size.swapped()
        } else {
            size
        }
    }

    /// Returns true for the two orientations that exchange x and y.
    #[must_use]
    pub const fn is_quarter_turn(self) -> bool {
        matches!(self, Self::BottomRight | Self::TopLeft)
    }

    /// Sign of the pin 1 corner relative to the body centre.
    ///
    /// In KiCad space +y is down, so "bottom-left" is `(-1, +1)`.
    #[must_use]
    pub fn corner_signs(self) -> Vec2 {
        self.apply(Vec2::new(-1.0, 1.0))
    }

    /// Orientation whose pin 1 corner lies at the other end of the rows.
    ///
    /// Mirrored pad arrays number from the far end of the local row axis,
    /// so their pin 1 sits in the corner `apply((+1, +1))`.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::BottomLeft => Self::BottomRight,
            Self::BottomRight => Self::TopRight,
            Self::TopRight => Self::TopLeft,
            Self::TopLeft => Self::BottomLeft,
        }
    }

    /// Orientation reached after `turns` steps of `(x, y) -> (y, -x)`.
    ///
    /// Used by quad arrays, whose four sides are the first side turned by
    /// zero to three quarter turns.
    #[must_use]
    pub const fn from_quarter_turns(turns: usize) -> Self {
        match turns % 4 {
            0 => Self::BottomLeft,
            1 => Self::BottomRight,
            2 => Self::TopRight,
            _ => Self::TopLeft,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BottomLeft => write!(f, "bottom-left"),
            Self::BottomRight => write!(f, "bottom-right"),
            Self::TopLeft => write!(f, "top-left"),
            Self::TopRight => write!(f, "top-right"),
        }
    }
}
