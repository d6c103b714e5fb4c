//! Boolean difference of outline paths against clearance rectangles.
//!
//! Floating-point polygon clipping is not robust, so every coordinate is
//! quantized onto an integer grid before clipping and mapped back afterwards.
//! Intersection parameters along a segment are kept as exact rationals.
//!
//! # Semantics
//!
//! The clip area is the union of all clip rectangles (non-zero winding).
//!
//! - **Open subjects** are polylines. The result is every piece of the
//!   polyline that lies outside the clip area, as open paths.
//! - **Closed subjects** are polygon regions (non-zero winding). The result is
//!   the outline of `subject - clip` as closed paths. Region subtraction
//!   requires axis-aligned edges; a closed subject with a slanted edge is cut
//!   along its boundary instead and its surviving pieces are returned as open
//!   paths.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::trace;

use super::{Rect, Vec2};

/// A point on the integer clipping grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point64 {
    /// X coordinate (grid units).
    pub x: i64,
    /// Y coordinate (grid units).
    pub y: i64,
}

impl Point64 {
    /// Creates a new grid point.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A path on the integer clipping grid.
pub type Path64 = Vec<Point64>;

/// An axis-aligned rectangle on the integer clipping grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect64 {
    /// Minimum X (grid units).
    pub min_x: i64,
    /// Minimum Y (grid units).
    pub min_y: i64,
    /// Maximum X (grid units).
    pub max_x: i64,
    /// Maximum Y (grid units).
    pub max_y: i64,
}

impl Rect64 {
    /// Creates a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point64, b: Point64) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Returns true if the rectangle has no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Returns the rectangle as a closed path.
    #[must_use]
    pub fn to_path(&self) -> Path64 {
        vec![
            Point64::new(self.min_x, self.min_y),
            Point64::new(self.max_x, self.min_y),
            Point64::new(self.max_x, self.max_y),
            Point64::new(self.min_x, self.max_y),
        ]
    }

    /// Tests a doubled-coordinate point for strict containment.
    fn contains_doubled(&self, x2: i128, y2: i128) -> bool {
        x2 > 2 * i128::from(self.min_x)
            && x2 < 2 * i128::from(self.max_x)
            && y2 > 2 * i128::from(self.min_y)
            && y2 < 2 * i128::from(self.max_y)
    }
}

/// Result of a boolean difference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipResult {
    /// Closed result paths (last point connects back to the first).
    pub closed: Vec<Path64>,
    /// Open result paths.
    pub open: Vec<Path64>,
}

/// Polygon boolean difference against a set of rectangles.
pub trait BooleanDifference {
    /// Subtracts the union of `clips` from the subject paths.
    fn subtract(
        &self,
        open_subjects: &[Path64],
        closed_subjects: &[Path64],
        clips: &[Rect64],
    ) -> ClipResult;
}

/// Integer-grid clipper for axis-aligned clip rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridClipper {
    scale: f64,
}

impl Default for GridClipper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALE)
    }
}

impl GridClipper {
    /// Grid units per millimetre (1 µm resolution).
    pub const DEFAULT_SCALE: f64 = 1000.0;

    /// Creates a clipper with the given grid units per millimetre.
    #[must_use]
    pub const fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Grid units per millimetre.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Snaps a point onto the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn quantize(&self, p: Vec2) -> Point64 {
        Point64::new(
            (p.x * self.scale).round() as i64,
            (p.y * self.scale).round() as i64,
        )
    }

    /// Maps a grid point back to millimetres.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dequantize(&self, p: Point64) -> Vec2 {
        Vec2::new(p.x as f64 / self.scale, p.y as f64 / self.scale)
    }

    /// Snaps a path onto the grid.
    #[must_use]
    pub fn quantize_path(&self, points: &[Vec2]) -> Path64 {
        points.iter().map(|p| self.quantize(*p)).collect()
    }

    /// Snaps a rectangle onto the grid.
    #[must_use]
    pub fn quantize_rect(&self, rect: &Rect) -> Rect64 {
        Rect64::from_corners(self.quantize(rect.min), self.quantize(rect.max))
    }
}

impl BooleanDifference for GridClipper {
    fn subtract(
        &self,
        open_subjects: &[Path64],
        closed_subjects: &[Path64],
        clips: &[Rect64],
    ) -> ClipResult {
        let clips: Vec<Rect64> = clips.iter().copied().filter(|r| !r.is_empty()).collect();
        let mut result = ClipResult::default();

        for path in open_subjects {
            clip_polyline(path, &clips, &mut result.open);
        }

        for path in closed_subjects {
            if path.len() >= 3 && is_axis_aligned(path) {
                subtract_region(path, &clips, &mut result.closed);
            } else {
                clip_ring(path, &clips, &mut result);
            }
        }

        trace!(
            clips = clips.len(),
            closed = result.closed.len(),
            open = result.open.len(),
            "Boolean difference done"
        );
        result
    }
}

// -----------------------------------------------------------------------------
// Segment parameters
// -----------------------------------------------------------------------------

/// Exact rational parameter `num / den` along a segment, `den > 0`.
#[derive(Debug, Clone, Copy)]
struct Param {
    num: i128,
    den: i128,
}

impl Param {
    const ZERO: Self = Self { num: 0, den: 1 };
    const ONE: Self = Self { num: 1, den: 1 };

    fn new(num: i128, den: i128) -> Self {
        if den < 0 {
            Self {
                num: -num,
                den: -den,
            }
        } else {
            Self { num, den }
        }
    }

    fn is_zero(self) -> bool {
        self.num == 0
    }

    fn is_one(self) -> bool {
        self.num == self.den
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Param {}

impl PartialOrd for Param {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Param {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

/// Rounds `n / d` to the nearest integer, `d > 0`.
fn round_div(n: i128, d: i128) -> i128 {
    (2 * n + d).div_euclid(2 * d)
}

/// Point at parameter `t` on segment `a -> b`, rounded onto the grid.
#[allow(clippy::cast_possible_truncation)]
fn lerp(a: Point64, b: Point64, t: Param) -> Point64 {
    if t.is_zero() {
        return a;
    }
    if t.is_one() {
        return b;
    }
    let along = |from: i64, to: i64| {
        let from = i128::from(from);
        let delta = i128::from(to) - from;
        round_div(from * t.den + delta * t.num, t.den) as i64
    };
    Point64::new(along(a.x, b.x), along(a.y, b.y))
}

/// Parameter interval of segment `a -> b` inside the closed rectangle.
///
/// Returns `None` when the segment misses the rectangle or only touches it
/// in a single point.
fn covered_interval(a: Point64, b: Point64, rect: &Rect64) -> Option<(Param, Param)> {
    let ax = i128::from(a.x);
    let ay = i128::from(a.y);
    let dx = i128::from(b.x) - ax;
    let dy = i128::from(b.y) - ay;

    let mut t0 = Param::ZERO;
    let mut t1 = Param::ONE;

    let bounds = [
        (-dx, ax - i128::from(rect.min_x)),
        (dx, i128::from(rect.max_x) - ax),
        (-dy, ay - i128::from(rect.min_y)),
        (dy, i128::from(rect.max_y) - ay),
    ];
    for (p, q) in bounds {
        match p.cmp(&0) {
            Ordering::Equal => {
                if q < 0 {
                    return None;
                }
            }
            Ordering::Less => t0 = t0.max(Param::new(q, p)),
            Ordering::Greater => t1 = t1.min(Param::new(q, p)),
        }
    }

    (t0 < t1).then_some((t0, t1))
}

/// Parameter intervals of segment `a -> b` outside every rectangle.
fn visible_intervals(a: Point64, b: Point64, clips: &[Rect64]) -> Vec<(Param, Param)> {
    let mut covered: Vec<(Param, Param)> = clips
        .iter()
        .filter_map(|rect| covered_interval(a, b, rect))
        .collect();
    covered.sort_by(|l, r| l.0.cmp(&r.0));

    let mut visible = Vec::new();
    let mut cursor = Param::ZERO;
    for (start, end) in covered {
        if start > cursor {
            visible.push((cursor, start));
        }
        cursor = cursor.max(end);
    }
    if cursor < Param::ONE {
        visible.push((cursor, Param::ONE));
    }
    visible
}

// -----------------------------------------------------------------------------
// Open paths
// -----------------------------------------------------------------------------

/// Collects the visible pieces of a polyline.
fn clip_polyline(path: &[Point64], clips: &[Rect64], out: &mut Vec<Path64>) {
    let mut current: Path64 = Vec::new();
    // true while `current` ends exactly at the end of the previous segment
    let mut connected = false;

    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a == b {
            continue;
        }

        let pieces = visible_intervals(a, b, clips);
        if pieces.is_empty() {
            flush(&mut current, out);
            connected = false;
            continue;
        }

        for (t0, t1) in pieces {
            let end = lerp(a, b, t1);
            if t0.is_zero() && connected {
                current.push(end);
            } else {
                flush(&mut current, out);
                current.push(lerp(a, b, t0));
                current.push(end);
            }
            connected = t1.is_one();
        }
        if !connected {
            flush(&mut current, out);
        }
    }
    flush(&mut current, out);
}

fn flush(current: &mut Path64, out: &mut Vec<Path64>) {
    if current.len() >= 2 {
        out.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Cuts a closed path along its boundary.
///
/// An untouched ring stays closed, otherwise the pieces are open and the
/// piece crossing the start point is joined back together.
fn clip_ring(path: &[Point64], clips: &[Rect64], result: &mut ClipResult) {
    let Some(&first) = path.first() else {
        return;
    };
    let mut ring = path.to_vec();
    ring.push(first);

    let mut pieces = Vec::new();
    clip_polyline(&ring, clips, &mut pieces);

    if pieces.len() == 1 && pieces[0] == ring && path.len() >= 3 {
        result.closed.push(path.to_vec());
        return;
    }

    if pieces.len() >= 2 {
        let starts_at_origin = pieces.first().and_then(|p| p.first()) == Some(&first);
        let ends_at_origin = pieces.last().and_then(|p| p.last()) == Some(&first);
        if starts_at_origin && ends_at_origin {
            if let Some(mut tail) = pieces.pop() {
                tail.extend(pieces[0].iter().skip(1).copied());
                pieces[0] = tail;
            }
        }
    }
    result.open.extend(pieces);
}

// -----------------------------------------------------------------------------
// Closed paths
// -----------------------------------------------------------------------------

fn is_axis_aligned(path: &[Point64]) -> bool {
    path.iter()
        .zip(path.iter().cycle().skip(1))
        .all(|(a, b)| a.x == b.x || a.y == b.y)
}

/// Non-zero winding test for a doubled-coordinate point.
///
/// Only vertical edges cross the horizontal ray; the point never lies on a
/// vertex row so no tie-breaking is needed.
fn winding_doubled(path: &[Point64], x2: i128, y2: i128) -> i32 {
    let mut winding = 0;
    for (a, b) in path.iter().zip(path.iter().cycle().skip(1)) {
        if a.x != b.x || 2 * i128::from(a.x) <= x2 {
            continue;
        }
        let (ya, yb) = (2 * i128::from(a.y), 2 * i128::from(b.y));
        if ya < y2 && y2 < yb {
            winding += 1;
        } else if yb < y2 && y2 < ya {
            winding -= 1;
        }
    }
    winding
}

/// Subtracts the clip rectangles from an axis-aligned polygon region.
///
/// The bounding box of the subject is split into cells along every subject
/// and clip coordinate; a cell is kept when its centre is inside the subject
/// and outside every clip. The boundary of the kept cells is traced back into
/// closed paths.
fn subtract_region(path: &[Point64], clips: &[Rect64], out: &mut Vec<Path64>) {
    let (Some(min_x), Some(max_x)) = (
        path.iter().map(|p| p.x).min(),
        path.iter().map(|p| p.x).max(),
    ) else {
        return;
    };
    let (Some(min_y), Some(max_y)) = (
        path.iter().map(|p| p.y).min(),
        path.iter().map(|p| p.y).max(),
    ) else {
        return;
    };

    let mut xs: Vec<i64> = path.iter().map(|p| p.x).collect();
    let mut ys: Vec<i64> = path.iter().map(|p| p.y).collect();
    for rect in clips {
        xs.extend([rect.min_x, rect.max_x]);
        ys.extend([rect.min_y, rect.max_y]);
    }
    xs.retain(|x| (min_x..=max_x).contains(x));
    ys.retain(|y| (min_y..=max_y).contains(y));
    xs.sort_unstable();
    xs.dedup();
    ys.sort_unstable();
    ys.dedup();

    if xs.len() < 2 || ys.len() < 2 {
        return;
    }

    let columns = xs.len() - 1;
    let rows = ys.len() - 1;
    let mut filled = vec![false; columns * rows];
    for j in 0..rows {
        let y2 = i128::from(ys[j]) + i128::from(ys[j + 1]);
        for i in 0..columns {
            let x2 = i128::from(xs[i]) + i128::from(xs[i + 1]);
            filled[j * columns + i] = winding_doubled(path, x2, y2) != 0
                && !clips.iter().any(|r| r.contains_doubled(x2, y2));
        }
    }

    let is_filled = |i: isize, j: isize| -> bool {
        usize::try_from(i)
            .ok()
            .zip(usize::try_from(j).ok())
            .is_some_and(|(i, j)| i < columns && j < rows && filled[j * columns + i])
    };

    // Directed boundary edges with the kept area on their left (y up).
    let mut edges: BTreeMap<(usize, usize), Vec<(usize, usize)>> = BTreeMap::new();
    for j in 0..rows {
        for i in 0..columns {
            if !filled[j * columns + i] {
                continue;
            }
            #[allow(clippy::cast_possible_wrap)]
            let (si, sj) = (i as isize, j as isize);
            if !is_filled(si, sj - 1) {
                edges.entry((i, j)).or_default().push((i + 1, j));
            }
            if !is_filled(si + 1, sj) {
                edges.entry((i + 1, j)).or_default().push((i + 1, j + 1));
            }
            if !is_filled(si, sj + 1) {
                edges.entry((i + 1, j + 1)).or_default().push((i, j + 1));
            }
            if !is_filled(si - 1, sj) {
                edges.entry((i, j + 1)).or_default().push((i, j));
            }
        }
    }

    while let Some(start) = edges.first_key_value().map(|(node, _)| *node) {
        let mut ring = vec![start];
        let mut node = start;
        loop {
            let Some(targets) = edges.get_mut(&node) else {
                break;
            };
            let next = targets.remove(0);
            if targets.is_empty() {
                edges.remove(&node);
            }
            if next == start {
                break;
            }
            ring.push(next);
            node = next;
        }

        let points: Path64 = ring
            .into_iter()
            .map(|(i, j)| Point64::new(xs[i], ys[j]))
            .collect();
        let points = drop_collinear(points);
        if points.len() >= 3 {
            out.push(points);
        }
    }
}

/// Removes vertices lying on the straight line through their neighbours.
fn drop_collinear(points: Path64) -> Path64 {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let kept: Path64 = (0..n)
        .filter(|&k| {
            let prev = points[(k + n - 1) % n];
            let here = points[k];
            let next = points[(k + 1) % n];
            !((prev.x == here.x && here.x == next.x) || (prev.y == here.y && here.y == next.y))
        })
        .map(|k| points[k])
        .collect();

    // start at the smallest vertex so identical input gives identical output
    let Some(start) = kept
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| (p.y, p.x))
        .map(|(k, _)| k)
    else {
        return kept;
    };
    let mut rotated = kept;
    rotated.rotate_left(start);
    rotated
}
