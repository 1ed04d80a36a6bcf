//! Normalized rectangles and terminal dimensions.

use std::fmt;

/// Tolerance for comparing normalized edges.
///
/// Neighbor edges are reattached exactly during propagation, but the far
/// edge of a moved cell is recomputed from `x + width`, which can be off by a
/// few ulps.
pub const EDGE_EPSILON: f64 = 1e-9;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EDGE_EPSILON
}

/// A rectangle in normalized `[0, 1]` coordinates of its enclosing box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const UNIT: Rect = Rect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn x_end(&self) -> f64 {
        self.x + self.width
    }

    pub fn y_end(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Area shared with `other`; zero for rectangles that only touch.
    pub fn overlap(&self, other: &Rect) -> f64 {
        let w = self.x_end().min(other.x_end()) - self.x.max(other.x);
        let h = self.y_end().min(other.y_end()) - self.y.max(other.y);
        w.max(0.0) * h.max(0.0)
    }

    /// Whether the rectangle lies inside the unit square.
    pub fn within_unit(&self) -> bool {
        self.x >= -EDGE_EPSILON
            && self.y >= -EDGE_EPSILON
            && self.x_end() <= 1.0 + EDGE_EPSILON
            && self.y_end() <= 1.0 + EDGE_EPSILON
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}) {:.3}x{:.3}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: u16,
    pub rows: u16,
}

impl TermSize {
    /// Used when the terminal cannot be queried.
    pub const FALLBACK: TermSize = TermSize { cols: 80, rows: 24 };

    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}
