//! Geometry primitives: [`Point`] and [`Rect`].
//!
//! Coordinates are `f32` pixels. Widget rectangles live in block-local space;
//! event positions are window space and are converted through
//! [`Block::window_to_block`](crate::block::Block::window_to_block).

use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D position or displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors.
    #[inline]
    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Sum of the absolute components.
    #[inline]
    pub fn manhattan_length(self) -> f32 {
        self.x.abs() + self.y.abs()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Point {
        let len = self.length();
        if len == 0.0 {
            Point::ZERO
        } else {
            Point::new(self.x / len, self.y / len)
        }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point { x: -self.x, y: -self.y }
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f32) -> Point {
        Point { x: self.x * rhs, y: self.y * rhs }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle stored as min/max bounds.
///
/// `contains` is inclusive on all edges, matching how widget hit-testing
/// treats a pointer resting on a border.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Rect {
    /// An empty rectangle at the origin.
    pub const EMPTY: Rect = Rect { xmin: 0.0, ymin: 0.0, xmax: 0.0, ymax: 0.0 };

    /// Create a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { xmin: x, ymin: y, xmax: x + width, ymax: y + height }
    }

    /// Create a rectangle from explicit bounds.
    #[inline]
    pub const fn from_bounds(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.ymax - self.ymin
    }

    #[inline]
    pub fn center(self) -> Point {
        Point::new((self.xmin + self.xmax) * 0.5, (self.ymin + self.ymax) * 0.5)
    }

    /// Whether the point lies inside (edges included).
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// Whether the two rectangles overlap with non-zero area.
    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }

    /// Move the rectangle by `delta`.
    #[inline]
    pub fn translate(self, delta: Point) -> Rect {
        Rect {
            xmin: self.xmin + delta.x,
            ymin: self.ymin + delta.y,
            xmax: self.xmax + delta.x,
            ymax: self.ymax + delta.y,
        }
    }

    /// Grow the rectangle by `margin` on every side.
    #[inline]
    pub fn expand(self, margin: f32) -> Rect {
        Rect {
            xmin: self.xmin - margin,
            ymin: self.ymin - margin,
            xmax: self.xmax + margin,
            ymax: self.ymax + margin,
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Whether the segment `a`-`b` touches this rectangle.
    ///
    /// Either endpoint inside counts, otherwise the segment is tested against
    /// the two diagonals, which is enough for an axis-aligned box.
    pub fn intersects_segment(self, a: Point, b: Point) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }
        let corners = [
            (Point::new(self.xmin, self.ymin), Point::new(self.xmax, self.ymax)),
            (Point::new(self.xmin, self.ymax), Point::new(self.xmax, self.ymin)),
        ];
        corners.iter().any(|&(c, d)| segments_intersect(a, b, c, d))
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Segment/segment intersection, collinear overlaps included.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Point ────────────────────────────────────────────────────────

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, -1.0);
        assert_eq!(a + b, Point::new(4.0, 1.0));
        assert_eq!(a - b, Point::new(-2.0, 3.0));
        assert_eq!(-a, Point::new(-1.0, -2.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
    }

    #[test]
    fn point_normalized_zero_stays_zero() {
        assert_eq!(Point::ZERO.normalized(), Point::ZERO);
    }

    #[test]
    fn point_normalized_vertical() {
        let n = Point::new(0.0, -4.0).normalized();
        assert_eq!(n, Point::new(0.0, -1.0));
        assert_eq!(n.dot(Point::new(0.0, 1.0)), -1.0);
    }

    #[test]
    fn point_manhattan() {
        assert_eq!(Point::new(-3.0, 4.0).manhattan_length(), 7.0);
    }

    // ── Rect ─────────────────────────────────────────────────────────

    #[test]
    fn rect_new_and_size() {
        let r = Rect::new(10.0, 20.0, 100.0, 20.0);
        assert_eq!(r.xmax, 110.0);
        assert_eq!(r.ymax, 40.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 20.0);
        assert_eq!(r.center(), Point::new(60.0, 30.0));
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn rect_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(Rect::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn rect_translate_and_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0).translate(Point::new(5.0, 5.0));
        assert_eq!(a, Rect::from_bounds(5.0, 5.0, 15.0, 15.0));
        let u = a.union(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(u, Rect::from_bounds(0.0, 0.0, 15.0, 15.0));
    }

    // ── Segment intersection ─────────────────────────────────────────

    #[test]
    fn segment_crossing_rect() {
        let r = Rect::new(0.0, 20.0, 100.0, 20.0);
        // Vertical sweep passing straight through.
        assert!(r.intersects_segment(Point::new(50.0, 0.0), Point::new(50.0, 60.0)));
    }

    #[test]
    fn segment_endpoint_inside() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.intersects_segment(Point::new(5.0, 5.0), Point::new(50.0, 50.0)));
    }

    #[test]
    fn segment_missing_rect() {
        let r = Rect::new(0.0, 20.0, 100.0, 20.0);
        assert!(!r.intersects_segment(Point::new(50.0, 0.0), Point::new(50.0, 15.0)));
        assert!(!r.intersects_segment(Point::new(120.0, 0.0), Point::new(120.0, 60.0)));
    }
}
