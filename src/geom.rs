//! Integer geometry: [`Point`] and [`Rectangle`].
//!
//! The axes increase right and down. A [`Rectangle`] is half-open: it
//! contains the points with `min.x <= x < max.x` and `min.y <= y < max.y`.
//! Methods always return well-formed outputs for well-formed inputs.

use core::fmt;
use core::ops;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// An `(x, y)` coordinate pair, usable as a location or a displacement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Shorthand for `Point { x, y }`.
#[inline]
pub const fn pt(x: i32, y: i32) -> Point {
    Point { x, y }
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Vector sum `p + q`.
    #[inline]
    pub const fn add(self, q: Point) -> Point {
        pt(self.x + q.x, self.y + q.y)
    }

    /// Vector difference `p - q`.
    #[inline]
    pub const fn sub(self, q: Point) -> Point {
        pt(self.x - q.x, self.y - q.y)
    }

    /// Scales both coordinates by `k`.
    #[inline]
    pub const fn mul(self, k: i32) -> Point {
        pt(self.x * k, self.y * k)
    }

    /// Divides both coordinates by `k`, truncating toward zero.
    ///
    /// # Panics
    ///
    /// Panics if `k == 0`, like native integer division.
    #[inline]
    pub const fn div(self, k: i32) -> Point {
        pt(self.x / k, self.y / k)
    }

    /// Whether `self` lies inside `r`.
    #[inline]
    pub const fn in_rect(self, r: Rectangle) -> bool {
        r.min.x <= self.x && self.x < r.max.x && r.min.y <= self.y && self.y < r.max.y
    }

    /// Wraps `self` toroidally into `r`.
    ///
    /// Returns the point `q` inside `r` such that `self.x - q.x` is a
    /// multiple of `r.dx()` and `self.y - q.y` is a multiple of `r.dy()`.
    ///
    /// # Panics
    ///
    /// Panics if `r` has zero width or height. The result is meaningless
    /// for other empty rectangles.
    pub fn modulo(self, r: Rectangle) -> Point {
        let (w, h) = (r.dx(), r.dy());
        let p = self.sub(r.min);
        pt(p.x.rem_euclid(w), p.y.rem_euclid(h)).add(r.min)
    }
}

impl ops::Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, q: Point) -> Point {
        Point::add(self, q)
    }
}

impl ops::Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, q: Point) -> Point {
        Point::sub(self, q)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Rectangle
// ---------------------------------------------------------------------------

/// A half-open axis-aligned rectangle.
///
/// Equality via `==` compares fields. Use [`eq_points`](Rectangle::eq_points)
/// to compare covered point sets, under which all empty rectangles are equal.
///
/// The zero value ([`Rectangle::ZERO`]) is both the result of a disjoint
/// [`intersect`](Rectangle::intersect) and the degenerate rectangle at the
/// origin; nothing distinguishes the two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub min: Point,
    pub max: Point,
}

/// Integer midpoint of `a` and `b`, truncated toward zero.
#[inline]
fn midpoint(a: i32, b: i32) -> i32 {
    ((a as i64 + b as i64) / 2) as i32
}

/// Shorthand for `Rectangle::new(x0, y0, x1, y1)`. The result is canonical.
#[inline]
pub const fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Rectangle {
    Rectangle::new(x0, y0, x1, y1)
}

impl Rectangle {
    /// The zero rectangle.
    pub const ZERO: Rectangle = Rectangle {
        min: Point::ZERO,
        max: Point::ZERO,
    };

    /// Builds a rectangle from two corners, swapping coordinates as needed so
    /// the result is well-formed.
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Rectangle {
            min: pt(x0, y0),
            max: pt(x1, y1),
        }
        .canon()
    }

    /// Builds a rectangle from its fields without canonicalizing.
    #[inline]
    pub const fn from_corners(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Width. Negative for rectangles that are not well-formed; wraps when
    /// the corners are further apart than `i32::MAX`.
    #[inline]
    pub const fn dx(&self) -> i32 {
        self.max.x.wrapping_sub(self.min.x)
    }

    /// Height, with the same wrapping as [`dx`](Self::dx).
    #[inline]
    pub const fn dy(&self) -> i32 {
        self.max.y.wrapping_sub(self.min.y)
    }

    /// `(dx, dy)` as a point.
    #[inline]
    pub const fn size(&self) -> Point {
        pt(self.dx(), self.dy())
    }

    /// Whether the rectangle contains no points.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `self` and `s` contain the same set of points.
    pub fn eq_points(&self, s: Rectangle) -> bool {
        *self == s || (self.is_empty() && s.is_empty())
    }

    /// Whether `p` lies inside the rectangle.
    #[inline]
    pub const fn contains(&self, p: Point) -> bool {
        p.in_rect(*self)
    }

    /// Returns the well-formed version of `self`, swapping min and max per
    /// axis where needed. Idempotent.
    pub const fn canon(self) -> Rectangle {
        let (x0, x1) = if self.max.x < self.min.x {
            (self.max.x, self.min.x)
        } else {
            (self.min.x, self.max.x)
        };
        let (y0, y1) = if self.max.y < self.min.y {
            (self.max.y, self.min.y)
        } else {
            (self.min.y, self.max.y)
        };
        Rectangle {
            min: pt(x0, y0),
            max: pt(x1, y1),
        }
    }

    /// Translates the rectangle by `p`.
    #[inline]
    pub const fn add(self, p: Point) -> Rectangle {
        Rectangle {
            min: self.min.add(p),
            max: self.max.add(p),
        }
    }

    /// Translates the rectangle by `-p`.
    #[inline]
    pub const fn sub(self, p: Point) -> Rectangle {
        Rectangle {
            min: self.min.sub(p),
            max: self.max.sub(p),
        }
    }

    /// Shrinks every side by `n`; a negative `n` grows the rectangle.
    ///
    /// If either dimension would become negative, returns the empty
    /// rectangle sitting on the integer midpoint of `self`.
    /// Growing past the `i32` range wraps.
    pub fn inset(self, n: i32) -> Rectangle {
        let twice = 2 * n as i64;
        let collapse_x = (self.max.x as i64 - self.min.x as i64) < twice;
        let collapse_y = (self.max.y as i64 - self.min.y as i64) < twice;
        if collapse_x || collapse_y {
            let c = pt(midpoint(self.min.x, self.max.x), midpoint(self.min.y, self.max.y));
            return Rectangle { min: c, max: c };
        }
        Rectangle {
            min: pt(self.min.x.wrapping_add(n), self.min.y.wrapping_add(n)),
            max: pt(self.max.x.wrapping_sub(n), self.max.y.wrapping_sub(n)),
        }
    }

    /// Largest rectangle contained in both `self` and `s`.
    ///
    /// Both operands are canonicalized first. Returns [`Rectangle::ZERO`]
    /// when they do not overlap.
    pub fn intersect(self, s: Rectangle) -> Rectangle {
        let (r, s) = (self.canon(), s.canon());
        let out = Rectangle {
            min: pt(r.min.x.max(s.min.x), r.min.y.max(s.min.y)),
            max: pt(r.max.x.min(s.max.x), r.max.y.min(s.max.y)),
        };
        if out.is_empty() {
            return Rectangle::ZERO;
        }
        out
    }

    /// Smallest rectangle containing both `self` and `s`.
    ///
    /// An empty operand contributes nothing; if both are empty the result is
    /// [`Rectangle::ZERO`].
    pub fn union(self, s: Rectangle) -> Rectangle {
        match (self.is_empty(), s.is_empty()) {
            (true, true) => Rectangle::ZERO,
            (true, false) => s,
            (false, true) => self,
            (false, false) => Rectangle {
                min: pt(self.min.x.min(s.min.x), self.min.y.min(s.min.y)),
                max: pt(self.max.x.max(s.max.x), self.max.y.max(s.max.y)),
            },
        }
    }

    /// Whether every point of `self` lies in `s`. An empty rectangle is in
    /// every rectangle.
    pub fn in_rect(&self, s: Rectangle) -> bool {
        if self.is_empty() {
            return true;
        }
        s.min.x <= self.min.x
            && self.max.x <= s.max.x
            && s.min.y <= self.min.y
            && self.max.y <= s.max.y
    }

    /// Whether `self` and `s` share at least one point.
    pub fn overlaps(&self, s: Rectangle) -> bool {
        !self.is_empty()
            && !s.is_empty()
            && self.min.x < s.max.x
            && s.min.x < self.max.x
            && self.min.y < s.max.y
            && s.min.y < self.max.y
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    fn samples() -> [Rectangle; 8] {
        [
            rect(0, 0, 10, 10),
            rect(1, 2, 3, 4),
            rect(-5, -5, 5, 5),
            rect(10, 10, 20, 20),
            Rectangle::ZERO,
            Rectangle::from_corners(pt(4, 4), pt(2, 2)),
            rect(3, 0, 4, 100),
            rect(-100, 7, 100, 8),
        ]
    }

    #[test]
    fn point_arithmetic() {
        let p = pt(3, -4);
        assert_eq!(p.add(pt(1, 1)), pt(4, -3));
        assert_eq!(p - pt(3, -4), Point::ZERO);
        assert_eq!(p.mul(3), pt(9, -12));
        assert_eq!(pt(7, -7).div(2), pt(3, -3));
    }

    #[test]
    fn point_display() {
        assert_eq!(format!("{}", pt(3, 4)), "(3,4)");
        assert_eq!(format!("{}", rect(3, 4, 6, 5)), "(3,4)-(6,5)");
    }

    #[test]
    fn rect_constructor_canonicalizes() {
        let r = rect(6, 5, 3, 4);
        assert_eq!(r.min, pt(3, 4));
        assert_eq!(r.max, pt(6, 5));
    }

    #[test]
    fn canon_idempotent() {
        for r in samples() {
            assert_eq!(r.canon().canon(), r.canon());
        }
        let well = rect(1, 2, 3, 4);
        assert_eq!(well.canon(), well);
    }

    #[test]
    fn reversed_rect_is_empty() {
        let r = Rectangle::from_corners(pt(4, 4), pt(2, 2));
        assert!(r.is_empty());
        assert!(!r.canon().is_empty());
    }

    #[test]
    fn intersect_commutes() {
        for r in samples() {
            for s in samples() {
                assert_eq!(r.intersect(s), s.intersect(r), "{r} {s}");
            }
        }
    }

    #[test]
    fn intersect_disjoint_is_zero() {
        let r = rect(0, 0, 10, 10);
        let s = rect(10, 10, 20, 20);
        assert!(!r.overlaps(s));
        assert_eq!(r.intersect(s), Rectangle::ZERO);
        assert!(r.intersect(s).is_empty());
    }

    #[test]
    fn intersect_overlap() {
        assert_eq!(rect(0, 0, 10, 10).intersect(rect(5, -5, 15, 5)), rect(5, 0, 10, 5));
    }

    #[test]
    fn union_contains_both() {
        for r in samples() {
            for s in samples() {
                let u = r.union(s);
                assert!(r.in_rect(u), "{r} not in {u}");
                assert!(s.in_rect(u), "{s} not in {u}");
            }
        }
    }

    #[test]
    fn union_with_empty_returns_other() {
        let r = rect(1, 1, 4, 4);
        assert_eq!(r.union(Rectangle::ZERO), r);
        assert_eq!(Rectangle::ZERO.union(r), r);
        assert_eq!(
            Rectangle::ZERO.union(Rectangle::from_corners(pt(5, 5), pt(1, 1))),
            Rectangle::ZERO
        );
    }

    #[test]
    fn modulo_lands_inside() {
        let rects = [rect(0, 0, 3, 5), rect(-4, 2, 1, 3), rect(10, -10, 17, -2)];
        for r in rects {
            for x in -20..20 {
                for y in -20..20 {
                    let q = pt(x, y).modulo(r);
                    assert!(q.in_rect(r), "{q} not in {r}");
                    assert_eq!((x - q.x) % r.dx(), 0);
                    assert_eq!((y - q.y) % r.dy(), 0);
                }
            }
        }
    }

    #[test]
    fn inset_shrinks_and_grows() {
        let r = rect(0, 0, 10, 6);
        assert_eq!(r.inset(2), rect(2, 2, 8, 4));
        assert_eq!(r.inset(-1), rect(-1, -1, 11, 7));
    }

    #[test]
    fn inset_too_far_collapses_to_center() {
        let r = rect(0, 0, 10, 6);
        let c = r.inset(4);
        assert!(c.is_empty());
        assert_eq!(c.min, pt(5, 3));
        assert_eq!(c.max, pt(5, 3));
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        let c = rect(0, 0, 10, 10).inset(i32::MAX);
        assert_eq!((c.min, c.max), (pt(5, 5), pt(5, 5)));
        let wide = Rectangle::from_corners(pt(i32::MIN, 0), pt(i32::MAX, 1));
        assert_eq!(wide.dx(), -1);
        assert_eq!(wide.dy(), 1);
        let m = Rectangle::from_corners(pt(i32::MAX - 1, 0), pt(i32::MAX, 1)).inset(1);
        assert_eq!(m.min, pt(i32::MAX - 1, 0));
        let grown = rect(0, 0, 1, 1).inset(i32::MIN);
        assert_eq!(grown.max, pt(1i32.wrapping_sub(i32::MIN), 1i32.wrapping_sub(i32::MIN)));
    }

    #[test]
    fn containment_is_half_open() {
        let r = rect(0, 0, 2, 2);
        assert!(pt(0, 0).in_rect(r));
        assert!(pt(1, 1).in_rect(r));
        assert!(!pt(2, 1).in_rect(r));
        assert!(!pt(1, 2).in_rect(r));
        assert!(rect(0, 0, 1, 1).in_rect(r));
        assert!(!rect(0, 0, 3, 1).in_rect(r));
        assert!(Rectangle::ZERO.in_rect(rect(50, 50, 60, 60)));
    }

    #[test]
    fn overlaps_requires_non_empty() {
        let r = rect(0, 0, 4, 4);
        assert!(r.overlaps(rect(3, 3, 5, 5)));
        assert!(!r.overlaps(rect(4, 0, 5, 4)));
        assert!(!r.overlaps(Rectangle::from_corners(pt(1, 1), pt(1, 3))));
    }

    #[test]
    fn eq_points_treats_empties_alike() {
        let a = Rectangle::from_corners(pt(3, 3), pt(3, 9));
        let b = Rectangle::from_corners(pt(-1, 5), pt(-7, 5));
        assert_ne!(a, b);
        assert!(a.eq_points(b));
        assert!(!rect(0, 0, 1, 1).eq_points(rect(0, 0, 1, 2)));
    }

    #[test]
    fn translate() {
        let r = rect(1, 2, 3, 4);
        assert_eq!(r.add(pt(10, 20)), rect(11, 22, 13, 24));
        assert_eq!(r.add(pt(10, 20)).sub(pt(10, 20)), r);
        assert_eq!(r.size(), pt(2, 2));
    }
}
