#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Layout works in abstract *grid cells* (`i32`, may be negative once an
//! origin offset is applied). Viewport state works in *pixels* (`f64`); one
//! grid cell spans `cell_pixel_size` pixels on both axes.

use std::ops::{Add, Sub};

/// A position in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The grid origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by `dx`, `dy`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_sq(self, other: Point) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Squared distance from the grid origin.
    #[inline]
    pub fn norm_sq(self) -> i64 {
        self.distance_sq(Point::ZERO)
    }

    /// Convert to pixels with a uniform scale.
    #[inline]
    pub fn to_pixels(self, cell_pixel_size: f64) -> PixelPoint {
        PixelPoint::new(
            f64::from(self.x) * cell_pixel_size,
            f64::from(self.y) * cell_pixel_size,
        )
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        self.offset(rhs.x, rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// A size in grid cells. Components are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Empty size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create a new size; negative components clamp to zero.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Grow by `dw`, `dh` (clamped at zero).
    #[inline]
    #[must_use]
    pub const fn grow(self, dw: i32, dh: i32) -> Self {
        Self::new(
            self.width.saturating_add(dw),
            self.height.saturating_add(dh),
        )
    }

    /// Check whether either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rectangle in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `origin` spanning `size`.
    #[inline]
    pub const fn from_origin(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Check whether two rectangles share any interior cell.
    #[inline]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle containing both. Empty inputs are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Margins in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Sides {
    /// Equal margin on every side.
    pub const fn all(val: i32) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create sides with specific values.
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// A position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Componentwise clamp into `[min, max]`.
    ///
    /// `max` components smaller than `min` are raised to `min` first.
    #[inline]
    #[must_use]
    pub fn clamp(self, min: PixelPoint, max: PixelPoint) -> Self {
        Self {
            x: self.x.clamp(min.x, max.x.max(min.x)),
            y: self.y.clamp(min.y, max.y.max(min.y)),
        }
    }

    /// Linear interpolation toward `to` by `t` in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn lerp(self, to: PixelPoint, t: f64) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// A size in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A viewport with no drawable area defers rendering.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_clamps_negative() {
        assert_eq!(Size::new(-3, 4), Size::new(0, 4));
        assert!(Size::new(0, 4).is_empty());
        assert_eq!(Size::new(2, 2).grow(-5, 1), Size::new(0, 3));
    }

    #[test]
    fn rect_overlap_is_exclusive_at_edges() {
        let a = Rect::new(0, 0, 4, 3);
        let b = Rect::new(4, 0, 2, 2);
        let c = Rect::new(3, 2, 2, 2);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn rect_union_skips_empty() {
        let a = Rect::new(2, 2, 3, 3);
        assert_eq!(a.union(&Rect::default()), a);
        assert_eq!(
            a.union(&Rect::new(-1, 4, 2, 5)),
            Rect::new(-1, 2, 6, 7)
        );
    }

    #[test]
    fn point_distances() {
        assert_eq!(Point::new(3, 4).norm_sq(), 25);
        assert_eq!(Point::new(1, 1).distance_sq(Point::new(-2, 5)), 25);
    }

    #[test]
    fn pixel_clamp_respects_inverted_bounds() {
        let p = PixelPoint::new(50.0, -10.0);
        let clamped = p.clamp(PixelPoint::new(10.0, 0.0), PixelPoint::new(5.0, 20.0));
        assert_eq!(clamped, PixelPoint::new(10.0, 0.0));
    }

    #[test]
    fn empty_viewport() {
        assert!(PixelSize::new(0.0, 10.0).is_empty());
        assert!(PixelSize::new(f64::NAN, 10.0).is_empty());
        assert!(!PixelSize::new(1.0, 1.0).is_empty());
    }
}
