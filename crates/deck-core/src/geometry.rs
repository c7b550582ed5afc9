#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are logical pixels in the coordinate space of the canvas
//! frame (origin at top-left, y grows downward). Rectangles are stored as
//! origin + size; a rectangle with negative size is *unnormalized* and can be
//! fixed up with [`Rect::normalize`].

/// A 2D point (or displacement).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        distance(self, other)
    }

    /// Length of this point interpreted as a vector.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Component-wise sum.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
#[inline]
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// A rectangle used for frame bounds, node geometry, and gesture bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub left: f64,
    /// Top edge (inclusive).
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    ///
    /// Edges given in the wrong order produce a negative size; call
    /// [`normalize`](Self::normalize) to fix that up.
    #[inline]
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Degenerate rectangle sitting on a single point.
    #[inline]
    #[must_use]
    pub const fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// A rectangle that contains every finite point.
    #[must_use]
    pub fn unbounded() -> Self {
        // Half range so that `right()` and `bottom()` stay finite.
        const HALF: f64 = f64::MAX / 2.0;
        Self::from_edges(-HALF, -HALF, HALF, HALF)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Area; zero for unnormalized rectangles.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.width * self.height).max(0.0)
    }

    /// Whether the rectangle has no area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Return an equivalent rectangle with non-negative width and height.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let (left, width) = if self.width < 0.0 {
            (self.left + self.width, -self.width)
        } else {
            (self.left, self.width)
        };
        let (top, height) = if self.height < 0.0 {
            (self.top + self.height, -self.height)
        } else {
            (self.top, self.height)
        };
        Self::new(left, top, width, height)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Whether the two rectangles share any area.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection_opt(other).is_some()
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[must_use]
    pub fn intersection_opt(&self, other: &Self) -> Option<Self> {
        let a = self.normalize();
        let b = other.normalize();
        let left = a.left.max(b.left);
        let top = a.top.max(b.top);
        let right = a.right().min(b.right());
        let bottom = a.bottom().min(b.bottom());

        if left < right && top < bottom {
            Some(Self::from_edges(left, top, right, bottom))
        } else {
            None
        }
    }

    /// The smallest rectangle that contains both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let a = self.normalize();
        let b = other.normalize();
        Self::from_edges(
            a.left.min(b.left),
            a.top.min(b.top),
            a.right().max(b.right()),
            a.bottom().max(b.bottom()),
        )
    }

    /// Union of every rectangle in `rects`, or `None` if the iterator is empty.
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Self> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Self>, r| match acc {
                Some(u) => Some(u.union(r)),
                None => Some(r.normalize()),
            })
    }

    /// Shift the rectangle by a displacement.
    #[inline]
    #[must_use]
    pub fn translate(&self, delta: Point) -> Self {
        Self::new(self.left + delta.x, self.top + delta.y, self.width, self.height)
    }

    /// Clamp a point into this rectangle, axis by axis.
    #[must_use]
    pub fn clamp_point(&self, p: Point) -> Point {
        let r = self.normalize();
        Point::new(
            p.x.max(r.left).min(r.right()),
            p.y.max(r.top).min(r.bottom()),
        )
    }
}
