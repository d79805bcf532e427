//! Shape data: bounding boxes, the three shape variants, and handles.

use crate::{config::HashConfig, Fp, Vec2};
use std::sync::atomic::{AtomicU64, Ordering};

// ---------- Handles ---------- //

/// Stable handle to a shape stored in a [`SpatialHash`](crate::SpatialHash).
///
/// Handles are assigned on insertion and never reused by the issuing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub(crate) u64);
impl ShapeId {
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Identity of a grid, used as a shape's weak back-reference to the grid that last inserted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashId(u64);
impl HashId {
    pub(crate) fn next() -> HashId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        HashId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ---------- Aabb ---------- //

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}
impl Aabb {
    #[inline]
    pub fn new(minx: Fp, miny: Fp, maxx: Fp, maxy: Fp) -> Aabb {
        //! Orders minimum and maximum values.
        Aabb {
            min: Vec2::new(minx.min(maxx), miny.min(maxy)),
            max: Vec2::new(minx.max(maxx), miny.max(maxy)),
        }
    }
    #[inline]
    pub fn from_center(center: Vec2, half: Vec2) -> Aabb {
        let half = half.abs();
        Aabb { min: center - half, max: center + half }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
    #[inline]
    pub fn extent(&self) -> Vec2 {
        self.max - self.min
    }
    #[inline]
    pub fn translate(self, offset: Vec2) -> Aabb {
        Aabb { min: self.min + offset, max: self.max + offset }
    }
    #[inline]
    pub fn to_tuple(self) -> (Fp, Fp, Fp, Fp) {
        (self.min.x, self.min.y, self.max.x, self.max.y)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    #[inline]
    pub fn aabb_test(&self, other: &Aabb) -> bool {
        //! Inclusive overlap test: touching edges count.
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
    #[inline]
    pub fn point_test(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

// ---------- Variants ---------- //

/// Axis-aligned rectangle, positioned by its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub width: Fp,
    pub height: Fp,
}
impl Rect {
    #[inline]
    pub fn new(posx: Fp, posy: Fp, width: Fp, height: Fp) -> Rect {
        Rect { pos: Vec2::new(posx, posy), width: width.abs(), height: height.abs() }
    }
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(self.width, self.height) * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub rad: Fp,
    pub pos: Vec2,
}
impl Circle {
    #[inline]
    pub fn new(rad: Fp, posx: Fp, posy: Fp) -> Circle {
        Circle { rad: rad.abs(), pos: Vec2::new(posx, posy) }
    }
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.rad))
    }
}

/// A point, occupying a small square of side `2 * half` so that grid
/// insertion and the box tests never work with an infinitesimal box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub pos: Vec2,
    pub half: Fp,
}
impl Point {
    #[inline]
    pub fn new(posx: Fp, posy: Fp) -> Point {
        Point::with_half_extent(posx, posy, HashConfig::DEFAULT_POINT_HALF_EXTENT)
    }
    #[inline]
    pub fn with_half_extent(posx: Fp, posy: Fp, half: Fp) -> Point {
        Point { pos: Vec2::new(posx, posy), half: half.abs() }
    }
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.half))
    }
}

/// Discriminant of a [`ShapeKind`], used to index the narrowphase dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    Point = 0,
    Circle = 1,
    Rect = 2,
}
impl ShapeTag {
    pub const ALL: [ShapeTag; 3] = [ShapeTag::Point, ShapeTag::Circle, ShapeTag::Rect];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Point(Point),
    Circle(Circle),
    Rect(Rect),
}
impl ShapeKind {
    #[inline]
    pub fn tag(&self) -> ShapeTag {
        match self {
            ShapeKind::Point(_) => ShapeTag::Point,
            ShapeKind::Circle(_) => ShapeTag::Circle,
            ShapeKind::Rect(_) => ShapeTag::Rect,
        }
    }
    #[inline]
    pub fn position(&self) -> Vec2 {
        match self {
            ShapeKind::Point(p) => p.pos,
            ShapeKind::Circle(c) => c.pos,
            ShapeKind::Rect(r) => r.pos,
        }
    }
    #[inline]
    pub fn aabb(&self) -> Aabb {
        match self {
            ShapeKind::Point(p) => p.aabb(),
            ShapeKind::Circle(c) => c.aabb(),
            ShapeKind::Rect(r) => r.aabb(),
        }
    }

    /// The box the narrowphase tests with, for points and rectangles.
    #[inline]
    pub fn as_box(&self) -> Option<Aabb> {
        match self {
            ShapeKind::Point(p) => Some(p.aabb()),
            ShapeKind::Rect(r) => Some(r.aabb()),
            ShapeKind::Circle(_) => None,
        }
    }
    #[inline]
    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            ShapeKind::Circle(c) => Some(c),
            _ => None,
        }
    }

    fn pos_mut(&mut self) -> &mut Vec2 {
        match self {
            ShapeKind::Point(p) => &mut p.pos,
            ShapeKind::Circle(c) => &mut c.pos,
            ShapeKind::Rect(r) => &mut r.pos,
        }
    }
}

// ---------- Shape ---------- //

/// A shape plus its weak reference to the grid that last inserted it.
///
/// Moving a `Shape` directly only changes its position; to keep cell
/// membership current, move it through the owning grid
/// ([`SpatialHash::translate`](crate::SpatialHash::translate)).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    hash: Option<HashId>,
}
impl Shape {
    pub fn new(kind: ShapeKind) -> Shape {
        Shape { kind, hash: None }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.kind.position()
    }
    #[inline]
    pub fn bounds(&self) -> Aabb {
        //! Returns the axis-aligned bounding box in world coordinates.
        self.kind.aabb()
    }
    #[inline]
    pub fn tag(&self) -> ShapeTag {
        self.kind.tag()
    }
    #[inline]
    pub fn hash(&self) -> Option<HashId> {
        self.hash
    }
    #[inline]
    pub(crate) fn set_hash(&mut self, hash: HashId) {
        self.hash = Some(hash);
    }

    pub fn translate(&mut self, dx: Fp, dy: Fp) {
        *self.kind.pos_mut() += Vec2::new(dx, dy);
    }
    pub fn move_to(&mut self, x: Fp, y: Fp) {
        *self.kind.pos_mut() = Vec2::new(x, y);
    }
}

impl From<Point> for Shape {
    fn from(point: Point) -> Self {
        Shape::new(ShapeKind::Point(point))
    }
}
impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::new(ShapeKind::Circle(circle))
    }
}
impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::new(ShapeKind::Rect(rect))
    }
}
