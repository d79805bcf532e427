//! Narrowphase: pairwise overlap tests producing separating vectors.
//!
//! Every test returns the vector that, added to the first shape's position,
//! moves it out of the second. Disjoint (or merely touching) shapes yield the
//! zero vector. Points are tested as small boxes.

use crate::{
    error::ColliderError,
    shape::{Aabb, Circle, ShapeId, ShapeKind, ShapeTag},
    vector::Vector,
    Vec2,
};
use std::fmt::{Debug, Formatter};
use tracing::debug;

/// A narrowphase hit: the other shape and the vector that separates the queried shape from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    pub other: ShapeId,
    pub separating: Vec2,
}

// ---------- Shape-Shape separation ---------- //

pub fn rect_rect(a: &Aabb, b: &Aabb) -> Vec2 {
    //! Axis-aligned push for `a` along the axis of least penetration.
    //! Ties between the axes keep the X push.
    if !a.aabb_test(b) {
        return Vec2::ZERO;
    }
    let (ca, cb) = (a.center(), b.center());
    // push toward the side a's center is on; equal centers push negative
    let dx = if ca.x <= cb.x { b.min.x - a.max.x } else { b.max.x - a.min.x };
    let dy = if ca.y <= cb.y { b.min.y - a.max.y } else { b.max.y - a.min.y };

    if dx.abs() <= dy.abs() {
        Vec2::new(dx, 0.0)
    } else {
        Vec2::new(0.0, dy)
    }
}

pub fn rect_circle(a: &Aabb, circle: &Circle) -> Vec2 {
    //! Separates a box from a circle, treating the circle as its bounding square
    //! unless the circle's center lies off one of the box's corners.
    //! A center beside an edge (outside on one axis only) gets the bounding-square push.
    let square = rect_rect(a, &circle.aabb());
    if square == Vec2::ZERO {
        return square;
    }

    let pos = circle.pos;
    let outside_x = pos.x < a.min.x || pos.x > a.max.x;
    let outside_y = pos.y < a.min.y || pos.y > a.max.y;
    if !(outside_x && outside_y) {
        return square;
    }

    let center = a.center();
    let corner = Vec2::new(
        if center.x < pos.x { a.max.x } else { a.min.x },
        if center.y < pos.y { a.max.y } else { a.min.y },
    );
    circle_circle(&Circle { rad: 0.0, pos: corner }, circle)
}

#[inline]
pub fn circle_rect(circle: &Circle, b: &Aabb) -> Vec2 {
    -rect_circle(b, circle)
}

pub fn circle_circle(a: &Circle, b: &Circle) -> Vec2 {
    //! Pushes `a` away from `b` along the line of centers by the penetration depth.
    let d = a.pos - b.pos;
    let depth = a.rad + b.rad - d.length();
    if depth < 0.0 {
        return Vec2::ZERO;
    }
    if d == Vec2::ZERO {
        // concentric: no line of centers, pick -X
        return Vec2::new(-depth, 0.0);
    }
    d.normalize_safe() * depth
}

// ---------- Dispatch ---------- //

/// A pair test. Returns `None` if it cannot handle the given kinds.
pub type PairTest = fn(&ShapeKind, &ShapeKind) -> Option<Vec2>;

fn box_box(a: &ShapeKind, b: &ShapeKind) -> Option<Vec2> {
    Some(rect_rect(&a.as_box()?, &b.as_box()?))
}
fn box_circle(a: &ShapeKind, b: &ShapeKind) -> Option<Vec2> {
    Some(rect_circle(&a.as_box()?, b.as_circle()?))
}
fn circle_box(a: &ShapeKind, b: &ShapeKind) -> Option<Vec2> {
    Some(circle_rect(a.as_circle()?, &b.as_box()?))
}
fn circle_circle_pair(a: &ShapeKind, b: &ShapeKind) -> Option<Vec2> {
    Some(circle_circle(a.as_circle()?, b.as_circle()?))
}

/// Dispatch table keyed by the ordered pair of shape kinds.
///
/// The default table covers every pair of points, circles and rectangles.
/// Entries may be replaced or cleared; a cleared entry makes
/// [`separate`](NarrowPhase::separate) report
/// [`ColliderError::UnsupportedShapePair`] rather than "no collision".
#[derive(Clone, Copy)]
pub struct NarrowPhase {
    table: [[Option<PairTest>; 3]; 3],
}

impl NarrowPhase {
    pub fn empty() -> NarrowPhase {
        NarrowPhase { table: [[None; 3]; 3] }
    }

    pub fn set_pair(&mut self, a: ShapeTag, b: ShapeTag, test: Option<PairTest>) -> &mut NarrowPhase {
        self.table[a as usize][b as usize] = test;
        self
    }
    #[inline]
    pub fn supports(&self, a: ShapeTag, b: ShapeTag) -> bool {
        self.table[a as usize][b as usize].is_some()
    }

    pub fn separate(&self, a: &ShapeKind, b: &ShapeKind) -> Result<Vec2, ColliderError> {
        //! Returns the vector separating `a` from `b`.
        let (ta, tb) = (a.tag(), b.tag());
        match self.table[ta as usize][tb as usize].and_then(|test| test(a, b)) {
            Some(sep) => Ok(sep),
            None => {
                debug!(?ta, ?tb, "unsupported shape pair");
                Err(ColliderError::UnsupportedShapePair(ta, tb))
            }
        }
    }
}

impl Default for NarrowPhase {
    fn default() -> NarrowPhase {
        // indexed [Point, Circle, Rect] x [Point, Circle, Rect]
        let box_box: PairTest = box_box;
        let box_circle: PairTest = box_circle;
        let circle_box: PairTest = circle_box;
        let circle_circle: PairTest = circle_circle_pair;
        NarrowPhase {
            table: [
                [Some(box_box), Some(box_circle), Some(box_box)],
                [Some(circle_box), Some(circle_circle), Some(circle_box)],
                [Some(box_box), Some(box_circle), Some(box_box)],
            ],
        }
    }
}

impl Debug for NarrowPhase {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut list = f.debug_list();
        for &a in ShapeTag::ALL.iter() {
            for &b in ShapeTag::ALL.iter() {
                if self.supports(a, b) {
                    list.entry(&(a, b));
                }
            }
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Point, Rect};
    use crate::{Fp, SpatialHash};
    use approx::assert_abs_diff_eq;

    fn rect(x: Fp, y: Fp, w: Fp, h: Fp) -> Aabb {
        Rect::new(x, y, w, h).aabb()
    }

    #[test]
    fn rect_rect_least_penetration() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(8.0, 0.0, 10.0, 10.0);
        assert_eq!(rect_rect(&a, &b), Vec2::new(-2.0, 0.0));
        assert_eq!(rect_rect(&b, &a), Vec2::new(2.0, 0.0));

        let below = rect(1.0, 9.0, 10.0, 10.0);
        assert_eq!(rect_rect(&a, &below), Vec2::new(0.0, -1.0));
        assert_eq!(rect_rect(&below, &a), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn rect_rect_touching_is_zero() {
        let a = Aabb::new(0.0, 0.0, 5.0, 5.0);
        let b = Aabb::new(5.0, 0.0, 10.0, 5.0);
        assert_eq!(rect_rect(&a, &b), Vec2::ZERO);
        assert_eq!(rect_rect(&a, &Aabb::new(6.0, 0.0, 10.0, 5.0)), Vec2::ZERO);
    }

    #[test]
    fn circle_circle_depth() {
        let a = Circle::new(5.0, 0.0, 0.0);
        let b = Circle::new(5.0, 8.0, 0.0);
        let sep = circle_circle(&a, &b);
        assert_abs_diff_eq!(sep.x, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sep.y, 0.0, epsilon = 1e-12);

        let far = Circle::new(5.0, 11.0, 0.0);
        assert_eq!(circle_circle(&a, &far), Vec2::ZERO);

        let diag = circle_circle(&Circle::new(1.0, 0.0, 0.0), &Circle::new(1.0, 1.0, 1.0));
        let depth = 2.0 - Fp::sqrt(2.0);
        assert_abs_diff_eq!(diag.length(), depth, epsilon = 1e-12);
        assert!(diag.x < 0.0 && diag.y < 0.0);

        assert_eq!(circle_circle(&a, &Circle::new(2.0, 0.0, 0.0)), Vec2::new(-7.0, 0.0));
    }

    #[test]
    fn rect_circle_cases() {
        let a = rect(0.0, 0.0, 10.0, 10.0);

        // center inside the box: bounding-square push
        assert_eq!(rect_circle(&a, &Circle::new(2.0, 4.0, 0.0)), Vec2::new(-3.0, 0.0));
        // off a side: bounding-square push
        assert_eq!(rect_circle(&a, &Circle::new(3.0, 7.0, 0.0)), Vec2::new(-1.0, 0.0));
        // off a corner but not reaching it
        assert_eq!(rect_circle(&a, &Circle::new(2.0, 6.5, 6.5)), Vec2::ZERO);
        // off a corner and overlapping it
        let sep = rect_circle(&a, &Circle::new(2.0, 6.0, 6.0));
        let depth = 2.0 - Fp::sqrt(2.0);
        assert_abs_diff_eq!(sep.x, -depth / Fp::sqrt(2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(sep.y, -depth / Fp::sqrt(2.0), epsilon = 1e-12);
        // far away
        assert_eq!(rect_circle(&a, &Circle::new(1.0, 20.0, 0.0)), Vec2::ZERO);

        assert_eq!(circle_rect(&Circle::new(3.0, 7.0, 0.0), &a), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn points_are_small_boxes() {
        let nar = NarrowPhase::default();
        let p = ShapeKind::Point(Point::new(0.0, 0.0));
        let q = ShapeKind::Point(Point::new(0.0, 0.0));
        assert_eq!(nar.separate(&p, &q).unwrap(), Vec2::new(-1.0, 0.0));

        let far = ShapeKind::Point(Point::new(3.0, 0.0));
        assert_eq!(nar.separate(&p, &far).unwrap(), Vec2::ZERO);

        let r = ShapeKind::Rect(Rect::new(5.0, 0.0, 10.0, 10.0));
        assert_eq!(nar.separate(&p, &r).unwrap(), Vec2::new(-0.5, 0.0));
        assert_eq!(nar.separate(&r, &p).unwrap(), Vec2::new(0.5, 0.0));

        let c = ShapeKind::Circle(Circle::new(1.0, 1.0, 0.0));
        assert_eq!(nar.separate(&p, &c).unwrap(), Vec2::new(-0.5, 0.0));
        assert_eq!(nar.separate(&c, &p).unwrap(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn full_matrix_is_supported() {
        let nar = NarrowPhase::default();
        for &a in ShapeTag::ALL.iter() {
            for &b in ShapeTag::ALL.iter() {
                assert!(nar.supports(a, b));
            }
        }
        assert!(!NarrowPhase::empty().supports(ShapeTag::Rect, ShapeTag::Rect));
    }

    #[test]
    fn unsupported_pair_is_reported() {
        let mut nar = NarrowPhase::default();
        nar.set_pair(ShapeTag::Circle, ShapeTag::Point, None);
        let c = ShapeKind::Circle(Circle::new(1.0, 0.0, 0.0));
        let p = ShapeKind::Point(Point::new(0.0, 0.0));
        assert_eq!(
            nar.separate(&c, &p),
            Err(ColliderError::UnsupportedShapePair(ShapeTag::Circle, ShapeTag::Point))
        );
        assert!(nar.separate(&p, &c).is_ok());

        let mut hash = SpatialHash::new(16).unwrap().with_narrow_phase(nar);
        let circle = hash.new_circle(0.0, 0.0, 1.0).unwrap();
        hash.new_point(20.0, 20.0).unwrap();
        assert!(hash.check_collisions(circle).unwrap().is_empty());
        hash.new_point(0.0, 0.0).unwrap();
        assert_eq!(
            hash.check_collisions(circle),
            Err(ColliderError::UnsupportedShapePair(ShapeTag::Circle, ShapeTag::Point))
        );
    }

    #[test]
    fn mismatched_entry_is_reported() {
        let mut nar = NarrowPhase::default();
        nar.set_pair(ShapeTag::Circle, ShapeTag::Circle, Some(box_box));
        let c = ShapeKind::Circle(Circle::new(1.0, 0.0, 0.0));
        assert!(matches!(nar.separate(&c, &c), Err(ColliderError::UnsupportedShapePair(_, _))));
    }

    #[test]
    fn check_collisions_reports_overlaps() {
        let mut hash = SpatialHash::new(128).unwrap();
        let a = hash.new_rect(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = hash.new_rect(8.0, 0.0, 10.0, 10.0).unwrap();
        let touching = hash.new_rect(-10.0, 0.0, 10.0, 10.0).unwrap();
        let c = hash.new_circle(0.0, 40.0, 5.0).unwrap();
        let d = hash.new_circle(8.0, 40.0, 5.0).unwrap();

        let hits = hash.check_collisions(a).unwrap();
        assert_eq!(hits, vec![CollisionData { other: b, separating: Vec2::new(-2.0, 0.0) }]);
        assert!(hits.iter().all(|hit| hit.other != touching));

        let hits = hash.check_collisions(c).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].other, d);
        assert_abs_diff_eq!(hits[0].separating.x, -2.0, epsilon = 1e-12);

        // resolving the reported vector clears the overlap
        let sep = hits[0].separating;
        hash.translate(c, sep.x, sep.y).unwrap();
        assert!(hash.check_collisions(c).unwrap().is_empty());
    }

    #[test]
    fn debug_lists_supported_pairs() {
        let mut nar = NarrowPhase::empty();
        nar.set_pair(ShapeTag::Rect, ShapeTag::Rect, Some(box_box));
        assert_eq!(format!("{:?}", nar), "[(Rect, Rect)]");
    }
}
