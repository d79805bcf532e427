//! Grid-hashed collision detection for axis-aligned 2D shapes.
//!
//! Shapes (points, circles and axis-aligned rectangles) are inserted into a
//! [`SpatialHash`], a uniform grid that records which cells each shape's
//! bounding box touches. Candidate pairs come from shapes sharing a cell, and
//! the narrowphase turns each pair into a separating vector that the caller
//! applies to push a shape out of overlap. Nothing is resolved automatically.
//!
//! Positions of circles and rectangles denote their **center**.
//!
//! ```
//! use gridcollide::{SpatialHash, Vec2};
//!
//! let mut hash = SpatialHash::new(128).unwrap();
//! let a = hash.new_rect(0.0, 0.0, 10.0, 10.0).unwrap();
//! let _b = hash.new_rect(8.0, 0.0, 10.0, 10.0).unwrap();
//!
//! let collisions = hash.check_collisions(a).unwrap();
//! assert_eq!(collisions.len(), 1);
//! assert_eq!(collisions[0].separating, Vec2::new(-2.0, 0.0));
//! ```

pub mod broad;
pub mod config;
pub mod error;
pub mod narrow;
pub mod shape;
pub mod vector;

pub type Fp = f64;
pub type Vec2 = glam::DVec2;

pub use broad::{cell::{CellCoord, CellInfo, DebugDraw}, SpatialHash};
pub use config::HashConfig;
pub use error::ColliderError;
pub use narrow::{CollisionData, NarrowPhase, PairTest};
pub use shape::{Aabb, Circle, HashId, Point, Rect, Shape, ShapeId, ShapeKind, ShapeTag};
pub use vector::Vector;
