use crate::shape::{ShapeId, ShapeTag};
use thiserror::Error;

/// Errors reported by the grid and the narrowphase.
///
/// None of these leave the grid in a partially updated state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColliderError {
    /// A grid was configured with a cell size that is not strictly positive,
    /// or a point extent that is not finite and positive.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A shape's bounds are not finite, or reach past the cells a grid can index.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// `remove` was called on a shape that is not registered in any cell.
    #[error("shape {0:?} is not registered in any cell")]
    NotFound(ShapeId),
    /// The narrowphase has no test for this ordered pair of shape kinds.
    #[error("no narrowphase test for {0:?} against {1:?}")]
    UnsupportedShapePair(ShapeTag, ShapeTag),
    /// The handle does not name a shape stored in this grid.
    #[error("unknown shape handle {0:?}")]
    UnknownShape(ShapeId),
}
