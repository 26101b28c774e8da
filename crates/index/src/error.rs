//! Index error types.

use thiserror::Error;

use crate::{Landmark, Position};

/// A landmark fell outside the region of the node it was inserted into.
///
/// Only raised when bounds checking is enabled. The tree is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "landmark {} not inside: x: {} y: {} size: {} center: {}, {}",
    .landmark.id,
    .landmark.position.x,
    .landmark.position.y,
    .half_size,
    .center.x,
    .center.y
)]
pub struct BoundsError {
    /// The rejected landmark.
    pub landmark: Landmark,
    /// Center of the rejecting node.
    pub center: Position,
    /// Half side length of the rejecting node.
    pub half_size: f64,
}
