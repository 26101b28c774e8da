//! Point quadtree for landmark radius queries.
//!
//! This crate contains:
//! - The landmark data model (`Position`, `Landmark`)
//! - The `QuadTree` spatial index
//! - The insertion error type

mod error;
mod quadtree;

pub use error::BoundsError;
pub use quadtree::{Leaves, QuadTree, Quadrant, TreeStats};

/// Represents a 2D position using glam's DVec2.
pub type Position = glam::DVec2;

/// A point record stored in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub id: u32,
    pub position: Position,
}

impl Landmark {
    pub const fn new(id: u32, position: Position) -> Self {
        Self { id, position }
    }

    /// Create a landmark from raw coordinates.
    #[inline]
    pub const fn at(id: u32, x: f64, y: f64) -> Self {
        Self::new(id, Position::new(x, y))
    }

    /// Euclidean distance from this landmark to `point`.
    #[inline]
    pub fn distance(&self, point: Position) -> f64 {
        self.position.distance(point)
    }
}
