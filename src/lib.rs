mod algorithms;
mod graph;
pub mod loader;
mod point;
mod refine;
mod triangle;
mod triangulation;

pub use algorithms::Algorithm;
pub use graph::{AdjacencyGraph, NodeId};
pub use point::{orient_2d, CircleSide, Orientation, Point};
pub use refine::{RefineAlgorithm, RefineCriteria, RefineReport};
pub use triangle::{Facet, Triangle};
pub use triangulation::{
    Observer, PlaceOutcome, Rect, Triangulation, TriangulationBuilder,
};

/// Type alias for the coordinate type. Defaults to f64, switch to f32 with
/// the `f32` feature when memory matters more than precision.
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(not(feature = "f32"))]
pub type Float = f64;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum TriangulationError {
    /// No live triangle contains the point, even after the fallback scan.
    #[error("no triangle contains point {0:?}")]
    NoContainingTriangle(Point),
    /// The point lies outside the configured bounding rectangle.
    #[error("point {0:?} lies outside the configured bounds")]
    OutOfBounds(Point),
    /// The requested segment crosses or overlaps a registered constraint.
    #[error("segment conflicts with an existing constraint")]
    ConstraintConflict,
    /// The segment is not registered as a constraint.
    #[error("segment is not a registered constraint")]
    UnknownConstraint,
    /// The active algorithm does not implement the requested operation.
    #[error("{0:?} does not support this operation")]
    Unsupported(Algorithm),
    /// Triangle construction from coincident or collinear points.
    #[error("triangle vertices are coincident or collinear")]
    DegenerateTriangle,
}
