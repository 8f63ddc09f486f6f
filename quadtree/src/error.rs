use common::shapes::ShapeError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadtreeError {
    /// An object or query rectangle failed validation.
    InvalidShape(ShapeError),
    /// The world bounds handed to the tree failed validation.
    InvalidBounds(ShapeError),
    InvalidConfig { max_objects: usize },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;

impl fmt::Display for QuadtreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadtreeError::InvalidShape(err) => write!(f, "invalid shape: {}", err),
            QuadtreeError::InvalidBounds(err) => write!(f, "invalid quadtree bounds: {}", err),
            QuadtreeError::InvalidConfig { max_objects } => write!(
                f,
                "quadtree node capacity must be at least 1 (max_objects: {})",
                max_objects
            ),
        }
    }
}

impl std::error::Error for QuadtreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuadtreeError::InvalidShape(err) | QuadtreeError::InvalidBounds(err) => Some(err),
            QuadtreeError::InvalidConfig { .. } => None,
        }
    }
}
