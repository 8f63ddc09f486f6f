pub mod shapes;

pub use shapes::{Aabb, Collider, ColliderId, ShapeError, ShapeResult};
