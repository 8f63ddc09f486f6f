mod config;
mod dynamic;
mod node;
mod tree;

pub use config::Config;
pub use dynamic::DynamicQuadtree;
pub use node::{quadrant_for, Node, NodeId, Quadrant};
pub use tree::Quadtree;
