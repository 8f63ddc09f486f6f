use crate::error::{QuadtreeError, QuadtreeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Objects a leaf holds before it splits.
    pub max_objects: usize,
    /// Deepest level a node may split to; nodes at this level never split.
    pub max_levels: usize,
}

impl Config {
    pub fn validate(&self) -> QuadtreeResult<()> {
        if self.max_objects == 0 {
            return Err(QuadtreeError::InvalidConfig {
                max_objects: self.max_objects,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_objects: 10,
            max_levels: 5,
        }
    }
}
