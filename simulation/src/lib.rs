//! Platformer simulation core: platform collision against a shared dynamic
//! quadtree, and enemy shards stepped in parallel behind a per-tick barrier.

pub mod config;
pub mod enemy;
pub mod error;
pub mod level;
pub mod physics;
pub mod player;
pub mod spatial;
pub mod world;

pub use config::{
    EnemyConfig, LevelConfig, PhysicsConfig, PlayerConfig, QuadtreeSettings, SchedulerConfig,
    SchedulerMode, SimulationConfig,
};
pub use enemy::{
    EnemyPolicy, EnemyRuntime, EnemyShard, EnemyState, Intent, ParallelEnemyManager, PolicyView,
    ShardOutcome, ShardReport, ThreeTierPolicy, TickContext, TickSummary,
};
pub use error::{LevelError, SimulationError, SimulationResult};
pub use level::{Level, Platform, TileLevel, TileType};
pub use physics::{approach, Body, MoveIntent, StepReport};
pub use player::{PlayerInput, PlayerRuntime, PlayerState};
pub use spatial::{lock_tree, ColliderIds, EntityKind, SharedQuadtree, SpatialEntry};
pub use world::{FrameSnapshot, World};
