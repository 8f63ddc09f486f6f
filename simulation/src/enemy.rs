//! Enemies: state machine, decision policy, per-enemy runtime, and the
//! sharded scheduler that steps them every tick.

mod policy;
mod runtime;
mod scheduler;
mod shard;
mod state;

pub use policy::{EnemyPolicy, Intent, PolicyView, ThreeTierPolicy};
pub use runtime::EnemyRuntime;
pub use scheduler::{ParallelEnemyManager, TickSummary};
pub use shard::{EnemyShard, ShardEnv, ShardOutcome, ShardReport, ShardStats, TickContext};
pub use state::{EnemyState, EnemyStateMachine};
