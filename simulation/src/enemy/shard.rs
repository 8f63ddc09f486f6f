use super::policy::{EnemyPolicy, Intent, PolicyView};
use super::runtime::EnemyRuntime;
use crate::config::EnemyConfig;
use crate::spatial::{lock_tree, SharedQuadtree};
use quadtree::QuadtreeResult;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

/// Everything a shard needs from the world for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    pub tick: u64,
    /// Seconds.
    pub dt: f32,
    pub player_center: Option<(f32, f32)>,
}

impl TickContext {
    pub fn view(&self) -> PolicyView {
        PolicyView {
            tick: self.tick,
            player_center: self.player_center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardStats {
    /// Live enemies stepped this tick.
    pub simulated: usize,
    /// Dead enemies skipped this tick.
    pub dead: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShardOutcome {
    Completed(ShardStats),
    /// The shard is degraded from an earlier panic and was not run.
    Skipped,
    Failed(String),
    Panicked(String),
}

/// One completion message: which shard, which tick, how it went.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardReport {
    pub shard: usize,
    pub tick: u64,
    pub outcome: ShardOutcome,
}

/// A fixed-capacity group of enemies stepped together by one worker.
#[derive(Debug)]
pub struct EnemyShard {
    /// `EM-<index>`.
    pub name: String,
    pub index: usize,
    capacity: usize,
    enemies: Vec<EnemyRuntime>,
    next_enemy: usize,
    degraded: bool,
    last_tick: Option<u64>,
}

impl EnemyShard {
    pub fn new(index: usize, capacity: usize) -> Self {
        Self {
            name: format!("EM-{}", index),
            index,
            capacity,
            enemies: Vec::with_capacity(capacity),
            next_enemy: 0,
            degraded: false,
            last_tick: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.enemies.len() >= self.capacity
    }

    pub fn enemies(&self) -> &[EnemyRuntime] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [EnemyRuntime] {
        &mut self.enemies
    }

    /// Set after a panic. A degraded shard is skipped on every later tick.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Last tick this shard finished, if any.
    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    /// Name for the next enemy added to this shard.
    pub(crate) fn next_enemy_name(&mut self) -> String {
        let name = format!("{}-E-{}", self.name, self.next_enemy);
        self.next_enemy += 1;
        name
    }

    pub(crate) fn push(&mut self, enemy: EnemyRuntime) {
        debug_assert!(!self.is_full());
        self.enemies.push(enemy);
    }

    /// Decide for every live enemy, then step them all under the tree lock.
    pub fn run_tick(&mut self, ctx: &TickContext, env: &ShardEnv) -> QuadtreeResult<ShardStats> {
        let view = ctx.view();
        let intents: Vec<Intent> = self
            .enemies
            .iter()
            .map(|enemy| {
                if enemy.is_dead() {
                    Intent::idle()
                } else {
                    env.policy.decide(enemy, &view)
                }
            })
            .collect();

        let mut stats = ShardStats::default();
        let mut tree = lock_tree(&env.tree);
        for (enemy, intent) in self.enemies.iter_mut().zip(intents) {
            match enemy.update(intent, &env.enemy, ctx.dt, &mut tree)? {
                Some(_) => stats.simulated += 1,
                None => stats.dead += 1,
            }
        }
        drop(tree);

        self.last_tick = Some(ctx.tick);
        Ok(stats)
    }
}

/// Read-only state shared by every shard worker.
pub struct ShardEnv {
    pub tree: SharedQuadtree,
    pub policy: Arc<dyn EnemyPolicy>,
    pub enemy: EnemyConfig,
}

pub(crate) fn lock_shard(shard: &Mutex<EnemyShard>) -> std::sync::MutexGuard<'_, EnemyShard> {
    shard.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run one shard for one tick and describe what happened. Never panics.
pub(crate) fn run_shard(shard: &Mutex<EnemyShard>, ctx: &TickContext, env: &ShardEnv) -> ShardReport {
    let mut guard = lock_shard(shard);
    let index = guard.index;
    if guard.degraded {
        return ShardReport {
            shard: index,
            tick: ctx.tick,
            outcome: ShardOutcome::Skipped,
        };
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| guard.run_tick(ctx, env)));
    let outcome = match result {
        Ok(Ok(stats)) => ShardOutcome::Completed(stats),
        Ok(Err(err)) => {
            log::warn!("shard {} failed tick {}: {}", guard.name, ctx.tick, err);
            ShardOutcome::Failed(err.to_string())
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            log::error!(
                "shard {} panicked on tick {}: {}; skipping it from now on",
                guard.name,
                ctx.tick,
                msg
            );
            guard.degraded = true;
            ShardOutcome::Panicked(msg)
        }
    };
    ShardReport {
        shard: index,
        tick: ctx.tick,
        outcome,
    }
}
