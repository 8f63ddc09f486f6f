use crate::config::SimulationConfig;
use crate::enemy::{EnemyPolicy, ParallelEnemyManager, ThreeTierPolicy, TickContext, TickSummary};
use crate::error::SimulationResult;
use crate::level::Level;
use crate::player::{PlayerInput, PlayerRuntime};
use crate::spatial::{self, lock_tree, ColliderIds, SharedQuadtree};
use common::shapes::Aabb;
use std::sync::Arc;

/// What a renderer needs after a tick. Read after the barrier, so nothing is
/// still moving.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub player: Aabb,
    pub enemies: Vec<Aabb>,
    pub shards: TickSummary,
}

/// A loaded level with its player and enemies, stepped one tick at a time.
pub struct World {
    config: SimulationConfig,
    level: Level,
    tree: SharedQuadtree,
    player: PlayerRuntime,
    enemies: ParallelEnemyManager,
    tick: u64,
}

impl World {
    /// Parse `map`, index its platforms and start the enemy workers.
    pub fn load(map: &str, config: SimulationConfig) -> SimulationResult<World> {
        Self::load_with_policy(map, config, Arc::new(ThreeTierPolicy::new(config.enemy)))
    }

    pub fn load_with_policy(
        map: &str,
        config: SimulationConfig,
        policy: Arc<dyn EnemyPolicy>,
    ) -> SimulationResult<World> {
        config.validate()?;
        let mut ids = ColliderIds::default();
        let level = Level::parse(map, &config.level, &mut ids)?;
        let tree = spatial::share(level.build_quadtree(config.quadtree.into())?);

        // Spawn cells are one tile; stand bodies on the cell floor.
        let tile_h = config.level.tile_height;
        let (x, y) = level.player_spawn.unwrap_or_else(|| {
            log::warn!("level has no player spawn, using the top-left corner");
            (0.0, 0.0)
        });
        let player = PlayerRuntime::new(
            ids.next_id(),
            x,
            y + tile_h - config.player.height,
            config.player,
        );
        lock_tree(&tree).insert(player.entry())?;

        let mut enemies =
            ParallelEnemyManager::new(Arc::clone(&tree), policy, config.enemy, config.scheduler);
        let spawns: Vec<(f32, f32)> = level
            .enemy_spawns
            .iter()
            .map(|&(x, y)| (x, y + tile_h - config.enemy.height))
            .collect();
        enemies.populate(&spawns, &mut ids)?;
        enemies.start_workers()?;

        Ok(World {
            config,
            level,
            tree,
            player,
            enemies,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tree(&self) -> &SharedQuadtree {
        &self.tree
    }

    pub fn player(&self) -> &PlayerRuntime {
        &self.player
    }

    pub fn enemies(&self) -> &ParallelEnemyManager {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut ParallelEnemyManager {
        &mut self.enemies
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Step the player, then every enemy shard, and report where everything is.
    pub fn tick(&mut self, input: PlayerInput) -> SimulationResult<FrameSnapshot> {
        let dt = self.config.dt();
        let next_tick = self.tick + 1;
        {
            let mut tree = lock_tree(&self.tree);
            self.player.update(input, dt, &mut tree)?;
        }

        let ctx = TickContext {
            tick: next_tick,
            dt,
            player_center: Some(self.player.body.center()),
        };
        let shards = self.enemies.update(ctx)?;
        if shards.failed() > 0 {
            log::warn!("tick {}: {} enemy shards failed", next_tick, shards.failed());
        }
        self.tick = next_tick;

        Ok(FrameSnapshot {
            tick: next_tick,
            player: self.player.bounds(),
            enemies: self.enemies.live_enemy_bounds(),
            shards,
        })
    }

    /// Stop the enemy workers. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.enemies.shutdown();
    }
}
