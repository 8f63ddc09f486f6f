use super::policy::Intent;
use super::state::{EnemyState, EnemyStateMachine};
use crate::config::EnemyConfig;
use crate::physics::{self, Body, MoveIntent, StepReport};
use crate::spatial::{EntityKind, SpatialEntry};
use common::shapes::{Aabb, ColliderId};
use quadtree::quadtree::DynamicQuadtree;
use quadtree::QuadtreeResult;

/// One enemy. Owned by a single shard and only mutated by that shard's update.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyRuntime {
    pub id: ColliderId,
    /// `<shard>-E-<n>`, e.g. `EM-0-E-3`.
    pub name: String,
    pub body: Body,
    health: f32,
    max_health: f32,
    state: EnemyStateMachine,
    patrol_dir: f32,
    attack_cooldown: f32,
    attacks: u32,
}

impl EnemyRuntime {
    pub fn new(id: ColliderId, name: String, x: f32, y: f32, config: &EnemyConfig) -> Self {
        Self {
            id,
            name,
            body: Body::new(x, y, config.width, config.height),
            health: config.max_health,
            max_health: config.max_health,
            state: EnemyStateMachine::default(),
            patrol_dir: 1.0,
            attack_cooldown: 0.0,
            attacks: 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.body.bounds()
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn state(&self) -> &EnemyStateMachine {
        &self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    /// +1.0 or -1.0; flips when a patrolling enemy walks into a wall.
    pub fn patrol_dir(&self) -> f32 {
        self.patrol_dir
    }

    /// Seconds until the next attack is allowed.
    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    pub fn attacks(&self) -> u32 {
        self.attacks
    }

    /// Subtract `amount` health. Returns true if this hit killed the enemy.
    ///
    /// A dead enemy stays in its shard and is dropped from the quadtree on
    /// its next update.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health == 0.0 {
            self.state.set(EnemyState::Dead);
            log::debug!("enemy {} died", self.name);
            return true;
        }
        false
    }

    /// Run one tick: apply `intent`, step the physics and re-file in `tree`.
    ///
    /// Returns `None` for dead enemies, which only make sure they are no
    /// longer indexed.
    pub fn update(
        &mut self,
        intent: Intent,
        config: &EnemyConfig,
        dt: f32,
        tree: &mut DynamicQuadtree<SpatialEntry>,
    ) -> QuadtreeResult<Option<StepReport>> {
        if self.is_dead() {
            if tree.contains(self.id) && !tree.remove(self.id) {
                log::warn!("dead enemy {} was indexed at a node that no longer holds it", self.name);
            }
            return Ok(None);
        }

        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }
        if let Some(state) = intent.state {
            self.state.set(state);
        }

        let movement = if self.state.can_move() {
            MoveIntent {
                horizontal: intent.horizontal,
                jump: intent.jump,
            }
        } else {
            MoveIntent::default()
        };
        let report = physics::step_body(
            &mut self.body,
            movement,
            &config.physics,
            dt,
            self.id,
            EntityKind::Enemy,
            tree,
        )?;

        if report.hit_wall && self.state.is(EnemyState::Patrolling) {
            self.patrol_dir = -self.patrol_dir;
        }

        if intent.wants_attack && self.attack_cooldown <= 0.0 && self.state.can_attack() {
            self.state.set(EnemyState::Attacking);
            self.attack_cooldown = config.attack_cooldown;
            self.attacks += 1;
        }

        if report.ground_detected {
            if self.body.grounded && self.state.is(EnemyState::Falling) {
                self.state.set(EnemyState::Idle);
            }
        } else if self.body.vel_y > 0.0 && !self.state.is(EnemyState::Falling) {
            self.state.set(EnemyState::Falling);
        }

        Ok(Some(report))
    }
}
