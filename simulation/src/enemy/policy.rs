use super::runtime::EnemyRuntime;
use super::state::EnemyState;
use crate::config::EnemyConfig;

/// What an enemy can see when deciding: the tick number and the player.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolicyView {
    pub tick: u64,
    /// Center of the player's bounds, if there is a player.
    pub player_center: Option<(f32, f32)>,
}

/// One enemy's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// -1.0 (left) ..= 1.0 (right).
    pub horizontal: f32,
    pub wants_attack: bool,
    pub jump: bool,
    /// State the decision puts the enemy in, if it changes it.
    pub state: Option<EnemyState>,
}

impl Intent {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Decision function run for every live enemy every tick.
///
/// Runs on shard worker threads without the quadtree lock held, so it must
/// not touch anything but its arguments.
pub trait EnemyPolicy: Send + Sync {
    fn decide(&self, enemy: &EnemyRuntime, view: &PolicyView) -> Intent;
}

impl<F> EnemyPolicy for F
where
    F: Fn(&EnemyRuntime, &PolicyView) -> Intent + Send + Sync,
{
    fn decide(&self, enemy: &EnemyRuntime, view: &PolicyView) -> Intent {
        self(enemy, view)
    }
}

/// Flee when hurt and close, attack in reach, hunt in sight, otherwise patrol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreeTierPolicy {
    config: EnemyConfig,
}

impl ThreeTierPolicy {
    pub fn new(config: EnemyConfig) -> Self {
        Self { config }
    }
}

impl Default for ThreeTierPolicy {
    fn default() -> Self {
        Self::new(EnemyConfig::default())
    }
}

impl EnemyPolicy for ThreeTierPolicy {
    fn decide(&self, enemy: &EnemyRuntime, view: &PolicyView) -> Intent {
        if enemy.is_dead() {
            return Intent::idle();
        }
        let patrol = Intent {
            horizontal: enemy.patrol_dir(),
            state: Some(EnemyState::Patrolling),
            ..Intent::default()
        };
        let Some((player_x, _)) = view.player_center else {
            return patrol;
        };

        let dx = player_x - enemy.body.center().0;
        let dist = dx.abs();
        let toward = if dx > 0.0 { 1.0 } else { -1.0 };

        let hurt = enemy.health() < enemy.max_health() * self.config.flee_health_ratio;
        if hurt && dist < self.config.flee_range && enemy.state().can_flee() {
            return Intent {
                horizontal: -toward,
                state: Some(EnemyState::Fleeing),
                ..Intent::default()
            };
        }

        if dist < self.config.detection_range {
            if dist < self.config.attack_range
                && enemy.attack_cooldown() <= 0.0
                && enemy.state().can_attack()
            {
                return Intent {
                    wants_attack: true,
                    ..Intent::default()
                };
            }
            return Intent {
                horizontal: toward,
                state: Some(EnemyState::Hunting),
                ..Intent::default()
            };
        }

        patrol
    }
}
