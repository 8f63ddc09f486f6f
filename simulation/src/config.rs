use crate::error::{SimulationError, SimulationResult};
use serde::{Deserialize, Serialize};

/// Movement tuning for one kind of body. Velocities are in units per second,
/// accelerations in units per second squared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub accel: f32,
    /// Horizontal deceleration applied when grounded with no input.
    pub decel: f32,
    pub max_speed: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub jump_force: f32,
    /// Height of the strip below a body that counts as "ground underneath".
    pub ground_sensor_depth: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            accel: 1200.0,
            decel: 1800.0,
            max_speed: 300.0,
            gravity: 1800.0,
            terminal_velocity: 900.0,
            jump_force: 700.0,
            ground_sensor_depth: 8.0,
        }
    }
}

impl PhysicsConfig {
    pub fn enemy_default() -> Self {
        Self {
            accel: 900.0,
            decel: 1200.0,
            max_speed: 200.0,
            terminal_velocity: 700.0,
            ground_sensor_depth: 50.0,
            ..Self::default()
        }
    }

    fn validate(&self, owner: &str) -> SimulationResult<()> {
        let fields = [
            ("accel", self.accel),
            ("decel", self.decel),
            ("max_speed", self.max_speed),
            ("gravity", self.gravity),
            ("terminal_velocity", self.terminal_velocity),
            ("jump_force", self.jump_force),
            ("ground_sensor_depth", self.ground_sensor_depth),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::Config(format!(
                    "{}.{} must be a finite non-negative number, got {}",
                    owner, name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub physics: PhysicsConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 80.0,
            physics: PhysicsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub width: f32,
    pub height: f32,
    pub max_health: f32,
    /// Distance to the player below which an enemy starts hunting.
    pub detection_range: f32,
    pub flee_range: f32,
    pub attack_range: f32,
    /// Seconds between two attacks.
    pub attack_cooldown: f32,
    /// Fraction of max health under which a nearby player makes an enemy flee.
    pub flee_health_ratio: f32,
    /// Fields left out of a partial `physics` block come from
    /// [`PhysicsConfig::default`], not [`PhysicsConfig::enemy_default`].
    pub physics: PhysicsConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 60.0,
            max_health: 100.0,
            detection_range: 400.0,
            flee_range: 250.0,
            attack_range: 50.0,
            attack_cooldown: 1.0,
            flee_health_ratio: 0.3,
            physics: PhysicsConfig::enemy_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub tile_width: f32,
    pub tile_height: f32,
    /// Vertical draw offset for top tiles whose art has a lip (grass, sand, water).
    pub top_tile_visual_offset: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tile_width: 60.0,
            tile_height: 60.0,
            top_tile_visual_offset: 26.5625,
        }
    }
}

/// Mirrors [`quadtree::quadtree::Config`] so it can live in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeSettings {
    pub max_objects: usize,
    pub max_levels: usize,
}

impl Default for QuadtreeSettings {
    fn default() -> Self {
        let config = quadtree::quadtree::Config::default();
        Self {
            max_objects: config.max_objects,
            max_levels: config.max_levels,
        }
    }
}

impl From<QuadtreeSettings> for quadtree::quadtree::Config {
    fn from(settings: QuadtreeSettings) -> Self {
        Self {
            max_objects: settings.max_objects,
            max_levels: settings.max_levels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerMode {
    /// One worker thread per shard, joined behind a barrier every tick.
    Parallel,
    /// Shards run on the calling thread in index order. Reproducible.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub shard_capacity: usize,
    pub mode: SchedulerMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            shard_capacity: 10,
            mode: SchedulerMode::Parallel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ticks_per_second: u32,
    pub quadtree: QuadtreeSettings,
    pub level: LevelConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub scheduler: SchedulerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            quadtree: QuadtreeSettings::default(),
            level: LevelConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON settings document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SimulationResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "loaded simulation settings: {} tps, shard capacity {}, {:?} scheduling",
            config.ticks_per_second,
            config.scheduler.shard_capacity,
            config.scheduler.mode
        );
        Ok(config)
    }

    pub fn to_json_string(&self) -> SimulationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fixed timestep in seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }

    pub fn validate(&self) -> SimulationResult<()> {
        if self.ticks_per_second == 0 {
            return Err(SimulationError::Config(
                "ticks_per_second must be positive".to_string(),
            ));
        }
        if self.scheduler.shard_capacity == 0 {
            return Err(SimulationError::Config(
                "scheduler.shard_capacity must be positive".to_string(),
            ));
        }
        if self.quadtree.max_objects == 0 {
            return Err(SimulationError::Config(
                "quadtree.max_objects must be positive".to_string(),
            ));
        }
        if !(self.level.tile_width > 0.0 && self.level.tile_height > 0.0) {
            return Err(SimulationError::Config(
                "level tiles must have a positive size".to_string(),
            ));
        }
        for (owner, width, height) in [
            ("player", self.player.width, self.player.height),
            ("enemy", self.enemy.width, self.enemy.height),
        ] {
            if !(width > 0.0 && height > 0.0) {
                return Err(SimulationError::Config(format!(
                    "{} must have a positive size",
                    owner
                )));
            }
        }
        self.player.physics.validate("player.physics")?;
        self.enemy.physics.validate("enemy.physics")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.scheduler.shard_capacity, 10);
        assert_eq!(config.quadtree.max_objects, 10);
        assert_eq!(config.quadtree.max_levels, 5);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let json = r#"{
            "ticks_per_second": 30,
            "scheduler": { "mode": "Sequential" },
            "enemy": { "physics": { "max_speed": 150.0 } }
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.ticks_per_second, 30);
        assert_eq!(config.scheduler.mode, SchedulerMode::Sequential);
        assert_eq!(config.scheduler.shard_capacity, 10);
        assert_eq!(config.enemy.physics.max_speed, 150.0);
        assert_eq!(config.enemy.physics.gravity, PhysicsConfig::default().gravity);
    }

    #[test]
    fn round_trips_through_json() {
        let config = SimulationConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(SimulationConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SimulationConfig::from_json_str(r#"{"ticks_per_second": 0}"#),
            Err(SimulationError::Config(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_str(r#"{"scheduler": {"shard_capacity": 0}}"#),
            Err(SimulationError::Config(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_str(r#"{"player": {"physics": {"gravity": -1.0}}}"#),
            Err(SimulationError::Config(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_str("not json"),
            Err(SimulationError::Config(_))
        ));
    }
}
