//! Fixed-timestep platformer movement against the platforms in the shared
//! quadtree. Player and enemies run the same step with their own tuning.

use crate::config::PhysicsConfig;
use crate::spatial::{EntityKind, SpatialEntry};
use common::shapes::{Aabb, ColliderId};
use quadtree::quadtree::DynamicQuadtree;
use quadtree::QuadtreeResult;
use smallvec::SmallVec;

type Solids = SmallVec<[Aabb; 16]>;

/// Move `current` toward `target` by at most `step`, never overshooting.
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Position, size and velocity of anything that moves through the level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub grounded: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// Strip of `depth` units directly under the feet.
    pub fn ground_sensor(&self, depth: f32) -> Aabb {
        Aabb::new(self.x, self.y + self.height, self.width, depth)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// What the body wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveIntent {
    /// -1.0 (left) ..= 1.0 (right). Zero means no horizontal input.
    pub horizontal: f32,
    pub jump: bool,
}

impl MoveIntent {
    pub fn horizontal(horizontal: f32) -> Self {
        Self {
            horizontal,
            jump: false,
        }
    }
}

/// Contacts found while resolving one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Landed on a platform this tick.
    pub landed: bool,
    pub hit_wall: bool,
    pub hit_ceiling: bool,
    /// The ground sensor overlaps a platform.
    pub ground_detected: bool,
}

fn solids_overlapping(tree: &DynamicQuadtree<SpatialEntry>, rect: &Aabb) -> QuadtreeResult<Solids> {
    let mut solids = Solids::new();
    tree.retrieve_with(rect, |entry| {
        if entry.is_solid() && entry.bounds.intersects(rect) {
            solids.push(entry.bounds);
        }
    })?;
    Ok(solids)
}

/// Advance `body` by one tick of `dt` seconds and re-file it in `tree` under `id`.
///
/// Horizontal movement is integrated and resolved before vertical movement,
/// so at an inside corner the horizontal snap wins.
pub fn step_body(
    body: &mut Body,
    intent: MoveIntent,
    physics: &PhysicsConfig,
    dt: f32,
    id: ColliderId,
    kind: EntityKind,
    tree: &mut DynamicQuadtree<SpatialEntry>,
) -> QuadtreeResult<StepReport> {
    let mut report = StepReport::default();
    let input = intent.horizontal.clamp(-1.0, 1.0);

    if intent.jump && body.grounded {
        body.vel_y = -physics.jump_force;
    }

    let target = input * physics.max_speed;
    let step = if input == 0.0 && body.grounded {
        physics.decel * dt
    } else {
        physics.accel * dt
    };
    body.vel_x = approach(body.vel_x, target, step);
    body.vel_y += physics.gravity * dt;

    body.x += body.vel_x * dt;
    for platform in solids_overlapping(tree, &body.bounds())? {
        if !platform.intersects(&body.bounds()) {
            continue;
        }
        if body.vel_x > 0.0 {
            body.x = platform.x - body.width;
            report.hit_wall = true;
        } else if body.vel_x < 0.0 {
            body.x = platform.right();
            report.hit_wall = true;
        }
        body.vel_x = 0.0;
    }

    body.vel_y = body.vel_y.min(physics.terminal_velocity);
    body.y += body.vel_y * dt;
    body.grounded = false;
    for platform in solids_overlapping(tree, &body.bounds())? {
        if !platform.intersects(&body.bounds()) {
            continue;
        }
        if body.vel_y > 0.0 {
            body.y = platform.y - body.height;
            body.vel_y = 0.0;
            body.grounded = true;
            report.landed = true;
        } else if body.vel_y < 0.0 {
            body.y = platform.bottom();
            body.vel_y = 0.0;
            report.hit_ceiling = true;
        }
    }

    let sensor = body.ground_sensor(physics.ground_sensor_depth);
    report.ground_detected = !solids_overlapping(tree, &sensor)?.is_empty();

    tree.update(SpatialEntry::new(id, kind, body.bounds()))?;
    Ok(report)
}
