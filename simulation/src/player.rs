use crate::config::PlayerConfig;
use crate::physics::{self, Body, MoveIntent, StepReport};
use crate::spatial::EntityKind;
use crate::spatial::SpatialEntry;
use common::shapes::{Aabb, ColliderId};
use quadtree::quadtree::DynamicQuadtree;
use quadtree::QuadtreeResult;

/// Per-tick input record from whatever polls the keyboard or gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// -1.0 (left) ..= 1.0 (right).
    pub horizontal: f32,
    pub jump_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Moving,
    Jumping,
    Falling,
}

pub struct PlayerRuntime {
    pub id: ColliderId,
    pub body: Body,
    state: PlayerState,
    previous: PlayerState,
    config: PlayerConfig,
}

impl PlayerRuntime {
    pub fn new(id: ColliderId, x: f32, y: f32, config: PlayerConfig) -> Self {
        Self {
            id,
            body: Body::new(x, y, config.width, config.height),
            state: PlayerState::Falling,
            previous: PlayerState::Falling,
            config,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn previous_state(&self) -> PlayerState {
        self.previous
    }

    pub fn bounds(&self) -> Aabb {
        self.body.bounds()
    }

    pub fn entry(&self) -> SpatialEntry {
        SpatialEntry::new(self.id, EntityKind::Player, self.bounds())
    }

    pub fn update(
        &mut self,
        input: PlayerInput,
        dt: f32,
        tree: &mut DynamicQuadtree<SpatialEntry>,
    ) -> QuadtreeResult<StepReport> {
        let intent = MoveIntent {
            horizontal: input.horizontal,
            jump: input.jump_pressed,
        };
        let report = physics::step_body(
            &mut self.body,
            intent,
            &self.config.physics,
            dt,
            self.id,
            EntityKind::Player,
            tree,
        )?;
        self.transition(next_state(&self.body, &report));
        Ok(report)
    }

    fn transition(&mut self, next: PlayerState) {
        if next != self.state {
            log::trace!("player {} {:?} -> {:?}", self.id, self.state, next);
            self.previous = self.state;
            self.state = next;
        }
    }
}

fn next_state(body: &Body, report: &StepReport) -> PlayerState {
    if body.grounded {
        if body.vel_x != 0.0 {
            PlayerState::Moving
        } else {
            PlayerState::Idle
        }
    } else if body.vel_y < 0.0 {
        PlayerState::Jumping
    } else if report.ground_detected && body.vel_y == 0.0 {
        PlayerState::Idle
    } else {
        PlayerState::Falling
    }
}
