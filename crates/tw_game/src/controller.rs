use crate::collision::{CollisionMoveResult, TileCollider};
use tw_core::Rect;
use tw_level::PropertyBag;

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerInput {
    pub move_x: f32,
    pub jump_pressed: bool,
}

/// Platformer tuning in pixels and seconds, y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub max_speed: f32,
    pub accel_ground: f32,
    pub accel_air: f32,
    pub friction_ground: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Upward launch speed; negative because y grows downward.
    pub jump_speed: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_speed: 180.0,
            accel_ground: 1600.0,
            accel_air: 900.0,
            friction_ground: 2000.0,
            gravity: 1800.0,
            max_fall_speed: 900.0,
            jump_speed: -620.0,
        }
    }
}

impl ControllerConfig {
    /// Defaults overridden by the map object's `speed`, `jump` and `gravity`
    /// properties. `jump` is given as a positive height speed.
    pub fn from_properties(props: &PropertyBag) -> Self {
        let mut config = Self::default();
        if let Some(speed) = props.get_f32("speed") {
            config.max_speed = speed;
        }
        if let Some(jump) = props.get_f32("jump") {
            config.jump_speed = -jump.abs();
        }
        if let Some(gravity) = props.get_f32("gravity") {
            config.gravity = gravity;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterController {
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub grounded: bool,
    pub contacts: ContactState,
    pub config: ControllerConfig,
}

impl CharacterController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            velocity_x: 0.0,
            velocity_y: 0.0,
            grounded: false,
            contacts: ContactState::default(),
            config,
        }
    }

    /// Advance one step and return the moved bounds.
    pub fn step(
        &mut self,
        bounds: Rect,
        input: ControllerInput,
        dt: f32,
        collider: &TileCollider<'_>,
    ) -> Rect {
        let accel = if self.grounded {
            self.config.accel_ground
        } else {
            self.config.accel_air
        };

        if input.move_x != 0.0 {
            let target = input.move_x * self.config.max_speed;
            self.velocity_x = move_towards(self.velocity_x, target, accel * dt);
        } else if self.grounded {
            self.velocity_x = move_towards(self.velocity_x, 0.0, self.config.friction_ground * dt);
        }

        // Jumps are edge-triggered and only legal from the ground.
        if input.jump_pressed && self.grounded {
            self.velocity_y = self.config.jump_speed;
            self.grounded = false;
        }

        self.velocity_y =
            (self.velocity_y + self.config.gravity * dt).min(self.config.max_fall_speed);

        let result = collider.move_and_collide_detailed(
            bounds,
            self.velocity_x * dt,
            self.velocity_y * dt,
        );
        self.apply_collision_result(result);
        result.bounds
    }

    fn apply_collision_result(&mut self, result: CollisionMoveResult) {
        self.contacts = ContactState {
            left: result.blocked_left,
            right: result.blocked_right,
            down: result.blocked_down,
            up: result.blocked_up,
        };

        if (result.blocked_left && self.velocity_x < 0.0)
            || (result.blocked_right && self.velocity_x > 0.0)
        {
            self.velocity_x = 0.0;
        }

        if result.blocked_up && self.velocity_y < 0.0 {
            self.velocity_y = 0.0;
        }
        // Grounded comes from contact, never from position heuristics.
        if result.blocked_down && self.velocity_y > 0.0 {
            self.velocity_y = 0.0;
            self.grounded = true;
        } else if result.collided_y {
            self.velocity_y = 0.0;
            self.grounded = false;
        } else {
            self.grounded = false;
        }
    }

    pub fn is_rising(&self) -> bool {
        !self.grounded && self.velocity_y < 0.0
    }

    pub fn is_falling(&self) -> bool {
        !self.grounded && self.velocity_y > 0.0
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else if target > current {
        current + max_delta
    } else {
        current - max_delta
    }
}
