//! A hopping enemy. It idles on the ground, jumps towards the player every
//! `jump_interval` milliseconds and stuns the player on contact.

use crate::collision::TileCollider;
use crate::controller::{CharacterController, ControllerConfig, ControllerInput};
use glam::Vec2;
use tw_core::{StateDefinition, StateMachine, StateReceiver};
use tw_level::{CallArgs, MapObject, Sprite, SpriteBody, SpriteContext, TypeRegistry};

pub const TYPE_NAME: &str = "Enemy";

const DEFAULT_JUMP_INTERVAL_MS: u64 = 2000;

pub fn default_states() -> Vec<StateDefinition> {
    vec![
        StateDefinition::new("idle").initial().on("jump", "jumping"),
        StateDefinition::new("jumping").on("land", "idle"),
    ]
}

#[derive(Debug, Clone)]
struct Hop {
    controller: CharacterController,
    now_ms: u64,
    next_jump_ms: Option<u64>,
    interval_ms: u64,
}

impl StateReceiver for Hop {
    fn enter_state(&mut self, state: &str) {
        match state {
            "jumping" => {
                self.controller.velocity_y = self.controller.config.jump_speed;
                self.controller.grounded = false;
            }
            "idle" => {
                self.controller.velocity_x = 0.0;
                self.next_jump_ms = Some(self.now_ms + self.interval_ms);
            }
            _ => {}
        }
    }
}

pub struct Enemy {
    body: SpriteBody,
    machine: StateMachine,
    hop: Hop,
    config: ControllerConfig,
    touching_player: bool,
}

impl Enemy {
    pub fn new(body: SpriteBody, config: ControllerConfig, interval_ms: u64) -> Self {
        Self {
            body,
            machine: StateMachine::new(default_states()),
            hop: Hop {
                controller: CharacterController::new(config),
                now_ms: 0,
                next_jump_ms: None,
                interval_ms,
            },
            config,
            touching_player: false,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &str {
        self.machine.state()
    }
}

impl Sprite for Enemy {
    fn body(&self) -> &SpriteBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut SpriteBody {
        &mut self.body
    }

    fn update_object(&mut self, ctx: &mut SpriteContext<'_>) {
        self.hop.now_ms = ctx.now_ms;
        let next_jump = *self
            .hop
            .next_jump_ms
            .get_or_insert(ctx.now_ms + self.hop.interval_ms);

        if self.machine.is_in("idle") && self.hop.controller.grounded && ctx.now_ms >= next_jump {
            self.machine.consume_event("jump", &mut self.hop);
        }

        let toward_player = match ctx.player_bounds {
            Some(player) if self.machine.is_in("jumping") => {
                (player.center().x - self.body.position.x).signum()
            }
            _ => 0.0,
        };
        let input = ControllerInput {
            move_x: toward_player,
            jump_pressed: false,
        };
        let collider = TileCollider::new(ctx.map);
        let bounds = self
            .hop
            .controller
            .step(self.body.bounds(), input, ctx.dt, &collider);
        self.body.position = bounds.center();
        self.body.velocity = Vec2::new(self.hop.controller.velocity_x, self.hop.controller.velocity_y);
        if toward_player != 0.0 {
            self.body.flip_x = toward_player < 0.0;
        }

        if self.machine.is_in("jumping") && self.hop.controller.grounded {
            self.machine.consume_event("land", &mut self.hop);
        }
        self.body.frame = u32::from(self.machine.is_in("jumping"));

        let touching = ctx
            .player_bounds
            .is_some_and(|player| player.intersects(&bounds));
        if touching && !self.touching_player {
            ctx.send_to_player("stun");
        }
        self.touching_player = touching;
    }

    fn reset(&mut self) {
        self.body.reset();
        self.machine.reset();
        self.hop.controller = CharacterController::new(self.config);
        self.hop.next_jump_ms = None;
        self.touching_player = false;
        self.body.frame = 0;
    }

    /// `alarm` makes a grounded enemy hop immediately.
    fn call(&mut self, method: &str, args: &CallArgs) -> Option<bool> {
        match method {
            "alarm" | "jump" => {
                if !(self.machine.is_in("idle") && self.hop.controller.grounded) {
                    return Some(false);
                }
                log::debug!("Enemy '{}' hops on '{}'", self.body.name, args.caller);
                Some(self.machine.consume_event("jump", &mut self.hop))
            }
            _ => None,
        }
    }
}

pub fn register(registry: &mut TypeRegistry) {
    registry.register(TYPE_NAME, |ctx, spec| {
        let size = Vec2::new(
            if spec.width > 0.0 { spec.width } else { ctx.tile_size.x },
            if spec.height > 0.0 { spec.height } else { ctx.tile_size.y },
        );
        let key = spec
            .properties
            .get_str("key")
            .unwrap_or_else(|| "enemy".to_string());
        let body = SpriteBody::new(&spec.name, &key, spec.x, spec.y, size.x, size.y);
        let mut config = ControllerConfig::from_properties(&spec.properties);
        config.max_speed = spec.properties.get_f32("speed").unwrap_or(60.0);
        let interval = spec
            .properties
            .get_u64("jump_interval")
            .unwrap_or(DEFAULT_JUMP_INTERVAL_MS);
        if interval == 0 {
            return Err("jump_interval must be positive".to_string());
        }
        Ok(Some(MapObject::Sprite(Box::new(Enemy::new(body, config, interval)))))
    });
}
