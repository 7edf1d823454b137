//! The playable character: platformer physics driven by keyboard input, with
//! its animation state tracked by a [`StateMachine`].
//!
//! States are `idle`, `walking`, `jumping`, `falling`, `recovering` (a short
//! landing pause) and `stunned` (entered when an enemy calls `stun`). The
//! machine may be authored in JSON; events it does not accept in the current
//! state are simply not raised.

use crate::collision::TileCollider;
use crate::controller::{CharacterController, ControllerConfig, ControllerInput};
use glam::Vec2;
use tw_core::{Key, StateDefinition, StateMachine, StateReceiver};
use tw_level::{CallArgs, MapObject, Sprite, SpriteBody, SpriteContext, TypeRegistry};

pub const TYPE_NAME: &str = "Player";

const STUN_MS: u64 = 1000;
const RECOVER_MS: u64 = 120;

/// The built-in state graph used when no state file is available.
pub fn default_states() -> Vec<StateDefinition> {
    vec![
        StateDefinition::new("idle")
            .initial()
            .on("walk", "walking")
            .on("jump", "jumping")
            .on("fall", "falling")
            .on("stun", "stunned"),
        StateDefinition::new("walking")
            .on("stop", "idle")
            .on("jump", "jumping")
            .on("fall", "falling")
            .on("stun", "stunned"),
        StateDefinition::new("jumping")
            .on("fall", "falling")
            .on("land", "recovering")
            .on("stun", "stunned"),
        StateDefinition::new("falling")
            .on("land", "recovering")
            .on("stun", "stunned"),
        StateDefinition::new("recovering")
            .on("recovered", "idle")
            .on("walk", "walking")
            .on("jump", "jumping")
            .on("stun", "stunned"),
        StateDefinition::new("stunned").on("recover", "idle"),
    ]
}

/// Spritesheet frame shown in each state.
fn frame_for(state: &str) -> u32 {
    match state {
        "walking" => 1,
        "jumping" => 2,
        "falling" => 3,
        "recovering" => 4,
        "stunned" => 5,
        _ => 0,
    }
}

/// Mutable motion state the machine's entry callbacks act on.
#[derive(Debug, Clone)]
struct Motion {
    controller: CharacterController,
    now_ms: u64,
    stunned_until: u64,
    recover_until: u64,
}

impl StateReceiver for Motion {
    fn enter_state(&mut self, state: &str) {
        log::debug!("Player entered '{}'", state);
        match state {
            "stunned" => {
                self.stunned_until = self.now_ms + STUN_MS;
                self.controller.velocity_x = 0.0;
                self.controller.velocity_y = self.controller.config.jump_speed * 0.5;
                self.controller.grounded = false;
            }
            "recovering" => self.recover_until = self.now_ms + RECOVER_MS,
            _ => {}
        }
    }
}

pub struct Player {
    body: SpriteBody,
    machine: StateMachine,
    motion: Motion,
    config: ControllerConfig,
}

impl Player {
    pub fn new(body: SpriteBody, machine: StateMachine, config: ControllerConfig) -> Self {
        Self {
            body,
            machine,
            motion: Motion {
                controller: CharacterController::new(config),
                now_ms: 0,
                stunned_until: 0,
                recover_until: 0,
            },
            config,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &str {
        self.machine.state()
    }

    #[allow(dead_code)]
    pub fn is_grounded(&self) -> bool {
        self.motion.controller.grounded
    }

    fn accepts(&self, event: &str) -> bool {
        let current = self.machine.state();
        self.machine
            .states()
            .iter()
            .rev()
            .find(|s| s.name == current)
            .is_some_and(|s| s.events.contains_key(event))
    }

    fn fire(&mut self, event: &str) {
        if self.accepts(event) {
            self.machine.consume_event(event, &mut self.motion);
        }
    }

    fn next_event(&self, moving: bool, jumped: bool) -> Option<&'static str> {
        let controller = &self.motion.controller;
        let now = self.motion.now_ms;
        match self.machine.state() {
            "idle" | "walking" if jumped => Some("jump"),
            "idle" | "walking" if controller.is_falling() => Some("fall"),
            "idle" if moving => Some("walk"),
            "walking" if !moving => Some("stop"),
            "jumping" if controller.grounded => Some("land"),
            "jumping" if controller.is_falling() => Some("fall"),
            "falling" if controller.grounded => Some("land"),
            "recovering" if jumped => Some("jump"),
            "recovering" if now >= self.motion.recover_until => {
                Some(if moving { "walk" } else { "recovered" })
            }
            "stunned" if now >= self.motion.stunned_until => Some("recover"),
            _ => None,
        }
    }
}

fn read_input(ctx: &SpriteContext<'_>) -> ControllerInput {
    let mut move_x = 0.0;
    if ctx.input.is_held(Key::Left) {
        move_x -= 1.0;
    }
    if ctx.input.is_held(Key::Right) {
        move_x += 1.0;
    }
    ControllerInput {
        move_x,
        jump_pressed: ctx.input.is_just_pressed(Key::Jump),
    }
}

impl Sprite for Player {
    fn body(&self) -> &SpriteBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut SpriteBody {
        &mut self.body
    }

    fn is_player(&self) -> bool {
        true
    }

    fn update_object(&mut self, ctx: &mut SpriteContext<'_>) {
        self.motion.now_ms = ctx.now_ms;
        if !self.body.exists {
            // Frozen until the level revives the body.
            self.motion.controller.velocity_x = 0.0;
            self.motion.controller.velocity_y = 0.0;
            self.body.velocity = Vec2::ZERO;
            return;
        }
        let input = if self.machine.is_in("stunned") {
            ControllerInput::default()
        } else {
            read_input(ctx)
        };
        let was_grounded = self.motion.controller.grounded;

        let collider = TileCollider::new(ctx.map);
        let mut bounds = self
            .motion
            .controller
            .step(self.body.bounds(), input, ctx.dt, &collider);
        let max_x = (ctx.world_size.x - bounds.width).max(0.0);
        if bounds.x < 0.0 || bounds.x > max_x {
            bounds.x = bounds.x.clamp(0.0, max_x);
            self.motion.controller.velocity_x = 0.0;
        }

        let controller = &self.motion.controller;
        self.body.position = bounds.center();
        self.body.velocity = Vec2::new(controller.velocity_x, controller.velocity_y);
        if input.move_x < 0.0 {
            self.body.flip_x = true;
        } else if input.move_x > 0.0 {
            self.body.flip_x = false;
        }

        let jumped = input.jump_pressed && was_grounded && controller.is_rising();
        if let Some(event) = self.next_event(input.move_x != 0.0, jumped) {
            self.fire(event);
        }
        self.body.frame = frame_for(self.machine.state());
    }

    fn reset(&mut self) {
        self.body.reset();
        self.machine.reset();
        self.motion.controller = CharacterController::new(self.config);
        self.motion.stunned_until = 0;
        self.motion.recover_until = 0;
        self.body.frame = frame_for(self.machine.state());
    }

    fn call(&mut self, method: &str, args: &CallArgs) -> Option<bool> {
        match method {
            "stun" => {
                if self.machine.is_in("stunned") {
                    return Some(false);
                }
                log::debug!("Player stunned by '{}'", args.caller);
                self.fire("stun");
                Some(self.machine.is_in("stunned"))
            }
            _ => None,
        }
    }
}

/// Register the `Player` object type. Every player starts from a copy of
/// `machine`.
pub fn register(registry: &mut TypeRegistry, machine: StateMachine) {
    registry.register(TYPE_NAME, move |ctx, spec| {
        let size = Vec2::new(
            if spec.width > 0.0 { spec.width } else { ctx.tile_size.x },
            if spec.height > 0.0 { spec.height } else { ctx.tile_size.y },
        );
        let key = spec
            .properties
            .get_str("key")
            .unwrap_or_else(|| "player".to_string());
        let body = SpriteBody::new(&spec.name, &key, spec.x, spec.y, size.x, size.y);
        let config = ControllerConfig::from_properties(&spec.properties);
        let player = Player::new(body, machine.clone(), config);
        Ok(Some(MapObject::Sprite(Box::new(player))))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Scene;

    const ROOM: [&str; 6] = [
        "........",
        "........",
        "........",
        "........",
        "........",
        "########",
    ];

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(
            SpriteBody::new("hero", "player", x, y, 16.0, 16.0),
            StateMachine::new(default_states()),
            ControllerConfig::default(),
        )
    }

    fn tick(scene: &mut Scene, player: &mut Player, frames: u32) {
        for _ in 0..frames {
            scene.with_context("hero", None, |ctx| player.update_object(ctx));
            scene.input.end_frame();
            scene.now_ms += 16;
        }
    }

    #[test]
    fn falls_then_recovers_to_idle() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(16.0, 0.0);
        tick(&mut scene, &mut player, 5);
        assert_eq!(player.state(), "falling");
        assert_eq!(player.body().frame, 3);

        tick(&mut scene, &mut player, 60);
        assert!(player.is_grounded());
        assert_eq!(player.state(), "idle");
        assert_eq!(player.body().bounds().bottom(), 80.0);
    }

    #[test]
    fn walking_and_stopping() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(16.0, 64.0);
        tick(&mut scene, &mut player, 30);
        assert_eq!(player.state(), "idle");

        scene.input.key_down(Key::Right);
        tick(&mut scene, &mut player, 10);
        assert_eq!(player.state(), "walking");
        assert!(player.body().position.x > 24.0);

        scene.input.key_up(Key::Right);
        tick(&mut scene, &mut player, 1);
        assert_eq!(player.state(), "idle");
    }

    #[test]
    fn jump_press_enters_jumping() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(16.0, 64.0);
        tick(&mut scene, &mut player, 30);
        scene.input.key_down(Key::Jump);
        tick(&mut scene, &mut player, 1);
        assert_eq!(player.state(), "jumping");
        assert!(player.body().velocity.y < 0.0);
    }

    #[test]
    fn facing_follows_input() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(64.0, 64.0);
        scene.input.key_down(Key::Left);
        tick(&mut scene, &mut player, 2);
        assert!(player.body().flip_x);
    }

    #[test]
    fn cannot_leave_the_world_sideways() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(0.0, 64.0);
        scene.input.key_down(Key::Left);
        tick(&mut scene, &mut player, 30);
        assert_eq!(player.body().bounds().x, 0.0);
    }

    #[test]
    fn stun_blocks_input_until_it_wears_off() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(16.0, 64.0);
        tick(&mut scene, &mut player, 30);

        assert_eq!(player.call("stun", &CallArgs::from_caller("slime")), Some(true));
        assert_eq!(player.state(), "stunned");
        assert_eq!(player.call("stun", &CallArgs::from_caller("slime")), Some(false));

        let x = player.body().position.x;
        scene.input.key_down(Key::Right);
        tick(&mut scene, &mut player, 30);
        assert_eq!(player.body().position.x, x);
        assert_eq!(player.state(), "stunned");

        tick(&mut scene, &mut player, 40);
        assert_ne!(player.state(), "stunned");
    }

    #[test]
    fn frozen_player_holds_position() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(16.0, 0.0);
        tick(&mut scene, &mut player, 3);
        player.body_mut().exists = false;
        let frozen_at = player.body().position;

        scene.input.key_down(Key::Right);
        tick(&mut scene, &mut player, 10);
        assert_eq!(player.body().position, frozen_at);
        assert_eq!(player.body().velocity, Vec2::ZERO);

        player.body_mut().exists = true;
        tick(&mut scene, &mut player, 1);
        assert!(player.body().position.y - frozen_at.y < 1.0, "fall restarts from rest");
    }

    #[test]
    fn reset_level_trigger_freezes_player_until_restart() {
        use tw_level::{FrameworkConfig, HeadlessHost, Level, LevelDefinition, LevelPhase, MapFile};

        let map: MapFile = serde_json::from_value(serde_json::json!({
            "width": 8, "height": 6, "tilewidth": 16, "tileheight": 16,
            "tilesets": [ { "firstgid": 1, "name": "tiles", "image": "tiles.png",
                            "tilewidth": 16, "tileheight": 16,
                            "tileproperties": { "0": { "solid": "true" } } } ],
            "layers": [
                { "name": "main", "type": "tilelayer", "width": 8, "height": 6,
                  "properties": { "solid": "true" },
                  "data": [0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0,
                           0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0, 1,1,1,1,1,1,1,1] },
                { "name": "actors", "type": "objectgroup", "objects": [
                    { "type": "Player", "name": "hero", "x": 16, "y": 0, "width": 16, "height": 16 },
                    { "type": "ResetLevelTrigger", "name": "pit", "x": 0, "y": 0,
                      "width": 64, "height": 48, "properties": { "fade_ms": 500 } }
                ] }
            ]
        }))
        .expect("fixture map is valid");
        let definition: LevelDefinition = serde_json::from_value(serde_json::json!({
            "index": 1, "tilemap": "maps/pit.json",
            "tileset": { "url": "tiles.png", "tile_width": 16, "tile_height": 16 }
        }))
        .expect("fixture definition parses");

        let mut registry = tw_level::TypeRegistry::with_builtins();
        register(&mut registry, StateMachine::new(default_states()));
        let config = FrameworkConfig::default();
        let mut host = HeadlessHost::new(128, 96);
        let mut level =
            Level::create(definition, &map, &registry, &config, &mut host).expect("level builds");

        let mut input = tw_core::InputState::new();
        level.update(&mut host, &input, &config, 1.0 / 60.0);
        assert!(level.triggers[0].activated);
        let frozen = level.world.player().expect("player").clone();
        assert!(!frozen.exists);

        input.key_down(Key::Right);
        for _ in 0..20 {
            host.advance(16);
            level.update(&mut host, &input, &config, 1.0 / 60.0);
            input.end_frame();
        }
        let player = level.world.player().expect("player");
        assert_eq!(player.position, frozen.position);
        assert_eq!(player.velocity, Vec2::ZERO);
        assert_eq!(level.phase(), LevelPhase::Running);

        host.advance(300);
        level.update(&mut host, &input, &config, 1.0 / 60.0);
        assert_eq!(level.phase(), LevelPhase::WarmUp);
        let player = level.world.player().expect("player");
        assert!(player.exists);
        assert_eq!(player.position, Vec2::new(24.0, 8.0));
    }

    #[test]
    fn unknown_calls_are_not_handled() {
        let mut player = player_at(0.0, 0.0);
        assert_eq!(player.call("explode", &CallArgs::default()), None);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut scene = Scene::new(&ROOM);
        let mut player = player_at(16.0, 0.0);
        tick(&mut scene, &mut player, 10);
        player.reset();
        assert_eq!(player.state(), "idle");
        assert_eq!(player.body().position, Vec2::new(24.0, 8.0));
        assert!(!player.is_grounded());
    }

    #[test]
    fn authored_machine_without_stun_ignores_enemies() {
        let machine = StateMachine::new(vec![StateDefinition::new("idle").initial()]);
        let mut player = Player::new(
            SpriteBody::new("hero", "player", 0.0, 0.0, 16.0, 16.0),
            machine,
            ControllerConfig::default(),
        );
        assert_eq!(player.call("stun", &CallArgs::from_caller("slime")), Some(false));
        assert_eq!(player.state(), "idle");
    }
}
