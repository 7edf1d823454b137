//! Renderable map objects.
//!
//! Game code implements [`Sprite`] for each sprite type it registers with the
//! [`crate::TypeRegistry`]. Shared placement state lives in [`SpriteBody`];
//! positions are sprite centres, so a map object at `(x, y)` with size
//! `(w, h)` starts at `(x + w/2, y + h/2)`.

use crate::host::HostEngine;
use crate::registry::Handle;
use crate::tiles::TileMap;
use glam::Vec2;
use tw_core::{InputState, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteBody {
    pub name: String,
    /// Image or spritesheet key drawn by the host.
    pub key: String,
    pub frame: u32,
    pub position: Vec2,
    pub initial_position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub alive: bool,
    /// When false the sprite neither moves nor renders.
    pub exists: bool,
    pub visible: bool,
    pub flip_x: bool,
}

impl SpriteBody {
    pub fn new(name: &str, key: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        let position = Vec2::new(x + width * 0.5, y + height * 0.5);
        Self {
            name: name.to_string(),
            key: key.to_string(),
            frame: 0,
            position,
            initial_position: position,
            size: Vec2::new(width, height),
            velocity: Vec2::ZERO,
            alive: true,
            exists: true,
            visible: true,
            flip_x: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    /// Back to the construction position, stationary and live.
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.velocity = Vec2::ZERO;
        self.alive = true;
        self.exists = true;
        self.visible = true;
    }

    pub fn revive(&mut self) {
        self.alive = true;
        self.exists = true;
        self.visible = true;
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.exists = false;
        self.visible = false;
    }
}

/// Arguments passed with a named callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    /// Name of the trigger, alarm, area or sprite making the call.
    pub caller: String,
    /// The entity tracked by the caller, if any.
    pub entity: Option<Handle>,
}

impl CallArgs {
    pub fn from_caller(caller: &str) -> Self {
        Self {
            caller: caller.to_string(),
            entity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageTarget {
    Player,
    Named(String),
}

/// A callback a sprite asked for during its update, delivered after every
/// sprite has moved.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub target: MessageTarget,
    pub method: String,
    pub args: CallArgs,
}

/// Everything a sprite may read or touch while updating.
pub struct SpriteContext<'a> {
    pub map: &'a TileMap,
    pub input: &'a InputState,
    pub host: &'a mut dyn HostEngine,
    pub now_ms: u64,
    /// Frame delta in seconds.
    pub dt: f32,
    pub world_size: Vec2,
    /// Player bounds after the player's own update this frame.
    pub player_bounds: Option<Rect>,
    caller: &'a str,
    outbox: &'a mut Vec<Message>,
}

impl<'a> SpriteContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        map: &'a TileMap,
        input: &'a InputState,
        host: &'a mut dyn HostEngine,
        now_ms: u64,
        dt: f32,
        world_size: Vec2,
        player_bounds: Option<Rect>,
        caller: &'a str,
        outbox: &'a mut Vec<Message>,
    ) -> Self {
        Self {
            map,
            input,
            host,
            now_ms,
            dt,
            world_size,
            player_bounds,
            caller,
            outbox,
        }
    }

    pub fn send(&mut self, target: &str, method: &str) {
        self.push(MessageTarget::Named(target.to_string()), method);
    }

    pub fn send_to_player(&mut self, method: &str) {
        self.push(MessageTarget::Player, method);
    }

    fn push(&mut self, target: MessageTarget, method: &str) {
        self.outbox.push(Message {
            target,
            method: method.to_string(),
            args: CallArgs::from_caller(self.caller),
        });
    }
}

/// Capability interface of every sprite built from map data.
pub trait Sprite {
    fn body(&self) -> &SpriteBody;
    fn body_mut(&mut self) -> &mut SpriteBody;

    fn is_player(&self) -> bool {
        false
    }

    /// Per-frame behaviour.
    fn update_object(&mut self, ctx: &mut SpriteContext<'_>);

    fn reset(&mut self) {
        self.body_mut().reset();
    }

    fn revive(&mut self) {
        self.body_mut().revive();
    }

    /// Invoke a named callback. `None` means the sprite has no such method.
    fn call(&mut self, _method: &str, _args: &CallArgs) -> Option<bool> {
        None
    }
}
