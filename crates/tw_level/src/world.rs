//! The live object graph of one level.
//!
//! [`World`] owns the tile layers, image layers, sprite groups and emitters,
//! plus the per-level [`NameRegistry`] used to resolve trigger/alarm/area
//! targets. Triggers, alarms and areas live beside the world in
//! [`crate::Level`] so they can borrow it mutably while they run.

use crate::entities::Emitter;
use crate::host::HostEngine;
use crate::registry::{Handle, NameRegistry, SpriteId};
use crate::sprite::{CallArgs, Message, MessageTarget, Sprite, SpriteBody, SpriteContext};
use crate::tiles::TileMap;
use glam::Vec2;
use tw_core::{InputState, Rect};

/// Requests raised during a frame and handled after the frame's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelCommand {
    Restart,
    ChangeLevel(u32),
}

/// A named, ordered collection of sprites (one per object group).
pub struct Group {
    pub name: String,
    pub visible: bool,
    pub alpha: f32,
    /// Inert groups neither update nor render.
    pub exists: bool,
    pub sprites: Vec<Box<dyn Sprite>>,
}

impl Group {
    pub fn new(name: &str, visible: bool, alpha: f32) -> Self {
        Self {
            name: name.to_string(),
            visible,
            alpha,
            exists: false,
            sprites: Vec::new(),
        }
    }
}

/// A single parallax background image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    pub name: String,
    pub key: String,
    pub size: Vec2,
    pub scroll_factor: Vec2,
    pub position: Vec2,
    pub visible: bool,
}

impl ImageLayer {
    pub fn follow_camera(&mut self, view: Rect) {
        self.position = Vec2::new(
            view.x - view.x * self.scroll_factor.x,
            view.y - view.y * self.scroll_factor.y,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawItem {
    TileLayer(usize),
    ImageLayer(usize),
    Group(usize),
}

pub struct World {
    pub map: TileMap,
    pub main_layer: usize,
    pub image_layers: Vec<ImageLayer>,
    pub groups: Vec<Group>,
    pub emitters: Vec<Emitter>,
    pub names: NameRegistry,
    pub player: SpriteId,
    /// World bounds in pixels.
    pub size: Vec2,
    pub draw_order: Vec<DrawItem>,
    commands: Vec<LevelCommand>,
    outbox: Vec<Message>,
}

impl World {
    pub fn new(map: TileMap, main_layer: usize, player: SpriteId, size: Vec2) -> Self {
        Self {
            map,
            main_layer,
            image_layers: Vec::new(),
            groups: Vec::new(),
            emitters: Vec::new(),
            names: NameRegistry::new(),
            player,
            size,
            draw_order: Vec::new(),
            commands: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Handle> {
        self.names.resolve(name)
    }

    pub fn player_handle(&self) -> Handle {
        Handle::Sprite(self.player)
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&dyn Sprite> {
        self.groups
            .get(id.group)
            .and_then(|g| g.sprites.get(id.index))
            .map(|s| s.as_ref())
    }

    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Box<dyn Sprite>> {
        self.groups
            .get_mut(id.group)
            .and_then(|g| g.sprites.get_mut(id.index))
    }

    pub fn player(&self) -> Option<&SpriteBody> {
        self.sprite(self.player).map(|s| s.body())
    }

    pub fn player_mut(&mut self) -> Option<&mut SpriteBody> {
        let id = self.player;
        self.sprite_mut(id).map(|s| s.body_mut())
    }

    pub fn find_sprite(&self, name: &str) -> Option<&dyn Sprite> {
        match self.names.resolve(name)? {
            Handle::Sprite(id) => self.sprite(id),
            _ => None,
        }
    }

    pub fn emitter(&self, name: &str) -> Option<&Emitter> {
        match self.names.resolve(name)? {
            Handle::Emitter(i) => self.emitters.get(i),
            _ => None,
        }
    }

    /// Current bounds of the object behind `handle`.
    pub fn bounds(&self, handle: Handle) -> Option<Rect> {
        match handle {
            Handle::Sprite(id) => self.sprite(id).map(|s| s.body().bounds()),
            Handle::Emitter(i) => self.emitters.get(i).map(|e| e.area),
            Handle::Level => None,
        }
    }

    pub fn set_position(&mut self, handle: Handle, position: Vec2) -> bool {
        match handle {
            Handle::Sprite(id) => match self.sprite_mut(id) {
                Some(sprite) => {
                    sprite.body_mut().position = position;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Invoke a named method on the object behind `handle`.
    ///
    /// `None` means the object has no such method; callers treat that as a
    /// successful no-op.
    pub fn call(
        &mut self,
        host: &mut dyn HostEngine,
        handle: Handle,
        method: &str,
        args: &CallArgs,
    ) -> Option<bool> {
        match handle {
            Handle::Sprite(id) => self.sprite_mut(id)?.call(method, args),
            Handle::Emitter(i) => self.emitters.get_mut(i)?.call(host, method),
            Handle::Level => match method {
                "restart" => {
                    self.push_command(LevelCommand::Restart);
                    Some(true)
                }
                _ => None,
            },
        }
    }

    pub fn push_command(&mut self, command: LevelCommand) {
        self.commands.push(command);
    }

    pub(crate) fn take_commands(&mut self) -> Vec<LevelCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn set_groups_exist(&mut self, exists: bool) {
        for group in &mut self.groups {
            group.exists = exists;
        }
    }

    pub(crate) fn update_player(
        &mut self,
        host: &mut dyn HostEngine,
        input: &InputState,
        now_ms: u64,
        dt: f32,
    ) {
        let SpriteId { group, index } = self.player;
        let world_size = self.size;
        let World {
            groups, map, outbox, ..
        } = self;
        let Some(sprite) = groups.get_mut(group).and_then(|g| g.sprites.get_mut(index)) else {
            return;
        };
        if !sprite.body().exists {
            return;
        }
        let name = sprite.body().name.clone();
        let mut ctx = SpriteContext::new(
            map, input, host, now_ms, dt, world_size, None, &name, outbox,
        );
        sprite.update_object(&mut ctx);
    }

    /// Update every live, existing, non-player sprite in every existing group.
    pub(crate) fn update_sprites(
        &mut self,
        host: &mut dyn HostEngine,
        input: &InputState,
        now_ms: u64,
        dt: f32,
    ) {
        let player_id = self.player;
        let player_bounds = self.player().map(|b| b.bounds());
        let world_size = self.size;
        let World {
            groups, map, outbox, ..
        } = self;
        for (gi, group) in groups.iter_mut().enumerate() {
            if !group.exists {
                continue;
            }
            for (si, sprite) in group.sprites.iter_mut().enumerate() {
                let id = SpriteId {
                    group: gi,
                    index: si,
                };
                let body = sprite.body();
                if id == player_id || sprite.is_player() || !body.alive || !body.exists {
                    continue;
                }
                let name = sprite.body().name.clone();
                let mut ctx = SpriteContext::new(
                    map,
                    input,
                    &mut *host,
                    now_ms,
                    dt,
                    world_size,
                    player_bounds,
                    &name,
                    outbox,
                );
                sprite.update_object(&mut ctx);
            }
        }
    }

    /// Deliver messages sprites sent during their updates.
    pub(crate) fn dispatch_messages(&mut self, host: &mut dyn HostEngine) {
        let messages = std::mem::take(&mut self.outbox);
        for message in messages {
            let handle = match &message.target {
                MessageTarget::Player => Some(self.player_handle()),
                MessageTarget::Named(name) => self.resolve(name),
            };
            let Some(handle) = handle else {
                continue;
            };
            if self
                .call(host, handle, &message.method, &message.args)
                .is_none()
            {
                log::debug!(
                    "'{}' sent unknown method '{}'",
                    message.args.caller,
                    message.method
                );
            }
        }
    }

    /// Reset then revive every sprite, and hold groups inert until the next
    /// warm-up tick.
    pub(crate) fn reset_sprites(&mut self) {
        for group in &mut self.groups {
            for sprite in &mut group.sprites {
                sprite.reset();
                sprite.revive();
            }
            group.exists = false;
        }
    }
}
