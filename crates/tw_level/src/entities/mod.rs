//! Map-authored behavioural objects: triggers, alarms, areas and emitters.

mod alarm;
mod area;
mod emitter;
mod fade;
mod trigger;

pub use alarm::Alarm;
pub use area::Area;
pub use emitter::{Emitter, EmitterConfig};
pub use fade::Fade;
pub use trigger::{
    NextLevel, ResetLevel, SetTile, Teleport, TileChange, Trigger, TriggerKind,
};

use crate::config::FrameworkConfig;
use crate::host::HostEngine;
use crate::registry::{Handle, MapObject, TypeRegistry};
use crate::world::World;

/// What an entity may touch while it updates or fires.
pub struct Frame<'a> {
    pub world: &'a mut World,
    pub host: &'a mut dyn HostEngine,
    pub config: &'a FrameworkConfig,
    pub now_ms: u64,
}

/// Weak, lazily resolved reference to another object by name.
///
/// Resolution is retried on every update until it succeeds; an unresolved
/// link simply makes the owning entity do nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    name: Option<String>,
    defaults_to_player: bool,
    handle: Option<Handle>,
}

impl Link {
    /// A callback target. No name means no target.
    pub fn target(name: Option<String>) -> Self {
        Self {
            name,
            defaults_to_player: false,
            handle: None,
        }
    }

    /// A tracked entity. No name means the level's player.
    pub fn entity(name: Option<String>) -> Self {
        Self {
            name,
            defaults_to_player: true,
            handle: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn resolve(&mut self, world: &World) -> Option<Handle> {
        if self.handle.is_none() {
            self.handle = match &self.name {
                Some(name) => world.resolve(name),
                None if self.defaults_to_player => Some(world.player_handle()),
                None => None,
            };
        }
        self.handle
    }
}

pub(crate) fn register_builtins(registry: &mut TypeRegistry) {
    registry.register("Trigger", |_ctx, spec| {
        Ok(Some(MapObject::Trigger(Trigger::basic(spec))))
    });
    registry.register("SetTileTrigger", |ctx, spec| {
        Trigger::set_tile(spec, ctx.tile_size).map(|t| Some(MapObject::Trigger(t)))
    });
    registry.register("NextLevelTrigger", |ctx, spec| {
        Trigger::next_level(spec, ctx.config).map(|t| Some(MapObject::Trigger(t)))
    });
    registry.register("TeleportTrigger", |_ctx, spec| {
        Trigger::teleport(spec).map(|t| Some(MapObject::Trigger(t)))
    });
    registry.register("ResetLevelTrigger", |ctx, spec| {
        Ok(Some(MapObject::Trigger(Trigger::reset_level(spec, ctx.config))))
    });
    registry.register("Alarm", |_ctx, spec| {
        Ok(Some(MapObject::Alarm(Alarm::from_spec(spec))))
    });
    registry.register("Area", |_ctx, spec| {
        Ok(Some(MapObject::Area(Area::from_spec(spec))))
    });
    registry.register("Emitter", |ctx, spec| {
        Ok(Emitter::from_spec(ctx, spec).map(MapObject::Emitter))
    });
}
