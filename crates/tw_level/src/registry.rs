//! Name lookups: object type name -> factory, and object name -> live handle.

use crate::config::FrameworkConfig;
use crate::entities::{self, Alarm, Area, Emitter, Trigger};
use crate::error::LevelError;
use crate::host::HostEngine;
use crate::map::ObjectSpec;
use crate::sprite::Sprite;
use glam::Vec2;
use std::collections::HashMap;

/// Position of a sprite: group index and slot within the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId {
    pub group: usize,
    pub index: usize,
}

/// Weak reference into a level's object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Sprite(SpriteId),
    Emitter(usize),
    /// The owning level itself (target name `state`).
    Level,
}

/// Target name that resolves to the owning level.
pub const LEVEL_TARGET: &str = "state";

/// Per-level name -> handle table. Scoped to one level; rebuilt on every
/// level construction.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    names: HashMap<String, Handle>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. The first object registered under a name keeps it.
    pub fn insert(&mut self, name: &str, handle: Handle) -> bool {
        if name.is_empty() || name == LEVEL_TARGET {
            return false;
        }
        if self.names.contains_key(name) {
            log::debug!("Object name '{}' already registered; keeping the first", name);
            return false;
        }
        self.names.insert(name.to_string(), handle);
        true
    }

    pub fn resolve(&self, name: &str) -> Option<Handle> {
        if name == LEVEL_TARGET {
            return Some(Handle::Level);
        }
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// What a factory produced for one map object.
pub enum MapObject {
    Sprite(Box<dyn Sprite>),
    Emitter(Emitter),
    Trigger(Trigger),
    Alarm(Alarm),
    Area(Area),
}

/// Engine and settings available to factories while a level is built.
pub struct BuildContext<'a> {
    pub host: &'a mut dyn HostEngine,
    pub config: &'a FrameworkConfig,
    pub world_size: Vec2,
    pub tile_size: Vec2,
}

/// Builds one object from its map description. `Ok(None)` means the object
/// is deliberately absent (e.g. an emitter on low detail).
pub type Factory =
    Box<dyn Fn(&mut BuildContext<'_>, &ObjectSpec) -> Result<Option<MapObject>, String>>;

/// Declared object type -> factory.
pub struct TypeRegistry {
    factories: HashMap<String, Factory>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeRegistry {
    /// A registry with no types at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry holding the framework's trigger, alarm, area and emitter
    /// types. Game types registered afterwards replace builtins of the same
    /// name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        entities::register_builtins(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&mut BuildContext<'_>, &ObjectSpec) -> Result<Option<MapObject>, String> + 'static,
    {
        if self
            .factories
            .insert(type_name.to_string(), Box::new(factory))
            .is_some()
        {
            log::debug!("Object type '{}' re-registered", type_name);
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn create(
        &self,
        ctx: &mut BuildContext<'_>,
        spec: &ObjectSpec,
    ) -> Result<Option<MapObject>, LevelError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| LevelError::UnknownObjectType {
                name: spec.name.clone(),
                kind: spec.kind.clone(),
            })?;
        factory(ctx, spec).map_err(|details| LevelError::ObjectConstruction {
            name: spec.name.clone(),
            kind: spec.kind.clone(),
            details,
        })
    }
}
