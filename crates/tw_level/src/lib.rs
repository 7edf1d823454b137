//! Tile-map driven levels: building a live object graph from Tiled JSON and
//! running it frame by frame on top of a [`HostEngine`].

pub mod builder;
pub mod config;
pub mod definition;
pub mod developer;
pub mod director;
pub mod entities;
pub mod error;
pub mod host;
pub mod level;
pub mod map;
pub mod props;
pub mod registry;
pub mod save;
pub mod sprite;
pub mod tiles;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BuiltLevel, LevelBuilder};
pub use config::{load_config_from_path, FrameworkConfig};
pub use definition::{load_level_definitions, LevelDefinition};
pub use developer::DeveloperMode;
pub use director::Director;
pub use error::LevelError;
pub use host::{HeadlessHost, HostEngine};
pub use level::{Level, LevelPhase};
pub use map::{load_map_from_path, MapFile, ObjectSpec};
pub use props::PropertyBag;
pub use registry::{BuildContext, Handle, MapObject, SpriteId, TypeRegistry};
pub use save::SaveState;
pub use sprite::{CallArgs, Sprite, SpriteBody, SpriteContext};
pub use tiles::{Slope, Tile, TileCollision, TileLayer, TileMap};
pub use world::World;
