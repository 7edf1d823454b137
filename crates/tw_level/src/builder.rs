//! Turns a parsed tile map into a live [`World`] plus the level's triggers,
//! alarms and areas.
//!
//! Layers are walked in map order. Tile layers become [`TileLayer`]s unless
//! excluded by config, object groups are handed to the [`TypeRegistry`] one
//! object at a time, and image layers become parallax backgrounds. A level
//! without its main layer or without a player sprite is never returned.

use crate::config::FrameworkConfig;
use crate::entities::{Alarm, Area, Emitter, Trigger};
use crate::error::LevelError;
use crate::host::HostEngine;
use crate::map::{LayerKind, MapFile, MapLayer};
use crate::registry::{BuildContext, Handle, MapObject, NameRegistry, SpriteId, TypeRegistry};
use crate::tiles::{SolidTiles, TileLayer, TileMap};
use crate::world::{DrawItem, Group, ImageLayer, World};
use glam::Vec2;

/// Everything the builder produced for one level.
pub struct BuiltLevel {
    pub world: World,
    pub triggers: Vec<Trigger>,
    pub alarms: Vec<Alarm>,
    pub areas: Vec<Area>,
}

#[derive(Default)]
struct Collected {
    tile_layers: Vec<TileLayer>,
    image_layers: Vec<ImageLayer>,
    groups: Vec<Group>,
    emitters: Vec<Emitter>,
    triggers: Vec<Trigger>,
    alarms: Vec<Alarm>,
    areas: Vec<Area>,
    names: NameRegistry,
    player: Option<SpriteId>,
    draw_order: Vec<DrawItem>,
}

pub struct LevelBuilder<'a> {
    registry: &'a TypeRegistry,
    config: &'a FrameworkConfig,
}

impl<'a> LevelBuilder<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a FrameworkConfig) -> Self {
        Self { registry, config }
    }

    pub fn build(
        &self,
        host: &mut dyn HostEngine,
        map: &MapFile,
    ) -> Result<BuiltLevel, LevelError> {
        let main_name = map.main_layer_name();
        let world_size = world_size(map, &main_name)?;
        let solid_tiles = SolidTiles::from_map(map);
        let mut ctx = BuildContext {
            host,
            config: self.config,
            world_size,
            tile_size: Vec2::new(map.tile_width as f32, map.tile_height as f32),
        };

        let mut out = Collected::default();
        for layer in &map.layers {
            match layer.layer_kind() {
                LayerKind::TileLayer => {
                    if self.config.is_excluded(&layer.name) {
                        log::debug!("Skipping excluded tile layer '{}'", layer.name);
                        continue;
                    }
                    out.draw_order.push(DrawItem::TileLayer(out.tile_layers.len()));
                    out.tile_layers
                        .push(TileLayer::from_map_layer(layer, map, &solid_tiles));
                }
                LayerKind::ObjectGroup => self.create_objects(&mut ctx, layer, &mut out)?,
                LayerKind::ImageLayer => {
                    out.draw_order.push(DrawItem::ImageLayer(out.image_layers.len()));
                    let image = self.create_image_layer(&*ctx.host, layer, world_size);
                    out.image_layers.push(image);
                }
                LayerKind::Unknown => {
                    log::warn!(
                        "Unknown layer type '{}' for layer '{}' in tile map",
                        layer.kind,
                        layer.name
                    );
                }
            }
        }

        let main_layer = out
            .tile_layers
            .iter()
            .position(|l| l.name == main_name)
            .ok_or_else(|| LevelError::MissingMainLayer(main_name.clone()))?;
        let player = out.player.ok_or(LevelError::MissingPlayer)?;
        if let Some(group) = out.groups.get_mut(player.group) {
            if !group.visible {
                log::debug!("Making player group '{}' visible", group.name);
                group.visible = true;
            }
        }

        let tile_map = TileMap {
            layers: out.tile_layers,
            solid_tiles,
            tile_width: map.tile_width,
            tile_height: map.tile_height,
        };
        let mut world = World::new(tile_map, main_layer, player, world_size);
        world.image_layers = out.image_layers;
        world.groups = out.groups;
        world.emitters = out.emitters;
        world.names = out.names;
        world.draw_order = out.draw_order;

        log::debug!(
            "Built level: {}x{} px, {} groups, {} triggers, {} alarms, {} areas, {} emitters",
            world_size.x,
            world_size.y,
            world.groups.len(),
            out.triggers.len(),
            out.alarms.len(),
            out.areas.len(),
            world.emitters.len()
        );
        Ok(BuiltLevel {
            world,
            triggers: out.triggers,
            alarms: out.alarms,
            areas: out.areas,
        })
    }

    fn create_objects(
        &self,
        ctx: &mut BuildContext<'_>,
        layer: &MapLayer,
        out: &mut Collected,
    ) -> Result<(), LevelError> {
        let group_index = out.groups.len();
        let alpha = if layer.opacity > 0.0 { layer.opacity } else { 1.0 };
        let mut group = Group::new(&layer.name, layer.visible, alpha);

        for spec in &layer.objects {
            let Some(object) = self.registry.create(ctx, spec)? else {
                log::warn!(
                    "Object '{}' of type '{}' produced nothing; skipping",
                    spec.name,
                    spec.kind
                );
                continue;
            };
            match object {
                MapObject::Sprite(mut sprite) => {
                    let id = SpriteId {
                        group: group_index,
                        index: group.sprites.len(),
                    };
                    if !spec.visible {
                        sprite.body_mut().visible = false;
                    }
                    if sprite.is_player() {
                        if let Some(previous) = out.player {
                            log::warn!(
                                "More than one player sprite in tile map; '{}' replaces {:?}",
                                spec.name,
                                previous
                            );
                        }
                        out.player = Some(id);
                    }
                    out.names.insert(&spec.name, Handle::Sprite(id));
                    group.sprites.push(sprite);
                }
                MapObject::Emitter(emitter) => {
                    out.names
                        .insert(&spec.name, Handle::Emitter(out.emitters.len()));
                    out.emitters.push(emitter);
                }
                MapObject::Trigger(trigger) => out.triggers.push(trigger),
                MapObject::Alarm(alarm) => out.alarms.push(alarm),
                MapObject::Area(area) => out.areas.push(area),
            }
        }

        out.draw_order.push(DrawItem::Group(group_index));
        out.groups.push(group);
        Ok(())
    }

    /// Parallax factor per axis is `(image - view) / (world - view)`; an axis
    /// where the world is no larger than the view keeps the layer's own
    /// `scrollFactorX/Y` (default 1).
    fn create_image_layer(
        &self,
        host: &dyn HostEngine,
        layer: &MapLayer,
        world_size: Vec2,
    ) -> ImageLayer {
        let key = layer.name.clone();
        let mut scroll_factor = layer.scroll_factor();
        let size = match host.image_size(&key) {
            Some(size) => {
                let view = self.config.view_size();
                let span = world_size - view;
                if span.x.abs() > f32::EPSILON {
                    scroll_factor.x = (size.x - view.x) / span.x;
                }
                if span.y.abs() > f32::EPSILON {
                    scroll_factor.y = (size.y - view.y) / span.y;
                }
                size
            }
            None => {
                log::warn!("Image layer '{}' has no loaded image; it will not scroll", key);
                Vec2::ZERO
            }
        };
        ImageLayer {
            name: layer.name.clone(),
            key,
            size,
            scroll_factor,
            position: Vec2::ZERO,
            visible: layer.visible,
        }
    }
}

/// World bounds in pixels: the map's `width`/`height` properties when set,
/// otherwise the main layer's grid size. Zero when the main layer is absent,
/// which is reported once layers are built.
fn world_size(map: &MapFile, main_name: &str) -> Result<Vec2, LevelError> {
    let props = &map.properties;
    if props.contains("width") || props.contains("height") {
        return match (props.get_f32("width"), props.get_f32("height")) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok(Vec2::new(w, h)),
            (w, h) => Err(LevelError::MalformedDimensions(format!(
                "map properties width={:?} height={:?} must both be positive",
                w, h
            ))),
        };
    }
    let Some(main) = map
        .layers
        .iter()
        .find(|l| l.name == main_name && l.layer_kind() == LayerKind::TileLayer)
    else {
        return Ok(Vec2::ZERO);
    };
    let pixels = main
        .width
        .checked_mul(map.tile_width)
        .zip(main.height.checked_mul(map.tile_height));
    match pixels {
        Some((w, h)) if w > 0 && h > 0 => Ok(Vec2::new(w as f32, h as f32)),
        _ => Err(LevelError::MalformedDimensions(format!(
            "main layer '{}' is {}x{} tiles of {}x{} px",
            main_name, main.width, main.height, map.tile_width, map.tile_height
        ))),
    }
}
