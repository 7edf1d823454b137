//! Runtime tile grids and per-tile collision metadata.
//!
//! Tile indices are map-global ids: 0 is "no tile", and a tileset's local id
//! `k` maps to `first_gid + k`. Each cell stores a [`Tile`] value carrying its
//! index and whether it collides on this layer, so set-tile entities can
//! snapshot and restore cells exactly.

use crate::map::{MapFile, MapLayer};
use glam::Vec2;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub index: u32,
    pub solid: bool,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        index: 0,
        solid: false,
    };

    pub fn is_empty(&self) -> bool {
        self.index == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slope {
    #[default]
    None,
    DownRight,
    DownLeft,
}

/// Which faces of a tile block movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileCollision {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub slope: Slope,
}

impl TileCollision {
    pub const FULL: TileCollision = TileCollision {
        left: true,
        right: true,
        up: true,
        down: true,
        slope: Slope::None,
    };

    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// Collision faces per global tile index, derived from tileset tile properties.
#[derive(Debug, Clone, Default)]
pub struct SolidTiles {
    faces: HashMap<u32, TileCollision>,
}

impl SolidTiles {
    pub fn from_map(map: &MapFile) -> Self {
        let mut faces = HashMap::new();
        for tileset in &map.tilesets {
            for (key, props) in &tileset.tile_properties {
                let Ok(local) = key.trim().parse::<u32>() else {
                    continue;
                };
                let index = tileset.first_gid + local;
                let collision = match props.get_str("solid") {
                    Some(kind) => TileCollision {
                        slope: match kind.as_str() {
                            "slopeDownRight" => Slope::DownRight,
                            "slopeDownLeft" => Slope::DownLeft,
                            _ => Slope::None,
                        },
                        ..TileCollision::FULL
                    },
                    None => TileCollision {
                        left: props.contains("solid-left"),
                        right: props.contains("solid-right"),
                        up: props.contains("solid-up"),
                        down: props.contains("solid-down"),
                        slope: Slope::None,
                    },
                };
                if collision.any() {
                    faces.insert(index, collision);
                }
            }
        }
        Self { faces }
    }

    pub fn is_solid(&self, index: u32) -> bool {
        self.faces.contains_key(&index)
    }

    pub fn collision(&self, index: u32) -> Option<TileCollision> {
        self.faces.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    cells: Vec<Tile>,
    /// Current visibility, toggled by developer mode.
    pub visible: bool,
    /// Visibility as authored in the map.
    pub authored_visible: bool,
    pub solid: bool,
    pub opacity: f32,
    pub scroll_factor: Vec2,
}

impl TileLayer {
    pub fn from_map_layer(layer: &MapLayer, map: &MapFile, solid_tiles: &SolidTiles) -> Self {
        let solid = layer.properties.flag("solid");
        let cells = layer
            .data
            .iter()
            .map(|&index| Tile {
                index,
                solid: solid && solid_tiles.is_solid(index),
            })
            .collect();
        Self {
            name: layer.name.clone(),
            width: layer.width,
            height: layer.height,
            tile_width: map.tile_width,
            tile_height: map.tile_height,
            cells,
            visible: layer.visible,
            authored_visible: layer.visible,
            solid,
            opacity: layer.opacity,
            scroll_factor: layer.scroll_factor(),
        }
    }

    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_width as f32,
            self.height as f32 * self.tile_height as f32,
        )
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<Tile> {
        self.offset(x, y).map(|i| self.cells[i])
    }

    /// Tile under a world-space point, if the point is on the grid.
    pub fn tile_at_world(&self, p: Vec2) -> Option<(u32, u32, Tile)> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / self.tile_width as f32).floor() as u32;
        let y = (p.y / self.tile_height as f32).floor() as u32;
        self.tile(x, y).map(|t| (x, y, t))
    }

    /// Overwrite one cell. Returns false if the cell is off the grid.
    pub fn put_tile(&mut self, x: u32, y: u32, tile: Tile) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }
}

/// The level's tile layers plus the shared collision metadata.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    pub layers: Vec<TileLayer>,
    pub solid_tiles: SolidTiles,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl TileMap {
    pub fn find_layer(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    pub fn layer(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut TileLayer> {
        self.layers.get_mut(index)
    }

    pub fn get_tile(&self, layer: usize, x: u32, y: u32) -> Option<Tile> {
        self.layers.get(layer)?.tile(x, y)
    }

    /// Place `index` at a cell. `collide` overrides the derived solidity;
    /// otherwise the cell collides when the layer is solid and the index is
    /// in the solid-tile mask.
    pub fn put_tile_index(
        &mut self,
        layer: usize,
        x: u32,
        y: u32,
        index: u32,
        collide: Option<bool>,
    ) -> bool {
        let derived = self.solid_tiles.is_solid(index);
        let Some(target) = self.layers.get_mut(layer) else {
            return false;
        };
        let solid = collide.unwrap_or(target.solid && derived);
        target.put_tile(x, y, Tile { index, solid })
    }

    pub fn put_tile(&mut self, layer: usize, x: u32, y: u32, tile: Tile) -> bool {
        match self.layers.get_mut(layer) {
            Some(target) => target.put_tile(x, y, tile),
            None => false,
        }
    }

    /// Collision faces of a cell; cells marked solid without tileset metadata
    /// block on every face.
    pub fn collision_for(&self, tile: Tile) -> Option<TileCollision> {
        if !tile.solid {
            return None;
        }
        Some(
            self.solid_tiles
                .collision(tile.index)
                .unwrap_or(TileCollision::FULL),
        )
    }

    pub fn solid_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter(|l| l.solid)
    }
}
