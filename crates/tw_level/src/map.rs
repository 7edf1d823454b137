//! Tile-map JSON model (the Tiled editor export format) and loading.

use crate::props::PropertyBag;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct MapFile {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    #[serde(default)]
    pub properties: PropertyBag,
    pub layers: Vec<MapLayer>,
    #[serde(default)]
    pub tilesets: Vec<MapTileset>,
}

/// One entry of the map's `layers` array.
///
/// The JSON keeps every layer kind in one flat shape tagged by `type`; unknown
/// kinds must survive parsing so the builder can skip them with a warning.
#[derive(Debug, Deserialize, Clone)]
pub struct MapLayer {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub data: Vec<u32>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    TileLayer,
    ObjectGroup,
    ImageLayer,
    Unknown,
}

impl MapLayer {
    pub fn layer_kind(&self) -> LayerKind {
        match self.kind.as_str() {
            "tilelayer" => LayerKind::TileLayer,
            "objectgroup" => LayerKind::ObjectGroup,
            "imagelayer" => LayerKind::ImageLayer,
            _ => LayerKind::Unknown,
        }
    }

    /// `scrollFactorX`/`scrollFactorY` properties, each defaulting to 1.
    pub fn scroll_factor(&self) -> glam::Vec2 {
        glam::Vec2::new(
            self.properties.get_f32("scrollFactorX").unwrap_or(1.0),
            self.properties.get_f32("scrollFactorY").unwrap_or(1.0),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapTileset {
    #[serde(rename = "firstgid", default = "default_first_gid")]
    pub first_gid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "tilewidth", default)]
    pub tile_width: u32,
    #[serde(rename = "tileheight", default)]
    pub tile_height: u32,
    /// Keyed by the tile's local id within the set, as a decimal string.
    #[serde(rename = "tileproperties", default)]
    pub tile_properties: BTreeMap<String, PropertyBag>,
}

/// An object placed in an object group.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ObjectSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl ObjectSpec {
    pub fn new(kind: &str, name: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            x,
            y,
            width,
            height,
            visible: true,
            properties: PropertyBag::new(),
        }
    }

    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }
}

impl MapFile {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let map: MapFile =
            serde_json::from_str(raw).map_err(|e| format!("Failed to parse map JSON: {e}"))?;
        validate_map(&map)?;
        Ok(map)
    }

    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Name of the layer defining world bounds (`main_layer` map property).
    pub fn main_layer_name(&self) -> String {
        self.properties
            .get_str("main_layer")
            .unwrap_or_else(|| "main".to_string())
    }
}

pub fn load_map_from_path(map_path: &Path) -> Result<MapFile, String> {
    let raw = fs::read_to_string(map_path)
        .map_err(|e| format!("Failed to read map file {}: {e}", map_path.display()))?;
    let map: MapFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse map JSON {}: {e}", map_path.display()))?;
    validate_map(&map)?;
    Ok(map)
}

pub(crate) fn validate_map(map: &MapFile) -> Result<(), String> {
    if map.tile_width == 0 || map.tile_height == 0 {
        return Err(format!(
            "Map validation failed: tile size {}x{} must be positive",
            map.tile_width, map.tile_height
        ));
    }
    if map.layers.is_empty() {
        return Err("Map validation failed: layers array is empty".to_string());
    }

    let mut names = HashSet::new();
    for layer in &map.layers {
        if !layer.name.is_empty() && !names.insert(layer.name.as_str()) {
            log::warn!(
                "Map defines layer '{}' more than once; lookups use the first",
                layer.name
            );
        }
        if layer.layer_kind() == LayerKind::TileLayer {
            let expected = layer.width as usize * layer.height as usize;
            if expected == 0 {
                return Err(format!(
                    "Map validation failed: tile layer '{}' has zero size",
                    layer.name
                ));
            }
            if layer.data.len() != expected {
                return Err(format!(
                    "Map validation failed: tile layer '{}' has {} cells, expected {}x{}",
                    layer.name,
                    layer.data.len(),
                    layer.width,
                    layer.height
                ));
            }
        }
    }
    Ok(())
}

const fn default_visible() -> bool {
    true
}

const fn default_opacity() -> f32 {
    1.0
}

const fn default_first_gid() -> u32 {
    1
}
