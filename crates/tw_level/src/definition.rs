//! Per-level asset manifests.

use crate::host::HostEngine;
use glam::Vec2;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Asset key the tile-map JSON is loaded under.
pub const MAP_KEY: &str = "level";
/// Asset key of the tileset image.
pub const TILESET_KEY: &str = "tiles";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LevelDefinition {
    pub index: u32,
    #[serde(default)]
    pub name: String,
    pub tilemap: String,
    pub tileset: TilesetAsset,
    #[serde(default)]
    pub spritesheets: Vec<SpritesheetAsset>,
    #[serde(default)]
    pub images: Vec<ImageAsset>,
    #[serde(default)]
    pub sounds: Vec<SoundAsset>,
    #[serde(default)]
    pub background_music: Option<MusicSpec>,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default)]
    pub paused_image: Option<String>,
    /// Show a percentage readout while loading.
    #[serde(default)]
    pub loading_text: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TilesetAsset {
    pub url: String,
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpritesheetAsset {
    pub name: String,
    pub url: String,
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImageAsset {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

/// A sound; `url` has no extension, `.mp3` and `.ogg` variants are queued.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SoundAsset {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MusicSpec {
    pub sound: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl LevelDefinition {
    /// Queue every asset this level needs with the host.
    pub fn preload(&self, host: &mut dyn HostEngine) {
        host.queue_text(MAP_KEY, &self.tilemap);
        host.queue_image(TILESET_KEY, &self.tileset.url, None);
        for sheet in &self.spritesheets {
            host.queue_spritesheet(
                &sheet.name,
                &sheet.url,
                Vec2::new(sheet.frame_width as f32, sheet.frame_height as f32),
            );
        }
        for image in &self.images {
            let size = match (image.width, image.height) {
                (Some(w), Some(h)) => Some(Vec2::new(w, h)),
                _ => None,
            };
            host.queue_image(&image.name, &image.url, size);
        }
        for sound in &self.sounds {
            let urls = [format!("{}.mp3", sound.url), format!("{}.ogg", sound.url)];
            host.queue_sound(&sound.name, &urls);
        }
    }

    pub fn sound(&self, name: &str) -> Option<&SoundAsset> {
        self.sounds.iter().find(|s| s.name == name)
    }
}

pub fn load_level_definitions(path: &Path) -> Result<Vec<LevelDefinition>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level manifest {}: {e}", path.display()))?;
    let levels: Vec<LevelDefinition> = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level manifest {}: {e}", path.display()))?;
    validate_levels(&levels)?;
    Ok(levels)
}

fn validate_levels(levels: &[LevelDefinition]) -> Result<(), String> {
    if levels.is_empty() {
        return Err("Level manifest validation failed: no levels defined".to_string());
    }
    let mut indices = HashSet::new();
    for level in levels {
        if !indices.insert(level.index) {
            return Err(format!(
                "Level manifest validation failed: duplicate level index {}",
                level.index
            ));
        }
        if level.tilemap.is_empty() {
            return Err(format!(
                "Level manifest validation failed: level {} has no tilemap",
                level.index
            ));
        }
        if let Some(music) = &level.background_music {
            if level.sound(&music.sound).is_none() {
                return Err(format!(
                    "Level manifest validation failed: level {} music '{}' is not in its sounds",
                    level.index, music.sound
                ));
            }
        }
    }
    Ok(())
}

fn default_background_color() -> String {
    "#000000".to_string()
}

const fn default_volume() -> f32 {
    1.0
}
