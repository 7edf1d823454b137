use serde::Deserialize;
use std::fs;
use std::path::Path;
use tw_core::DetailTier;

/// Framework-wide settings shared by every level.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FrameworkConfig {
    #[serde(default = "default_view_width")]
    pub view_width: u32,
    #[serde(default = "default_view_height")]
    pub view_height: u32,
    #[serde(default)]
    pub developer_mode: bool,
    #[serde(default)]
    pub detail: DetailTier,
    /// Tile layers never created (skipped for performance on low detail).
    #[serde(default)]
    pub excluded_layers: Vec<String>,
    #[serde(default = "default_save_key")]
    pub save_key: String,
    /// Default duration of level-change and level-reset fades.
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    /// Default delay before a reset-level trigger can fire again.
    #[serde(default = "default_reset_rearm_ms")]
    pub reset_rearm_ms: u64,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            view_width: default_view_width(),
            view_height: default_view_height(),
            developer_mode: false,
            detail: DetailTier::default(),
            excluded_layers: Vec::new(),
            save_key: default_save_key(),
            fade_ms: default_fade_ms(),
            reset_rearm_ms: default_reset_rearm_ms(),
        }
    }
}

impl FrameworkConfig {
    pub fn view_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.view_width as f32, self.view_height as f32)
    }

    pub fn is_excluded(&self, layer_name: &str) -> bool {
        self.excluded_layers.iter().any(|l| l == layer_name)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FrameworkConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: FrameworkConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &FrameworkConfig) -> Result<(), String> {
    if config.view_width == 0 || config.view_height == 0 {
        return Err(format!(
            "Config validation failed: view size {}x{} must be positive",
            config.view_width, config.view_height
        ));
    }
    if config.save_key.is_empty() {
        return Err("Config validation failed: save_key is empty".to_string());
    }
    Ok(())
}

const fn default_view_width() -> u32 {
    640
}

const fn default_view_height() -> u32 {
    480
}

fn default_save_key() -> String {
    "tilewright_save".to_string()
}

const fn default_fade_ms() -> u64 {
    1000
}

const fn default_reset_rearm_ms() -> u64 {
    1500
}
