//! Level transitions: which level is loading or running, and swapping to the
//! next one when a level asks for it.

use crate::config::FrameworkConfig;
use crate::definition::{LevelDefinition, MAP_KEY};
use crate::error::LevelError;
use crate::host::HostEngine;
use crate::level::{Level, LevelPhase};
use crate::map::MapFile;
use crate::registry::TypeRegistry;
use crate::save::SaveState;
use glam::Vec2;
use std::collections::BTreeMap;
use tw_core::InputState;

enum Stage {
    Idle,
    Loading { index: u32, progress: u8 },
    Playing(Box<Level>),
}

pub struct Director {
    config: FrameworkConfig,
    registry: TypeRegistry,
    levels: BTreeMap<u32, LevelDefinition>,
    stage: Stage,
}

impl Director {
    pub fn new(
        config: FrameworkConfig,
        registry: TypeRegistry,
        definitions: Vec<LevelDefinition>,
    ) -> Self {
        let levels = definitions.into_iter().map(|d| (d.index, d)).collect();
        Self {
            config,
            registry,
            levels,
            stage: Stage::Idle,
        }
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    pub fn level(&self) -> Option<&Level> {
        match &self.stage {
            Stage::Playing(level) => Some(level.as_ref()),
            _ => None,
        }
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        match &mut self.stage {
            Stage::Playing(level) => Some(level.as_mut()),
            _ => None,
        }
    }

    /// Index of the level loading or running.
    pub fn current_index(&self) -> Option<u32> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Loading { index, .. } => Some(*index),
            Stage::Playing(level) => Some(level.definition.index),
        }
    }

    /// `None` before the first level was started.
    pub fn phase(&self) -> Option<LevelPhase> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Loading { .. } => Some(LevelPhase::Loading),
            Stage::Playing(level) => Some(level.phase()),
        }
    }

    /// Tear down the current level and queue the assets of level `index`.
    pub fn start(&mut self, host: &mut dyn HostEngine, index: u32) -> Result<(), LevelError> {
        let Some(definition) = self.levels.get(&index) else {
            log::error!("No level with index {}", index);
            return Err(LevelError::UnknownLevel(index));
        };
        host.stop_all_sounds();
        definition.preload(host);
        self.stage = Stage::Loading { index, progress: 0 };
        log::info!("Loading level {} '{}'", index, definition.name);
        Ok(())
    }

    /// Start the saved level, or the first level when there is no usable save.
    pub fn continue_game(&mut self, host: &mut dyn HostEngine) -> Result<(), LevelError> {
        let saved = SaveState::load(host, &self.config.save_key).map(|s| s.level);
        let index = match saved {
            Some(level) if self.levels.contains_key(&level) => level,
            other => {
                if let Some(level) = other {
                    log::warn!("Saved level {} no longer exists; starting over", level);
                }
                self.levels
                    .keys()
                    .next()
                    .copied()
                    .ok_or(LevelError::UnknownLevel(saved.unwrap_or(0)))?
            }
        };
        self.start(host, index)
    }

    pub fn update(
        &mut self,
        host: &mut dyn HostEngine,
        input: &InputState,
        dt: f32,
    ) -> Result<(), LevelError> {
        match &mut self.stage {
            Stage::Idle => Ok(()),
            Stage::Loading { index, progress } => {
                *progress = host.load_progress();
                if *progress < 100 {
                    return Ok(());
                }
                let index = *index;
                match self.create_level(host, index) {
                    Ok(level) => {
                        self.stage = Stage::Playing(Box::new(level));
                        Ok(())
                    }
                    Err(e) => {
                        log::error!("Failed to create level {}: {e}", index);
                        self.stage = Stage::Idle;
                        Err(e)
                    }
                }
            }
            Stage::Playing(level) => {
                level.update(host, input, &self.config, dt);
                match level.take_transition() {
                    Some(next) => self.start(host, next),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn render(&self, host: &mut dyn HostEngine) {
        match &self.stage {
            Stage::Idle => {}
            Stage::Loading { index, progress } => {
                let shows_text = self
                    .levels
                    .get(index)
                    .map(|d| d.loading_text)
                    .unwrap_or(false);
                if shows_text {
                    let view = host.camera_view();
                    let position = Vec2::new(
                        view.x + view.width * 0.5,
                        view.y + view.height * 0.7,
                    );
                    host.draw_text(&format!("{progress}%"), position, "#ffffff");
                }
            }
            Stage::Playing(level) => level.render(host, &self.config),
        }
    }

    pub fn on_pause(&mut self, host: &mut dyn HostEngine) {
        if let Some(level) = self.level_mut() {
            level.on_pause(host);
        }
    }

    pub fn on_resume(&mut self, host: &mut dyn HostEngine) {
        if let Some(level) = self.level_mut() {
            level.on_resume(host);
        }
    }

    fn create_level(&self, host: &mut dyn HostEngine, index: u32) -> Result<Level, LevelError> {
        let definition = self
            .levels
            .get(&index)
            .cloned()
            .ok_or(LevelError::UnknownLevel(index))?;
        let raw = host
            .asset_text(MAP_KEY)
            .ok_or_else(|| LevelError::MissingAsset(definition.tilemap.clone()))?;
        let map = MapFile::from_json(&raw).map_err(|details| LevelError::Parse {
            path: definition.tilemap.clone(),
            details,
        })?;
        Level::create(definition, &map, &self.registry, &self.config, host)
    }
}
