//! One running level: construction, the per-frame update, restart and
//! rendering.

use crate::builder::{BuiltLevel, LevelBuilder};
use crate::config::FrameworkConfig;
use crate::definition::LevelDefinition;
use crate::developer::DeveloperMode;
use crate::entities::{Alarm, Area, Frame, Trigger};
use crate::error::LevelError;
use crate::host::HostEngine;
use crate::map::MapFile;
use crate::registry::TypeRegistry;
use crate::world::{DrawItem, LevelCommand, World};
use glam::Vec2;
use tw_core::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// Assets are still arriving; no level exists yet.
    Loading,
    /// Built, waiting for the first update to switch groups on.
    WarmUp,
    Running,
}

pub struct Level {
    pub definition: LevelDefinition,
    pub world: World,
    pub triggers: Vec<Trigger>,
    pub alarms: Vec<Alarm>,
    pub areas: Vec<Area>,
    pub developer: DeveloperMode,
    phase: LevelPhase,
    updates: u64,
    paused: bool,
    transition: Option<u32>,
}

impl Level {
    /// Build the level from its loaded map and start its music and alarms.
    pub fn create(
        definition: LevelDefinition,
        map: &MapFile,
        registry: &TypeRegistry,
        config: &FrameworkConfig,
        host: &mut dyn HostEngine,
    ) -> Result<Self, LevelError> {
        host.set_background_color(&definition.background_color);
        host.set_fade_overlay(0, 0.0);

        let BuiltLevel {
            world,
            triggers,
            alarms,
            areas,
        } = LevelBuilder::new(registry, config).build(host, map)?;

        let mut level = Self {
            definition,
            world,
            triggers,
            alarms,
            areas,
            developer: DeveloperMode::default(),
            phase: LevelPhase::WarmUp,
            updates: 0,
            paused: false,
            transition: None,
        };
        level.play_music(host);
        level.start_alarms(host.now_ms());
        log::info!(
            "Level {} '{}' created",
            level.definition.index,
            level.definition.name
        );
        Ok(level)
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Level index requested by a next-level trigger this frame, if any.
    pub fn take_transition(&mut self) -> Option<u32> {
        self.transition.take()
    }

    pub fn update(
        &mut self,
        host: &mut dyn HostEngine,
        input: &InputState,
        config: &FrameworkConfig,
        dt: f32,
    ) {
        let now_ms = host.now_ms();
        if self.phase == LevelPhase::WarmUp {
            self.world.set_groups_exist(true);
            self.phase = LevelPhase::Running;
        }
        self.updates += 1;

        if config.developer_mode {
            self.developer.handle_input(input, &mut self.world, host);
            self.developer.apply_layer_visibility(&mut self.world.map);
        }

        self.world.update_player(host, input, now_ms, dt);
        self.world.update_sprites(host, input, now_ms, dt);
        self.world.dispatch_messages(host);

        if let Some(target) = self.world.player().map(|p| p.position) {
            host.follow(target, self.world.size);
        }
        let view = host.camera_view();
        for image in &mut self.world.image_layers {
            image.follow_camera(view);
        }

        {
            let mut frame = Frame {
                world: &mut self.world,
                host: &mut *host,
                config,
                now_ms,
            };
            for trigger in &mut self.triggers {
                trigger.update_object(&mut frame);
            }
            for alarm in &mut self.alarms {
                alarm.update_object(&mut frame);
            }
            for area in &mut self.areas {
                area.update_object(&mut frame);
            }
            for emitter in &mut frame.world.emitters {
                emitter.update_object(frame.host);
            }
            for trigger in self.triggers.iter_mut().filter(|t| t.trigger_on_touch) {
                trigger.check_activate(&mut frame);
            }
        }

        for command in self.world.take_commands() {
            match command {
                LevelCommand::Restart => self.restart(host, config),
                LevelCommand::ChangeLevel(index) => self.transition = Some(index),
            }
        }
    }

    /// Put every object back in its construction state and hold groups inert
    /// until the next update.
    pub fn restart(&mut self, host: &mut dyn HostEngine, config: &FrameworkConfig) {
        self.updates = 0;
        self.phase = LevelPhase::WarmUp;
        host.stop_all_sounds();
        self.world.reset_sprites();

        let now_ms = host.now_ms();
        {
            let mut frame = Frame {
                world: &mut self.world,
                host: &mut *host,
                config,
                now_ms,
            };
            for trigger in &mut self.triggers {
                trigger.reset(&mut frame);
            }
            for emitter in &mut frame.world.emitters {
                emitter.reset(frame.host);
                emitter.revive();
            }
        }
        for alarm in &mut self.alarms {
            alarm.reset();
        }
        for area in &mut self.areas {
            area.reset();
        }

        self.play_music(host);
        self.start_alarms(now_ms);
        log::info!("Level {} restarted", self.definition.index);
    }

    pub fn render(&self, host: &mut dyn HostEngine, config: &FrameworkConfig) {
        let view = host.camera_view();
        for item in &self.world.draw_order {
            match *item {
                DrawItem::TileLayer(i) => {
                    if let Some(layer) = self.world.map.layer(i).filter(|l| l.visible) {
                        host.draw_tile_layer(layer, view);
                    }
                }
                DrawItem::ImageLayer(i) => {
                    if let Some(image) = self.world.image_layers.get(i).filter(|l| l.visible) {
                        host.draw_image(&image.key, image.position);
                    }
                }
                DrawItem::Group(i) => {
                    let Some(group) = self.world.groups.get(i) else {
                        continue;
                    };
                    if !group.exists || !group.visible {
                        continue;
                    }
                    for sprite in &group.sprites {
                        let body = sprite.body();
                        if body.exists && body.visible {
                            host.draw_sprite(&body.key, body.frame, body.bounds(), body.flip_x);
                        }
                    }
                }
            }
        }

        if self.paused {
            if let Some(key) = &self.definition.paused_image {
                host.draw_image(key, Vec2::new(view.x, view.y));
            }
        }
        if !config.developer_mode {
            return;
        }
        if self.developer.show_framerate {
            let fps = format!("{:.0}", host.fps());
            host.draw_text(&fps, Vec2::new(view.x + 10.0, view.y + 25.0), "#ff0000");
        }
        if self.developer.show_debug {
            let player = self.world.player;
            for (gi, group) in self.world.groups.iter().enumerate() {
                for (si, sprite) in group.sprites.iter().enumerate() {
                    let body = sprite.body();
                    if !body.alive || !body.visible {
                        continue;
                    }
                    let color = if player.group == gi && player.index == si {
                        "rgba(0,255,0,0.3)"
                    } else {
                        "rgba(255,255,255,0.3)"
                    };
                    host.draw_rect(body.bounds(), color);
                }
            }
        }
    }

    pub fn on_pause(&mut self, host: &mut dyn HostEngine) {
        self.paused = true;
        host.pause_all_sounds();
    }

    pub fn on_resume(&mut self, host: &mut dyn HostEngine) {
        self.paused = false;
        host.resume_all_sounds();
    }

    fn play_music(&self, host: &mut dyn HostEngine) {
        if let Some(music) = &self.definition.background_music {
            host.play_sound(&music.sound, music.volume, true);
        }
    }

    fn start_alarms(&mut self, now_ms: u64) {
        for alarm in &mut self.alarms {
            alarm.start(now_ms);
        }
    }
}
