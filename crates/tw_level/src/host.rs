//! The engine collaborator.
//!
//! Rendering, audio, asset loading, tweened overlays, particles and persistent
//! storage belong to whatever engine hosts the framework. [`HostEngine`] is
//! the narrow surface the level runtime drives. [`HeadlessHost`] implements it
//! without a window: it loads text assets from disk, keeps a camera that
//! follows the player and records every side effect, which makes it both the
//! binary's driver and the test double.

use crate::entities::EmitterConfig;
use crate::tiles::TileLayer;
use glam::Vec2;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use tw_core::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle(pub usize);

pub trait HostEngine {
    /// Host clock in milliseconds.
    fn now_ms(&self) -> u64;

    /// Visible world rectangle.
    fn camera_view(&self) -> Rect;

    /// Keep `target` in view within a world of `world_size` pixels.
    fn follow(&mut self, _target: Vec2, _world_size: Vec2) {}

    fn set_background_color(&mut self, _color: &str) {}

    // Asset loading.
    fn queue_text(&mut self, key: &str, url: &str);
    fn queue_image(&mut self, _key: &str, _url: &str, _size_hint: Option<Vec2>) {}
    fn queue_spritesheet(&mut self, _key: &str, _url: &str, _frame_size: Vec2) {}
    fn queue_sound(&mut self, _key: &str, _urls: &[String]) {}
    /// Percentage of queued assets loaded so far.
    fn load_progress(&mut self) -> u8 {
        100
    }
    fn asset_text(&self, key: &str) -> Option<String>;
    fn image_size(&self, _key: &str) -> Option<Vec2> {
        None
    }

    // Audio.
    fn play_sound(&mut self, _key: &str, _volume: f32, _looping: bool) {}
    fn stop_all_sounds(&mut self) {}
    fn pause_all_sounds(&mut self) {}
    fn resume_all_sounds(&mut self) {}

    /// Full-screen colour overlay; alpha 0 hides it.
    fn set_fade_overlay(&mut self, _color: u32, _alpha: f32) {}

    // Persistent key-value storage.
    fn storage_get(&self, key: &str) -> Option<String>;
    fn storage_set(&mut self, key: &str, value: &str);

    // Particles.
    fn create_particles(&mut self, config: &EmitterConfig, area: Rect) -> ParticleHandle;
    fn start_particles(&mut self, _handle: ParticleHandle, _period_ms: u64, _delay_ms: u64) {}
    fn kill_particles(&mut self, _handle: ParticleHandle) {}
    fn set_particle_area(&mut self, _handle: ParticleHandle, _area: Rect) {}

    // Drawing, called from `Level::render`.
    fn draw_tile_layer(&mut self, _layer: &TileLayer, _view: Rect) {}
    fn draw_image(&mut self, _key: &str, _position: Vec2) {}
    fn draw_sprite(&mut self, _key: &str, _frame: u32, _bounds: Rect, _flip_x: bool) {}
    fn draw_text(&mut self, _text: &str, _position: Vec2, _color: &str) {}
    fn draw_rect(&mut self, _rect: Rect, _color: &str) {}

    fn fps(&self) -> f32 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Text,
    Image,
    Sound,
}

#[derive(Debug, Clone)]
struct QueuedAsset {
    key: String,
    url: String,
    kind: AssetKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayingSound {
    pub key: String,
    pub volume: f32,
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    pub config: EmitterConfig,
    pub area: Rect,
    pub running: bool,
    pub starts: u32,
}

/// What the last rendered frame drew.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecord {
    pub tile_layers: Vec<String>,
    pub images: Vec<String>,
    pub sprites: Vec<String>,
    pub texts: Vec<String>,
    pub rects: usize,
}

pub struct HeadlessHost {
    pub now_ms: u64,
    pub view: Rect,
    pub fps: f32,
    pub background_color: Option<String>,
    asset_root: PathBuf,
    pending: VecDeque<QueuedAsset>,
    queued_total: usize,
    loaded_total: usize,
    texts: HashMap<String, String>,
    image_sizes: HashMap<String, Vec2>,
    pub playing: Vec<PlayingSound>,
    /// Every sound started, in order.
    pub sound_log: Vec<String>,
    pub sounds_paused: bool,
    pub fade: Option<(u32, f32)>,
    pub storage: HashMap<String, String>,
    pub particles: Vec<ParticleSystem>,
    pub frame: FrameRecord,
}

impl HeadlessHost {
    pub fn new(view_width: u32, view_height: u32) -> Self {
        Self {
            now_ms: 0,
            view: Rect::new(0.0, 0.0, view_width as f32, view_height as f32),
            fps: 60.0,
            background_color: None,
            asset_root: PathBuf::from("."),
            pending: VecDeque::new(),
            queued_total: 0,
            loaded_total: 0,
            texts: HashMap::new(),
            image_sizes: HashMap::new(),
            playing: Vec::new(),
            sound_log: Vec::new(),
            sounds_paused: false,
            fade: None,
            storage: HashMap::new(),
            particles: Vec::new(),
            frame: FrameRecord::default(),
        }
    }

    /// Resolve queued asset URLs relative to `root`.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Make a text asset available without touching the filesystem.
    pub fn insert_text(&mut self, key: &str, text: &str) {
        self.texts.insert(key.to_string(), text.to_string());
    }

    pub fn insert_image(&mut self, key: &str, size: Vec2) {
        self.image_sizes.insert(key.to_string(), size);
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    pub fn begin_frame(&mut self) {
        self.frame = FrameRecord::default();
    }

    pub fn is_playing(&self, key: &str) -> bool {
        self.playing.iter().any(|s| s.key == key)
    }

    fn load_one(&mut self, asset: QueuedAsset) {
        match asset.kind {
            AssetKind::Text => {
                let path = self.asset_root.join(&asset.url);
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        self.texts.insert(asset.key, text);
                    }
                    Err(e) => {
                        log::warn!("Failed to load text asset {}: {e}", path.display());
                    }
                }
            }
            AssetKind::Image | AssetKind::Sound => {
                log::trace!("Headless host skipping decode of '{}'", asset.url);
            }
        }
        self.loaded_total += 1;
    }

    fn enqueue(&mut self, key: &str, url: &str, kind: AssetKind) {
        if self.pending.is_empty() {
            self.queued_total = 0;
            self.loaded_total = 0;
        }
        // A re-queued key must not resolve to the previous batch's text.
        if kind == AssetKind::Text {
            self.texts.remove(key);
        }
        self.pending.push_back(QueuedAsset {
            key: key.to_string(),
            url: url.to_string(),
            kind,
        });
        self.queued_total += 1;
    }
}

impl HostEngine for HeadlessHost {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn camera_view(&self) -> Rect {
        self.view
    }

    fn follow(&mut self, target: Vec2, world_size: Vec2) {
        let max_x = (world_size.x - self.view.width).max(0.0);
        let max_y = (world_size.y - self.view.height).max(0.0);
        self.view.x = (target.x - self.view.width * 0.5).clamp(0.0, max_x);
        self.view.y = (target.y - self.view.height * 0.5).clamp(0.0, max_y);
    }

    fn set_background_color(&mut self, color: &str) {
        self.background_color = Some(color.to_string());
    }

    fn queue_text(&mut self, key: &str, url: &str) {
        self.enqueue(key, url, AssetKind::Text);
    }

    fn queue_image(&mut self, key: &str, url: &str, size_hint: Option<Vec2>) {
        if let Some(size) = size_hint {
            self.image_sizes.insert(key.to_string(), size);
        }
        self.enqueue(key, url, AssetKind::Image);
    }

    fn queue_spritesheet(&mut self, key: &str, url: &str, frame_size: Vec2) {
        self.image_sizes.insert(key.to_string(), frame_size);
        self.enqueue(key, url, AssetKind::Image);
    }

    fn queue_sound(&mut self, key: &str, urls: &[String]) {
        let url = urls.first().map(String::as_str).unwrap_or_default();
        self.enqueue(key, url, AssetKind::Sound);
    }

    fn load_progress(&mut self) -> u8 {
        if let Some(asset) = self.pending.pop_front() {
            self.load_one(asset);
        }
        if self.queued_total == 0 {
            return 100;
        }
        ((self.loaded_total * 100) / self.queued_total) as u8
    }

    fn asset_text(&self, key: &str) -> Option<String> {
        self.texts.get(key).cloned()
    }

    fn image_size(&self, key: &str) -> Option<Vec2> {
        self.image_sizes.get(key).copied()
    }

    fn play_sound(&mut self, key: &str, volume: f32, looping: bool) {
        self.playing.retain(|s| s.key != key);
        self.playing.push(PlayingSound {
            key: key.to_string(),
            volume,
            looping,
        });
        self.sound_log.push(key.to_string());
    }

    fn stop_all_sounds(&mut self) {
        self.playing.clear();
    }

    fn pause_all_sounds(&mut self) {
        self.sounds_paused = true;
    }

    fn resume_all_sounds(&mut self) {
        self.sounds_paused = false;
    }

    fn set_fade_overlay(&mut self, color: u32, alpha: f32) {
        self.fade = if alpha > 0.0 { Some((color, alpha)) } else { None };
    }

    fn storage_get(&self, key: &str) -> Option<String> {
        self.storage.get(key).cloned()
    }

    fn storage_set(&mut self, key: &str, value: &str) {
        self.storage.insert(key.to_string(), value.to_string());
    }

    fn create_particles(&mut self, config: &EmitterConfig, area: Rect) -> ParticleHandle {
        self.particles.push(ParticleSystem {
            config: config.clone(),
            area,
            running: false,
            starts: 0,
        });
        ParticleHandle(self.particles.len() - 1)
    }

    fn start_particles(&mut self, handle: ParticleHandle, _period_ms: u64, _delay_ms: u64) {
        if let Some(system) = self.particles.get_mut(handle.0) {
            system.running = true;
            system.starts += 1;
        }
    }

    fn kill_particles(&mut self, handle: ParticleHandle) {
        if let Some(system) = self.particles.get_mut(handle.0) {
            system.running = false;
        }
    }

    fn set_particle_area(&mut self, handle: ParticleHandle, area: Rect) {
        if let Some(system) = self.particles.get_mut(handle.0) {
            system.area = area;
        }
    }

    fn draw_tile_layer(&mut self, layer: &TileLayer, _view: Rect) {
        self.frame.tile_layers.push(layer.name.clone());
    }

    fn draw_image(&mut self, key: &str, _position: Vec2) {
        self.frame.images.push(key.to_string());
    }

    fn draw_sprite(&mut self, key: &str, _frame: u32, _bounds: Rect, _flip_x: bool) {
        self.frame.sprites.push(key.to_string());
    }

    fn draw_text(&mut self, text: &str, _position: Vec2, _color: &str) {
        self.frame.texts.push(text.to_string());
    }

    fn draw_rect(&mut self, _rect: Rect, _color: &str) {
        self.frame.rects += 1;
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_clamps_to_world() {
        let mut host = HeadlessHost::new(100, 80);
        host.follow(Vec2::new(10.0, 10.0), Vec2::new(400.0, 300.0));
        assert_eq!((host.view.x, host.view.y), (0.0, 0.0));
        host.follow(Vec2::new(390.0, 290.0), Vec2::new(400.0, 300.0));
        assert_eq!((host.view.x, host.view.y), (300.0, 220.0));
        host.follow(Vec2::new(200.0, 150.0), Vec2::new(400.0, 300.0));
        assert_eq!((host.view.x, host.view.y), (150.0, 110.0));
    }

    #[test]
    fn small_worlds_pin_camera_at_origin() {
        let mut host = HeadlessHost::new(640, 480);
        host.follow(Vec2::new(32.0, 32.0), Vec2::new(64.0, 64.0));
        assert_eq!((host.view.x, host.view.y), (0.0, 0.0));
    }

    #[test]
    fn progress_advances_one_asset_per_call() {
        let mut host = HeadlessHost::new(640, 480);
        assert_eq!(host.load_progress(), 100);
        host.queue_image("a", "a.png", None);
        host.queue_sound("b", &["b.mp3".to_string(), "b.ogg".to_string()]);
        assert_eq!(host.load_progress(), 50);
        assert_eq!(host.load_progress(), 100);
    }

    #[test]
    fn missing_text_asset_still_completes_loading() {
        let mut host = HeadlessHost::new(640, 480).with_asset_root("/nonexistent-root");
        host.queue_text("level", "maps/none.json");
        assert_eq!(host.load_progress(), 100);
        assert!(host.asset_text("level").is_none());
    }

    #[test]
    fn requeued_text_drops_the_previous_batch() {
        let mut host = HeadlessHost::new(640, 480).with_asset_root("/nonexistent-root");
        host.insert_text("level", "{}");
        host.queue_text("level", "maps/level-2.json");
        assert!(host.asset_text("level").is_none());
        assert_eq!(host.load_progress(), 100);
        assert!(host.asset_text("level").is_none());
    }

    #[test]
    fn each_batch_reports_progress_from_zero() {
        let mut host = HeadlessHost::new(640, 480);
        host.queue_image("a", "a.png", None);
        host.queue_image("b", "b.png", None);
        assert_eq!(host.load_progress(), 50);
        assert_eq!(host.load_progress(), 100);

        host.queue_image("c", "c.png", None);
        host.queue_image("d", "d.png", None);
        host.queue_image("e", "e.png", None);
        host.queue_image("f", "f.png", None);
        assert_eq!(host.load_progress(), 25);
    }

    #[test]
    fn fade_overlay_clears_at_zero_alpha() {
        let mut host = HeadlessHost::new(640, 480);
        host.set_fade_overlay(0x000000, 0.5);
        assert_eq!(host.fade, Some((0, 0.5)));
        host.set_fade_overlay(0x000000, 0.0);
        assert!(host.fade.is_none());
    }

    #[test]
    fn replaying_a_sound_does_not_duplicate_it() {
        let mut host = HeadlessHost::new(640, 480);
        host.play_sound("music", 0.5, true);
        host.play_sound("music", 0.5, true);
        assert_eq!(host.playing.len(), 1);
        assert_eq!(host.sound_log.len(), 2);
        host.stop_all_sounds();
        assert!(!host.is_playing("music"));
    }
}
