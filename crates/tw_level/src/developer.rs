//! Developer-mode toggles, driven by keyboard input while a level runs.
//!
//! Keys `1`-`5` hide and show the first five tile layers, `F` shows the
//! framerate, `D` outlines live sprites and `P` kills or restarts every
//! particle emitter. The layer named `collision` is never shown.

use crate::host::HostEngine;
use crate::tiles::TileMap;
use crate::world::World;
use tw_core::{InputState, Key};

const COLLISION_LAYER: &str = "collision";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperMode {
    pub show_layers: [bool; 5],
    pub show_framerate: bool,
    pub show_debug: bool,
}

impl Default for DeveloperMode {
    fn default() -> Self {
        Self {
            show_layers: [true; 5],
            show_framerate: false,
            show_debug: false,
        }
    }
}

impl DeveloperMode {
    pub fn handle_input(&mut self, input: &InputState, world: &mut World, host: &mut dyn HostEngine) {
        for (i, key) in Key::DIGITS.iter().enumerate() {
            if input.is_just_pressed(*key) {
                self.show_layers[i] = !self.show_layers[i];
            }
        }
        if input.is_just_pressed(Key::F) {
            self.show_framerate = !self.show_framerate;
        }
        if input.is_just_pressed(Key::D) {
            self.show_debug = !self.show_debug;
        }
        if input.is_just_pressed(Key::P) {
            toggle_emitters(world, host);
        }
    }

    /// Layers past the fifth keep their authored visibility.
    pub fn apply_layer_visibility(&self, map: &mut TileMap) {
        for (i, layer) in map.layers.iter_mut().enumerate() {
            layer.visible = match self.show_layers.get(i) {
                Some(false) => false,
                Some(true) if layer.name == COLLISION_LAYER => layer.visible,
                Some(true) => true,
                None => layer.authored_visible,
            };
        }
    }
}

fn toggle_emitters(world: &mut World, host: &mut dyn HostEngine) {
    for emitter in &mut world.emitters {
        if emitter.alive {
            emitter.kill(host);
        } else {
            emitter.revive();
            emitter.go(host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::testing::world_with_player;

    fn press(key: Key) -> InputState {
        let mut input = InputState::new();
        input.key_down(key);
        input
    }

    #[test]
    fn digit_keys_toggle_layers() {
        let (mut world, _log) = world_with_player(0.0, 0.0);
        let mut host = HeadlessHost::new(640, 480);
        let mut dev = DeveloperMode::default();

        dev.handle_input(&press(Key::Num1), &mut world, &mut host);
        dev.apply_layer_visibility(&mut world.map);
        assert!(!world.map.layers[0].visible);

        dev.handle_input(&press(Key::Num1), &mut world, &mut host);
        dev.apply_layer_visibility(&mut world.map);
        assert!(world.map.layers[0].visible);
    }

    #[test]
    fn collision_layer_is_never_shown() {
        let (mut world, _log) = world_with_player(0.0, 0.0);
        world.map.layers[0].name = COLLISION_LAYER.to_string();
        world.map.layers[0].visible = false;
        DeveloperMode::default().apply_layer_visibility(&mut world.map);
        assert!(!world.map.layers[0].visible);
    }

    #[test]
    fn visible_collision_layer_stays_visible() {
        let (mut world, _log) = world_with_player(0.0, 0.0);
        world.map.layers[0].name = COLLISION_LAYER.to_string();
        world.map.layers[0].visible = true;
        DeveloperMode::default().apply_layer_visibility(&mut world.map);
        assert!(world.map.layers[0].visible);
    }

    #[test]
    fn f_and_d_toggle_overlays() {
        let (mut world, _log) = world_with_player(0.0, 0.0);
        let mut host = HeadlessHost::new(640, 480);
        let mut dev = DeveloperMode::default();
        dev.handle_input(&press(Key::F), &mut world, &mut host);
        dev.handle_input(&press(Key::D), &mut world, &mut host);
        assert!(dev.show_framerate);
        assert!(dev.show_debug);
    }

    #[test]
    fn held_keys_toggle_once() {
        let (mut world, _log) = world_with_player(0.0, 0.0);
        let mut host = HeadlessHost::new(640, 480);
        let mut dev = DeveloperMode::default();
        let mut input = press(Key::F);
        dev.handle_input(&input, &mut world, &mut host);
        input.end_frame();
        dev.handle_input(&input, &mut world, &mut host);
        assert!(dev.show_framerate);
    }
}
