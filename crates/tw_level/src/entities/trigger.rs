//! Triggers: rectangles that latch on and off and fire named callbacks.
//!
//! All variants share the latch in [`Trigger`]; [`TriggerKind`] decides what
//! switching on and off does. Plain triggers call `on`/`off` methods on their
//! target, the other kinds act on the level directly.

use super::{Fade, Frame, Link};
use crate::config::FrameworkConfig;
use crate::map::ObjectSpec;
use crate::props::PropertyBag;
use crate::registry::Handle;
use crate::save::SaveState;
use crate::sprite::CallArgs;
use crate::tiles::Tile;
use crate::world::{LevelCommand, World};
use glam::Vec2;
use tw_core::Rect;

const FADE_COLOR: u32 = 0x000000;

/// One cell rewritten by a set-tile trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TileChange {
    pub layer: String,
    pub x: u32,
    pub y: u32,
    pub tile: u32,
    /// Forces the new cell's solidity; derived from the layer otherwise.
    pub collide: Option<bool>,
}

impl TileChange {
    fn from_props(props: &PropertyBag, key: &str) -> Result<Option<Self>, String> {
        let Some(value) = props.get_json(key)? else {
            return Ok(None);
        };
        let serde_json::Value::Object(fields) = value else {
            return Err(format!("property '{}' must be a JSON object", key));
        };
        let fields = PropertyBag::from(fields);
        let missing = |field: &str| format!("property '{}' is missing '{}'", key, field);
        Ok(Some(Self {
            layer: fields.get_str("layer").ok_or_else(|| missing("layer"))?,
            x: fields.get_u32("x").ok_or_else(|| missing("x"))?,
            y: fields.get_u32("y").ok_or_else(|| missing("y"))?,
            tile: fields.get_u32("tile").ok_or_else(|| missing("tile"))?,
            collide: fields.get_bool("collide"),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetTile {
    pub changes: Vec<TileChange>,
    /// Snapshot of each changed cell, taken on the first switch-on.
    saved: Option<Vec<Option<Tile>>>,
    pub trigger_tile: Option<u32>,
    trigger_cell: (u32, u32),
    saved_trigger_tile: Option<Tile>,
    pub sound: Option<String>,
    pub volume: f32,
}

impl SetTile {
    pub fn is_saved(&self) -> bool {
        self.saved.is_some()
    }

    fn snapshot(&mut self, world: &World) {
        let map = &world.map;
        let cells = self
            .changes
            .iter()
            .map(|c| {
                map.find_layer(&c.layer)
                    .and_then(|layer| map.get_tile(layer, c.x, c.y))
            })
            .collect();
        self.saved = Some(cells);
        if self.trigger_tile.is_some() {
            let (x, y) = self.trigger_cell;
            self.saved_trigger_tile = map.get_tile(world.main_layer, x, y);
        }
    }

    fn on(&mut self, frame: &mut Frame<'_>) -> bool {
        if self.saved.is_none() {
            self.snapshot(frame.world);
        }
        let map = &mut frame.world.map;
        for change in &self.changes {
            match map.find_layer(&change.layer) {
                Some(layer) => {
                    if !map.put_tile_index(layer, change.x, change.y, change.tile, change.collide)
                    {
                        log::warn!(
                            "Set-tile cell ({}, {}) is outside layer '{}'",
                            change.x,
                            change.y,
                            change.layer
                        );
                    }
                }
                None => log::warn!("Set-tile references unknown layer '{}'", change.layer),
            }
        }
        if let Some(index) = self.trigger_tile {
            let (x, y) = self.trigger_cell;
            map.put_tile_index(frame.world.main_layer, x, y, index, None);
        }
        if let Some(sound) = &self.sound {
            frame.host.play_sound(sound, self.volume, false);
        }
        true
    }

    fn off(&mut self, frame: &mut Frame<'_>) -> bool {
        self.restore(frame.world);
        if let Some(sound) = &self.sound {
            frame.host.play_sound(sound, 0.5, false);
        }
        true
    }

    fn restore(&self, world: &mut World) {
        let Some(saved) = &self.saved else {
            return;
        };
        let map = &mut world.map;
        for (change, tile) in self.changes.iter().zip(saved) {
            let (Some(layer), Some(tile)) = (map.find_layer(&change.layer), tile) else {
                continue;
            };
            map.put_tile(layer, change.x, change.y, *tile);
        }
        if let Some(tile) = self.saved_trigger_tile {
            let (x, y) = self.trigger_cell;
            map.put_tile(world.main_layer, x, y, tile);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextLevel {
    pub level: u32,
    pub fade_ms: u64,
    fade: Option<Fade>,
}

impl NextLevel {
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teleport {
    pub destination: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetLevel {
    pub fade_ms: u64,
    pub rearm_ms: u64,
    activated_at: Option<u64>,
    fade: Option<Fade>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerKind {
    /// Calls the `on`/`off` methods named in its properties on its target.
    Basic,
    SetTile(SetTile),
    NextLevel(NextLevel),
    Teleport(Teleport),
    ResetLevel(ResetLevel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub name: String,
    pub bounds: Rect,
    pub activated: bool,
    pub trigger_on_touch: bool,
    pub entity: Link,
    pub target: Link,
    pub on_callback: Option<String>,
    pub off_callback: Option<String>,
    pub kind: TriggerKind,
}

impl Trigger {
    fn with_kind(spec: &ObjectSpec, kind: TriggerKind, touch_default: bool) -> Self {
        let props = &spec.properties;
        let width = if spec.width > 0.0 { spec.width } else { 1.0 };
        let height = if spec.height > 0.0 { spec.height } else { 1.0 };
        Self {
            name: spec.name.clone(),
            bounds: Rect::new(spec.x, spec.y, width, height),
            activated: false,
            trigger_on_touch: props.get_bool("trigger_on_touch").unwrap_or(touch_default),
            entity: Link::entity(props.get_str("entity")),
            target: Link::target(props.get_str("target")),
            on_callback: props.get_str("on"),
            off_callback: props.get_str("off"),
            kind,
        }
    }

    pub fn basic(spec: &ObjectSpec) -> Self {
        Self::with_kind(spec, TriggerKind::Basic, false)
    }

    pub fn set_tile(spec: &ObjectSpec, tile_size: Vec2) -> Result<Self, String> {
        let props = &spec.properties;
        let mut changes = Vec::new();
        for key in ["new_tile_1", "new_tile_2", "new_tile_3"] {
            if let Some(change) = TileChange::from_props(props, key)? {
                changes.push(change);
            } else if key == "new_tile_1" {
                return Err("SetTileTrigger requires a 'new_tile_1' property".to_string());
            }
        }
        let cell = |pos: f32, size: f32| {
            if size > 0.0 {
                (pos / size).floor().max(0.0) as u32
            } else {
                0
            }
        };
        let kind = TriggerKind::SetTile(SetTile {
            changes,
            saved: None,
            trigger_tile: props.get_u32("new_trigger_tile"),
            trigger_cell: (cell(spec.x, tile_size.x), cell(spec.y, tile_size.y)),
            saved_trigger_tile: None,
            sound: props.get_str("sound_effect"),
            volume: props.get_f32("volume").unwrap_or(1.0),
        });
        Ok(Self::with_kind(spec, kind, false))
    }

    pub fn next_level(spec: &ObjectSpec, config: &FrameworkConfig) -> Result<Self, String> {
        let props = &spec.properties;
        let level = props
            .get_u32("level")
            .ok_or_else(|| "NextLevelTrigger requires an integer 'level' property".to_string())?;
        let kind = TriggerKind::NextLevel(NextLevel {
            level,
            fade_ms: props.get_u64("fade_ms").unwrap_or(config.fade_ms),
            fade: None,
        });
        Ok(Self::with_kind(spec, kind, true))
    }

    pub fn teleport(spec: &ObjectSpec) -> Result<Self, String> {
        let props = &spec.properties;
        let (Some(x), Some(y)) = (props.get_f32("new_x"), props.get_f32("new_y")) else {
            return Err("TeleportTrigger requires 'new_x' and 'new_y' properties".to_string());
        };
        let kind = TriggerKind::Teleport(Teleport {
            destination: Vec2::new(x, y),
        });
        Ok(Self::with_kind(spec, kind, true))
    }

    pub fn reset_level(spec: &ObjectSpec, config: &FrameworkConfig) -> Self {
        let props = &spec.properties;
        let kind = TriggerKind::ResetLevel(ResetLevel {
            fade_ms: props.get_u64("fade_ms").unwrap_or(config.fade_ms),
            rearm_ms: props.get_u64("rearm_ms").unwrap_or(config.reset_rearm_ms),
            activated_at: None,
            fade: None,
        });
        Self::with_kind(spec, kind, true)
    }

    /// Switch on. Returns false if already on; otherwise the on-action's result.
    pub fn activate(&mut self, frame: &mut Frame<'_>) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;
        let entity = self.entity.resolve(frame.world);
        match &mut self.kind {
            TriggerKind::Basic => fire(
                &mut self.target,
                &self.name,
                entity,
                self.on_callback.as_deref(),
                frame,
            ),
            TriggerKind::SetTile(set_tile) => set_tile.on(frame),
            TriggerKind::NextLevel(next) => {
                next.fade = Some(Fade::start(FADE_COLOR, next.fade_ms, frame.now_ms));
                true
            }
            TriggerKind::Teleport(teleport) => {
                if let Some(entity) = entity {
                    frame.world.set_position(entity, teleport.destination);
                }
                self.activated = false;
                true
            }
            TriggerKind::ResetLevel(reset) => {
                reset.activated_at = Some(frame.now_ms);
                if let Some(player) = frame.world.player_mut() {
                    player.velocity = Vec2::ZERO;
                    player.exists = false;
                }
                reset.fade = Some(Fade::start(FADE_COLOR, reset.fade_ms, frame.now_ms));
                true
            }
        }
    }

    /// Switch off. Returns false if already off; otherwise the off-action's result.
    pub fn deactivate(&mut self, frame: &mut Frame<'_>) -> bool {
        if !self.activated {
            return false;
        }
        self.activated = false;
        let entity = self.entity.resolve(frame.world);
        match &mut self.kind {
            TriggerKind::Basic => fire(
                &mut self.target,
                &self.name,
                entity,
                self.off_callback.as_deref(),
                frame,
            ),
            TriggerKind::SetTile(set_tile) => set_tile.off(frame),
            TriggerKind::NextLevel(_) | TriggerKind::Teleport(_) | TriggerKind::ResetLevel(_) => {
                true
            }
        }
    }

    /// Whether the tracked entity overlaps this trigger.
    pub fn check(&mut self, world: &World) -> bool {
        match self.entity.resolve(world).and_then(|e| world.bounds(e)) {
            Some(entity_bounds) => self.bounds.intersects(&entity_bounds),
            None => false,
        }
    }

    pub fn check_activate(&mut self, frame: &mut Frame<'_>) -> bool {
        self.check(frame.world) && self.activate(frame)
    }

    pub fn check_deactivate(&mut self, frame: &mut Frame<'_>) -> bool {
        self.check(frame.world) && self.deactivate(frame)
    }

    pub fn update_object(&mut self, frame: &mut Frame<'_>) {
        self.target.resolve(frame.world);
        self.entity.resolve(frame.world);

        match &mut self.kind {
            TriggerKind::NextLevel(next) => {
                if let Some(fade) = next.fade {
                    if fade.poll(frame.host, frame.now_ms) {
                        next.fade = None;
                        frame.host.stop_all_sounds();
                        SaveState { level: next.level }.store(frame.host, &frame.config.save_key);
                        frame.world.push_command(LevelCommand::ChangeLevel(next.level));
                    }
                }
            }
            TriggerKind::ResetLevel(reset) => {
                if let Some(fade) = reset.fade {
                    if fade.poll(frame.host, frame.now_ms) {
                        reset.fade = None;
                        frame.host.set_fade_overlay(fade.color, 0.0);
                        frame.world.push_command(LevelCommand::Restart);
                    }
                }
                if let (true, Some(at)) = (self.activated, reset.activated_at) {
                    if frame.now_ms.saturating_sub(at) >= reset.rearm_ms {
                        self.activated = false;
                        reset.activated_at = None;
                    }
                }
            }
            TriggerKind::Basic | TriggerKind::SetTile(_) | TriggerKind::Teleport(_) => {}
        }
    }

    /// Return to construction state. Set-tile triggers put their saved cells
    /// back; reset-level triggers keep running their own re-arm timer.
    pub fn reset(&mut self, frame: &mut Frame<'_>) {
        match &mut self.kind {
            TriggerKind::ResetLevel(_) => {}
            TriggerKind::SetTile(set_tile) => {
                self.activated = false;
                set_tile.restore(frame.world);
            }
            TriggerKind::NextLevel(next) => {
                next.fade = None;
                self.deactivate(frame);
            }
            TriggerKind::Basic | TriggerKind::Teleport(_) => {
                self.deactivate(frame);
            }
        }
    }
}

fn fire(
    target: &mut Link,
    caller: &str,
    entity: Option<Handle>,
    callback: Option<&str>,
    frame: &mut Frame<'_>,
) -> bool {
    let Some(callback) = callback else {
        return true;
    };
    let Some(handle) = target.resolve(frame.world) else {
        return true;
    };
    let args = CallArgs {
        caller: caller.to_string(),
        entity,
    };
    frame
        .world
        .call(&mut *frame.host, handle, callback, &args)
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessHost, HostEngine};
    use crate::testing::{world_with_player, CallLog};

    fn spec(kind: &str, name: &str, rect: (f32, f32, f32, f32), props: PropertyBag) -> ObjectSpec {
        ObjectSpec::new(kind, name, rect.0, rect.1, rect.2, rect.3).with_properties(props)
    }

    fn frame<'a>(
        world: &'a mut World,
        host: &'a mut HeadlessHost,
        config: &'a FrameworkConfig,
        now_ms: u64,
    ) -> Frame<'a> {
        Frame {
            world,
            host,
            config,
            now_ms,
        }
    }

    #[test]
    fn activate_and_deactivate_are_idempotent() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let mut f = frame(&mut world, &mut host, &config, 0);
        let mut trigger = Trigger::basic(&spec("Trigger", "t", (0.0, 0.0, 20.0, 20.0), PropertyBag::new()));

        assert!(trigger.activate(&mut f));
        assert!(trigger.activated);
        assert!(!trigger.activate(&mut f));
        assert!(trigger.activated);

        assert!(trigger.deactivate(&mut f));
        assert!(!trigger.activated);
        assert!(!trigger.deactivate(&mut f));
        assert!(!trigger.activated);
    }

    #[test]
    fn basic_trigger_calls_target_methods() {
        let (mut world, log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new()
            .with("target", "hero")
            .with("on", "light")
            .with("off", "dark");
        let mut trigger = Trigger::basic(&spec("Trigger", "switch", (0.0, 0.0, 4.0, 4.0), props));
        let mut f = frame(&mut world, &mut host, &config, 0);
        trigger.update_object(&mut f);
        assert!(trigger.activate(&mut f));
        assert!(trigger.deactivate(&mut f));
        assert_eq!(log.calls(), vec!["light from switch", "dark from switch"]);
    }

    #[test]
    fn unresolved_target_is_a_silent_success() {
        let (mut world, log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new().with("target", "ghost").with("on", "boo");
        let mut trigger = Trigger::basic(&spec("Trigger", "t", (0.0, 0.0, 4.0, 4.0), props));
        let mut f = frame(&mut world, &mut host, &config, 0);
        trigger.update_object(&mut f);
        assert!(trigger.activate(&mut f));
        assert!(log.calls().is_empty());
    }

    #[test]
    fn entity_defaults_to_player() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        let mut trigger = Trigger::basic(&spec("Trigger", "t", (0.0, 0.0, 20.0, 20.0), PropertyBag::new()));
        assert!(trigger.check(&world));
        assert_eq!(trigger.entity.handle(), Some(world.player_handle()));
        world.player_mut().expect("player").position = Vec2::new(200.0, 200.0);
        assert!(!trigger.check(&world));
    }

    #[test]
    fn check_activate_fails_without_entity() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new().with("entity", "nobody");
        let mut trigger = Trigger::basic(&spec("Trigger", "t", (0.0, 0.0, 20.0, 20.0), props));
        let mut f = frame(&mut world, &mut host, &config, 0);
        assert!(!trigger.check_activate(&mut f));
        assert!(!trigger.activated);
    }

    #[test]
    fn zero_sized_trigger_gets_unit_bounds() {
        let trigger = Trigger::basic(&spec("Trigger", "t", (5.0, 6.0, 0.0, 0.0), PropertyBag::new()));
        assert_eq!(trigger.bounds, Rect::new(5.0, 6.0, 1.0, 1.0));
        assert!(!trigger.trigger_on_touch);
    }

    #[test]
    fn set_tile_snapshots_then_restores_exactly() {
        let (mut world, _log) = world_with_player(100.0, 100.0);
        let main = world.main_layer;
        let original = Tile { index: 7, solid: true };
        world.map.put_tile(main, 2, 3, original);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new().with("new_tile_1", r#"{"layer":"main","x":2,"y":3,"tile":9}"#);
        let mut trigger = Trigger::set_tile(
            &spec("SetTileTrigger", "lever", (0.0, 0.0, 16.0, 16.0), props),
            Vec2::new(16.0, 16.0),
        )
        .expect("valid set-tile trigger");

        let mut f = frame(&mut world, &mut host, &config, 0);
        assert!(trigger.activate(&mut f));
        assert_eq!(f.world.map.get_tile(main, 2, 3).map(|t| t.index), Some(9));
        assert!(trigger.deactivate(&mut f));
        assert_eq!(f.world.map.get_tile(main, 2, 3), Some(original));
    }

    #[test]
    fn set_tile_keeps_first_snapshot_and_reset_restores() {
        let (mut world, _log) = world_with_player(100.0, 100.0);
        let main = world.main_layer;
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new()
            .with("new_tile_1", serde_json::json!({"layer": "main", "x": 1, "y": 1, "tile": 5, "collide": true}))
            .with("new_tile_2", r#"{"layer":"missing","x":0,"y":0,"tile":5}"#)
            .with("new_trigger_tile", 3)
            .with("sound_effect", "click")
            .with("volume", "0.8");
        let mut trigger = Trigger::set_tile(
            &spec("SetTileTrigger", "lever", (32.0, 16.0, 16.0, 16.0), props),
            Vec2::new(16.0, 16.0),
        )
        .expect("valid set-tile trigger");
        let before_cell = world.map.get_tile(main, 1, 1);
        let before_trigger_cell = world.map.get_tile(main, 2, 1);

        let mut f = frame(&mut world, &mut host, &config, 0);
        trigger.activate(&mut f);
        assert_eq!(f.world.map.get_tile(main, 1, 1), Some(Tile { index: 5, solid: true }));
        assert_eq!(f.world.map.get_tile(main, 2, 1).map(|t| t.index), Some(3));
        trigger.deactivate(&mut f);
        trigger.activate(&mut f);
        trigger.reset(&mut f);
        assert!(!trigger.activated);
        assert_eq!(f.world.map.get_tile(main, 1, 1), before_cell);
        assert_eq!(f.world.map.get_tile(main, 2, 1), before_trigger_cell);
        assert_eq!(host.sound_log, vec!["click", "click", "click"]);
    }

    #[test]
    fn set_tile_requires_first_entry() {
        let err = Trigger::set_tile(
            &spec("SetTileTrigger", "lever", (0.0, 0.0, 16.0, 16.0), PropertyBag::new()),
            Vec2::new(16.0, 16.0),
        )
        .expect_err("missing new_tile_1");
        assert!(err.contains("new_tile_1"));
        let bad = PropertyBag::new().with("new_tile_1", r#"{"layer":"main"}"#);
        assert!(Trigger::set_tile(
            &spec("SetTileTrigger", "lever", (0.0, 0.0, 16.0, 16.0), bad),
            Vec2::new(16.0, 16.0)
        )
        .is_err());
    }

    #[test]
    fn teleport_moves_entity_and_rearms() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new().with("new_x", "48").with("new_y", 8);
        let mut trigger =
            Trigger::teleport(&spec("TeleportTrigger", "pad", (0.0, 0.0, 20.0, 20.0), props))
                .expect("valid teleport");
        assert!(trigger.trigger_on_touch);
        let mut f = frame(&mut world, &mut host, &config, 0);
        assert!(trigger.check_activate(&mut f));
        assert!(!trigger.activated);
        assert_eq!(f.world.player().map(|p| p.position), Some(Vec2::new(48.0, 8.0)));
    }

    #[test]
    fn next_level_fades_then_saves_and_requests_change() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        host.play_sound("music", 1.0, true);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new().with("level", "2");
        let mut trigger =
            Trigger::next_level(&spec("NextLevelTrigger", "exit", (0.0, 0.0, 20.0, 20.0), props), &config)
                .expect("valid next-level trigger");

        {
            let mut f = frame(&mut world, &mut host, &config, 100);
            assert!(trigger.activate(&mut f));
            trigger.update_object(&mut f);
        }
        assert!(world.take_commands().is_empty());
        assert!(host.fade.is_some());
        {
            let mut f = frame(&mut world, &mut host, &config, 1100);
            trigger.update_object(&mut f);
        }
        assert_eq!(world.take_commands(), vec![LevelCommand::ChangeLevel(2)]);
        assert!(host.playing.is_empty());
        assert_eq!(
            SaveState::load(&host, &config.save_key),
            Some(SaveState { level: 2 })
        );
    }

    #[test]
    fn reset_level_freezes_player_restarts_and_rearms() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        world.player_mut().expect("player").velocity = Vec2::new(5.0, 5.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let mut trigger = Trigger::reset_level(
            &spec("ResetLevelTrigger", "pit", (0.0, 0.0, 20.0, 20.0), PropertyBag::new().with("rearm_ms", 1200)),
            &config,
        );
        {
            let mut f = frame(&mut world, &mut host, &config, 0);
            assert!(trigger.check_activate(&mut f));
        }
        let player = world.player().expect("player");
        assert_eq!(player.velocity, Vec2::ZERO);
        assert!(!player.exists);

        {
            let mut f = frame(&mut world, &mut host, &config, 1000);
            trigger.update_object(&mut f);
            trigger.reset(&mut f);
        }
        assert_eq!(world.take_commands(), vec![LevelCommand::Restart]);
        assert!(trigger.activated);
        assert!(host.fade.is_none());

        {
            let mut f = frame(&mut world, &mut host, &config, 1199);
            trigger.update_object(&mut f);
            assert!(trigger.activated);
            f.now_ms = 1200;
            trigger.update_object(&mut f);
        }
        assert!(!trigger.activated);
        assert!(world.take_commands().is_empty());
    }

    #[test]
    fn level_target_accepts_restart() {
        let (mut world, _log) = world_with_player(10.0, 10.0);
        let mut host = HeadlessHost::new(640, 480);
        let config = FrameworkConfig::default();
        let props = PropertyBag::new().with("target", "state").with("on", "restart");
        let mut trigger = Trigger::basic(&spec("Trigger", "t", (0.0, 0.0, 4.0, 4.0), props));
        {
            let mut f = frame(&mut world, &mut host, &config, 0);
            assert!(trigger.activate(&mut f));
        }
        assert_eq!(world.take_commands(), vec![LevelCommand::Restart]);
    }
}
