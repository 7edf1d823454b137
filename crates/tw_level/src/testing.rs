//! Fixtures shared by the crate's unit tests.

use crate::map::MapFile;
use crate::registry::{MapObject, SpriteId, TypeRegistry};
use crate::sprite::{CallArgs, Sprite, SpriteBody, SpriteContext};
use crate::tiles::{SolidTiles, TileLayer, TileMap};
use crate::world::{Group, World};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;

/// Records every method call a [`StubSprite`] receives as `"method from caller"`.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }
}

pub struct StubSprite {
    pub body: SpriteBody,
    pub player: bool,
    pub updates: u32,
    log: CallLog,
}

impl StubSprite {
    pub fn new(body: SpriteBody, player: bool, log: CallLog) -> Self {
        Self {
            body,
            player,
            updates: 0,
            log,
        }
    }
}

impl Sprite for StubSprite {
    fn body(&self) -> &SpriteBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut SpriteBody {
        &mut self.body
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn update_object(&mut self, _ctx: &mut SpriteContext<'_>) {
        self.updates += 1;
    }

    fn call(&mut self, method: &str, args: &CallArgs) -> Option<bool> {
        self.log.push(format!("{method} from {}", args.caller));
        Some(true)
    }
}

/// An 8x8 solid "main" layer of 16px tiles with a 16x16 player "hero" whose
/// top-left corner is at `(x, y)`.
pub fn world_with_player(x: f32, y: f32) -> (World, CallLog) {
    let log = CallLog::default();
    let grid = serde_json::json!({
        "width": 8, "height": 8, "tilewidth": 16, "tileheight": 16,
        "layers": [ {
            "name": "main", "type": "tilelayer", "width": 8, "height": 8,
            "properties": { "solid": "true" }, "data": vec![0; 64]
        } ]
    });
    let file: MapFile = serde_json::from_value(grid).expect("fixture map is valid");
    let raw = &file.layers[0];
    let solid_tiles = SolidTiles::from_map(&file);
    let layer = TileLayer::from_map_layer(raw, &file, &solid_tiles);
    let map = TileMap {
        layers: vec![layer],
        solid_tiles,
        tile_width: 16,
        tile_height: 16,
    };

    let player = SpriteId { group: 0, index: 0 };
    let mut world = World::new(map, 0, player, Vec2::new(128.0, 128.0));
    let mut group = Group::new("actors", true, 1.0);
    group.exists = true;
    group.sprites.push(Box::new(StubSprite::new(
        SpriteBody::new("hero", "hero", x, y, 16.0, 16.0),
        true,
        log.clone(),
    )));
    world.groups.push(group);
    world.names.insert("hero", crate::registry::Handle::Sprite(player));
    (world, log)
}

/// Builtins plus `PlayerStub` and `Npc` stub sprite types sharing `log`.
pub fn registry_with_stubs(log: &CallLog) -> TypeRegistry {
    let mut registry = TypeRegistry::with_builtins();
    for (kind, player) in [("PlayerStub", true), ("Npc", false)] {
        let log = log.clone();
        registry.register(kind, move |_ctx, spec| {
            let body = SpriteBody::new(&spec.name, kind, spec.x, spec.y, spec.width, spec.height);
            let sprite = StubSprite::new(body, player, log.clone());
            Ok(Some(MapObject::Sprite(Box::new(sprite))))
        });
    }
    registry
}

/// A 4x4 map of 16px tiles with a solid "main" layer and an object group
/// holding `objects` (raw JSON object literals).
pub fn map_json(objects: &[&str]) -> String {
    format!(
        r#"{{
          "width": 4, "height": 4, "tilewidth": 16, "tileheight": 16,
          "tilesets": [ {{ "firstgid": 1, "name": "tiles", "image": "tiles.png",
                          "tilewidth": 16, "tileheight": 16,
                          "tileproperties": {{ "0": {{ "solid": "true" }} }} }} ],
          "layers": [
            {{ "name": "sky", "type": "imagelayer", "image": "sky" }},
            {{ "name": "main", "type": "tilelayer", "width": 4, "height": 4,
              "properties": {{ "solid": "true" }},
              "data": [0,0,0,0, 0,0,0,0, 0,0,0,0, 1,1,1,1] }},
            {{ "name": "actors", "type": "objectgroup", "objects": [ {} ] }}
          ]
        }}"#,
        objects.join(",")
    )
}
