//! Fixtures shared by the game's unit tests.

use tw_core::InputState;
use tw_level::host::HeadlessHost;
use tw_level::sprite::{Message, SpriteContext};
use tw_level::tiles::{SolidTiles, TileLayer, TileMap};
use tw_level::MapFile;

/// A single solid layer of 16px tiles drawn as ASCII rows: `#` is a full
/// block, `^` a one-way platform and anything else is empty.
pub fn tile_map(rows: &[&str]) -> TileMap {
    let width = rows.first().map_or(0, |r| r.len());
    let data: Vec<u32> = rows
        .iter()
        .flat_map(|row| {
            row.chars().map(|c| match c {
                '#' => 1,
                '^' => 2,
                _ => 0,
            })
        })
        .collect();
    let file: MapFile = serde_json::from_value(serde_json::json!({
        "width": width, "height": rows.len(), "tilewidth": 16, "tileheight": 16,
        "tilesets": [ {
            "firstgid": 1, "name": "tiles", "image": "tiles.png",
            "tilewidth": 16, "tileheight": 16,
            "tileproperties": { "0": { "solid": "true" }, "1": { "solid-up": "true" } }
        } ],
        "layers": [ {
            "name": "main", "type": "tilelayer", "width": width, "height": rows.len(),
            "properties": { "solid": "true" }, "data": data
        } ]
    }))
    .expect("fixture map is valid");
    let solid_tiles = SolidTiles::from_map(&file);
    let layer = TileLayer::from_map_layer(&file.layers[0], &file, &solid_tiles);
    TileMap {
        layers: vec![layer],
        solid_tiles,
        tile_width: 16,
        tile_height: 16,
    }
}

/// Owns everything a [`SpriteContext`] borrows.
pub struct Scene {
    pub map: TileMap,
    pub input: InputState,
    pub host: HeadlessHost,
    pub outbox: Vec<Message>,
    pub now_ms: u64,
}

impl Scene {
    pub fn new(rows: &[&str]) -> Self {
        Self {
            map: tile_map(rows),
            input: InputState::new(),
            host: HeadlessHost::new(640, 480),
            outbox: Vec::new(),
            now_ms: 0,
        }
    }

    /// Run `f` with a context for a sprite named `caller`.
    pub fn with_context<R>(
        &mut self,
        caller: &str,
        player_bounds: Option<tw_core::Rect>,
        f: impl FnOnce(&mut SpriteContext<'_>) -> R,
    ) -> R {
        let world_size = glam::Vec2::new(
            (self.map.layers[0].width * 16) as f32,
            (self.map.layers[0].height * 16) as f32,
        );
        let mut ctx = SpriteContext::new(
            &self.map,
            &self.input,
            &mut self.host,
            self.now_ms,
            1.0 / 60.0,
            world_size,
            player_bounds,
            caller,
            &mut self.outbox,
        );
        f(&mut ctx)
    }
}
