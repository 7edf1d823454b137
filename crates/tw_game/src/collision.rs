//! Move-and-slide against the solid tile layers of a level.
//!
//! Movement is **axis-separable**: X is resolved against the grid first, then
//! Y using the corrected X position. A cell blocks only on the faces its
//! tileset metadata marks solid, so a tile with just `solid-up` behaves as a
//! one-way platform. Slope tiles block on every face.
//!
//! Coordinates are world pixels with y growing downward.

use tw_core::Rect;
use tw_level::tiles::{TileCollision, TileMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionMoveResult {
    pub bounds: Rect,
    pub collided_y: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_down: bool,
    pub blocked_up: bool,
}

/// Face of a cell a moving box runs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Left,
    Right,
    Top,
    Bottom,
}

impl Face {
    fn blocks(self, collision: TileCollision) -> bool {
        match self {
            Face::Left => collision.left,
            Face::Right => collision.right,
            Face::Top => collision.up,
            Face::Bottom => collision.down,
        }
    }
}

/// Read-only collision view over a level's tile map.
#[derive(Clone, Copy)]
pub struct TileCollider<'a> {
    map: &'a TileMap,
    cell_w: f32,
    cell_h: f32,
}

impl<'a> TileCollider<'a> {
    pub fn new(map: &'a TileMap) -> Self {
        Self {
            map,
            cell_w: map.tile_width.max(1) as f32,
            cell_h: map.tile_height.max(1) as f32,
        }
    }

    /// True when any solid layer holds a cell at `(x, y)` that blocks `face`.
    /// Cells off the grid never block.
    fn blocks(&self, x: i32, y: i32, face: Face) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.map.solid_layers().any(|layer| {
            layer
                .tile(x as u32, y as u32)
                .and_then(|tile| self.map.collision_for(tile))
                .is_some_and(|collision| face.blocks(collision))
        })
    }

    #[allow(dead_code)]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        [Face::Left, Face::Right, Face::Top, Face::Bottom]
            .into_iter()
            .any(|face| self.blocks(x, y, face))
    }

    /// True when the box is resting on a cell that blocks from above.
    #[allow(dead_code)]
    pub fn is_supported(&self, bounds: Rect) -> bool {
        const EPS: f32 = 0.001;
        let below = self.world_to_cell_y(bounds.bottom() + EPS);
        let x0 = self.world_to_cell_x(bounds.x + EPS);
        let x1 = self.world_to_cell_x(bounds.right() - EPS);
        let on_boundary = (bounds.bottom() / self.cell_h).fract().abs() < EPS;
        on_boundary && (x0..=x1).any(|x| self.blocks(x, below, Face::Top))
    }

    #[allow(dead_code)]
    pub fn move_and_collide(&self, bounds: Rect, dx: f32, dy: f32) -> Rect {
        self.move_and_collide_detailed(bounds, dx, dy).bounds
    }

    pub fn move_and_collide_detailed(&self, bounds: Rect, dx: f32, dy: f32) -> CollisionMoveResult {
        const EPS: f32 = 0.0001;

        let resolved_x = self.resolve_axis_x(bounds, dx);
        let collided_x = (resolved_x - (bounds.x + dx)).abs() > EPS;

        let mut moved = bounds;
        moved.x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy);
        let collided_y = (resolved_y - (bounds.y + dy)).abs() > EPS;
        moved.y = resolved_y;

        CollisionMoveResult {
            bounds: moved,
            collided_y,
            blocked_left: collided_x && dx < 0.0,
            blocked_right: collided_x && dx > 0.0,
            blocked_down: collided_y && dy > 0.0,
            blocked_up: collided_y && dy < 0.0,
        }
    }

    fn resolve_axis_x(&self, bounds: Rect, dx: f32) -> f32 {
        if dx == 0.0 {
            return bounds.x;
        }

        const EPS: f32 = 0.001;
        let mut candidate = bounds.x + dx;
        let y0 = self.world_to_cell_y(bounds.y + EPS);
        let y1 = self.world_to_cell_y(bounds.bottom() - EPS);

        if dx > 0.0 {
            let from = self.world_to_cell_x(bounds.right() - EPS) + 1;
            let to = self.world_to_cell_x(candidate + bounds.width - EPS);
            'scan: for x in from..=to {
                for y in y0..=y1 {
                    if self.blocks(x, y, Face::Left) {
                        candidate = candidate.min(x as f32 * self.cell_w - bounds.width);
                        break 'scan;
                    }
                }
            }
            // Never push against the direction of travel.
            candidate = candidate.max(bounds.x);
        } else {
            let from = self.world_to_cell_x(bounds.x + EPS) - 1;
            let to = self.world_to_cell_x(candidate + EPS);
            'scan: for x in (to..=from).rev() {
                for y in y0..=y1 {
                    if self.blocks(x, y, Face::Right) {
                        candidate = candidate.max((x + 1) as f32 * self.cell_w);
                        break 'scan;
                    }
                }
            }
            candidate = candidate.min(bounds.x);
        }

        candidate
    }

    fn resolve_axis_y(&self, bounds: Rect, dy: f32) -> f32 {
        if dy == 0.0 {
            return bounds.y;
        }

        const EPS: f32 = 0.001;
        let mut candidate = bounds.y + dy;
        let x0 = self.world_to_cell_x(bounds.x + EPS);
        let x1 = self.world_to_cell_x(bounds.right() - EPS);

        if dy > 0.0 {
            let from = self.world_to_cell_y(bounds.bottom() - EPS) + 1;
            let to = self.world_to_cell_y(candidate + bounds.height - EPS);
            'scan: for y in from..=to {
                for x in x0..=x1 {
                    if self.blocks(x, y, Face::Top) {
                        candidate = candidate.min(y as f32 * self.cell_h - bounds.height);
                        break 'scan;
                    }
                }
            }
            candidate = candidate.max(bounds.y);
        } else {
            let from = self.world_to_cell_y(bounds.y + EPS) - 1;
            let to = self.world_to_cell_y(candidate + EPS);
            'scan: for y in (to..=from).rev() {
                for x in x0..=x1 {
                    if self.blocks(x, y, Face::Bottom) {
                        candidate = candidate.max((y + 1) as f32 * self.cell_h);
                        break 'scan;
                    }
                }
            }
            candidate = candidate.min(bounds.y);
        }

        candidate
    }

    fn world_to_cell_x(&self, world_x: f32) -> i32 {
        (world_x / self.cell_w).floor() as i32
    }

    fn world_to_cell_y(&self, world_y: f32) -> i32 {
        (world_y / self.cell_h).floor() as i32
    }
}
