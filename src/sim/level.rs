/// The reference level: a deterministic fixed layout, built in code.
/// This is a static test fixture, not runtime-configurable.
///
/// Layout (tile coordinates, 120×20 grid of 32 px tiles):
///   - full-width ground strip on rows 18–19
///   - two ground gaps: columns 48–51 and 76–79
///   - several elevated platform segments
///   - two single-tile pillars on the ground
///   - tall goal pillar at the far right edge

use crate::domain::tile::{Tile, TileWorld};

pub const LEVEL_WIDTH: usize = 120;
pub const LEVEL_HEIGHT: usize = 20;

pub const GROUND_TOP_ROW: usize = 18;
pub const GAP_A: (usize, usize) = (48, 51);
pub const GAP_B: (usize, usize) = (76, 79);
pub const GOAL_COL: usize = 118;
pub const GOAL_TOP_ROW: usize = 6;

/// Spawn tile for the body's top-left corner.
pub const SPAWN_TILE: (usize, usize) = (2, 12);

/// A loaded level: the immutable grid plus spawn and goal data.
pub struct LevelDef {
    pub world: TileWorld,
    pub spawn: (f32, f32),
    pub goal_x: f32,
    pub goal_top_y: f32,
}

pub fn reference_level(tile_size: f32) -> LevelDef {
    let mut world = TileWorld::empty(LEVEL_WIDTH, LEVEL_HEIGHT);

    // Ground strip
    world.fill(0..=LEVEL_WIDTH - 1, GROUND_TOP_ROW..=LEVEL_HEIGHT - 1, Tile::Solid);

    // Carve the two gaps through both ground rows
    world.fill(GAP_A.0..=GAP_A.1, GROUND_TOP_ROW..=LEVEL_HEIGHT - 1, Tile::Empty);
    world.fill(GAP_B.0..=GAP_B.1, GROUND_TOP_ROW..=LEVEL_HEIGHT - 1, Tile::Empty);

    // Elevated platforms
    world.fill(20..=26, 14..=14, Tile::Solid);
    world.fill(33..=37, 12..=12, Tile::Solid);
    world.fill(58..=64, 14..=14, Tile::Solid);
    world.fill(88..=93, 13..=13, Tile::Solid);

    // Single-tile pillars
    world.set(30, 17, Tile::Solid);
    world.set(68, 17, Tile::Solid);

    // Goal pillar at the far right edge
    world.fill(GOAL_COL..=GOAL_COL, GOAL_TOP_ROW..=GROUND_TOP_ROW - 1, Tile::Solid);

    LevelDef {
        world,
        spawn: (SPAWN_TILE.0 as f32 * tile_size, SPAWN_TILE.1 as f32 * tile_size),
        goal_x: GOAL_COL as f32 * tile_size,
        goal_top_y: GOAL_TOP_ROW as f32 * tile_size,
    }
}
