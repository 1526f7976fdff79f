/// Perception encoding: the bridge from continuous simulation state to the
/// bounded discrete view handed to a decision-maker.
///
/// ## Grid orientation
///
/// The 5×9 grid is body-relative, not a fixed map excerpt:
///   - row 0 = foot level, rows increase UPWARD (toward the sky)
///   - col 0 = the body's current column, columns increase to the RIGHT
///     (toward the goal)
///
/// `grid[r][c] == is_solid(foot_col + c, foot_row - r)`.
///
/// The foot row is `floor(bottom / tile)`; a flush-landed body therefore
/// addresses its supporting row, so `grid[0][0] == 1` means "floor under
/// feet". A downstream policy needs no global coordinates: only this
/// window, raw kinematics, and the goal's absolute x for overall progress.

use serde::{Deserialize, Serialize};

use crate::domain::body::PhysicsBody;
use crate::domain::tile::TileWorld;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 9;

/// Scalar body state as seen by the policy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GoalState {
    pub x: f32,
}

/// Ephemeral, read-only snapshot produced fresh each decision cycle and
/// consumed immediately. This struct IS the decision-boundary wire format
/// (serialized with serde_json, camelCase keys).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceptionSnapshot {
    pub player: PlayerState,
    pub near_grid: [[u8; GRID_COLS]; GRID_ROWS],
    pub goal: GoalState,
}

/// Tile column under the body's horizontal center.
pub fn foot_col(body: &PhysicsBody, tile_size: f32) -> i32 {
    (body.center_x() / tile_size).floor() as i32
}

/// Tile row at the body's bottom edge.
pub fn foot_row(body: &PhysicsBody, tile_size: f32) -> i32 {
    (body.bottom() / tile_size).floor() as i32
}

pub fn encode(body: &PhysicsBody, world: &TileWorld, goal_x: f32, tile_size: f32) -> PerceptionSnapshot {
    let fc = foot_col(body, tile_size);
    let fr = foot_row(body, tile_size);

    let mut near_grid = [[0u8; GRID_COLS]; GRID_ROWS];
    for (r, grid_row) in near_grid.iter_mut().enumerate() {
        for (c, cell) in grid_row.iter_mut().enumerate() {
            *cell = world.is_solid(fc + c as i32, fr - r as i32) as u8;
        }
    }

    PerceptionSnapshot {
        player: PlayerState {
            x: body.x,
            y: body.y,
            vx: body.vx,
            vy: body.vy,
            on_ground: body.on_ground,
        },
        near_grid,
        goal: GoalState { x: goal_x },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::body::PhysicsBody;
    use crate::domain::tile::{Tile, TileWorld};

    const TS: f32 = 32.0;

    fn checker_world() -> TileWorld {
        let mut w = TileWorld::empty(20, 20);
        for row in 0..20 {
            for col in 0..20 {
                if (row * 7 + col * 3) % 5 < 2 {
                    w.set(col, row, Tile::Solid);
                }
            }
        }
        w
    }

    #[test]
    fn grid_cells_match_solidity_queries() {
        let world = checker_world();
        let mut body = PhysicsBody::new(5.0 * TS + 4.0, 10.0 * TS - 44.0);
        body.on_ground = true;
        let snap = encode(&body, &world, 600.0, TS);

        let fc = foot_col(&body, TS);
        let fr = foot_row(&body, TS);
        for r in 0..GRID_ROWS {
            for c in 0..GRID_COLS {
                let expect = world.is_solid(fc + c as i32, fr - r as i32) as u8;
                assert_eq!(snap.near_grid[r][c], expect, "mismatch at r={r} c={c}");
            }
        }
        assert_eq!(
            snap.near_grid[0][0],
            world.is_solid(fc, fr) as u8
        );
    }

    #[test]
    fn foot_tile_of_flush_grounded_body() {
        // Bottom exactly on top of row 12 → foot row addresses row 12
        let body = PhysicsBody::new(100.0, 12.0 * TS - 44.0);
        assert_eq!(foot_row(&body, TS), 12);
        // Center at 112 → column 3
        assert_eq!(foot_col(&body, TS), 3);
    }

    #[test]
    fn rows_above_world_edge_read_solid() {
        let world = TileWorld::empty(20, 20);
        let mut body = PhysicsBody::new(100.0, 2.0 * TS - 44.0);
        body.on_ground = false;
        let snap = encode(&body, &world, 600.0, TS);
        // foot row 2; r=3,4 sample rows -1,-2 → out of bounds → solid
        assert_eq!(snap.near_grid[3][0], 1);
        assert_eq!(snap.near_grid[4][0], 1);
        assert_eq!(snap.near_grid[0][0], 0);
    }

    #[test]
    fn wire_format_shape() {
        let world = TileWorld::empty(4, 4);
        let mut body = PhysicsBody::new(10.0, 20.0);
        body.vx = 1.5;
        body.on_ground = true;
        let snap = encode(&body, &world, 3776.0, TS);

        let json = serde_json::to_value(&snap).unwrap();
        assert!(json["player"]["onGround"].as_bool().unwrap());
        assert_eq!(json["player"]["vx"].as_f64().unwrap(), 1.5);
        assert_eq!(json["nearGrid"].as_array().unwrap().len(), 5);
        assert_eq!(json["nearGrid"][0].as_array().unwrap().len(), 9);
        assert_eq!(json["goal"]["x"].as_f64().unwrap(), 3776.0);

        // Round-trips through the boundary
        let back: PerceptionSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.near_grid, snap.near_grid);
    }
}
