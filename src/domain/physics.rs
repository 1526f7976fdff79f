/// Physics step: integration plus axis-separated tile collision.
///
/// Per-tick contract, in order:
///   1. Horizontal integration: `vx += ax*dt`, clamp to ±max_speed_x,
///      then multiplicative friction every tick (ground and air alike,
///      a deliberate simplification rather than an air/ground distinction).
///   2. Gravity: `vy += gravity*dt`, unconditionally, before resolution.
///   3. Jump: impulse `vy = jump_vy` only on the rising edge of the jump
///      input while the body was grounded at the end of the PREVIOUS tick.
///      The one-tick lag is intentional: the same-tick `on_ground` is
///      recomputed by the vertical pass below, and using it here would let
///      that pass cancel the impulse it just allowed.
///   4. Collision resolution, horizontal axis fully first, then vertical
///      from the already-moved x. Two independent passes, never a single
///      diagonal move, which is what prevents tunneling and corner-catching.
///
/// Clamping: a downward hit lands flush (`bottom == tile_top`) so the
/// perception foot row addresses the supporting tile. The epsilon inset
/// lives in the horizontal clamp and in the perpendicular-span
/// computation, which keeps a flush-landed body from re-reporting the
/// floor as a wall.

use crate::config::PhysicsConfig;
use crate::domain::body::{Facing, InputIntent, PhysicsBody};
use crate::domain::tile::TileWorld;

/// Inset keeping resolved edges from re-triggering the same collision.
const EPS: f32 = 0.01;

/// What happened during one physics step. Consumed by the presentation
/// layer; the simulation itself only reads `body` state.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepEvents {
    pub jumped: bool,
    pub landed: bool,
    pub bonked: bool,
}

pub fn step_body(
    body: &mut PhysicsBody,
    world: &TileWorld,
    intent: InputIntent,
    cfg: &PhysicsConfig,
    dt: f32,
) -> StepEvents {
    let mut events = StepEvents::default();

    // 1. Horizontal integration
    let dir = intent.dir();
    body.vx += dir * cfg.accel_x * dt;
    body.vx = body.vx.clamp(-cfg.max_speed_x, cfg.max_speed_x);
    body.vx *= cfg.friction;
    if dir < 0.0 {
        body.facing = Facing::Left;
    } else if dir > 0.0 {
        body.facing = Facing::Right;
    }

    // 2. Gravity
    body.vy += cfg.gravity * dt;

    // 3. Jump on rising edge, gated by last tick's grounded state
    let jump_pressed = intent.jump && !body.jump_was_down;
    body.jump_was_down = intent.jump;
    let grounded_last = body.on_ground;
    body.on_ground = false;
    if jump_pressed && grounded_last {
        body.vy = cfg.jump_vy;
        events.jumped = true;
    }

    // 4. Axis-separated resolution
    move_horizontal(body, world, body.vx * dt, cfg.tile_size);
    let fell = body.vy > 0.0;
    move_vertical(body, world, body.vy * dt, cfg.tile_size, &mut events);
    events.landed = fell && body.on_ground && !grounded_last;

    events
}

/// Move along x by `dx`, stopping flush (epsilon-inset) against the first
/// solid tile at the leading edge. Only the target leading column is
/// tested, across the rows the body spans.
fn move_horizontal(body: &mut PhysicsBody, world: &TileWorld, dx: f32, ts: f32) {
    if dx == 0.0 {
        return;
    }
    let row_top = ((body.y + EPS) / ts).floor() as i32;
    let row_bot = ((body.y + body.h - EPS) / ts).floor() as i32;

    if dx > 0.0 {
        let lead = body.x + body.w + dx;
        let col = (lead / ts).floor() as i32;
        for row in row_top..=row_bot {
            if world.is_solid(col, row) {
                body.x = col as f32 * ts - body.w - EPS;
                body.vx = 0.0;
                return;
            }
        }
    } else {
        let lead = body.x + dx;
        let col = (lead / ts).floor() as i32;
        for row in row_top..=row_bot {
            if world.is_solid(col, row) {
                body.x = (col + 1) as f32 * ts + EPS;
                body.vx = 0.0;
                return;
            }
        }
    }
    body.x += dx;
}

/// Move along y by `dy`. A downward hit lands flush on the tile top and
/// sets `on_ground`; an upward hit stops just under the tile bottom.
fn move_vertical(
    body: &mut PhysicsBody,
    world: &TileWorld,
    dy: f32,
    ts: f32,
    events: &mut StepEvents,
) {
    if dy == 0.0 {
        return;
    }
    let col_left = ((body.x + EPS) / ts).floor() as i32;
    let col_right = ((body.x + body.w - EPS) / ts).floor() as i32;

    if dy > 0.0 {
        let lead = body.y + body.h + dy;
        let row = (lead / ts).floor() as i32;
        for col in col_left..=col_right {
            if world.is_solid(col, row) {
                body.y = row as f32 * ts - body.h;
                body.vy = 0.0;
                body.on_ground = true;
                return;
            }
        }
    } else {
        let lead = body.y + dy;
        let row = (lead / ts).floor() as i32;
        for col in col_left..=col_right {
            if world.is_solid(col, row) {
                body.y = (row + 1) as f32 * ts + EPS;
                body.vy = 0.0;
                events.bonked = true;
                return;
            }
        }
    }
    body.y += dy;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    fn world_from(rows: &[&str]) -> TileWorld {
        let h = rows.len();
        let w = rows[0].len();
        let mut world = TileWorld::empty(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    world.set(x, y, Tile::Solid);
                }
            }
        }
        world
    }

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    const IDLE: InputIntent = InputIntent { move_left: false, move_right: false, jump: false };
    const RIGHT: InputIntent = InputIntent { move_left: false, move_right: true, jump: false };
    const JUMP: InputIntent = InputIntent { move_left: false, move_right: false, jump: true };

    /// 10×10 tiles, floor on the bottom two rows.
    fn floor_world() -> TileWorld {
        world_from(&[
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "##########",
            "##########",
        ])
    }

    fn settle(body: &mut PhysicsBody, world: &TileWorld) {
        for _ in 0..200 {
            step_body(body, world, IDLE, &cfg(), 1.0);
        }
        assert!(body.on_ground);
    }

    #[test]
    fn free_fall_strictly_descends_until_floor() {
        let world = floor_world();
        let mut body = PhysicsBody::new(100.0, 32.0);
        let mut last_y = body.y;
        let mut landed_tick = None;
        for tick in 0..120 {
            step_body(&mut body, &world, IDLE, &cfg(), 1.0);
            if body.on_ground {
                landed_tick = Some(tick);
                break;
            }
            assert!(body.y > last_y, "free-falling y must strictly increase");
            last_y = body.y;
        }
        assert!(landed_tick.is_some(), "body never reached the floor");
        // Flush landing on top of row 8
        assert_eq!(body.bottom(), 8.0 * 32.0);
        assert_eq!(body.vy, 0.0);
    }

    #[test]
    fn grounded_stays_grounded_while_idle() {
        let world = floor_world();
        let mut body = PhysicsBody::new(100.0, 32.0);
        settle(&mut body, &world);
        for _ in 0..30 {
            step_body(&mut body, &world, IDLE, &cfg(), 1.0);
            assert!(body.on_ground);
            assert_eq!(body.bottom(), 8.0 * 32.0);
        }
    }

    #[test]
    fn jump_rising_edge_applies_impulse() {
        let world = floor_world();
        let mut body = PhysicsBody::new(100.0, 32.0);
        settle(&mut body, &world);

        let ev = step_body(&mut body, &world, JUMP, &cfg(), 1.0);
        assert!(ev.jumped);
        assert!(body.vy < 0.0);
        assert!(!body.on_ground);
    }

    #[test]
    fn held_jump_does_not_retrigger() {
        let world = floor_world();
        let mut body = PhysicsBody::new(100.0, 32.0);
        settle(&mut body, &world);

        assert!(step_body(&mut body, &world, JUMP, &cfg(), 1.0).jumped);
        // Hold the input through the whole arc and past landing
        let mut rejumped = false;
        for _ in 0..120 {
            rejumped |= step_body(&mut body, &world, JUMP, &cfg(), 1.0).jumped;
        }
        assert!(!rejumped, "held jump must not fire again without a release");
        assert!(body.on_ground);

        // Release, then press again: fires
        step_body(&mut body, &world, IDLE, &cfg(), 1.0);
        assert!(step_body(&mut body, &world, JUMP, &cfg(), 1.0).jumped);
    }

    #[test]
    fn midair_jump_press_applies_no_impulse() {
        let world = floor_world();
        let mut body = PhysicsBody::new(100.0, 32.0);
        // Airborne: on_ground false going into the tick
        assert!(!body.on_ground);
        let vy_before = body.vy;
        let ev = step_body(&mut body, &world, JUMP, &cfg(), 1.0);
        assert!(!ev.jumped);
        // Gravity applied, impulse not
        assert!(body.vy > vy_before);
    }

    #[test]
    fn jump_uses_previous_tick_grounded_state() {
        // Body walks off a ledge; the jump press on the first airborne tick
        // still succeeds (grounded at the end of the previous tick), but a
        // press after that must not.
        let world = world_from(&[
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "###       ",
            "###       ",
        ]);
        let mut body = PhysicsBody::new(8.0, 100.0);
        settle(&mut body, &world);

        // Walk right until the vertical pass stops reporting ground
        for _ in 0..200 {
            step_body(&mut body, &world, RIGHT, &cfg(), 1.0);
            if !body.on_ground {
                break;
            }
        }
        assert!(!body.on_ground);
        // One-tick lag already consumed; a press now is mid-air
        let ev = step_body(&mut body, &world, JUMP, &cfg(), 1.0);
        assert!(!ev.jumped);
    }

    #[test]
    fn horizontal_wall_stops_flush_and_zeroes_vx() {
        let world = world_from(&[
            "         #",
            "         #",
            "         #",
            "         #",
            "         #",
            "         #",
            "         #",
            "         #",
            "##########",
            "##########",
        ]);
        let mut body = PhysicsBody::new(32.0, 100.0);
        settle(&mut body, &world);

        for _ in 0..300 {
            step_body(&mut body, &world, RIGHT, &cfg(), 1.0);
        }
        let wall_x = 9.0 * 32.0;
        assert_eq!(body.vx, 0.0);
        let gap = wall_x - (body.x + body.w);
        assert!(gap >= 0.0 && gap <= 0.02, "leading edge {gap} px from wall");
    }

    #[test]
    fn speed_never_exceeds_clamp() {
        let world = floor_world();
        let mut body = PhysicsBody::new(32.0, 100.0);
        settle(&mut body, &world);
        let c = cfg();
        for _ in 0..200 {
            step_body(&mut body, &world, RIGHT, &c, 1.0);
            assert!(body.vx.abs() <= c.max_speed_x);
        }
        assert!(body.vx > 0.0);
    }

    #[test]
    fn ceiling_bonk_zeroes_vy() {
        let world = world_from(&[
            "##########",
            "          ",
            "          ",
            "##########",
        ]);
        let mut body = PhysicsBody::new(100.0, 50.0);
        settle(&mut body, &world);

        step_body(&mut body, &world, JUMP, &cfg(), 1.0);
        let mut bonked = false;
        for _ in 0..20 {
            let ev = step_body(&mut body, &world, JUMP, &cfg(), 1.0);
            if ev.bonked {
                bonked = true;
                break;
            }
        }
        assert!(bonked);
        assert!(body.y >= 32.0, "body must not enter the ceiling tile");
    }

    #[test]
    fn corner_contact_resolves_each_axis_independently() {
        // A step one tile high directly ahead: the horizontal pass stops at
        // the step face; the vertical pass then lands on the lower floor
        // unaffected by the wall column.
        let world = world_from(&[
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "          ",
            "     #####",
            "##########",
            "##########",
        ]);
        let mut body = PhysicsBody::new(32.0, 100.0);
        settle(&mut body, &world);
        assert_eq!(body.bottom(), 8.0 * 32.0);

        for _ in 0..100 {
            step_body(&mut body, &world, RIGHT, &cfg(), 1.0);
        }
        // Stopped at the step face, still grounded on the lower floor
        let face = 5.0 * 32.0;
        assert!(body.x + body.w <= face);
        assert!(face - (body.x + body.w) <= 0.02);
        assert!(body.on_ground);
        assert_eq!(body.bottom(), 8.0 * 32.0);
    }
}
