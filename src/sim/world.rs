/// WorldState: the complete snapshot of a running session.
///
/// The tile grid is immutable after construction; all mutable state lives
/// in the body and the session bookkeeping. All mutation happens on the
/// loop thread (see `agent::driver` for the decision-call model).
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate:
///   - `camera`: viewport into the world (top-left tile + size)
///   - Renderer maps: `screen(sx, sy) = world(camera.x + sx, camera.y + sy)`
///   - Camera follows the body with a dead-zone approach
///   - Maps smaller than the viewport are centered

use crate::config::PhysicsConfig;
use crate::domain::body::PhysicsBody;
use crate::domain::policy::Action;
use crate::domain::tile::TileWorld;
use crate::sim::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlMode {
    /// Keyboard drives the intent directly.
    Manual,
    /// The decision policy drives the intent; keyboard handles meta keys.
    Policy,
}

/// Camera: a viewport into the world, in tile units.
///
/// `(x, y)` is the world tile of the top-left visible cell.
/// `(view_w, view_h)` are set from the terminal size during `render()`.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World column of the top-left visible cell (negative when centering)
    pub x: i32,
    /// World row of the top-left visible cell
    pub y: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0, y: 0, view_w: 0, view_h: 0 }
    }

    /// Follow a target tile within the world bounds. Dead-zone approach:
    /// only scroll when the target nears the viewport edge.
    pub fn follow(&mut self, target_x: i32, target_y: i32, world_w: usize, world_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }

        if world_w <= self.view_w {
            self.x = -((self.view_w as i32 - world_w as i32) / 2);
        } else {
            let margin_x = (self.view_w as i32) / 5;
            let left_bound = self.x + margin_x;
            let right_bound = self.x + self.view_w as i32 - margin_x - 1;

            if target_x < left_bound {
                self.x = target_x - margin_x;
            } else if target_x > right_bound {
                self.x = target_x - self.view_w as i32 + margin_x + 1;
            }
            self.x = self.x.max(0).min((world_w as i32 - self.view_w as i32).max(0));
        }

        if world_h <= self.view_h {
            self.y = -((self.view_h as i32 - world_h as i32) / 2);
        } else {
            let margin_y = (self.view_h as i32) / 5;
            let top_bound = self.y + margin_y;
            let bottom_bound = self.y + self.view_h as i32 - margin_y - 1;

            if target_y < top_bound {
                self.y = target_y - margin_y;
            } else if target_y > bottom_bound {
                self.y = target_y - self.view_h as i32 + margin_y + 1;
            }
            self.y = self.y.max(0).min((world_h as i32 - self.view_h as i32).max(0));
        }
    }

    /// Convert a world tile to a viewport cell, or None if off-screen.
    pub fn world_to_view(&self, wx: i32, wy: i32) -> Option<(usize, usize)> {
        let vx = wx - self.x;
        let vy = wy - self.y;
        if vx >= 0 && vx < self.view_w as i32 && vy >= 0 && vy < self.view_h as i32 {
            Some((vx as usize, vy as usize))
        } else {
            None
        }
    }
}

pub struct WorldState {
    // ── Static level ──
    pub world: TileWorld,
    pub spawn: (f32, f32),
    pub goal_x: f32,
    pub goal_top_y: f32,

    // ── The one entity ──
    pub body: PhysicsBody,

    // ── Physics tuning ──
    pub physics: PhysicsConfig,

    // ── Session tracking ──
    pub tick: u64,
    /// Goal crossings this session.
    pub runs: u32,
    pub mode: ControlMode,
    pub paused: bool,

    // ── HUD ──
    pub message: String,
    pub message_timer: u32,
    pub last_action: Option<Action>,
    pub backend: String,

    // ── Camera / Viewport ──
    pub camera: Camera,
}

impl WorldState {
    pub fn new(level: LevelDef, physics: PhysicsConfig) -> Self {
        let body = PhysicsBody::new(level.spawn.0, level.spawn.1);
        WorldState {
            world: level.world,
            spawn: level.spawn,
            goal_x: level.goal_x,
            goal_top_y: level.goal_top_y,
            body,
            physics,
            tick: 0,
            runs: 0,
            mode: ControlMode::Policy,
            paused: false,
            message: String::new(),
            message_timer: 0,
            last_action: None,
            backend: String::new(),
            camera: Camera::new(),
        }
    }

    /// Return the body to spawn state. Level geometry and session
    /// counters are untouched.
    pub fn reset_body(&mut self) {
        let (sx, sy) = self.spawn;
        self.body.reset(sx, sy);
    }

    /// Body center as a tile coordinate, for camera and HUD.
    pub fn body_tile(&self) -> (i32, i32) {
        let ts = self.physics.tile_size;
        (
            (self.body.center_x() / ts).floor() as i32,
            ((self.body.y + self.body.h / 2.0) / ts).floor() as i32,
        )
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
