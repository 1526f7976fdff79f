/// The player body and the per-tick input value.
///
/// There is no ambient key-state table: every simulation tick receives an
/// explicit `InputIntent`, and manual controls and the decision policy both
/// produce the same shape.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Input for one simulation tick.
/// Movement flags are level-triggered; jump is edge-detected inside the
/// physics step via `PhysicsBody::jump_was_down`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
}

impl InputIntent {
    /// Horizontal direction as -1 / 0 / +1.
    pub fn dir(&self) -> f32 {
        (self.move_right as i32 - self.move_left as i32) as f32
    }
}

/// Axis-aligned body: top-left position, fixed size, velocity.
///
/// Created once at level start, mutated every tick by the physics step,
/// reset to spawn values on goal-reach or explicit reset, never destroyed.
#[derive(Clone, Debug)]
pub struct PhysicsBody {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    /// True only during a tick in which a downward collision was detected.
    pub on_ground: bool,
    /// Jump input state at the end of the previous tick (rising-edge detect).
    pub jump_was_down: bool,
}

/// Body size in pixels. Narrower than a tile so the perpendicular span of
/// the collision passes covers at most two cells.
pub const BODY_W: f32 = 24.0;
pub const BODY_H: f32 = 44.0;

impl PhysicsBody {
    pub fn new(x: f32, y: f32) -> Self {
        PhysicsBody {
            x,
            y,
            w: BODY_W,
            h: BODY_H,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            on_ground: false,
            jump_was_down: false,
        }
    }

    /// Return the body to spawn state. Idempotent: calling twice in a row
    /// yields the same state as calling once.
    pub fn reset(&mut self, spawn_x: f32, spawn_y: f32) {
        self.x = spawn_x;
        self.y = spawn_y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.facing = Facing::Right;
        self.on_ground = false;
        self.jump_was_down = false;
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}
