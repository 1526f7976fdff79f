/// Discrete actions, the local fallback heuristic, and the action mapper.
///
/// The action set is fixed to six tokens. Anything a decision service
/// returns outside this set (any casing accepted) resolves to the local
/// fallback, never to a crash or a stall.

use crate::domain::body::InputIntent;
use crate::domain::perception::PerceptionSnapshot;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Idle,
    Left,
    Right,
    Jump,
    LeftJump,
    RightJump,
}

impl Action {
    /// Parse one of the six tokens, case-insensitively. Anything else is None.
    pub fn parse(token: &str) -> Option<Action> {
        match token.trim().to_ascii_lowercase().as_str() {
            "idle" => Some(Action::Idle),
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "jump" => Some(Action::Jump),
            "left_jump" => Some(Action::LeftJump),
            "right_jump" => Some(Action::RightJump),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Left => "left",
            Action::Right => "right",
            Action::Jump => "jump",
            Action::LeftJump => "left_jump",
            Action::RightJump => "right_jump",
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Action::Jump | Action::LeftJump | Action::RightJump)
    }

    /// The same action with the jump flag dropped. What a held intent
    /// decays to when its hold window runs out.
    pub fn without_jump(self) -> Action {
        match self {
            Action::Jump => Action::Idle,
            Action::LeftJump => Action::Left,
            Action::RightJump => Action::Right,
            other => other,
        }
    }
}

/// Deterministic local fallback. Zero external dependency, callable
/// synchronously whenever the decision service is unavailable, slow, or
/// returns garbage.
///
/// Rightward-only by design: the reference level is strictly
/// left-to-right. Grid row 0 is the floor row, so `grid[0][0] == 0` means
/// no floor under the feet (a gap) and a solid cell at `grid[0][1..=2]`
/// means terrain at foot level ahead.
pub fn fallback(snapshot: &PerceptionSnapshot) -> Action {
    if !snapshot.player.on_ground {
        // Never jump while airborne; keep pushing right.
        return Action::Right;
    }
    let g = &snapshot.near_grid;
    let ahead_solid = g[0][1] == 1 || g[0][2] == 1;
    let gap_here = g[0][0] == 0;
    if ahead_solid || gap_here {
        Action::RightJump
    } else {
        Action::Right
    }
}

/// Convert an action into the intent applied on upcoming ticks.
///
/// The jump flag is only set if the body is grounded at mapping time.
/// The physics step performs its own edge-triggered grounded check; both
/// must pass for an impulse, so a jump decided while airborne is dropped
/// here rather than queued.
pub fn apply(action: Action, grounded: bool) -> InputIntent {
    let (left, right, jump) = match action {
        Action::Idle => (false, false, false),
        Action::Left => (true, false, false),
        Action::Right => (false, true, false),
        Action::Jump => (false, false, true),
        Action::LeftJump => (true, false, true),
        Action::RightJump => (false, true, true),
    };
    InputIntent {
        move_left: left,
        move_right: right,
        jump: jump && grounded,
    }
}
