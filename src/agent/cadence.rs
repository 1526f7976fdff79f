/// ## Decision cadence
///
/// Tracks the currently-held action between decision replies and decides
/// when the next request goes out. The rules:
///
///   - A decided action is held for the hold window; when the window
///     runs out only the jump flag is dropped and the direction keeps
///     applying until the next adoption. The intent never lapses to idle
///     on its own.
///   - Requests go out on a fixed interval, and the interval is cut
///     short by a landing so the service sees every grounded phase.
///   - Grounded ticks are decided by the local heuristic directly
///     (see `policy_intent` in main): a jump can only fire while
///     grounded, and grounded phases are short enough that even one
///     tick of reply latency can spend the whole launch window. The
///     service reply steers the air phase.

use crate::domain::policy::Action;

pub struct PolicyCadence {
    held: Option<Action>,
    hold_left: u32,
    since_request: u32,
    interval_ticks: u32,
    hold_ticks: u32,
}

impl PolicyCadence {
    pub fn new(interval_ticks: u32, hold_ticks: u32) -> Self {
        PolicyCadence {
            held: None,
            hold_left: 0,
            since_request: u32::MAX / 2, // first request fires immediately
            interval_ticks: interval_ticks.max(1),
            hold_ticks: hold_ticks.max(1),
        }
    }

    /// Derive the tick counts from the configured millisecond timings.
    pub fn from_timings(tick_ms: u64, interval_ms: u64, hold_ms: u64) -> Self {
        let tick_ms = tick_ms.max(1);
        PolicyCadence::new(
            (interval_ms / tick_ms).max(1) as u32,
            (hold_ms / tick_ms).max(1) as u32,
        )
    }

    /// Adopt a decided action for a fresh hold window.
    pub fn adopt(&mut self, action: Action) {
        self.held = Some(action);
        self.hold_left = self.hold_ticks;
    }

    /// True until the first adoption (startup, or after `clear`).
    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    /// Forget everything, e.g. on a mode switch or a manual reset.
    pub fn clear(&mut self) {
        self.held = None;
        self.hold_left = 0;
        self.since_request = u32::MAX / 2;
    }

    /// Advance the request timer one tick. True when a request is due;
    /// the caller fires it if the driver slot is free and then calls
    /// `mark_requested`.
    pub fn request_due(&mut self) -> bool {
        self.since_request = self.since_request.saturating_add(1);
        self.since_request >= self.interval_ticks
    }

    pub fn mark_requested(&mut self) {
        self.since_request = 0;
    }

    /// A landing makes the next request due immediately, interval or not.
    pub fn note_landing(&mut self) {
        self.since_request = self.interval_ticks;
    }

    /// Action for this tick, advancing the hold window. After the window
    /// runs out the held action decays to its jump-less form and keeps
    /// applying until the next adoption.
    pub fn current(&mut self) -> Action {
        let held = match self.held {
            Some(action) => action,
            None => return Action::Idle,
        };
        if self.hold_left > 0 {
            self.hold_left -= 1;
            if self.hold_left == 0 {
                self.held = Some(held.without_jump());
            }
        }
        held
    }
}
