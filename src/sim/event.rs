/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD messages.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Jumped,
    Landed,
    Bonked,
    /// The body crossed the goal line; the world has already been reset.
    GoalReached,
}
