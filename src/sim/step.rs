/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Physics (integration + collision) with the tick's InputIntent
///   2. Goal detection → reset to spawn
///
/// The goal is a scalar x: crossing it (center beyond goal minus one
/// tile, while below the flagpole top) restores the body to spawn state
/// exactly and counts one completed run.

use crate::domain::body::InputIntent;
use crate::domain::physics;
use crate::sim::event::GameEvent;
use crate::sim::world::WorldState;

pub fn step(ws: &mut WorldState, intent: InputIntent, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    ws.tick += 1;

    let ev = physics::step_body(&mut ws.body, &ws.world, intent, &ws.physics, dt);
    if ev.jumped {
        events.push(GameEvent::Jumped);
    }
    if ev.landed {
        events.push(GameEvent::Landed);
    }
    if ev.bonked {
        events.push(GameEvent::Bonked);
    }

    if goal_reached(ws) {
        ws.runs += 1;
        ws.reset_body();
        events.push(GameEvent::GoalReached);
    }

    events
}

fn goal_reached(ws: &WorldState) -> bool {
    ws.body.center_x() > ws.goal_x - ws.physics.tile_size && ws.body.bottom() > ws.goal_top_y
}
