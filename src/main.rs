/// Entry point and game loop.

mod agent;
mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use agent::cadence::PolicyCadence;
use agent::driver::{PolicyDriver, PollOutcome};
use agent::service::HeuristicService;
use config::GameConfig;
use domain::body::InputIntent;
use domain::perception;
use domain::policy;
use sim::event::GameEvent;
use sim::level::reference_level;
use sim::step;
use sim::world::{ControlMode, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let level = reference_level(config.physics.tile_size);
    let mut world = WorldState::new(level, config.physics.clone());

    let mut driver = PolicyDriver::spawn(
        Box::new(HeuristicService),
        Duration::from_millis(config.policy.timeout_ms),
    );
    world.backend = driver.status().backend.clone();
    if !driver.status().configured {
        world.set_message("no policy backend configured, using local heuristic", 180);
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &mut driver, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Runs completed: {}", world.runs);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    driver: &mut PolicyDriver,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut cadence = PolicyCadence::from_timings(
        config.speed.tick_rate_ms,
        config.policy.decision_interval_ms,
        config.policy.hold_ms,
    );

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        handle_meta(world, &mut cadence, &kb);

        if last_tick.elapsed() >= tick_rate {
            if !world.paused {
                let intent = match world.mode {
                    ControlMode::Manual => manual_intent(&kb),
                    ControlMode::Policy => policy_intent(world, driver, &mut cadence),
                };

                let events = step::step(world, intent, 1.0);
                if events.contains(&GameEvent::Landed) {
                    cadence.note_landing();
                }
                process_events(world, &events);
            }

            if world.message_timer > 0 {
                world.message_timer -= 1;
                if world.message_timer == 0 {
                    world.message.clear();
                }
            }

            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[
    KeyCode::Up,
    KeyCode::Char(' '),
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::F(1)];
const KEYS_MODE: &[KeyCode] = &[KeyCode::Tab];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

fn manual_intent(kb: &InputState) -> InputIntent {
    InputIntent {
        move_left: kb.any_held(KEYS_LEFT),
        move_right: kb.any_held(KEYS_RIGHT),
        jump: kb.any_held(KEYS_JUMP),
    }
}

/// One policy-mode tick: poll the in-flight decision, let the local
/// heuristic decide grounded ticks, maybe fire the next request, and
/// derive the intent from the held action.
fn policy_intent(
    world: &mut WorldState,
    driver: &mut PolicyDriver,
    cadence: &mut PolicyCadence,
) -> InputIntent {
    match driver.poll() {
        PollOutcome::Decided(action) => {
            cadence.adopt(action);
            world.last_action = Some(action);
        }
        PollOutcome::Failed(_) => {
            let snap = snapshot(world);
            let action = PolicyDriver::fallback(&snap);
            cadence.adopt(action);
            world.last_action = Some(action);
            world.set_message("policy failed, using fallback", 60);
        }
        PollOutcome::TimedOut => {
            let snap = snapshot(world);
            let action = PolicyDriver::fallback(&snap);
            cadence.adopt(action);
            world.last_action = Some(action);
            world.set_message("policy timeout, using fallback", 60);
        }
        PollOutcome::Pending | PollOutcome::Idle => {}
    }

    // Grounded ticks go to the local heuristic: a jump can only fire
    // while grounded, and a grounded phase near a ledge can be shorter
    // than one reply round-trip. The service reply steers the air phase.
    if world.body.on_ground || cadence.is_empty() {
        let action = PolicyDriver::fallback(&snapshot(world));
        cadence.adopt(action);
        world.last_action = Some(action);
    }

    if cadence.request_due() && !driver.in_flight() && driver.request(&snapshot(world)) {
        cadence.mark_requested();
    }

    policy::apply(cadence.current(), world.body.on_ground)
}

fn snapshot(world: &WorldState) -> perception::PerceptionSnapshot {
    perception::encode(
        &world.body,
        &world.world,
        world.goal_x,
        world.physics.tile_size,
    )
}

fn handle_meta(world: &mut WorldState, cadence: &mut PolicyCadence, kb: &InputState) {
    if kb.any_pressed(KEYS_MODE) {
        world.mode = match world.mode {
            ControlMode::Manual => ControlMode::Policy,
            ControlMode::Policy => ControlMode::Manual,
        };
        cadence.clear();
        let label = match world.mode {
            ControlMode::Manual => "manual control",
            ControlMode::Policy => "policy control",
        };
        world.set_message(label, 60);
    }
    if kb.any_pressed(KEYS_RESET) {
        world.reset_body();
        cadence.clear();
        world.set_message("reset to spawn", 60);
    }
    if kb.any_pressed(KEYS_PAUSE) {
        world.paused = !world.paused;
    }
}

fn process_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::GoalReached => {
                world.set_message("goal reached! back to spawn", 120);
            }
            GameEvent::Landed | GameEvent::Jumped | GameEvent::Bonked => {}
        }
    }
}
