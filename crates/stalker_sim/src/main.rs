//! Headless stalker demo
//!
//! Runs the abandoned school with a scripted player who collects the three
//! keys, hides once and heads for the cellar, logging every stalker state
//! change on the way.
//!
//! Run with: cargo run -p stalker_sim -- [config.toml]
//! Verbose:  RUST_LOG=debug cargo run -p stalker_sim

use stalker_ai::StalkerState;
use stalker_sim::prelude::*;
use std::collections::HashMap;

/// Distance at which a walk target counts as reached
const ARRIVAL: f32 = 0.2;
/// Give up on a walk target after this long
const WALK_TIMEOUT: f32 = 20.0;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = load_config();
    let mut sim = Simulation::new(config, demo_building()?)?;
    let delta_time = 1.0 / sim.config().sim.tick_rate;
    let duration = sim.config().sim.duration;

    let mut script = Script::new(demo_script());
    let mut stats = RunStats::default();

    while sim.time() < duration && sim.status() == SimStatus::Running {
        let input = script.next_input(&mut sim, delta_time)?;
        let report = sim.step(&input, delta_time);
        stats.record(&report);

        if let Some(change) = report.stalker.transition {
            let room = sim.level().room_at(sim.stalker().position()).unwrap_or("a passage");
            log::info!(
                "[{:>6.1}s] Stalker {:?} -> {:?} ({:?}) in {}",
                sim.time(),
                change.from,
                change.to,
                change.cause,
                room
            );
        }
    }

    stats.print_summary(&sim);
    Ok(())
}

/// Configuration from the first argument, defaults otherwise
fn load_config() -> SimConfig {
    match std::env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Could not use {} ({}), falling back to defaults", path, e);
                SimConfig::default()
            }
        },
        None => SimConfig::default(),
    }
}

/// One scripted player action
#[derive(Debug, Clone, Copy)]
enum Action {
    /// Walk in a straight line to a cell centre
    Walk { x: i32, z: i32, sprint: bool },
    Interact,
    Hide,
    Unhide,
    /// Stand still for a number of seconds
    Wait(f32),
}

fn walk(x: i32, z: i32) -> Action {
    Action::Walk { x, z, sprint: false }
}

fn sprint(x: i32, z: i32) -> Action {
    Action::Walk { x, z, sprint: true }
}

/// Keys from classroom A, the chapel and the kitchen, then the cellar
fn demo_script() -> Vec<Action> {
    vec![
        Action::Wait(2.0),
        walk(25, 14),
        walk(25, 10),
        walk(21, 10),
        Action::Interact,
        walk(15, 10),
        Action::Interact,
        walk(12, 10),
        Action::Hide,
        Action::Wait(8.0),
        Action::Unhide,
        walk(15, 10),
        walk(25, 10),
        sprint(25, 25),
        walk(25, 36),
        walk(25, 38),
        walk(20, 38),
        Action::Interact,
        walk(13, 38),
        walk(13, 40),
        Action::Interact,
        walk(13, 38),
        walk(25, 38),
        sprint(25, 25),
        walk(36, 25),
        walk(39, 25),
        walk(39, 26),
        Action::Interact,
        walk(39, 31),
        walk(40, 32),
        Action::Interact,
        walk(39, 31),
        walk(39, 25),
        sprint(36, 25),
        sprint(25, 25),
        walk(14, 25),
        walk(9, 25),
        walk(9, 26),
        Action::Interact,
        Action::Wait(5.0),
    ]
}

/// Plays the actions in order, one input per step
struct Script {
    actions: Vec<Action>,
    index: usize,
    elapsed: f32,
}

impl Script {
    fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            index: 0,
            elapsed: 0.0,
        }
    }

    fn advance(&mut self) {
        self.index += 1;
        self.elapsed = 0.0;
    }

    fn next_input(&mut self, sim: &mut Simulation, delta_time: f32) -> Result<PlayerInput> {
        while let Some(&action) = self.actions.get(self.index) {
            match action {
                Action::Walk { x, z, sprint } => {
                    let target = sim.level().at(x, z);
                    let position = sim.player().position();
                    if position.distance_to(&target) < ARRIVAL {
                        self.advance();
                        continue;
                    }
                    if self.elapsed > WALK_TIMEOUT {
                        log::warn!("Player could not reach ({}, {}), skipping", x, z);
                        self.advance();
                        continue;
                    }
                    self.elapsed += delta_time;
                    return Ok(PlayerInput::toward(position, target).sprinting(sprint));
                }
                Action::Interact => {
                    let interaction = sim.interact()?;
                    log::info!("[{:>6.1}s] Player interacts: {:?}", sim.time(), interaction);
                    self.advance();
                }
                Action::Hide => {
                    match sim.hide() {
                        Some(index) => {
                            let spot = &sim.level().hiding_spots[index];
                            log::info!("[{:>6.1}s] Player hides in the {}", sim.time(), spot.name);
                        }
                        None => log::warn!("No hiding spot within reach"),
                    }
                    self.advance();
                }
                Action::Unhide => {
                    if sim.unhide() {
                        log::info!("[{:>6.1}s] Player leaves the hiding spot", sim.time());
                    }
                    self.advance();
                }
                Action::Wait(seconds) => {
                    if self.elapsed >= seconds {
                        self.advance();
                        continue;
                    }
                    self.elapsed += delta_time;
                    return Ok(PlayerInput::idle());
                }
            }
        }
        Ok(PlayerInput::idle())
    }
}

#[derive(Default)]
struct RunStats {
    state: StalkerState,
    time_in_state: HashMap<StalkerState, f32>,
    transitions: usize,
    door_requests: usize,
    hits: usize,
}

impl RunStats {
    fn record(&mut self, report: &StepReport) {
        // Time is credited to the state the step ended in
        if let Some(change) = report.stalker.transition {
            self.state = change.to;
            self.transitions += 1;
        }
        *self.time_in_state.entry(self.state).or_default() += report.delta_time;

        if report.stalker.door_request.is_some() {
            self.door_requests += 1;
        }
        if matches!(report.hit, Some(HitOutcome::Damaged { .. } | HitOutcome::Killed)) {
            self.hits += 1;
        }
    }

    fn print_summary(&self, sim: &Simulation) {
        println!();
        println!("=== {} ===", sim.level().name);
        println!("Outcome:       {:?} after {:.1}s", sim.status(), sim.time());
        println!(
            "Player:        {}/{} health, {} keys",
            sim.player().health().current(),
            sim.player().health().max(),
            sim.player().inventory().len()
        );
        println!("Transitions:   {}", self.transitions);
        println!("Door requests: {}", self.door_requests);
        println!("Hits landed:   {}", self.hits);
        for state in [
            StalkerState::Patrol,
            StalkerState::Investigate,
            StalkerState::Search,
            StalkerState::Chase,
            StalkerState::Cooldown,
        ] {
            let seconds = self.time_in_state.get(&state).copied().unwrap_or(0.0);
            println!("  {:<12} {:>6.1}s", format!("{:?}", state), seconds);
        }
        println!();
    }
}
