//! The fixed-cadence simulation loop

use crate::config::SimConfig;
use crate::error::Result;
use crate::health::HitOutcome;
use crate::level::Level;
use crate::player::{Interaction, PlayerController, PlayerInput, Surroundings};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use stalker_ai::{Stalker, StalkerState, StateChange, StateEntry, TickContext, TickReport};
use stalker_world::{DoorId, SoundChannel, SoundEvent};

/// Whether the run is still going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimStatus {
    #[default]
    Running,
    PlayerDied,
    /// The exit door finished opening
    Escaped,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default)]
pub struct StepReport {
    /// Step length after clamping
    pub delta_time: f32,
    pub stalker: TickReport,
    /// Door opened on the stalker's request
    pub door_opened: Option<DoorId>,
    /// Sound events the stalker was handed
    pub sounds: usize,
    /// Damage resolution of an attack hit
    pub hit: Option<HitOutcome>,
    pub status: SimStatus,
}

/// One level, one player, one stalker
///
/// Owns the sound buffer and the seeded RNG. Each step runs the player,
/// the door collaborator, the stalker and damage resolution in that order.
pub struct Simulation {
    config: SimConfig,
    level: Level,
    sounds: SoundChannel,
    stalker: Stalker,
    player: PlayerController,
    rng: SmallRng,
    time: f32,
    status: SimStatus,
}

impl Simulation {
    pub fn new(config: SimConfig, mut level: Level) -> Result<Self> {
        config.validate()?;
        level.validate()?;
        level.doors.set_config(config.doors);

        let stalker = Stalker::new(config.stalker, level.route.clone(), level.space)?;
        stalker.check_route(&level.grid)?;
        let player = PlayerController::new(config.player, level.player_start);

        log::info!(
            "Simulation started: {} ({}x{} cells, {} doors, {} waypoints, seed {})",
            level.name,
            level.grid.width(),
            level.grid.height(),
            level.doors.len(),
            level.route.len(),
            config.sim.seed
        );

        Ok(Self {
            sounds: SoundChannel::with_capacity(config.sim.sound_capacity),
            rng: SmallRng::seed_from_u64(config.sim.seed),
            config,
            level,
            stalker,
            player,
            time: 0.0,
            status: SimStatus::Running,
        })
    }

    /// Advance by one step, clamped to the configured maximum
    pub fn step(&mut self, input: &PlayerInput, delta_time: f32) -> StepReport {
        if self.status != SimStatus::Running {
            return StepReport {
                status: self.status,
                ..Default::default()
            };
        }

        let delta_time = delta_time.clamp(0.0, self.config.sim.max_delta);
        self.time += delta_time;

        let surroundings = Surroundings {
            grid: &self.level.grid,
            space: &self.level.space,
            doors: &self.level.doors,
        };
        self.player
            .update(input, &surroundings, &mut self.sounds, &self.config.sound, delta_time);

        let door_opened = self.level.doors.service_requests();
        if let Some(id) = door_opened {
            log::debug!("Opening {} for the stalker", id);
        }
        self.level.doors.update(delta_time);

        let sounds = self.sounds.drain();
        let mut ctx = TickContext {
            grid: &self.level.grid,
            doors: &mut self.level.doors,
            sounds: &sounds,
            player: self.player.view(),
            delta_time,
        };
        let stalker = self.stalker.update(&mut ctx, &mut self.rng);

        let hit = if self.stalker.take_attack_hit() {
            self.resolve_hit()
        } else {
            None
        };
        self.update_status();

        StepReport {
            delta_time,
            stalker,
            door_opened,
            sounds: sounds.len(),
            hit,
            status: self.status,
        }
    }

    /// Damage only lands on a visible player still within reach
    fn resolve_hit(&mut self) -> Option<HitOutcome> {
        if self.player.is_hiding() || self.stalker.state() != StalkerState::Chase {
            return None;
        }
        let distance = self.stalker.position().distance_to(&self.player.position());
        if distance > self.stalker.config().strike_distance {
            log::debug!("Stalker swing missed ({:.2} away)", distance);
            return None;
        }

        let outcome = self.player.health_mut().apply_hit();
        match outcome {
            HitOutcome::Damaged { remaining } => {
                log::info!("Player hit at {:.1}s, {} health left", self.time, remaining)
            }
            HitOutcome::Killed => log::info!("Player killed at {:.1}s", self.time),
            HitOutcome::Ignored => log::debug!("Hit ignored during immunity"),
        }
        Some(outcome)
    }

    fn update_status(&mut self) {
        if self.status != SimStatus::Running {
            return;
        }
        if self.player.health().is_dead() {
            self.status = SimStatus::PlayerDied;
            log::info!("Player died after {:.1}s", self.time);
            return;
        }
        let escaped = self
            .level
            .exit
            .and_then(|exit| self.level.doors.get(exit))
            .is_some_and(|door| door.open && !door.animating);
        if escaped {
            self.status = SimStatus::Escaped;
            log::info!("Player escaped after {:.1}s", self.time);
        }
    }

    /// Use the nearest door or item
    pub fn interact(&mut self) -> Result<Interaction> {
        if self.status != SimStatus::Running {
            return Ok(Interaction::Nothing);
        }
        self.player
            .interact(&mut self.level.doors, &mut self.level.items, &mut self.sounds, &self.config.sound)
    }

    /// Hide in a nearby spot, returns its index
    pub fn hide(&mut self) -> Option<usize> {
        self.player.hide(&self.level.hiding_spots)
    }

    pub fn unhide(&mut self) -> bool {
        self.player.unhide()
    }

    /// Queue a sound for the next step, returns false if the buffer is full
    pub fn emit_sound(&mut self, event: SoundEvent) -> bool {
        self.sounds.emit(event)
    }

    /// Put the stalker into a state directly
    pub fn force_stalker(&mut self, entry: StateEntry) -> StateChange {
        self.stalker.force_transition(entry, &mut self.rng)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn stalker(&self) -> &Stalker {
        &self.stalker
    }

    pub fn stalker_mut(&mut self) -> &mut Stalker {
        &mut self.stalker
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    /// Simulated seconds since start
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }
}
