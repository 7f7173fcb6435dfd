//! The stalker controller

use crate::attack::AttackState;
use crate::config::StalkerConfig;
use crate::error::{AiError, Result};
use crate::navigation::ChasePath;
use crate::perception::{can_track, sense_hearing, sense_vision, PlayerView, WorldView};
use crate::state_machine::{StalkerState, StateChange, StateEntry, Transition, TransitionCause};
use crate::steering::{resolve_move, wrap_angle, DoorWait, MoveOutcome, Pose};
use rand::Rng;
use stalker_world::{CellSpace, DoorId, DoorRegistry, Grid, GridPos, SoundEvent, WorldPos};

/// Everything the stalker reads from its collaborators for one tick
pub struct TickContext<'a> {
    /// Level occupancy
    pub grid: &'a Grid,
    /// Doors; only read and handed open requests
    pub doors: &'a mut DoorRegistry,
    /// Sound events drained for this tick
    pub sounds: &'a [SoundEvent],
    /// Player as reported by the player controller
    pub player: PlayerView,
    /// Tick length in seconds
    pub delta_time: f32,
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// State change, if any
    pub transition: Option<StateChange>,
    /// Movement step result, if the stalker tried to move
    pub outcome: Option<MoveOutcome>,
    /// Whether the position changed (drives footstep audio)
    pub moved: bool,
    /// Door an open request was filed for
    pub door_request: Option<DoorId>,
}

/// The single adversary
///
/// Owns its pose and every behavior timer. Collaborators read `position`,
/// `heading` and `state`; everything else is exposed read-only for tests
/// and debug overlays.
#[derive(Debug, Clone)]
pub struct Stalker {
    config: StalkerConfig,
    space: CellSpace,
    waypoints: Vec<WorldPos>,

    pose: Pose,
    state: StalkerState,
    state_timer: f32,

    reaction_timer: f32,
    reaction_target: Option<WorldPos>,
    memory_timer: f32,
    last_known_player_pos: Option<WorldPos>,
    search_timer: f32,
    chase_timer: f32,
    cooldown_timer: f32,
    patrol_index: usize,
    investigate_target: Option<WorldPos>,

    path: ChasePath,
    door_wait: DoorWait,
    attack: AttackState,
    last_move: Option<MoveOutcome>,
}

impl Stalker {
    /// Create a stalker standing on the first waypoint, in Patrol
    pub fn new(config: StalkerConfig, waypoints: Vec<WorldPos>, space: CellSpace) -> Result<Self> {
        config.validate()?;
        let start = *waypoints.first().ok_or(AiError::EmptyRoute)?;

        Ok(Self {
            config,
            space,
            waypoints,
            pose: Pose::new(start, 0.0),
            state: StalkerState::Patrol,
            state_timer: 0.0,
            reaction_timer: 0.0,
            reaction_target: None,
            memory_timer: 0.0,
            last_known_player_pos: None,
            search_timer: 0.0,
            chase_timer: 0.0,
            cooldown_timer: 0.0,
            patrol_index: 0,
            investigate_target: None,
            path: ChasePath::new(),
            door_wait: DoorWait::new(),
            attack: AttackState::new(),
            last_move: None,
        })
    }

    /// Check that every waypoint is a cell the stalker can stand on
    pub fn check_route(&self, grid: &Grid) -> Result<()> {
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            let cell = self.space.world_to_grid(*waypoint);
            if !grid.is_walkable_for_stalker(cell) {
                return Err(AiError::UnwalkableWaypoint { index, cell });
            }
        }
        Ok(())
    }

    /// Move the stalker without any behavior side effects
    pub fn place(&mut self, position: WorldPos, heading: f32) {
        self.pose = Pose::new(position, wrap_angle(heading));
        self.door_wait.reset();
        self.path.clear();
    }

    /// Enter a state directly, running its entry action
    pub fn force_transition<R: Rng + ?Sized>(&mut self, entry: StateEntry, rng: &mut R) -> StateChange {
        self.enter(entry, TransitionCause::Forced, rng)
    }

    /// Advance one tick
    ///
    /// Perception runs against the pose at the start of the tick, then the
    /// active state decides and moves. A door held past the wait threshold
    /// gets one open request per continuous hold.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &mut TickContext<'_>, rng: &mut R) -> TickReport {
        let delta_time = ctx.delta_time.max(0.0);
        let config = self.config;
        let space = self.space;

        self.state_timer += delta_time;
        self.attack.tick_cooldown(delta_time);
        self.last_move = None;

        let transition = {
            let view = WorldView {
                grid: ctx.grid,
                doors: &*ctx.doors,
                space: &space,
                config: &config,
            };
            let heard = if self.state.perceives() {
                sense_hearing(ctx.sounds, self.pose.position)
            } else {
                None
            };

            match self.state {
                StalkerState::Patrol => self.tick_patrol(&view, &ctx.player, heard, delta_time, rng),
                StalkerState::Investigate => self.tick_investigate(&view, &ctx.player, heard, delta_time, rng),
                StalkerState::Search => self.tick_search(&view, &ctx.player, heard, delta_time, rng),
                StalkerState::Chase => self.tick_chase(&view, &ctx.player, delta_time),
                StalkerState::Cooldown => self.tick_cooldown(&view, delta_time),
            }
        };

        let mut report = TickReport {
            outcome: self.last_move,
            moved: self.last_move.is_some_and(MoveOutcome::moved),
            ..Default::default()
        };

        if let Transition::To { entry, cause } = transition {
            report.transition = Some(self.enter(entry, cause, rng));
        }

        if let Some(MoveOutcome::DoorBlocked(door)) = self.last_move {
            if !self.door_wait.requested() && ctx.doors.request_open(door) {
                self.door_wait.mark_requested();
                report.door_request = Some(door);
            }
        }

        debug_assert!(self.memory_timer >= 0.0 && self.search_timer >= 0.0 && self.cooldown_timer >= 0.0);
        debug_assert!(self.state == StalkerState::Chase || !self.attack.is_attacking());
        debug_assert!(self.state.reacts() || self.reaction_target.is_none());
        report
    }

    fn enter<R: Rng + ?Sized>(&mut self, entry: StateEntry, cause: TransitionCause, rng: &mut R) -> StateChange {
        let from = self.state;
        let to = entry.state();

        self.state = to;
        self.state_timer = 0.0;
        self.path.clear();
        self.door_wait.reset();
        if from == StalkerState::Chase {
            self.attack.cancel();
        }
        if !to.reacts() {
            self.clear_reaction();
        }

        match entry {
            StateEntry::Patrol => {
                self.clear_reaction();
                self.chase_timer = 0.0;
                self.memory_timer = 0.0;
                self.search_timer = 0.0;
                self.cooldown_timer = 0.0;
                self.investigate_target = None;
                self.patrol_index = self.nearest_waypoint();
            }
            StateEntry::Investigate { target } => {
                self.investigate_target = Some(target);
            }
            StateEntry::Search { last_known } => {
                self.last_known_player_pos = Some(last_known);
                self.search_timer = self.config.roll_search_time(rng);
                self.memory_timer = 0.0;
                self.investigate_target = None;
            }
            StateEntry::Chase { last_known } => {
                self.last_known_player_pos = Some(last_known);
                self.chase_timer = 0.0;
                self.memory_timer = self.config.memory_duration;
                self.investigate_target = None;
            }
            StateEntry::Cooldown => {
                self.cooldown_timer = self.config.cooldown_duration;
                self.memory_timer = 0.0;
                self.search_timer = 0.0;
                self.investigate_target = None;
                self.patrol_index = self.nearest_waypoint();
            }
        }

        log::debug!("Stalker {} -> {} ({})", from, to, cause);
        StateChange { from, to, cause }
    }

    fn clear_reaction(&mut self) {
        self.reaction_timer = 0.0;
        self.reaction_target = None;
    }

    fn nearest_waypoint(&self) -> usize {
        let position = self.pose.position;
        self.waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared_to(&position)
                    .total_cmp(&b.distance_squared_to(&position))
            })
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// Reaction-delayed sighting shared by Patrol, Investigate and Search
    ///
    /// The first sighting arms the timer and captures the player position;
    /// Chase starts toward that captured position once the timer runs out.
    fn react<R: Rng + ?Sized>(
        &mut self,
        view: &WorldView<'_>,
        player: &PlayerView,
        delta_time: f32,
        rng: &mut R,
    ) -> Transition {
        let seen = sense_vision(view, self.pose.position, self.pose.heading, player);

        let Some(target) = self.reaction_target else {
            if seen {
                self.reaction_timer = self.config.roll_reaction_delay(rng);
                self.reaction_target = Some(player.position);
                log::debug!("Stalker spotted the player, reacting in {:.2}s", self.reaction_timer);
            }
            return Transition::Stay;
        };

        if !seen && self.config.cancel_reaction_on_lost_sight {
            log::debug!("Stalker lost sight before reacting");
            self.clear_reaction();
            return Transition::Stay;
        }

        self.reaction_timer -= delta_time;
        if self.reaction_timer <= 0.0 {
            Transition::to(StateEntry::Chase { last_known: target }, TransitionCause::ReactionElapsed)
        } else {
            Transition::Stay
        }
    }

    fn step_toward(&mut self, view: &WorldView<'_>, target: WorldPos, speed: f32, delta_time: f32) -> MoveOutcome {
        let outcome = resolve_move(view, &mut self.pose, &mut self.door_wait, target, speed, delta_time);
        log::trace!("Stalker move toward ({:.1}, {:.1}): {:?}", target.x, target.z, outcome);
        self.last_move = Some(outcome);
        outcome
    }

    fn tick_patrol<R: Rng + ?Sized>(
        &mut self,
        view: &WorldView<'_>,
        player: &PlayerView,
        heard: Option<SoundEvent>,
        delta_time: f32,
        rng: &mut R,
    ) -> Transition {
        let reaction = self.react(view, player, delta_time, rng);
        if !reaction.is_stay() {
            return reaction;
        }
        if let Some(sound) = heard {
            return Transition::to(StateEntry::Investigate { target: sound.position }, TransitionCause::Heard);
        }

        let waypoint = self.waypoints[self.patrol_index];
        if self.navigate(view, waypoint, self.config.patrol_speed, delta_time, false) == MoveOutcome::Arrived {
            self.patrol_index = (self.patrol_index + 1) % self.waypoints.len();
        }
        Transition::Stay
    }

    fn tick_investigate<R: Rng + ?Sized>(
        &mut self,
        view: &WorldView<'_>,
        player: &PlayerView,
        heard: Option<SoundEvent>,
        delta_time: f32,
        rng: &mut R,
    ) -> Transition {
        let reaction = self.react(view, player, delta_time, rng);
        if !reaction.is_stay() {
            return reaction;
        }
        if let Some(sound) = heard {
            self.investigate_target = Some(sound.position);
        }

        let Some(target) = self.investigate_target else {
            return Transition::to(StateEntry::Search { last_known: self.pose.position }, TransitionCause::ArrivedAtTarget);
        };
        if self.state_timer >= self.config.investigate_timeout {
            return Transition::to(StateEntry::Search { last_known: target }, TransitionCause::InvestigateTimeout);
        }

        if self.navigate(view, target, self.config.investigate_speed, delta_time, false) == MoveOutcome::Arrived {
            return Transition::to(StateEntry::Search { last_known: target }, TransitionCause::ArrivedAtTarget);
        }
        Transition::Stay
    }

    fn tick_search<R: Rng + ?Sized>(
        &mut self,
        view: &WorldView<'_>,
        player: &PlayerView,
        heard: Option<SoundEvent>,
        delta_time: f32,
        rng: &mut R,
    ) -> Transition {
        let reaction = self.react(view, player, delta_time, rng);
        if !reaction.is_stay() {
            return reaction;
        }
        if let Some(sound) = heard {
            self.last_known_player_pos = Some(sound.position);
            self.search_timer = self.config.roll_search_time(rng);
        }

        self.search_timer = (self.search_timer - delta_time).max(0.0);
        if self.search_timer <= 0.0 {
            return Transition::to(StateEntry::Cooldown, TransitionCause::SearchExpired);
        }

        let target = self.last_known_player_pos.unwrap_or(self.pose.position);
        match self.navigate(view, target, self.config.search_speed, delta_time, false) {
            MoveOutcome::Arrived | MoveOutcome::Blocked | MoveOutcome::LockedDoor(_) => {
                self.pose.heading = wrap_angle(self.pose.heading + self.config.scan_rate * delta_time);
            }
            _ => {}
        }
        Transition::Stay
    }

    fn tick_chase(&mut self, view: &WorldView<'_>, player: &PlayerView, delta_time: f32) -> Transition {
        self.chase_timer += delta_time;
        if self.chase_timer >= self.config.max_chase_time {
            return Transition::to(StateEntry::Cooldown, TransitionCause::ChaseCapReached);
        }

        let tracking = can_track(view, self.pose.position, player);
        if tracking {
            self.last_known_player_pos = Some(player.position);
            self.memory_timer = self.config.memory_duration;
        } else {
            self.memory_timer = (self.memory_timer - delta_time).max(0.0);
            if self.memory_timer <= 0.0 {
                let last_known = self.last_known_player_pos.unwrap_or(self.pose.position);
                return Transition::to(StateEntry::Search { last_known }, TransitionCause::MemoryExpired);
            }
        }

        if tracking && self.pose.position.distance_to(&player.position) <= self.config.strike_distance {
            self.path.clear();
            self.door_wait.reset();
            self.pose
                .face(player.position, self.config.strike_turn_rate, delta_time);
            if self.attack.start(&self.config) {
                log::debug!("Stalker attacks");
            }
        } else if tracking {
            self.navigate(view, player.position, self.config.chase_speed, delta_time, false);
        } else if let Some(last_known) = self.last_known_player_pos {
            self.navigate(view, last_known, self.config.chase_speed, delta_time, true);
        }

        if self.attack.update(delta_time, &self.config) {
            log::debug!("Stalker attack hit window reached");
        }
        Transition::Stay
    }

    /// Walk toward a goal, on an A* path when one is active
    ///
    /// With `plan_ahead` the path is recomputed every recalculation
    /// interval. Otherwise the stalker walks straight and only plans a
    /// detour once a straight step runs into a wall or vent. Without a path
    /// it steers directly at the goal.
    fn navigate(
        &mut self,
        view: &WorldView<'_>,
        goal: WorldPos,
        speed: f32,
        delta_time: f32,
        plan_ahead: bool,
    ) -> MoveOutcome {
        let goal_cell = view.space.world_to_grid(goal);
        if !plan_ahead && self.path.goal().is_some_and(|cell| cell != goal_cell) {
            self.path.clear();
        }

        let due = self.path.tick(delta_time);
        if plan_ahead && due {
            self.replan(view, goal_cell);
        }

        while let Some(cell) = self.path.current() {
            let center = view.space.grid_to_world(cell);
            if self.pose.position.distance_to(&center) < self.config.arrival_threshold {
                self.path.advance();
            } else {
                break;
            }
        }

        let target = match self.path.current() {
            Some(cell) => view.space.grid_to_world(cell),
            None => goal,
        };
        let outcome = self.step_toward(view, target, speed, delta_time);

        if !plan_ahead && due && outcome == MoveOutcome::Blocked {
            self.replan(view, goal_cell);
        }
        outcome
    }

    fn replan(&mut self, view: &WorldView<'_>, goal: GridPos) {
        let start = view.space.world_to_grid(self.pose.position);
        if !self.path.replan(
            view.grid,
            start,
            goal,
            self.config.max_path_nodes,
            self.config.path_recalc_interval,
        ) {
            log::trace!("No path from {:?} to {:?}, steering directly", start, goal);
        }
    }

    fn tick_cooldown(&mut self, view: &WorldView<'_>, delta_time: f32) -> Transition {
        self.cooldown_timer = (self.cooldown_timer - delta_time).max(0.0);
        if self.cooldown_timer <= 0.0 {
            return Transition::to(StateEntry::Patrol, TransitionCause::CooldownElapsed);
        }

        let waypoint = self.waypoints[self.patrol_index];
        self.navigate(view, waypoint, self.config.patrol_speed, delta_time, false);
        Transition::Stay
    }

    /// Read and clear the attack-hit signal
    pub fn take_attack_hit(&mut self) -> bool {
        self.attack.take_hit()
    }

    pub fn position(&self) -> WorldPos {
        self.pose.position
    }

    pub fn heading(&self) -> f32 {
        self.pose.heading
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn state(&self) -> StalkerState {
        self.state
    }

    pub fn config(&self) -> &StalkerConfig {
        &self.config
    }

    pub fn waypoints(&self) -> &[WorldPos] {
        &self.waypoints
    }

    /// Time spent in the current state
    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn reaction_timer(&self) -> f32 {
        self.reaction_timer
    }

    /// Player position captured when the reaction delay was armed
    pub fn reaction_target(&self) -> Option<WorldPos> {
        self.reaction_target
    }

    pub fn memory_timer(&self) -> f32 {
        self.memory_timer
    }

    pub fn last_known_player_pos(&self) -> Option<WorldPos> {
        self.last_known_player_pos
    }

    pub fn search_timer(&self) -> f32 {
        self.search_timer
    }

    pub fn chase_timer(&self) -> f32 {
        self.chase_timer
    }

    pub fn cooldown_timer(&self) -> f32 {
        self.cooldown_timer
    }

    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    pub fn investigate_target(&self) -> Option<WorldPos> {
        self.investigate_target
    }

    pub fn path(&self) -> &ChasePath {
        &self.path
    }

    pub fn door_wait(&self) -> &DoorWait {
        &self.door_wait
    }

    pub fn attack(&self) -> &AttackState {
        &self.attack
    }
}
