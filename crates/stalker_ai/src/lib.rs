//! Stalker AI - Perception, Pathfinding and Behavior
//!
//! This crate drives the single adversary that hunts the player.
//!
//! # Features
//!
//! - Vision (range, cone and grid line of sight) and hearing
//! - Five-state behavior machine: patrol, investigate, search, chase, cooldown
//! - Reaction delay, memory and a fairness cap on pursuit
//! - Bounded grid A* used while chasing without line of sight
//! - Movement resolution against walls, crouch-only cells and doors
//! - Melee attack with a single hit window per swing
//!
//! # Example
//!
//! ```ignore
//! use stalker_ai::prelude::*;
//!
//! let mut stalker = Stalker::new(StalkerConfig::default(), waypoints, space)?;
//!
//! let mut ctx = TickContext {
//!     grid: &grid,
//!     doors: &mut doors,
//!     sounds: &sounds.drain(),
//!     player: PlayerView::new(player_pos),
//!     delta_time: 1.0 / 60.0,
//! };
//! let report = stalker.update(&mut ctx, &mut rng);
//! if stalker.take_attack_hit() {
//!     // apply damage
//! }
//! ```

pub mod attack;
pub mod config;
pub mod error;
pub mod navigation;
pub mod perception;
pub mod stalker;
pub mod state_machine;
pub mod steering;

pub mod prelude {
    pub use crate::attack::AttackState;
    pub use crate::config::StalkerConfig;
    pub use crate::error::{AiError, Result};
    pub use crate::navigation::{find_path, ChasePath};
    pub use crate::perception::{can_track, sense_hearing, sense_vision, PlayerView, WorldView};
    pub use crate::stalker::{Stalker, TickContext, TickReport};
    pub use crate::state_machine::{StalkerState, StateChange, StateEntry, Transition, TransitionCause};
    pub use crate::steering::{angle_diff, bearing, resolve_move, slew_heading, DoorWait, MoveOutcome, Pose};
}

pub use prelude::*;
