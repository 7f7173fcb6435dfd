//! Stalker Sim - Headless game loop around the stalker AI
//!
//! Hosts the stalker in a level together with a scripted player stand-in.
//!
//! # Features
//!
//! - Fixed-cadence step with a clamped delta
//! - Player movement with footstep cadence, stamina, crouching and hiding
//! - Doors, keys and a locked exit
//! - Hit resolution with post-hit immunity
//! - TOML configuration covering every tunable
//! - The abandoned school demo level
//!
//! # Example
//!
//! ```ignore
//! use stalker_sim::prelude::*;
//!
//! let config = SimConfig::load("stalker-sim.toml")?;
//! let mut sim = Simulation::new(config, demo_building()?)?;
//!
//! let input = PlayerInput::toward(sim.player().position(), target);
//! let report = sim.step(&input, 1.0 / 60.0);
//! if let Some(change) = report.stalker.transition {
//!     println!("{:?} -> {:?}", change.from, change.to);
//! }
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod level;
pub mod player;
pub mod simulation;

pub mod prelude {
    pub use crate::config::{LoopConfig, PlayerConfig, SimConfig};
    pub use crate::error::{Result, SimError};
    pub use crate::health::{Health, HitOutcome};
    pub use crate::level::{demo_building, HidingSpot, Item, ItemKind, Level, Room};
    pub use crate::player::{Interaction, PlayerController, PlayerInput, Surroundings};
    pub use crate::simulation::{SimStatus, Simulation, StepReport};
}

pub use prelude::*;
