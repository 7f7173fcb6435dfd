//! Stalker World - Level data shared by the AI and its collaborators
//!
//! This crate holds everything the stalker reads but does not own.
//!
//! # Features
//!
//! - Occupancy grid with blocked, open and crouch-only cells
//! - Grid/world coordinate conversion
//! - Door registry with a one-shot open-request slot and swing animation
//! - Per-tick sound channel with configurable loudness per source
//! - Bresenham line-of-sight oracle blocked by walls and closed doors
//!
//! # Example
//!
//! ```ignore
//! use stalker_world::prelude::*;
//!
//! let grid = Grid::parse("#####\n#...#\n#####")?;
//! let space = CellSpace::for_grid(&grid, 2.0);
//! let doors = DoorRegistry::new();
//!
//! let seen = visible(&grid, &doors, &space, GridPos::new(1, 1), GridPos::new(3, 1));
//! ```

pub mod door;
pub mod error;
pub mod grid;
pub mod los;
pub mod sound;

pub mod prelude {
    pub use crate::door::{Door, DoorAnimConfig, DoorAxis, DoorId, DoorRegistry, ItemId};
    pub use crate::error::{Result, WorldError};
    pub use crate::grid::{Cell, CellSpace, Grid, GridPos, WorldPos};
    pub use crate::los::visible;
    pub use crate::sound::{SoundChannel, SoundEvent, SoundProfile, SoundSource};
}

pub use prelude::*;
