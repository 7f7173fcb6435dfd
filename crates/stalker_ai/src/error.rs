//! Error types for the stalker AI

use stalker_world::GridPos;
use thiserror::Error;

/// Stalker construction errors
///
/// Runtime behavior never fails; these only guard setup.
#[derive(Debug, Error)]
pub enum AiError {
    /// Invalid configuration
    #[error("Invalid stalker configuration: {0}")]
    InvalidConfig(String),

    /// Patrol route has no waypoints
    #[error("Patrol route is empty")]
    EmptyRoute,

    /// A waypoint lies on a cell the stalker cannot stand on
    #[error("Waypoint {index} at {cell:?} is not walkable")]
    UnwalkableWaypoint { index: usize, cell: GridPos },
}

/// Result type for AI setup
pub type Result<T> = std::result::Result<T, AiError>;
