//! Error types for the simulation

use stalker_ai::AiError;
use stalker_world::WorldError;
use thiserror::Error;

/// Simulation setup and configuration errors
#[derive(Debug, Error)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Level error: {0}")]
    World(#[from] WorldError),

    #[error("Stalker error: {0}")]
    Ai(#[from] AiError),

    /// Invalid configuration
    #[error("Invalid simulation configuration: {0}")]
    InvalidConfig(String),

    /// Level data that cannot be played
    #[error("Invalid level: {0}")]
    InvalidLevel(String),
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
