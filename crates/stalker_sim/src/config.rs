//! Simulation configuration
//!
//! Every section is optional in the TOML file; missing keys fall back to
//! the defaults below.
//!
//! ```toml
//! [sim]
//! seed = 42
//!
//! [stalker]
//! chase_speed = 5.0
//! cancel_reaction_on_lost_sight = false
//!
//! [sound]
//! sprint_step = 10.0
//! ```

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use stalker_ai::StalkerConfig;
use stalker_world::{DoorAnimConfig, SoundProfile};
use std::path::Path;

/// Loop cadence and seeding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Upper bound on a single step, guards against catch-up after a stall
    pub max_delta: f32,
    /// Steps per second used by the demo binary
    pub tick_rate: f32,
    /// Length of the demo run in seconds
    pub duration: f32,
    /// Seed for the stalker's random delays
    pub seed: u64,
    /// Sound events kept per tick
    pub sound_capacity: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            tick_rate: 60.0,
            duration: 120.0,
            seed: 0x5EED,
            sound_capacity: 64,
        }
    }
}

/// Player stand-in tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub crouch_speed: f32,
    /// Collision radius against walls
    pub radius: f32,
    /// Time between footsteps per gait
    pub walk_step_interval: f32,
    pub sprint_step_interval: f32,
    pub crouch_step_interval: f32,
    /// Reach for doors and items
    pub interact_distance: f32,
    /// Reach for hiding spots
    pub hide_distance: f32,
    pub max_health: u32,
    /// Time after a hit during which further hits are ignored
    pub hit_immunity: f32,
    pub max_stamina: f32,
    /// Stamina spent per second of sprinting
    pub stamina_drain: f32,
    /// Stamina recovered per second when not sprinting
    pub stamina_regen: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.5,
            sprint_speed: 7.5,
            crouch_speed: 2.2,
            radius: 0.35,
            walk_step_interval: 0.42,
            sprint_step_interval: 0.28,
            crouch_step_interval: 0.55,
            interact_distance: 3.0,
            hide_distance: 3.0,
            max_health: 3,
            hit_immunity: 1.0,
            max_stamina: 100.0,
            stamina_drain: 28.0,
            stamina_regen: 12.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub sim: LoopConfig,
    pub stalker: StalkerConfig,
    pub sound: SoundProfile,
    pub doors: DoorAnimConfig,
    pub player: PlayerConfig,
}

impl SimConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.stalker.validate()?;

        let positive = [
            ("sim.max_delta", self.sim.max_delta),
            ("sim.tick_rate", self.sim.tick_rate),
            ("doors.swing_speed", self.doors.swing_speed),
            ("player.walk_speed", self.player.walk_speed),
            ("player.sprint_speed", self.player.sprint_speed),
            ("player.crouch_speed", self.player.crouch_speed),
            ("player.walk_step_interval", self.player.walk_step_interval),
            ("player.sprint_step_interval", self.player.sprint_step_interval),
            ("player.crouch_step_interval", self.player.crouch_step_interval),
            ("player.max_stamina", self.player.max_stamina),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidConfig(format!("{} must be positive and finite, got {}", name, value)));
            }
        }

        let non_negative = [
            ("sim.duration", self.sim.duration),
            ("player.radius", self.player.radius),
            ("player.interact_distance", self.player.interact_distance),
            ("player.hide_distance", self.player.hide_distance),
            ("player.hit_immunity", self.player.hit_immunity),
            ("player.stamina_drain", self.player.stamina_drain),
            ("player.stamina_regen", self.player.stamina_regen),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!("{} must be finite and not negative, got {}", name, value)));
            }
        }

        // Doorways are a single two-unit cell wide
        if self.player.radius >= 1.0 {
            return Err(SimError::InvalidConfig(format!(
                "player.radius must be below 1.0, got {}",
                self.player.radius
            )));
        }
        if self.player.max_health == 0 {
            return Err(SimError::InvalidConfig("player.max_health must be at least 1".into()));
        }
        if self.sim.sound_capacity == 0 {
            return Err(SimError::InvalidConfig("sim.sound_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
