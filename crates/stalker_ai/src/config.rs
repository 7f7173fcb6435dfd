//! Stalker tuning parameters

use crate::error::{AiError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stalker configuration
///
/// Distances are world units, durations seconds, angles radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalkerConfig {
    /// Walking speed on the patrol route and while returning in cooldown
    pub patrol_speed: f32,
    /// Speed while walking to a heard sound
    pub investigate_speed: f32,
    /// Speed while walking to the last known player position
    pub search_speed: f32,
    /// Pursuit speed
    pub chase_speed: f32,

    /// Maximum distance at which the player can be seen
    pub sight_range: f32,
    /// Half of the vision cone, measured from the heading
    pub sight_half_angle: f32,

    /// Minimum reaction delay after first sighting
    pub reaction_delay_min: f32,
    /// Maximum reaction delay after first sighting
    pub reaction_delay_max: f32,
    /// Drop a pending reaction when sight is lost before it fires
    pub cancel_reaction_on_lost_sight: bool,

    /// How long a chase continues without seeing the player
    pub memory_duration: f32,
    /// Hard cap on a single chase
    pub max_chase_time: f32,
    /// Minimum search duration
    pub search_time_min: f32,
    /// Maximum search duration
    pub search_time_max: f32,
    /// Stimulus-blind return walk after a chase
    pub cooldown_duration: f32,
    /// Give up walking to a sound after this long
    pub investigate_timeout: f32,

    /// Distance below which a target counts as reached
    pub arrival_threshold: f32,
    /// Heading slew rate while moving (fraction of the error per second)
    pub turn_rate: f32,
    /// Heading slew rate while facing the player in strike range
    pub strike_turn_rate: f32,
    /// Rotation speed while scanning at the search point
    pub scan_rate: f32,

    /// Time blocked by a closed door before asking for it to open
    pub door_wait_time: f32,
    /// Interval between path recalculations during pursuit
    pub path_recalc_interval: f32,
    /// Node expansion cap for one A* search
    pub max_path_nodes: usize,

    /// Distance at which the stalker stops and attacks
    pub strike_distance: f32,
    /// Minimum time between attack starts
    pub attack_cooldown: f32,
    /// Length of the windup, thrust and recover animation
    pub attack_duration: f32,
    /// Start of the hit-eligible window as a fraction of the animation
    pub hit_window_start: f32,
    /// End of the hit-eligible window as a fraction of the animation
    pub hit_window_end: f32,
}

impl Default for StalkerConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 2.0,
            investigate_speed: 3.2,
            search_speed: 2.6,
            chase_speed: 5.8,
            sight_range: 14.0,
            sight_half_angle: 0.7,
            reaction_delay_min: 0.2,
            reaction_delay_max: 0.5,
            cancel_reaction_on_lost_sight: true,
            memory_duration: 4.0,
            max_chase_time: 20.0,
            search_time_min: 6.0,
            search_time_max: 10.0,
            cooldown_duration: 6.0,
            investigate_timeout: 10.0,
            arrival_threshold: 0.5,
            turn_rate: 8.0,
            strike_turn_rate: 10.0,
            scan_rate: 2.0,
            door_wait_time: 0.6,
            path_recalc_interval: 0.5,
            max_path_nodes: 2500,
            strike_distance: 2.0,
            attack_cooldown: 1.8,
            attack_duration: 0.5,
            hit_window_start: 0.4,
            hit_window_end: 0.6,
        }
    }
}

impl StalkerConfig {
    /// Check ranges and orderings
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("patrol_speed", self.patrol_speed),
            ("investigate_speed", self.investigate_speed),
            ("search_speed", self.search_speed),
            ("chase_speed", self.chase_speed),
            ("sight_range", self.sight_range),
            ("sight_half_angle", self.sight_half_angle),
            ("memory_duration", self.memory_duration),
            ("max_chase_time", self.max_chase_time),
            ("cooldown_duration", self.cooldown_duration),
            ("investigate_timeout", self.investigate_timeout),
            ("arrival_threshold", self.arrival_threshold),
            ("turn_rate", self.turn_rate),
            ("strike_turn_rate", self.strike_turn_rate),
            ("path_recalc_interval", self.path_recalc_interval),
            ("strike_distance", self.strike_distance),
            ("attack_duration", self.attack_duration),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AiError::InvalidConfig(format!("{} must be positive and finite, got {}", name, value)));
            }
        }

        let non_negative = [
            ("reaction_delay_min", self.reaction_delay_min),
            ("reaction_delay_max", self.reaction_delay_max),
            ("search_time_min", self.search_time_min),
            ("search_time_max", self.search_time_max),
            ("scan_rate", self.scan_rate),
            ("door_wait_time", self.door_wait_time),
            ("attack_cooldown", self.attack_cooldown),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AiError::InvalidConfig(format!("{} must be finite and not negative, got {}", name, value)));
            }
        }

        if self.reaction_delay_min > self.reaction_delay_max {
            return Err(AiError::InvalidConfig("reaction delay range is inverted".into()));
        }
        if self.search_time_min > self.search_time_max {
            return Err(AiError::InvalidConfig("search time range is inverted".into()));
        }
        if !(0.0..=1.0).contains(&self.hit_window_start)
            || !(0.0..=1.0).contains(&self.hit_window_end)
            || self.hit_window_start > self.hit_window_end
        {
            return Err(AiError::InvalidConfig("hit window must be an ordered range within [0, 1]".into()));
        }
        if self.max_path_nodes == 0 {
            return Err(AiError::InvalidConfig("max_path_nodes must be at least 1".into()));
        }
        Ok(())
    }

    /// Draw a reaction delay
    pub fn roll_reaction_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        roll(rng, self.reaction_delay_min, self.reaction_delay_max)
    }

    /// Draw a search duration
    pub fn roll_search_time<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        roll(rng, self.search_time_min, self.search_time_max)
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}
