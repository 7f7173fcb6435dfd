//! Melee attack sub-state

use crate::config::StalkerConfig;
use serde::{Deserialize, Serialize};

/// Windup, thrust and recover animation with a single hit window
///
/// The hit window is a phase range of the animation. A hit is reported
/// the first tick the phase enters or jumps over the window, and never
/// again for the same swing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackState {
    attacking: bool,
    elapsed: f32,
    landed: bool,
    cooldown: f32,
    pending_hit: bool,
}

impl AttackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a swing is in progress
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Whether the current swing already reported its hit
    pub fn has_landed(&self) -> bool {
        self.landed
    }

    /// Time until the next swing may start
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Time into the current swing
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether a new swing may start
    pub fn can_start(&self) -> bool {
        !self.attacking && self.cooldown <= 0.0
    }

    /// Count down the cooldown
    pub fn tick_cooldown(&mut self, delta_time: f32) {
        self.cooldown = (self.cooldown - delta_time).max(0.0);
    }

    /// Begin a swing, returns false if one cannot start yet
    pub fn start(&mut self, config: &StalkerConfig) -> bool {
        if !self.can_start() {
            return false;
        }
        self.attacking = true;
        self.elapsed = 0.0;
        self.landed = false;
        self.cooldown = config.attack_cooldown;
        true
    }

    /// Advance the swing, returns true on the tick the hit lands
    pub fn update(&mut self, delta_time: f32, config: &StalkerConfig) -> bool {
        if !self.attacking {
            return false;
        }

        let previous = self.elapsed / config.attack_duration;
        self.elapsed += delta_time;
        let phase = self.elapsed / config.attack_duration;

        let hit = !self.landed && previous < config.hit_window_end && phase >= config.hit_window_start;
        if hit {
            self.landed = true;
            self.pending_hit = true;
        }

        if self.elapsed >= config.attack_duration {
            self.attacking = false;
        }
        hit
    }

    /// Abort the swing in progress
    pub fn cancel(&mut self) {
        self.attacking = false;
        self.elapsed = 0.0;
        self.landed = false;
    }

    /// Read and clear the hit signal
    pub fn take_hit(&mut self) -> bool {
        std::mem::take(&mut self.pending_hit)
    }
}
