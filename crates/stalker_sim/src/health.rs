//! Player health and hit immunity

use serde::{Deserialize, Serialize};

/// What a stalker hit did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Hit ignored: still immune from the previous one, or already dead
    Ignored,
    /// One hit point lost
    Damaged { remaining: u32 },
    /// Last hit point lost
    Killed,
}

/// Hit-point counter with post-hit immunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
    /// Immunity granted by each hit
    immunity_on_hit: f32,
    #[serde(skip)]
    immunity_timer: f32,
}

impl Health {
    /// Create a health counter at full hit points
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            immunity_on_hit: 0.0,
            immunity_timer: 0.0,
        }
    }

    /// Set immunity time after a hit
    pub fn with_immunity(mut self, duration: f32) -> Self {
        self.immunity_on_hit = duration;
        self
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn is_immune(&self) -> bool {
        self.immunity_timer > 0.0
    }

    /// Count down immunity (call once per tick)
    pub fn update(&mut self, delta_time: f32) {
        if self.immunity_timer > 0.0 {
            self.immunity_timer = (self.immunity_timer - delta_time).max(0.0);
        }
    }

    /// Take one hit
    pub fn apply_hit(&mut self) -> HitOutcome {
        if self.is_dead() || self.is_immune() {
            return HitOutcome::Ignored;
        }

        self.current -= 1;
        self.immunity_timer = self.immunity_on_hit;
        if self.current == 0 {
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged { remaining: self.current }
        }
    }

    /// Back to full hit points without immunity
    pub fn restore(&mut self) {
        self.current = self.max;
        self.immunity_timer = 0.0;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(3).with_immunity(1.0)
    }
}
