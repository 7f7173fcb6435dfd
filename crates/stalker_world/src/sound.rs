//! Sound events and the per-tick sound channel

use crate::grid::WorldPos;
use serde::{Deserialize, Serialize};

/// What produced a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundSource {
    /// Walking footstep
    Footstep,
    /// Sprinting footstep
    SprintStep,
    /// Crouched footstep
    CrouchStep,
    /// Door swinging open
    DoorOpen,
    /// Door slammed shut
    DoorSlam,
    /// Rattling a locked door
    LockedRattle,
    /// Picking up an item
    Pickup,
}

/// A sound emitted during the current tick
///
/// Lives for exactly one tick; `loudness` is also the radius within which
/// it can be heard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub position: WorldPos,
    pub loudness: f32,
    pub source: SoundSource,
}

impl SoundEvent {
    /// Create a new sound event
    pub fn new(position: WorldPos, loudness: f32, source: SoundSource) -> Self {
        Self {
            position,
            loudness,
            source,
        }
    }

    /// Whether a listener at `listener` is inside this event's radius
    pub fn audible_from(&self, listener: WorldPos) -> bool {
        self.position.distance_squared_to(&listener) <= self.loudness * self.loudness
    }
}

/// Loudness per sound source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundProfile {
    pub footstep: f32,
    pub sprint_step: f32,
    pub crouch_step: f32,
    pub door_open: f32,
    pub door_slam: f32,
    pub locked_rattle: f32,
    pub pickup: f32,
}

impl Default for SoundProfile {
    fn default() -> Self {
        Self {
            footstep: 4.0,
            sprint_step: 8.0,
            crouch_step: 1.5,
            door_open: 6.0,
            door_slam: 12.0,
            locked_rattle: 6.0,
            pickup: 3.0,
        }
    }
}

impl SoundProfile {
    /// Loudness of a source
    pub fn loudness(&self, source: SoundSource) -> f32 {
        match source {
            SoundSource::Footstep => self.footstep,
            SoundSource::SprintStep => self.sprint_step,
            SoundSource::CrouchStep => self.crouch_step,
            SoundSource::DoorOpen => self.door_open,
            SoundSource::DoorSlam => self.door_slam,
            SoundSource::LockedRattle => self.locked_rattle,
            SoundSource::Pickup => self.pickup,
        }
    }

    /// Build an event for a source at a position
    pub fn event(&self, source: SoundSource, position: WorldPos) -> SoundEvent {
        SoundEvent::new(position, self.loudness(source), source)
    }
}

/// Bounded per-tick sound buffer
///
/// Any number of emitters append during a tick; the listener drains it
/// exactly once. Nothing carries over: whatever is not drained is cleared
/// at the end of the tick.
#[derive(Debug, Clone)]
pub struct SoundChannel {
    events: Vec<SoundEvent>,
    capacity: usize,
    dropped: usize,
}

impl SoundChannel {
    /// Default number of events kept per tick
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a channel with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a channel holding at most `capacity` events per tick
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append an event, returns false if the tick's buffer is full
    pub fn emit(&mut self, event: SoundEvent) -> bool {
        if self.events.len() >= self.capacity {
            self.dropped += 1;
            log::warn!(
                "Sound channel full ({} events), dropping {:?}",
                self.capacity,
                event.source
            );
            return false;
        }
        self.events.push(event);
        true
    }

    /// Append an event using a loudness profile
    pub fn emit_from(&mut self, profile: &SoundProfile, source: SoundSource, position: WorldPos) -> bool {
        self.emit(profile.event(source, position))
    }

    /// Take every event of this tick, leaving the channel empty
    pub fn drain(&mut self) -> Vec<SoundEvent> {
        self.dropped = 0;
        std::mem::take(&mut self.events)
    }

    /// Discard undrained events
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    /// Events waiting for the listener
    pub fn pending(&self) -> &[SoundEvent] {
        &self.events
    }

    /// Events dropped this tick because the buffer was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for SoundChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_channel() {
        let mut channel = SoundChannel::new();
        let profile = SoundProfile::default();

        channel.emit_from(&profile, SoundSource::Footstep, WorldPos::new(1.0, 1.0));
        channel.emit_from(&profile, SoundSource::DoorSlam, WorldPos::new(2.0, 2.0));
        assert_eq!(channel.len(), 2);

        let events = channel.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].source, SoundSource::Footstep);
        assert!(channel.is_empty());
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn test_capacity_drops_overflow() {
        let mut channel = SoundChannel::with_capacity(2);
        let event = SoundEvent::new(WorldPos::default(), 1.0, SoundSource::Pickup);

        assert!(channel.emit(event));
        assert!(channel.emit(event));
        assert!(!channel.emit(event));
        assert_eq!(channel.dropped(), 1);

        channel.clear();
        assert!(channel.is_empty());
        assert_eq!(channel.dropped(), 0);
        assert!(channel.emit(event));
    }

    #[test]
    fn test_louder_sources_travel_farther() {
        let profile = SoundProfile::default();
        assert!(profile.loudness(SoundSource::CrouchStep) < profile.loudness(SoundSource::Footstep));
        assert!(profile.loudness(SoundSource::Footstep) < profile.loudness(SoundSource::SprintStep));
        assert!(profile.loudness(SoundSource::SprintStep) < profile.loudness(SoundSource::DoorSlam));
    }

    #[test]
    fn test_audible_radius_is_inclusive() {
        let event = SoundEvent::new(WorldPos::new(0.0, 0.0), 5.0, SoundSource::Footstep);
        assert!(event.audible_from(WorldPos::new(3.0, 4.0)));
        assert!(!event.audible_from(WorldPos::new(3.0, 4.1)));
    }
}
