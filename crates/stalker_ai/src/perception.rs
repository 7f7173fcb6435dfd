//! Vision and hearing

use crate::config::StalkerConfig;
use crate::steering::{angle_diff, bearing};
use serde::{Deserialize, Serialize};
use stalker_world::{visible, CellSpace, DoorRegistry, Grid, SoundEvent, WorldPos};

/// What the player controller reports each tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player position on the floor plane
    pub position: WorldPos,
    /// Inside a hiding spot
    pub hiding: bool,
    /// Sprinting this tick
    pub sprinting: bool,
    /// Crouching this tick
    pub crouching: bool,
}

impl PlayerView {
    /// A standing, visible player
    pub fn new(position: WorldPos) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the hiding flag
    pub fn hiding(mut self, hiding: bool) -> Self {
        self.hiding = hiding;
        self
    }
}

/// Borrowed level data the stalker reads each tick
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub grid: &'a Grid,
    pub doors: &'a DoorRegistry,
    pub space: &'a CellSpace,
    pub config: &'a StalkerConfig,
}

/// Whether the stalker sees the player
///
/// Requires all of: player not hiding, distance within sight range,
/// bearing inside the vision cone, and grid line of sight.
pub fn sense_vision(view: &WorldView<'_>, position: WorldPos, heading: f32, player: &PlayerView) -> bool {
    if player.hiding {
        return false;
    }

    let distance = position.distance_to(&player.position);
    if distance > view.config.sight_range {
        return false;
    }

    let to_player = bearing(position, player.position);
    if angle_diff(to_player, heading).abs() > view.config.sight_half_angle {
        return false;
    }

    has_line_of_sight(view, position, player.position)
}

/// Whether an engaged stalker keeps track of the player
///
/// Same as vision without the cone: range and line of sight only.
pub fn can_track(view: &WorldView<'_>, position: WorldPos, player: &PlayerView) -> bool {
    !player.hiding
        && position.distance_to(&player.position) <= view.config.sight_range
        && has_line_of_sight(view, position, player.position)
}

fn has_line_of_sight(view: &WorldView<'_>, from: WorldPos, to: WorldPos) -> bool {
    visible(
        view.grid,
        view.doors,
        view.space,
        view.space.world_to_grid(from),
        view.space.world_to_grid(to),
    )
}

/// Loudest event the listener is inside the radius of
///
/// Events farther away than their own loudness are ignored. Ties keep the
/// earliest emitted event.
pub fn sense_hearing(events: &[SoundEvent], listener: WorldPos) -> Option<SoundEvent> {
    events
        .iter()
        .filter(|event| event.audible_from(listener))
        .fold(None, |best: Option<&SoundEvent>, event| match best {
            Some(current) if current.loudness >= event.loudness => Some(current),
            _ => Some(event),
        })
        .copied()
}
