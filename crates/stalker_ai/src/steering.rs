//! Movement resolution and heading control
//!
//! Headings are measured from +Z toward +X, so a heading of 0 faces +Z.

use crate::perception::WorldView;
use serde::{Deserialize, Serialize};
use stalker_world::{DoorId, WorldPos};
use std::f32::consts::{PI, TAU};

/// Bearing from one point to another
pub fn bearing(from: WorldPos, to: WorldPos) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Wrap an angle into `(-PI, PI]`
pub fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Signed shortest difference `a - b`, wrapped into `(-PI, PI]`
pub fn angle_diff(a: f32, b: f32) -> f32 {
    wrap_angle(a - b)
}

/// Turn toward a target heading by a fraction of the remaining error
///
/// Each call closes `min(1, rate * dt)` of the gap, never overshooting.
pub fn slew_heading(current: f32, target: f32, rate: f32, delta_time: f32) -> f32 {
    let diff = angle_diff(target, current);
    wrap_angle(current + diff * (rate * delta_time).min(1.0))
}

/// Position and heading of the stalker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: WorldPos,
    pub heading: f32,
}

impl Pose {
    pub fn new(position: WorldPos, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Turn to face a point without moving
    pub fn face(&mut self, target: WorldPos, rate: f32, delta_time: f32) {
        if self.position.distance_squared_to(&target) > f32::EPSILON {
            self.heading = slew_heading(self.heading, bearing(self.position, target), rate, delta_time);
        }
    }
}

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Already within the arrival threshold, nothing moved
    Arrived,
    /// Position committed
    Moved,
    /// Destination cell is a wall, outside the grid, or crouch-only
    Blocked,
    /// Held by a closed door, still inside the wait threshold
    WaitingAtDoor(DoorId),
    /// Held by a closed door past the wait threshold
    DoorBlocked(DoorId),
    /// Held by a locked door; waiting will not help
    LockedDoor(DoorId),
}

impl MoveOutcome {
    /// Whether the step changed position
    pub fn moved(self) -> bool {
        matches!(self, Self::Moved)
    }
}

/// Time spent held by the same door
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DoorWait {
    door: Option<DoorId>,
    elapsed: f32,
    requested: bool,
}

impl DoorWait {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current wait
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accumulate time held by `door`, returns true once past `threshold`
    ///
    /// Being held by a different door restarts the wait.
    pub fn hold(&mut self, door: DoorId, delta_time: f32, threshold: f32) -> bool {
        if self.door != Some(door) {
            *self = Self {
                door: Some(door),
                ..Default::default()
            };
        }
        self.elapsed += delta_time;
        self.elapsed >= threshold
    }

    /// Door currently holding the stalker
    pub fn door(&self) -> Option<DoorId> {
        self.door
    }

    /// Time held so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether an open request was already filed for this wait
    pub fn requested(&self) -> bool {
        self.requested
    }

    /// Record that an open request was filed
    pub fn mark_requested(&mut self) {
        self.requested = true;
    }
}

/// Take one step toward `target`
///
/// The destination cell must be walkable for the stalker; crouch-only and
/// blocked cells reject the step regardless of doors. A closed, unlocked,
/// settled door whose panel covers the destination holds the stalker until
/// `door_wait_time` has passed, after which `DoorBlocked` is returned so
/// the caller can ask for it to be opened. Position only changes on
/// `Moved`; heading then slews toward the direction of travel.
pub fn resolve_move(
    view: &WorldView<'_>,
    pose: &mut Pose,
    wait: &mut DoorWait,
    target: WorldPos,
    speed: f32,
    delta_time: f32,
) -> MoveOutcome {
    let config = view.config;
    let distance = pose.position.distance_to(&target);
    if distance < config.arrival_threshold {
        wait.reset();
        return MoveOutcome::Arrived;
    }

    let step = (speed * delta_time).min(distance);
    let destination = WorldPos::new(
        pose.position.x + (target.x - pose.position.x) / distance * step,
        pose.position.z + (target.z - pose.position.z) / distance * step,
    );

    if !view.grid.is_walkable_for_stalker(view.space.world_to_grid(destination)) {
        wait.reset();
        return MoveOutcome::Blocked;
    }

    if let Some(door) = view.doors.obstruction_at(destination) {
        if door.locked {
            wait.reset();
            return MoveOutcome::LockedDoor(door.id);
        }
        debug_assert!(door.blocks_stalker());
        return if wait.hold(door.id, delta_time, config.door_wait_time) {
            MoveOutcome::DoorBlocked(door.id)
        } else {
            MoveOutcome::WaitingAtDoor(door.id)
        };
    }

    wait.reset();
    let direction = bearing(pose.position, destination);
    pose.position = destination;
    pose.heading = slew_heading(pose.heading, direction, config.turn_rate, delta_time);
    MoveOutcome::Moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StalkerConfig;
    use approx::assert_relative_eq;
    use stalker_world::{CellSpace, Door, DoorAxis, DoorRegistry, Grid, GridPos, ItemId};
    use std::f32::consts::FRAC_PI_2;

    struct Fixture {
        grid: Grid,
        doors: DoorRegistry,
        space: CellSpace,
        config: StalkerConfig,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let grid = Grid::parse(text).unwrap();
            let space = CellSpace::for_grid(&grid, 2.0);
            Self {
                grid,
                doors: DoorRegistry::new(),
                space,
                config: StalkerConfig::default(),
            }
        }

        fn view(&self) -> WorldView<'_> {
            WorldView {
                grid: &self.grid,
                doors: &self.doors,
                space: &self.space,
                config: &self.config,
            }
        }

        fn center(&self, x: i32, z: i32) -> WorldPos {
            self.space.grid_to_world(GridPos::new(x, z))
        }
    }

    const CORRIDOR: &str = "\
#######
#.....#
#######";

    #[test]
    fn test_angle_helpers() {
        assert_relative_eq!(bearing(WorldPos::new(0.0, 0.0), WorldPos::new(0.0, 1.0)), 0.0);
        assert_relative_eq!(bearing(WorldPos::new(0.0, 0.0), WorldPos::new(1.0, 0.0)), FRAC_PI_2);

        assert_relative_eq!(angle_diff(PI - 0.1, -PI + 0.1), -0.2, epsilon = 1e-5);
        assert_relative_eq!(angle_diff(-PI + 0.1, PI - 0.1), 0.2, epsilon = 1e-5);
        assert_relative_eq!(wrap_angle(2.5 * PI), FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_slew_heading_takes_short_way() {
        let heading = slew_heading(PI - 0.1, -PI + 0.1, 5.0, 0.1);
        // Half the 0.2 gap, crossing the wrap point
        assert_relative_eq!(heading.abs(), PI, epsilon = 1e-4);

        // Large rate * dt never overshoots
        assert_relative_eq!(slew_heading(0.0, 1.0, 100.0, 1.0), 1.0);
    }

    #[test]
    fn test_moves_toward_target() {
        let fixture = Fixture::new(CORRIDOR);
        let mut pose = Pose::new(fixture.center(1, 1), 0.0);
        let mut wait = DoorWait::new();
        let target = fixture.center(5, 1);

        let outcome = resolve_move(&fixture.view(), &mut pose, &mut wait, target, 2.0, 0.5);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_relative_eq!(pose.position.x, fixture.center(1, 1).x + 1.0);
        assert!(pose.heading > 0.0);
    }

    #[test]
    fn test_arrival_does_not_move() {
        let fixture = Fixture::new(CORRIDOR);
        let start = fixture.center(2, 1);
        let mut pose = Pose::new(start, 0.0);
        let mut wait = DoorWait::new();

        let target = WorldPos::new(start.x + 0.3, start.z);
        let outcome = resolve_move(&fixture.view(), &mut pose, &mut wait, target, 2.0, 0.1);
        assert_eq!(outcome, MoveOutcome::Arrived);
        assert_eq!(pose.position, start);
    }

    #[test]
    fn test_walls_and_vents_reject_step() {
        let fixture = Fixture::new(
            "\
#####
#.,.#
#####",
        );
        let start = fixture.center(1, 1);
        let mut pose = Pose::new(start, 0.0);
        let mut wait = DoorWait::new();

        // Step of 1.5 lands in the crouch-only cell
        let vent = resolve_move(&fixture.view(), &mut pose, &mut wait, fixture.center(3, 1), 3.0, 0.5);
        assert_eq!(vent, MoveOutcome::Blocked);
        assert_eq!(pose.position, start);

        let wall = resolve_move(&fixture.view(), &mut pose, &mut wait, fixture.center(1, 0), 3.0, 0.5);
        assert_eq!(wall, MoveOutcome::Blocked);
        assert_eq!(pose.position, start);
    }

    #[test]
    fn test_closed_door_waits_then_blocks() {
        let mut fixture = Fixture::new(CORRIDOR);
        let door_pos = fixture.center(3, 1);
        fixture
            .doors
            .add(Door::new(DoorId(4), "corridor", door_pos, DoorAxis::Z))
            .unwrap();

        // Standing just short of the panel
        let start = WorldPos::new(door_pos.x - 1.0, door_pos.z);
        let mut pose = Pose::new(start, FRAC_PI_2);
        let mut wait = DoorWait::new();
        let target = fixture.center(5, 1);

        let mut outcomes = Vec::new();
        for _ in 0..5 {
            outcomes.push(resolve_move(&fixture.view(), &mut pose, &mut wait, target, 2.0, 0.125));
        }
        assert_eq!(pose.position, start);
        assert_eq!(
            outcomes,
            vec![
                MoveOutcome::WaitingAtDoor(DoorId(4)),
                MoveOutcome::WaitingAtDoor(DoorId(4)),
                MoveOutcome::WaitingAtDoor(DoorId(4)),
                MoveOutcome::WaitingAtDoor(DoorId(4)),
                MoveOutcome::DoorBlocked(DoorId(4)),
            ]
        );
        assert_relative_eq!(wait.elapsed(), 0.625);

        // Once the door has finished opening the step goes through
        fixture.doors.open(DoorId(4)).unwrap();
        fixture.doors.update(10.0);
        let outcome = resolve_move(&fixture.view(), &mut pose, &mut wait, target, 2.0, 0.125);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(wait.door(), None);
    }

    #[test]
    fn test_locked_door_never_waits() {
        let mut fixture = Fixture::new(CORRIDOR);
        let door_pos = fixture.center(3, 1);
        fixture
            .doors
            .add(Door::new(DoorId(9), "cellar", door_pos, DoorAxis::Z).with_lock(ItemId::new("key")))
            .unwrap();

        let start = WorldPos::new(door_pos.x - 1.0, door_pos.z);
        let mut pose = Pose::new(start, FRAC_PI_2);
        let mut wait = DoorWait::new();

        for _ in 0..20 {
            let outcome = resolve_move(&fixture.view(), &mut pose, &mut wait, fixture.center(5, 1), 2.0, 0.125);
            assert_eq!(outcome, MoveOutcome::LockedDoor(DoorId(9)));
        }
        assert_eq!(pose.position, start);
        assert_eq!(wait.door(), None);
    }

    #[test]
    fn test_swinging_door_does_not_block() {
        let mut fixture = Fixture::new(CORRIDOR);
        let door_pos = fixture.center(3, 1);
        fixture
            .doors
            .add(Door::new(DoorId(2), "swing", door_pos, DoorAxis::Z))
            .unwrap();
        fixture.doors.open(DoorId(2)).unwrap();

        let mut pose = Pose::new(WorldPos::new(door_pos.x - 1.0, door_pos.z), FRAC_PI_2);
        let mut wait = DoorWait::new();
        let outcome = resolve_move(&fixture.view(), &mut pose, &mut wait, fixture.center(5, 1), 2.0, 0.125);
        assert_eq!(outcome, MoveOutcome::Moved);
    }

    #[test]
    fn test_door_wait_restarts_for_other_door() {
        let mut wait = DoorWait::new();
        assert!(!wait.hold(DoorId(1), 0.5, 0.6));
        wait.mark_requested();
        assert!(wait.hold(DoorId(1), 0.5, 0.6));
        assert!(wait.requested());

        assert!(!wait.hold(DoorId(2), 0.5, 0.6));
        assert!(!wait.requested());
        assert_eq!(wait.door(), Some(DoorId(2)));
    }
}
