//! Player stand-in: movement, footsteps, interaction and hiding

use crate::config::PlayerConfig;
use crate::error::Result;
use crate::health::Health;
use crate::level::{HidingSpot, Item, ItemKind};
use stalker_ai::PlayerView;
use stalker_world::{Cell, CellSpace, DoorId, DoorRegistry, Grid, ItemId, SoundChannel, SoundProfile, SoundSource, WorldPos};

/// Movement intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Desired direction in world space; normalised before use
    pub move_x: f32,
    pub move_z: f32,
    pub sprint: bool,
    pub crouch: bool,
}

impl PlayerInput {
    /// Stand still
    pub fn idle() -> Self {
        Self::default()
    }

    /// Walk from one point toward another
    pub fn toward(from: WorldPos, to: WorldPos) -> Self {
        Self {
            move_x: to.x - from.x,
            move_z: to.z - from.z,
            ..Default::default()
        }
    }

    pub fn sprinting(mut self, sprint: bool) -> Self {
        self.sprint = sprint;
        self
    }

    pub fn crouching(mut self, crouch: bool) -> Self {
        self.crouch = crouch;
        self
    }

    fn direction(&self) -> Option<(f32, f32)> {
        let length = (self.move_x * self.move_x + self.move_z * self.move_z).sqrt();
        if length > 1e-4 {
            Some((self.move_x / length, self.move_z / length))
        } else {
            None
        }
    }
}

/// Read-only level state the player collides with
pub struct Surroundings<'a> {
    pub grid: &'a Grid,
    pub space: &'a CellSpace,
    pub doors: &'a DoorRegistry,
}

/// Result of pressing the interact key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    OpenedDoor(DoorId),
    /// A locked door gave way to the carried items and opened
    Unlocked(DoorId),
    /// A locked door rattled
    Locked(DoorId),
    PickedUp(ItemId),
    Nothing,
}

#[derive(Debug, Clone, Copy)]
struct Hidden {
    spot: usize,
    previous: WorldPos,
}

/// The avatar the stalker hunts
///
/// Emits footsteps at a cadence that depends on gait, and interaction
/// sounds for doors and pickups. While hiding it cannot move and makes no
/// noise.
#[derive(Debug, Clone)]
pub struct PlayerController {
    config: PlayerConfig,
    position: WorldPos,
    crouching: bool,
    sprinting: bool,
    stamina: f32,
    step_timer: f32,
    hidden: Option<Hidden>,
    inventory: Vec<ItemId>,
    health: Health,
}

impl PlayerController {
    pub fn new(config: PlayerConfig, position: WorldPos) -> Self {
        Self {
            config,
            position,
            crouching: false,
            sprinting: false,
            stamina: config.max_stamina,
            step_timer: 0.0,
            hidden: None,
            inventory: Vec::new(),
            health: Health::new(config.max_health).with_immunity(config.hit_immunity),
        }
    }

    /// What the stalker gets to know about the player
    pub fn view(&self) -> PlayerView {
        PlayerView {
            position: self.position,
            hiding: self.is_hiding(),
            sprinting: self.sprinting,
            crouching: self.crouching,
        }
    }

    /// Move and emit footsteps for one tick
    pub fn update(
        &mut self,
        input: &PlayerInput,
        world: &Surroundings<'_>,
        sounds: &mut SoundChannel,
        profile: &SoundProfile,
        delta_time: f32,
    ) {
        self.health.update(delta_time);

        if self.is_hiding() {
            self.sprinting = false;
            self.step_timer = 0.0;
            self.regen_stamina(delta_time);
            return;
        }

        // Cannot stand up inside a crawl space
        self.crouching = input.crouch || self.in_crawl_space(world);
        let direction = input.direction();
        self.sprinting = input.sprint && !self.crouching && direction.is_some() && self.stamina > 0.0;

        if self.sprinting {
            self.stamina = (self.stamina - self.config.stamina_drain * delta_time).max(0.0);
        } else {
            self.regen_stamina(delta_time);
        }

        let Some((dir_x, dir_z)) = direction else {
            self.step_timer = 0.0;
            return;
        };

        let speed = if self.crouching {
            self.config.crouch_speed
        } else if self.sprinting {
            self.config.sprint_speed
        } else {
            self.config.walk_speed
        };
        let start = self.position;

        // Each axis separately so the player slides along walls
        let along_x = WorldPos::new(self.position.x + dir_x * speed * delta_time, self.position.z);
        if self.can_stand(along_x, world) {
            self.position = along_x;
        }
        let along_z = WorldPos::new(self.position.x, self.position.z + dir_z * speed * delta_time);
        if self.can_stand(along_z, world) {
            self.position = along_z;
        }

        if self.position == start {
            self.step_timer = 0.0;
            return;
        }

        self.step_timer -= delta_time;
        if self.step_timer <= 0.0 {
            let (source, interval) = if self.crouching {
                (SoundSource::CrouchStep, self.config.crouch_step_interval)
            } else if self.sprinting {
                (SoundSource::SprintStep, self.config.sprint_step_interval)
            } else {
                (SoundSource::Footstep, self.config.walk_step_interval)
            };
            sounds.emit_from(profile, source, self.position);
            self.step_timer = interval;
        }
    }

    fn regen_stamina(&mut self, delta_time: f32) {
        self.stamina = (self.stamina + self.config.stamina_regen * delta_time).min(self.config.max_stamina);
    }

    fn in_crawl_space(&self, world: &Surroundings<'_>) -> bool {
        world.grid.get(world.space.world_to_grid(self.position)) == Some(Cell::CrouchOnly)
    }

    /// Whether the player's footprint fits at a position
    fn can_stand(&self, at: WorldPos, world: &Surroundings<'_>) -> bool {
        let r = self.config.radius;
        for offset_x in [-r, 0.0, r] {
            for offset_z in [-r, 0.0, r] {
                let cell = world.space.world_to_grid(WorldPos::new(at.x + offset_x, at.z + offset_z));
                match world.grid.get(cell) {
                    Some(Cell::Open) => {}
                    Some(Cell::CrouchOnly) if self.crouching => {}
                    _ => return false,
                }
            }
        }
        world.doors.obstruction_at(at).is_none()
    }

    /// Use the nearest closed door, or failing that the nearest item
    pub fn interact(
        &mut self,
        doors: &mut DoorRegistry,
        items: &mut [Item],
        sounds: &mut SoundChannel,
        profile: &SoundProfile,
    ) -> Result<Interaction> {
        if self.is_hiding() {
            return Ok(Interaction::Nothing);
        }

        let reach = self.config.interact_distance;
        let door = doors
            .iter()
            .filter(|door| !door.open && door.position.distance_to(&self.position) < reach)
            .map(|door| (door.id, door.locked, door.position))
            .next();

        if let Some((id, locked, position)) = door {
            if locked && !doors.try_unlock(id, &self.inventory)? {
                log::debug!("{} is locked", id);
                sounds.emit_from(profile, SoundSource::LockedRattle, position);
                return Ok(Interaction::Locked(id));
            }
            self.open_door(doors, id, sounds, profile)?;
            return Ok(if locked {
                Interaction::Unlocked(id)
            } else {
                Interaction::OpenedDoor(id)
            });
        }

        let position = self.position;
        if let Some(item) = items
            .iter_mut()
            .find(|item| !item.collected && item.position.distance_to(&position) < reach)
        {
            let id = self.pick_up(item, sounds, profile);
            return Ok(Interaction::PickedUp(id));
        }

        Ok(Interaction::Nothing)
    }

    /// Open an unlocked door, returns false if it was locked or already open
    pub fn open_door(
        &mut self,
        doors: &mut DoorRegistry,
        id: DoorId,
        sounds: &mut SoundChannel,
        profile: &SoundProfile,
    ) -> Result<bool> {
        let opened = doors.open(id)?;
        if opened {
            if let Some(door) = doors.get(id) {
                sounds.emit_from(profile, SoundSource::DoorOpen, door.position);
            }
        }
        Ok(opened)
    }

    /// Collect an item; keys go into the inventory
    pub fn pick_up(&mut self, item: &mut Item, sounds: &mut SoundChannel, profile: &SoundProfile) -> ItemId {
        item.collected = true;
        if item.kind == ItemKind::Key && !self.inventory.contains(&item.id) {
            self.inventory.push(item.id.clone());
        }
        sounds.emit_from(profile, SoundSource::Pickup, self.position);
        log::info!("Picked up {}", item.name);
        item.id.clone()
    }

    /// Hide in the first spot within reach, returns its index
    pub fn hide(&mut self, spots: &[HidingSpot]) -> Option<usize> {
        if self.is_hiding() {
            return None;
        }
        let reach = self.config.hide_distance;
        let index = spots
            .iter()
            .position(|spot| spot.position.distance_to(&self.position) < reach)?;

        self.hidden = Some(Hidden {
            spot: index,
            previous: self.position,
        });
        self.position = spots[index].position;
        self.crouching = false;
        self.sprinting = false;
        log::debug!("Player hides in {}", spots[index].name);
        Some(index)
    }

    /// Leave the hiding spot, back to where the player stood before
    pub fn unhide(&mut self) -> bool {
        match self.hidden.take() {
            Some(hidden) => {
                self.position = hidden.previous;
                true
            }
            None => false,
        }
    }

    /// Move without collision, leaving any hiding spot
    pub fn set_position(&mut self, position: WorldPos) {
        self.hidden = None;
        self.position = position;
        self.step_timer = 0.0;
    }

    pub fn give(&mut self, item: ItemId) {
        if !self.inventory.contains(&item) {
            self.inventory.push(item);
        }
    }

    pub fn position(&self) -> WorldPos {
        self.position
    }

    pub fn is_hiding(&self) -> bool {
        self.hidden.is_some()
    }

    /// Index of the spot the player is hiding in
    pub fn hiding_spot(&self) -> Option<usize> {
        self.hidden.map(|hidden| hidden.spot)
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn inventory(&self) -> &[ItemId] {
        &self.inventory
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use stalker_world::{Door, DoorAxis, GridPos};

    const DT: f32 = 0.05;

    struct Room {
        grid: Grid,
        space: CellSpace,
        doors: DoorRegistry,
        sounds: SoundChannel,
        profile: SoundProfile,
    }

    impl Room {
        fn new(text: &str) -> Self {
            let grid = Grid::parse(text).unwrap();
            let space = CellSpace::for_grid(&grid, 2.0);
            Self {
                grid,
                space,
                doors: DoorRegistry::new(),
                sounds: SoundChannel::new(),
                profile: SoundProfile::default(),
            }
        }

        fn at(&self, x: i32, z: i32) -> WorldPos {
            self.space.grid_to_world(GridPos::new(x, z))
        }

        fn run(&mut self, player: &mut PlayerController, input: PlayerInput, ticks: usize) {
            for _ in 0..ticks {
                let world = Surroundings {
                    grid: &self.grid,
                    space: &self.space,
                    doors: &self.doors,
                };
                player.update(&input, &world, &mut self.sounds, &self.profile, DT);
            }
        }
    }

    const CORRIDOR: &str = "\
##########
#........#
##########";

    #[test]
    fn test_walk_emits_footsteps() {
        let mut room = Room::new(CORRIDOR);
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(1, 1));
        let east = PlayerInput::toward(room.at(1, 1), room.at(8, 1));

        // First step immediately, then every 0.42 s
        room.run(&mut player, east, 20);
        let steps = room.sounds.drain();
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|event| event.source == SoundSource::Footstep));
        assert_relative_eq!(player.position().x, room.at(1, 1).x + 4.5 * DT * 20.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sprint_is_louder_and_drains_stamina() {
        let mut room = Room::new(CORRIDOR);
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(1, 1));
        let east = PlayerInput::toward(room.at(1, 1), room.at(8, 1)).sprinting(true);

        room.run(&mut player, east, 4);
        assert!(player.is_sprinting());
        assert!(player.stamina() < 100.0);
        let steps = room.sounds.drain();
        assert_eq!(steps[0].source, SoundSource::SprintStep);
        assert!(steps[0].loudness > room.profile.footstep);
    }

    #[test]
    fn test_idle_is_silent() {
        let mut room = Room::new(CORRIDOR);
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(3, 1));
        room.run(&mut player, PlayerInput::idle(), 20);
        assert!(room.sounds.is_empty());
        assert_eq!(player.position(), room.at(3, 1));
    }

    #[test]
    fn test_walls_stop_movement() {
        let mut room = Room::new(CORRIDOR);
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(1, 1));
        let north = PlayerInput::toward(room.at(1, 1), room.at(1, 0));
        room.run(&mut player, north, 20);
        // Footprint stays clear of the wall row
        let limit = room.at(1, 1).z - 1.0 + 0.35;
        assert!(player.position().z >= limit - 1e-4);
        assert!(player.position().z < room.at(1, 1).z);
    }

    #[test]
    fn test_crawl_space_needs_crouch() {
        let mut room = Room::new(
            "\
#######
#..,..#
#######",
        );
        let start = room.at(1, 1);
        let east = PlayerInput::toward(start, room.at(5, 1));

        let mut player = PlayerController::new(PlayerConfig::default(), start);
        room.run(&mut player, east, 40);
        assert!(room.space.world_to_grid(player.position()).x <= 2);

        let mut player = PlayerController::new(PlayerConfig::default(), start);
        room.run(&mut player, east.crouching(true), 80);
        assert_eq!(room.space.world_to_grid(player.position()).x, 5);
        let steps = room.sounds.drain();
        assert!(steps.iter().any(|event| event.source == SoundSource::CrouchStep));
    }

    #[test]
    fn test_closed_door_blocks_until_opened() {
        let mut room = Room::new(CORRIDOR);
        let door_pos = room.at(5, 1);
        room.doors
            .add(Door::new(DoorId(1), "door", door_pos, DoorAxis::Z))
            .unwrap();
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(2, 1));
        let east = PlayerInput::toward(room.at(2, 1), room.at(8, 1));

        room.run(&mut player, east, 40);
        assert!(player.position().x < door_pos.x);

        let mut items = Vec::new();
        let outcome = player
            .interact(&mut room.doors, &mut items, &mut room.sounds, &room.profile)
            .unwrap();
        assert_eq!(outcome, Interaction::OpenedDoor(DoorId(1)));
        assert!(room.sounds.pending().iter().any(|e| e.source == SoundSource::DoorOpen));

        room.run(&mut player, east, 40);
        assert!(player.position().x > door_pos.x);
    }

    #[test]
    fn test_locked_door_and_keys() {
        let mut room = Room::new(CORRIDOR);
        room.doors
            .add(Door::new(DoorId(2), "exit", room.at(5, 1), DoorAxis::Z).with_lock(ItemId::new("key")))
            .unwrap();
        let mut items = vec![Item::new("key", "Key", ItemKind::Key, room.at(2, 1))];
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(4, 1));

        let outcome = player
            .interact(&mut room.doors, &mut items, &mut room.sounds, &room.profile)
            .unwrap();
        assert_eq!(outcome, Interaction::Locked(DoorId(2)));
        assert_eq!(room.sounds.drain()[0].source, SoundSource::LockedRattle);

        // Out of the door's reach, next to the key
        player.set_position(room.at(1, 1));
        let outcome = player
            .interact(&mut room.doors, &mut items, &mut room.sounds, &room.profile)
            .unwrap();
        assert_eq!(outcome, Interaction::PickedUp(ItemId::new("key")));
        assert!(items[0].collected);
        assert_eq!(player.inventory(), &[ItemId::new("key")]);

        player.set_position(room.at(4, 1));
        let outcome = player
            .interact(&mut room.doors, &mut items, &mut room.sounds, &room.profile)
            .unwrap();
        assert_eq!(outcome, Interaction::Unlocked(DoorId(2)));
        assert!(room.doors.get(DoorId(2)).unwrap().open);
    }

    #[test]
    fn test_hide_and_unhide() {
        let mut room = Room::new(CORRIDOR);
        let spots = vec![HidingSpot::new("Locker", room.at(7, 1))];
        let mut player = PlayerController::new(PlayerConfig::default(), room.at(2, 1));

        assert_eq!(player.hide(&spots), None);

        let before = room.at(6, 1);
        player.set_position(before);
        assert_eq!(player.hide(&spots), Some(0));
        assert!(player.view().hiding);
        assert_eq!(player.position(), spots[0].position);

        // No movement or noise while hidden
        let west = PlayerInput::toward(room.at(7, 1), room.at(1, 1)).sprinting(true);
        room.run(&mut player, west, 10);
        assert_eq!(player.position(), spots[0].position);
        assert!(room.sounds.is_empty());

        assert!(player.unhide());
        assert_eq!(player.position(), before);
        assert!(!player.unhide());
    }
}
