//! Level data: occupancy, doors, patrol route, items and hiding spots

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use stalker_world::{Cell, CellSpace, Door, DoorAxis, DoorId, DoorRegistry, Grid, GridPos, ItemId, WorldPos};

/// Kind of a pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Goes into the inventory and can unlock doors
    Key,
    /// Read on pickup
    Note,
}

/// A pickup lying in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub position: WorldPos,
    pub collected: bool,
}

impl Item {
    pub fn new(id: &str, name: impl Into<String>, kind: ItemKind, position: WorldPos) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            kind,
            position,
            collected: false,
        }
    }
}

/// Place the player can hide in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HidingSpot {
    pub name: String,
    pub position: WorldPos,
}

impl HidingSpot {
    pub fn new(name: impl Into<String>, position: WorldPos) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Named rectangle of cells, used for location names in logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub x: i32,
    pub z: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.x && pos.x < self.x + self.width && pos.z >= self.z && pos.z < self.z + self.height
    }
}

/// Everything the level collaborator supplies to a simulation
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub grid: Grid,
    pub space: CellSpace,
    pub doors: DoorRegistry,
    /// Cyclic stalker patrol route
    pub route: Vec<WorldPos>,
    pub items: Vec<Item>,
    pub hiding_spots: Vec<HidingSpot>,
    pub rooms: Vec<Room>,
    pub player_start: WorldPos,
    /// Door whose opening ends the run
    pub exit: Option<DoorId>,
}

impl Level {
    /// Level with no doors, items or route; the player starts in the middle
    pub fn new(name: impl Into<String>, grid: Grid, cell_size: f32) -> Self {
        let space = CellSpace::for_grid(&grid, cell_size);
        let centre = GridPos::new(grid.width() as i32 / 2, grid.height() as i32 / 2);
        Self {
            name: name.into(),
            player_start: space.grid_to_world(centre),
            grid,
            space,
            doors: DoorRegistry::new(),
            route: Vec::new(),
            items: Vec::new(),
            hiding_spots: Vec::new(),
            rooms: Vec::new(),
            exit: None,
        }
    }

    /// Parse an ASCII level (`#` wall, `.` floor, `,` crouch-only)
    pub fn from_ascii(name: impl Into<String>, text: &str, cell_size: f32) -> Result<Self> {
        Ok(Self::new(name, Grid::parse(text)?, cell_size))
    }

    /// Centre of a cell
    pub fn at(&self, x: i32, z: i32) -> WorldPos {
        self.space.grid_to_world(GridPos::new(x, z))
    }

    pub fn with_route(mut self, cells: &[(i32, i32)]) -> Self {
        self.route = cells.iter().map(|&(x, z)| self.at(x, z)).collect();
        self
    }

    pub fn with_player_start(mut self, x: i32, z: i32) -> Self {
        self.player_start = self.at(x, z);
        self
    }

    /// Add a door centred on a cell
    pub fn with_door(mut self, door: Door) -> Result<Self> {
        self.doors.add(door)?;
        Ok(self)
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_hiding_spot(mut self, spot: HidingSpot) -> Self {
        self.hiding_spots.push(spot);
        self
    }

    pub fn with_exit(mut self, door: DoorId) -> Self {
        self.exit = Some(door);
        self
    }

    /// Name of the room containing a position
    pub fn room_at(&self, position: WorldPos) -> Option<&str> {
        let cell = self.space.world_to_grid(position);
        self.rooms.iter().find(|room| room.contains(cell)).map(|room| room.name.as_str())
    }

    /// Check that the level can be played
    ///
    /// The patrol route is checked by the stalker itself.
    pub fn validate(&self) -> Result<()> {
        self.doors.validate(&self.grid, &self.space)?;

        let passable = |position: WorldPos| self.grid.is_passable(self.space.world_to_grid(position));
        if !passable(self.player_start) {
            return Err(SimError::InvalidLevel("player start is inside a wall".into()));
        }
        if let Some(item) = self.items.iter().find(|item| !passable(item.position)) {
            return Err(SimError::InvalidLevel(format!("item {} is inside a wall", item.name)));
        }
        if let Some(spot) = self.hiding_spots.iter().find(|spot| !passable(spot.position)) {
            return Err(SimError::InvalidLevel(format!("hiding spot {} is inside a wall", spot.name)));
        }
        if let Some(exit) = self.exit {
            if self.doors.get(exit).is_none() {
                return Err(SimError::InvalidLevel(format!("exit {} is not a registered door", exit)));
            }
        }
        Ok(())
    }
}

const MAP_SIZE: usize = 50;
const CELL_SIZE: f32 = 2.0;

/// Rooms and corridors, as (name, x, z, width, height)
const ROOMS: &[(&str, i32, i32, i32, i32)] = &[
    ("Entry Hall", 20, 20, 10, 10),
    ("North Corridor", 23, 7, 4, 13),
    ("South Corridor", 23, 30, 4, 13),
    ("East Corridor", 30, 23, 13, 4),
    ("West Corridor", 7, 23, 13, 4),
    ("Classroom A", 11, 7, 8, 6),
    ("Classroom B", 31, 7, 8, 6),
    ("Library", 36, 15, 8, 7),
    ("Kitchen", 36, 28, 7, 7),
    ("Chapel", 9, 36, 9, 8),
    ("Dining Hall", 31, 36, 8, 7),
    ("Storage Room", 3, 16, 7, 6),
    ("Cellar", 3, 28, 7, 7),
];

/// Short passages joining rooms to corridors, as (x, z, width, height)
const CONNECTORS: &[(i32, i32, i32, i32)] = &[
    (19, 9, 4, 3),
    (27, 9, 4, 3),
    (38, 22, 3, 1),
    (38, 27, 3, 1),
    (18, 37, 5, 3),
    (27, 37, 4, 3),
    (8, 22, 2, 1),
    (8, 27, 2, 1),
];

/// Wall cells narrowing each connector to a single doorway
const DOOR_FRAMES: &[(i32, i32)] = &[
    (20, 9),
    (20, 11),
    (28, 9),
    (28, 11),
    (38, 22),
    (40, 22),
    (38, 27),
    (40, 27),
    (19, 37),
    (19, 39),
    (28, 37),
    (28, 39),
    (8, 22),
    (8, 27),
];

/// Crawl spaces only the player fits through
const VENTS: &[(i32, i32)] = &[(19, 12), (20, 12), (21, 12), (22, 12), (37, 35)];

const KEYS: [&str; 3] = ["red_key", "blue_key", "green_key"];

/// Patrol route through every wing, with corner points so each leg is a
/// straight walk along open cells
const ROUTE: &[(i32, i32)] = &[
    (13, 40),
    (13, 38),
    (25, 38),
    (25, 36),
    (25, 25),
    (25, 14),
    (25, 10),
    (35, 10),
    (25, 10),
    (25, 14),
    (25, 10),
    (15, 10),
    (25, 10),
    (25, 14),
    (25, 25),
    (36, 25),
    (39, 25),
    (39, 19),
    (40, 19),
    (39, 19),
    (39, 25),
    (39, 31),
    (39, 25),
    (36, 25),
    (25, 25),
    (14, 25),
    (9, 25),
    (9, 19),
    (6, 19),
    (9, 19),
    (9, 25),
    (14, 25),
    (25, 25),
    (25, 36),
    (25, 38),
    (35, 38),
    (35, 39),
    (35, 38),
    (25, 38),
    (13, 38),
];

/// The abandoned school: thirteen rooms around an entry hall, eight doors
/// and a cellar exit locked behind three keys
pub fn demo_building() -> Result<Level> {
    let mut rows = vec![vec![Cell::Blocked; MAP_SIZE]; MAP_SIZE];
    let mut fill = |x: i32, z: i32, cell: Cell| {
        if let Some(slot) = rows.get_mut(z as usize).and_then(|row| row.get_mut(x as usize)) {
            *slot = cell;
        }
    };

    let carved = ROOMS
        .iter()
        .map(|&(_, x, z, width, height)| (x, z, width, height))
        .chain(CONNECTORS.iter().copied());
    for (x0, z0, width, height) in carved {
        for z in z0..z0 + height {
            for x in x0..x0 + width {
                fill(x, z, Cell::Open);
            }
        }
    }
    for &(x, z) in DOOR_FRAMES {
        fill(x, z, Cell::Blocked);
    }
    for &(x, z) in VENTS {
        fill(x, z, Cell::CrouchOnly);
    }

    let mut level = Level::new("Abandoned School", Grid::from_rows(rows)?, CELL_SIZE)
        .with_route(ROUTE)
        .with_player_start(25, 25);

    level.rooms = ROOMS
        .iter()
        .map(|&(name, x, z, width, height)| Room {
            name: name.to_string(),
            x,
            z,
            width,
            height,
        })
        .collect();

    let doors = [
        (1, "Classroom A", 20, 10, DoorAxis::Z),
        (2, "Classroom B", 28, 10, DoorAxis::Z),
        (3, "Library", 39, 22, DoorAxis::X),
        (4, "Kitchen", 39, 27, DoorAxis::X),
        (5, "Chapel", 19, 38, DoorAxis::Z),
        (6, "Dining Hall", 28, 38, DoorAxis::Z),
        (7, "Storage Room", 9, 22, DoorAxis::X),
    ];
    for (id, name, x, z, axis) in doors {
        let door = Door::new(DoorId(id), name, level.at(x, z), axis);
        level = level.with_door(door)?;
    }

    let cellar = DoorId(8);
    let mut cellar_door = Door::new(cellar, "Cellar", level.at(9, 27), DoorAxis::X);
    for key in KEYS {
        cellar_door = cellar_door.with_lock(ItemId::new(key));
    }
    level = level.with_door(cellar_door)?.with_exit(cellar);

    let items = [
        ("red_key", "Red Key", ItemKind::Key, 15, 9),
        ("blue_key", "Blue Key", ItemKind::Key, 13, 40),
        ("green_key", "Green Key", ItemKind::Key, 40, 32),
        ("torn_note", "Torn Note", ItemKind::Note, 40, 18),
        ("diary_page", "Diary Page", ItemKind::Note, 35, 39),
    ];
    for (id, name, kind, x, z) in items {
        let item = Item::new(id, name, kind, level.at(x, z));
        level = level.with_item(item);
    }

    let spots = [
        ("Locker", 12, 11),
        ("Locker", 37, 11),
        ("Cabinet", 42, 19),
        ("Pantry", 41, 33),
        ("Confessional", 11, 41),
        ("Crate", 5, 19),
    ];
    for (name, x, z) in spots {
        let spot = HidingSpot::new(name, level.at(x, z));
        level = level.with_hiding_spot(spot);
    }

    level.validate()?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_building_layout() {
        let level = demo_building().unwrap();
        let grid = &level.grid;

        assert_eq!((grid.width(), grid.height()), (MAP_SIZE, MAP_SIZE));
        assert_eq!(level.doors.len(), 8);
        assert_eq!(level.route.len(), ROUTE.len());
        assert_eq!(level.room_at(level.player_start), Some("Entry Hall"));

        // Doorways are single cells between frame walls
        assert_eq!(grid.cell(GridPos::new(20, 10)), Cell::Open);
        assert_eq!(grid.cell(GridPos::new(20, 9)), Cell::Blocked);
        assert_eq!(grid.cell(GridPos::new(20, 11)), Cell::Blocked);
        assert_eq!(grid.cell(GridPos::new(21, 12)), Cell::CrouchOnly);
    }

    #[test]
    fn test_route_legs_stay_on_open_floor() {
        let level = demo_building().unwrap();
        for (index, from) in level.route.iter().enumerate() {
            let to = level.route[(index + 1) % level.route.len()];
            for step in 0..=200 {
                let t = step as f32 / 200.0;
                let probe = WorldPos::new(from.x + (to.x - from.x) * t, from.z + (to.z - from.z) * t);
                let cell = level.space.world_to_grid(probe);
                assert!(
                    level.grid.is_walkable_for_stalker(cell),
                    "leg {} crosses {:?}",
                    index,
                    cell
                );
            }
        }
    }

    #[test]
    fn test_cellar_needs_all_keys() {
        let mut level = demo_building().unwrap();
        let exit = level.exit.unwrap();
        let cellar = level.doors.get(exit).unwrap();
        assert!(cellar.locked);
        assert_eq!(cellar.required_items.len(), 3);

        let keys: Vec<ItemId> = level
            .items
            .iter()
            .filter(|item| item.kind == ItemKind::Key)
            .map(|item| item.id.clone())
            .collect();
        assert!(!level.doors.try_unlock(exit, &keys[..2]).unwrap());
        assert!(level.doors.try_unlock(exit, &keys).unwrap());
    }

    #[test]
    fn test_validate_rejects_misplaced_content() {
        let level = Level::from_ascii("box", "###\n#.#\n###", 2.0).unwrap();
        assert!(level.validate().is_ok());

        let bad = level.clone().with_player_start(0, 0);
        assert!(matches!(bad.validate(), Err(SimError::InvalidLevel(_))));

        let bad = level.clone().with_hiding_spot(HidingSpot::new("wall", WorldPos::new(-2.0, -2.0)));
        assert!(bad.validate().is_err());

        let bad = level.with_exit(DoorId(4));
        assert!(bad.validate().is_err());
    }
}
