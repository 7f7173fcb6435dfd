//! Door registry and door animation

use crate::error::{Result, WorldError};
use crate::grid::{CellSpace, Grid, GridPos, WorldPos};
use serde::{Deserialize, Serialize};

/// Door identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorId(pub u32);

impl std::fmt::Display for DoorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "door#{}", self.0)
    }
}

/// Item identifier used to gate locked doors
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Axis the door panel spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorAxis {
    /// Panel runs along X (passage is along Z)
    X,
    /// Panel runs along Z (passage is along X)
    Z,
}

/// A single door
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    /// Human-readable name
    pub name: String,
    /// Centre of the door panel
    pub position: WorldPos,
    pub axis: DoorAxis,
    /// Logically open (set as soon as an opening swing starts)
    pub open: bool,
    pub locked: bool,
    /// Items that must all be held to unlock this door
    pub required_items: Vec<ItemId>,
    /// Current swing angle (radians)
    pub angle: f32,
    /// Angle the swing is heading to
    pub target_angle: f32,
    /// Whether the panel is mid-swing
    pub animating: bool,
    /// Half extent of the blocking rectangle along the panel
    pub half_width: f32,
    /// Half extent of the blocking rectangle across the panel
    pub half_thickness: f32,
}

impl Door {
    /// Create a closed, unlocked door
    pub fn new(id: DoorId, name: impl Into<String>, position: WorldPos, axis: DoorAxis) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            axis,
            open: false,
            locked: false,
            required_items: Vec::new(),
            angle: 0.0,
            target_angle: 0.0,
            animating: false,
            half_width: 0.9,
            half_thickness: 0.8,
        }
    }

    /// Lock the door behind an item
    ///
    /// Calling this more than once adds items; every one is then needed.
    pub fn with_lock(mut self, item: ItemId) -> Self {
        self.locked = true;
        self.required_items.push(item);
        self
    }

    /// Set the blocking rectangle
    pub fn with_extents(mut self, half_width: f32, half_thickness: f32) -> Self {
        self.half_width = half_width;
        self.half_thickness = half_thickness;
        self
    }

    /// Grid cell the door sits in
    pub fn grid_pos(&self, space: &CellSpace) -> GridPos {
        space.world_to_grid(self.position)
    }

    /// Whether the panel is a physical obstacle right now
    pub fn is_solid(&self) -> bool {
        !self.open && !self.animating
    }

    /// Whether the stalker should wait and then ask for this door to open
    pub fn blocks_stalker(&self) -> bool {
        !self.open && !self.locked && !self.animating
    }

    /// Rectangular proximity test against the panel
    pub fn obstructs(&self, point: WorldPos) -> bool {
        let dx = (point.x - self.position.x).abs();
        let dz = (point.z - self.position.z).abs();
        let (along, across) = match self.axis {
            DoorAxis::X => (dx, dz),
            DoorAxis::Z => (dz, dx),
        };
        along < self.half_width && across < self.half_thickness
    }
}

/// Door swing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorAnimConfig {
    /// Swing angle of a fully open door (radians)
    pub open_angle: f32,
    /// Swing speed (radians per second)
    pub swing_speed: f32,
}

impl Default for DoorAnimConfig {
    fn default() -> Self {
        Self {
            open_angle: std::f32::consts::FRAC_PI_2,
            swing_speed: 3.0,
        }
    }
}

/// All doors of a level plus the one-shot open-request slot
///
/// The AI only reads doors and files requests; opening, closing and
/// animation belong to the door collaborator (`service_requests`/`update`).
#[derive(Debug, Clone, Default)]
pub struct DoorRegistry {
    doors: Vec<Door>,
    request: Option<DoorId>,
    config: DoorAnimConfig,
}

impl DoorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with a swing configuration
    pub fn with_config(config: DoorAnimConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Swing configuration
    pub fn config(&self) -> &DoorAnimConfig {
        &self.config
    }

    /// Replace the swing configuration; swings in progress keep their target
    pub fn set_config(&mut self, config: DoorAnimConfig) {
        self.config = config;
    }

    /// Register a door
    pub fn add(&mut self, door: Door) -> Result<()> {
        if self.doors.iter().any(|d| d.id == door.id) {
            return Err(WorldError::DuplicateDoor(door.id.to_string()));
        }
        self.doors.push(door);
        Ok(())
    }

    /// Check that every door lies inside the grid
    pub fn validate(&self, grid: &Grid, space: &CellSpace) -> Result<()> {
        for door in &self.doors {
            if !grid.in_bounds(door.grid_pos(space)) {
                return Err(WorldError::DoorOutOfBounds(door.name.clone()));
            }
        }
        Ok(())
    }

    /// Number of doors
    pub fn len(&self) -> usize {
        self.doors.len()
    }

    /// Whether there are no doors
    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    /// Iterate all doors
    pub fn iter(&self) -> impl Iterator<Item = &Door> {
        self.doors.iter()
    }

    /// Get a door
    pub fn get(&self, id: DoorId) -> Option<&Door> {
        self.doors.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: DoorId) -> Result<&mut Door> {
        self.doors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| WorldError::DoorNotFound(id.to_string()))
    }

    /// Door whose panel sits in a grid cell
    pub fn door_at(&self, pos: GridPos, space: &CellSpace) -> Option<&Door> {
        self.doors.iter().find(|d| d.grid_pos(space) == pos)
    }

    /// Solid door whose blocking rectangle contains a point
    pub fn obstruction_at(&self, point: WorldPos) -> Option<&Door> {
        self.doors.iter().find(|d| d.is_solid() && d.obstructs(point))
    }

    /// File a request to open a door
    ///
    /// At most one request is pending; returns false when the slot is
    /// taken or the door is unknown.
    pub fn request_open(&mut self, id: DoorId) -> bool {
        if self.request.is_some() || self.get(id).is_none() {
            return false;
        }
        log::debug!("Open requested for {}", id);
        self.request = Some(id);
        true
    }

    /// Currently pending open request
    pub fn pending_request(&self) -> Option<DoorId> {
        self.request
    }

    /// Consume the pending open request
    pub fn take_request(&mut self) -> Option<DoorId> {
        self.request.take()
    }

    /// Honour the pending request, returns the door that started opening
    pub fn service_requests(&mut self) -> Option<DoorId> {
        let id = self.take_request()?;
        match self.open(id) {
            Ok(true) => Some(id),
            Ok(false) => {
                log::debug!("Ignoring open request for {} (locked or already open)", id);
                None
            }
            Err(e) => {
                log::warn!("Dropping open request: {}", e);
                None
            }
        }
    }

    /// Start opening a door, returns false if locked or already open
    pub fn open(&mut self, id: DoorId) -> Result<bool> {
        let open_angle = self.config.open_angle;
        let door = self.get_mut(id)?;
        if door.open || door.locked {
            return Ok(false);
        }
        door.open = true;
        door.target_angle = open_angle;
        door.animating = true;
        Ok(true)
    }

    /// Start closing a door, returns false if already closed
    pub fn close(&mut self, id: DoorId) -> Result<bool> {
        let door = self.get_mut(id)?;
        if !door.open {
            return Ok(false);
        }
        door.open = false;
        door.target_angle = 0.0;
        door.animating = true;
        Ok(true)
    }

    /// Unlock a door if the inventory holds all of its items
    ///
    /// A locked door without any required item never unlocks.
    pub fn try_unlock(&mut self, id: DoorId, inventory: &[ItemId]) -> Result<bool> {
        let door = self.get_mut(id)?;
        if !door.locked {
            return Ok(true);
        }
        let unlocked = !door.required_items.is_empty()
            && door.required_items.iter().all(|item| inventory.contains(item));
        if unlocked {
            door.locked = false;
            log::debug!("{} unlocked", id);
        }
        Ok(unlocked)
    }

    /// Advance door swings
    pub fn update(&mut self, delta_time: f32) {
        let step = self.config.swing_speed * delta_time;
        for door in self.doors.iter_mut().filter(|d| d.animating) {
            let remaining = door.target_angle - door.angle;
            if remaining.abs() <= step {
                door.angle = door.target_angle;
                door.animating = false;
                log::debug!(
                    "{} finished {}",
                    door.id,
                    if door.open { "opening" } else { "closing" }
                );
            } else {
                door.angle += step.copysign(remaining);
            }
        }
    }
}
