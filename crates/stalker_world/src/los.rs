//! Grid line of sight

use crate::door::DoorRegistry;
use crate::grid::{Cell, CellSpace, Grid, GridPos};

/// Whether `to` is visible from `from`
///
/// Walks the cells between the two endpoints with integer Bresenham
/// stepping. Any intermediate cell that is blocked (or outside the grid)
/// or holds a door that is not open stops the ray. Endpoints are never
/// tested.
pub fn visible(grid: &Grid, doors: &DoorRegistry, space: &CellSpace, from: GridPos, to: GridPos) -> bool {
    let dx = (to.x - from.x).abs();
    let dz = -(to.z - from.z).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sz = if from.z < to.z { 1 } else { -1 };
    let mut err = dx + dz;
    let mut cursor = from;

    loop {
        if cursor == to {
            return true;
        }

        let e2 = 2 * err;
        if e2 >= dz {
            err += dz;
            cursor.x += sx;
        }
        if e2 <= dx {
            err += dx;
            cursor.z += sz;
        }

        if cursor == to {
            return true;
        }
        if grid.cell(cursor) == Cell::Blocked || closed_door_at(doors, space, cursor) {
            return false;
        }
    }
}

fn closed_door_at(doors: &DoorRegistry, space: &CellSpace, pos: GridPos) -> bool {
    doors.iter().any(|d| !d.open && d.grid_pos(space) == pos)
}
