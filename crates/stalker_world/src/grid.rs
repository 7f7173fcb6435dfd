//! Occupancy grid and coordinate spaces

use crate::error::{Result, WorldError};
use serde::{Deserialize, Serialize};

/// Kind of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Solid wall
    Blocked,
    /// Walkable floor
    Open,
    /// Low passage, passable only while crouching
    CrouchOnly,
}

impl Cell {
    /// Parse a level glyph
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(Self::Blocked),
            '.' => Some(Self::Open),
            ',' => Some(Self::CrouchOnly),
            _ => None,
        }
    }

    /// Level glyph for this cell
    pub fn glyph(self) -> char {
        match self {
            Self::Blocked => '#',
            Self::Open => '.',
            Self::CrouchOnly => ',',
        }
    }
}

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    /// Create a new grid position
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance to another cell
    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// The four orthogonal neighbours
    pub fn neighbors4(self) -> [GridPos; 4] {
        [
            GridPos::new(self.x + 1, self.z),
            GridPos::new(self.x - 1, self.z),
            GridPos::new(self.x, self.z + 1),
            GridPos::new(self.x, self.z - 1),
        ]
    }
}

/// Continuous position on the floor plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub z: f32,
}

impl WorldPos {
    /// Create a new world position
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Distance to another point
    pub fn distance_to(&self, other: &WorldPos) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared distance (faster for comparisons)
    pub fn distance_squared_to(&self, other: &WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

/// Fixed-size, row-major occupancy table
///
/// Built once per level and read-only afterwards. Every accessor is
/// bounds-checked; coordinates outside the table behave as blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid filled with one cell kind
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    /// Create a grid from row-major cells
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).ok_or(WorldError::EmptyLevel)?;

        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(WorldError::RaggedRow {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Parse a grid from ASCII rows (`#` blocked, `.` open, `,` crouch-only)
    ///
    /// Blank lines and surrounding whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let z = rows.len();
            let row = line
                .chars()
                .enumerate()
                .map(|(x, glyph)| {
                    Cell::from_glyph(glyph).ok_or(WorldError::UnknownGlyph { glyph, x, z })
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    /// Grid width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a position lies inside the grid
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.z >= 0 && (pos.x as usize) < self.width && (pos.z as usize) < self.height
    }

    /// Cell at a position, `None` when out of bounds
    pub fn get(&self, pos: GridPos) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells.get(pos.z as usize * self.width + pos.x as usize).copied()
    }

    /// Cell at a position, out of bounds reads as blocked
    pub fn cell(&self, pos: GridPos) -> Cell {
        self.get(pos).unwrap_or(Cell::Blocked)
    }

    /// Whether the stalker may stand on this cell (open floor only)
    pub fn is_walkable_for_stalker(&self, pos: GridPos) -> bool {
        self.get(pos) == Some(Cell::Open)
    }

    /// Whether a crouching character may stand on this cell
    pub fn is_passable(&self, pos: GridPos) -> bool {
        matches!(self.get(pos), Some(Cell::Open | Cell::CrouchOnly))
    }

    /// Render back to ASCII rows
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|c| c.glyph()));
            out.push('\n');
        }
        out
    }
}

/// Mapping between grid cells and world coordinates
///
/// The grid is centred on the world origin: cell `(W/2, H/2)` has its
/// lower corner at `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSpace {
    /// Edge length of one cell in world units
    pub cell_size: f32,
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
}

impl CellSpace {
    /// Create a coordinate space
    pub fn new(cell_size: f32, width: usize, height: usize) -> Self {
        Self {
            cell_size,
            width,
            height,
        }
    }

    /// Coordinate space matching a grid's dimensions
    pub fn for_grid(grid: &Grid, cell_size: f32) -> Self {
        Self::new(cell_size, grid.width(), grid.height())
    }

    fn half_width(&self) -> f32 {
        self.width as f32 / 2.0
    }

    fn half_height(&self) -> f32 {
        self.height as f32 / 2.0
    }

    /// Centre of a cell in world space
    pub fn grid_to_world(&self, pos: GridPos) -> WorldPos {
        WorldPos::new(
            (pos.x as f32 - self.half_width()) * self.cell_size + self.cell_size / 2.0,
            (pos.z as f32 - self.half_height()) * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Cell containing a world position
    pub fn world_to_grid(&self, pos: WorldPos) -> GridPos {
        GridPos::new(
            (pos.x / self.cell_size + self.half_width()).floor() as i32,
            (pos.z / self.cell_size + self.half_height()).floor() as i32,
        )
    }
}

impl Default for CellSpace {
    fn default() -> Self {
        Self::new(2.0, 50, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_grid() {
        let grid = Grid::parse(
            "
            ####
            #.,#
            ####
            ",
        )
        .unwrap();

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(GridPos::new(1, 1)), Some(Cell::Open));
        assert_eq!(grid.get(GridPos::new(2, 1)), Some(Cell::CrouchOnly));
        assert_eq!(grid.get(GridPos::new(0, 0)), Some(Cell::Blocked));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Grid::parse(""), Err(WorldError::EmptyLevel)));
        assert!(matches!(
            Grid::parse("###\n##"),
            Err(WorldError::RaggedRow { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            Grid::parse("#x#"),
            Err(WorldError::UnknownGlyph { glyph: 'x', x: 1, z: 0 })
        ));
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let grid = Grid::filled(3, 3, Cell::Open);

        assert_eq!(grid.get(GridPos::new(-1, 0)), None);
        assert_eq!(grid.get(GridPos::new(3, 0)), None);
        assert_eq!(grid.get(GridPos::new(0, 3)), None);
        assert_eq!(grid.cell(GridPos::new(0, -7)), Cell::Blocked);
        assert!(!grid.is_walkable_for_stalker(GridPos::new(99, 99)));
        assert!(!grid.is_passable(GridPos::new(-1, -1)));
    }

    #[test]
    fn test_walkability() {
        let grid = Grid::parse("#.,").unwrap();

        assert!(!grid.is_walkable_for_stalker(GridPos::new(0, 0)));
        assert!(grid.is_walkable_for_stalker(GridPos::new(1, 0)));
        assert!(!grid.is_walkable_for_stalker(GridPos::new(2, 0)));
        assert!(grid.is_passable(GridPos::new(2, 0)));
    }

    #[test]
    fn test_coordinate_round_trip() {
        let space = CellSpace::new(2.0, 50, 50);

        let center = space.grid_to_world(GridPos::new(25, 25));
        assert_relative_eq!(center.x, 1.0);
        assert_relative_eq!(center.z, 1.0);

        let corner = space.grid_to_world(GridPos::new(0, 0));
        assert_relative_eq!(corner.x, -49.0);
        assert_relative_eq!(corner.z, -49.0);

        for pos in [GridPos::new(0, 0), GridPos::new(13, 40), GridPos::new(49, 1)] {
            assert_eq!(space.world_to_grid(space.grid_to_world(pos)), pos);
        }
    }

    #[test]
    fn test_world_to_grid_floors() {
        let space = CellSpace::new(2.0, 4, 4);

        assert_eq!(space.world_to_grid(WorldPos::new(0.0, 0.0)), GridPos::new(2, 2));
        assert_eq!(space.world_to_grid(WorldPos::new(-0.01, 1.99)), GridPos::new(1, 2));
        assert_eq!(space.world_to_grid(WorldPos::new(-100.0, 0.0)).x, -48);
    }

    #[test]
    fn test_ascii_round_trip() {
        let text = "###\n#.,\n###\n";
        assert_eq!(Grid::parse(text).unwrap().to_ascii(), text);
    }
}
