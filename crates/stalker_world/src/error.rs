//! Error types for level data

use thiserror::Error;

/// Level and collaborator errors
#[derive(Debug, Error)]
pub enum WorldError {
    /// Level text contained no rows
    #[error("Level has no rows")]
    EmptyLevel,

    /// A row had a different width than the first row
    #[error("Row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Unknown cell glyph in level text
    #[error("Unknown cell glyph {glyph:?} at ({x}, {z})")]
    UnknownGlyph { glyph: char, x: usize, z: usize },

    /// Door placed outside the grid
    #[error("Door {0} is outside the grid")]
    DoorOutOfBounds(String),

    /// Two doors share an id
    #[error("Duplicate door id: {0}")]
    DuplicateDoor(String),

    /// Door id not registered
    #[error("Door not found: {0}")]
    DoorNotFound(String),
}

/// Result type for level operations
pub type Result<T> = std::result::Result<T, WorldError>;
