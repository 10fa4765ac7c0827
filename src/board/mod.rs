//! Board representation.
//!
//! Contains hole addressing, the seed store, the cursor that walks it, and
//! the move notation.

pub mod cursor;
pub mod hole;
pub mod order;
pub mod state;

use thiserror::Error;

pub use cursor::Cursor;
pub use hole::{
    hole_in_back_row, hole_in_field, hole_in_front_row, rival_field, rival_hole, Direction, Field,
    Hole, PerField, Row, ALL_FIELDS, ALL_ROWS, HOUSE_COLUMN, ROW_LEN, STORE_COLUMN,
};
pub use order::{Modifier, Move, MoveParseError};
pub use state::{Board, HOLE_COUNT};

/// Errors raised by board addressing and seed relocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid hole '{0}'")]
    InvalidHole(String),

    #[error("cannot take {requested} seeds at {hole}: only {available} available")]
    InsufficientSeeds {
        hole: Hole,
        requested: u32,
        available: u32,
    },
}
