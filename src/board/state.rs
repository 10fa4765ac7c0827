//! Seed-count store for the whole board.
//!
//! Holds the seed count of every real hole plus the two reserve stores.
//! The board knows nothing about legality; it only relocates seeds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::hole::{Field, Hole, ALL_ROWS, ROW_LEN, STORE_COLUMN};
use super::BoardError;

/// Number of real holes on the board.
pub const HOLE_COUNT: usize = 32;

/// Complete seed layout at a point in time.
///
/// Fixed-size arrays indexed by `Row as usize * 8 + column - 1`, so copies
/// are cheap and allocation free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    holes: [u32; HOLE_COUNT],
    stores: [u32; 2],
}

impl Board {
    /// Creates a board with every hole and store empty.
    pub fn empty() -> Self {
        Board::default()
    }

    fn index(hole: Hole) -> usize {
        hole.row() as usize * ROW_LEN as usize + hole.column() as usize - 1
    }

    /// Returns the seed count of `hole`; store aliases read the store.
    pub fn get(&self, hole: Hole) -> u32 {
        if hole.is_store() {
            self.stores[hole.field().index()]
        } else {
            self.holes[Board::index(hole)]
        }
    }

    /// Sets the seed count of `hole`; store aliases write the store.
    pub fn set(&mut self, hole: Hole, count: u32) {
        if hole.is_store() {
            self.stores[hole.field().index()] = count;
        } else {
            self.holes[Board::index(hole)] = count;
        }
    }

    /// Reads a hole by its notation, failing with `InvalidHole`.
    pub fn get_named(&self, name: &str) -> Result<u32, BoardError> {
        Ok(self.get(name.parse()?))
    }

    /// Writes a hole by its notation, failing with `InvalidHole`.
    pub fn set_named(&mut self, name: &str, count: u32) -> Result<(), BoardError> {
        self.set(name.parse()?, count);
        Ok(())
    }

    /// Seeds held in `field`'s reserve store.
    pub fn store(&self, field: Field) -> u32 {
        self.stores[field.index()]
    }

    /// Every addressable hole: the 32 real holes followed by the four store aliases.
    pub fn holes() -> impl Iterator<Item = Hole> {
        let real = ALL_ROWS
            .into_iter()
            .flat_map(|row| (1..=ROW_LEN).filter_map(move |c| Hole::new(row, c).ok()));
        let stores = ALL_ROWS
            .into_iter()
            .filter_map(|row| Hole::new(row, STORE_COLUMN).ok());
        real.chain(stores)
    }

    /// Seeds on one field: its 16 holes plus its store.
    pub fn field_seeds(&self, field: Field) -> u32 {
        field.holes().map(|h| self.get(h)).sum::<u32>() + self.store(field)
    }

    /// Total seeds on the board, stores included. Constant over a game.
    pub fn total_seeds(&self) -> u32 {
        self.holes.iter().sum::<u32>() + self.stores.iter().sum::<u32>()
    }
}

impl fmt::Display for Board {
    /// Renders the board upper field first, back row on top, each row
    /// left to right, followed by both stores.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            Field::Upper.back_row(),
            Field::Upper.front_row(),
            Field::Lower.front_row(),
            Field::Lower.back_row(),
        ];
        for (i, row) in rows.into_iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            let counts: Vec<String> = (1..=ROW_LEN)
                .filter_map(|c| Hole::new(row, c).ok())
                .map(|h| self.get(h).to_string())
                .collect();
            write!(f, "{}:{}", row.letter(), counts.join(","))?;
        }
        write!(
            f,
            " stores AB:{} ab:{}",
            self.store(Field::Upper),
            self.store(Field::Lower)
        )
    }
}
