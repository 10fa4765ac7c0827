//! A hand moving along the board.
//!
//! The cursor borrows a `Board` and carries the seeds currently in hand.
//! Stepping stays within the cursor's field; only `switch_field` crosses to
//! the rival field.

use super::hole::{Direction, Hole};
use super::state::Board;
use super::BoardError;

/// A stateful walker that steps, sows and captures on a borrowed board.
#[derive(Debug)]
pub struct Cursor<'a> {
    board: &'a mut Board,
    hole: Hole,
    direction: Direction,
    stock: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(board: &'a mut Board, hole: Hole, direction: Direction, stock: u32) -> Self {
        Cursor { board, hole, direction, stock }
    }

    pub fn hole(&self) -> Hole {
        self.hole
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Seeds currently in hand.
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Seed count of the hole under the cursor.
    pub fn count(&self) -> u32 {
        self.board.get(self.hole)
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    /// Moves one step in the current direction, wrapping onto the other row
    /// of the field (and reversing) at either end.
    pub fn step(&mut self) {
        let (hole, direction) = self.hole.step(self.direction);
        self.hole = hole;
        self.direction = direction;
    }

    /// Picks up `count` seeds (all when `None`) from the current hole.
    pub fn capture(&mut self, count: Option<u32>) -> Result<u32, BoardError> {
        let here = self.board.get(self.hole);
        let count = count.unwrap_or(here);
        if count > here {
            return Err(BoardError::InsufficientSeeds {
                hole: self.hole,
                requested: count,
                available: here,
            });
        }
        self.stock += count;
        self.board.set(self.hole, here - count);
        Ok(count)
    }

    /// Drops `count` seeds (all when `None`) from hand into the current hole.
    pub fn sow(&mut self, count: Option<u32>) -> Result<u32, BoardError> {
        let count = count.unwrap_or(self.stock);
        if count > self.stock {
            return Err(BoardError::InsufficientSeeds {
                hole: self.hole,
                requested: count,
                available: self.stock,
            });
        }
        self.stock -= count;
        let here = self.board.get(self.hole);
        self.board.set(self.hole, here + count);
        Ok(count)
    }

    pub fn reverse_direction(&mut self) {
        self.direction = self.direction.reversed();
    }

    /// Jumps to the hole on the rival field facing the current one.
    pub fn switch_field(&mut self) {
        self.hole = self.hole.rival();
    }

    /// Repositions the cursor on its current row without stepping.
    pub(crate) fn jump(&mut self, hole: Hole, direction: Direction) {
        self.hole = hole;
        self.direction = direction;
    }
}
