//! Move execution.
//!
//! A move is played by a `Sower`, a small state machine around a board
//! cursor. Each `advance` performs one step of the walk and reports whether
//! sowing continues, has stopped (and why) or has run past the long-move
//! limit.

use serde::{Deserialize, Serialize};

use crate::board::{Cursor, Direction, Field, Hole, Modifier, Move, PerField, ROW_LEN};

use super::state::{State, TurnKind};
use super::GameError;

/// Hard bound on walk steps; no legal move comes close.
pub const OVERRUN_LIMIT: u32 = 500;

/// Why a move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stop {
    /// A takata move ended on an empty hole.
    Free,
    /// A mtaji move ended on an empty hole, or the mover chose `$`.
    Forced,
    /// A takata move ended on the takasia hole.
    Repetition,
    /// A mtaji move ended in the mover's own house while sowing leftwards.
    HouseLeft,
    /// As `HouseLeft`, sowing rightwards.
    HouseRight,
}

impl Stop {
    /// The direction of an interrupted house sow, if this stop is one.
    pub fn house_direction(self) -> Option<Direction> {
        match self {
            Stop::HouseLeft => Some(Direction::Left),
            Stop::HouseRight => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Progress of a walk after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SowState {
    Sowing,
    Stopped(Stop),
    TooLong,
}

/// What applying a move did to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    Done,
    TooLong,
    /// The move does not start from a playable hole; nothing changed.
    Rejected,
}

struct Sower<'a, 'o> {
    cursor: Cursor<'a>,
    houses: &'a mut PerField<bool>,
    field: Field,
    kind: TurnKind,
    takasia: Option<Hole>,
    long_move_limit: u32,
    steps: u32,
    observer: &'o mut dyn FnMut(Hole, u32),
}

impl Sower<'_, '_> {
    fn run(&mut self) -> Result<SowState, GameError> {
        loop {
            match self.advance()? {
                SowState::Sowing => continue,
                done => return Ok(done),
            }
        }
    }

    fn advance(&mut self) -> Result<SowState, GameError> {
        if self.steps > OVERRUN_LIMIT {
            return Err(GameError::ExecutionOverrun { steps: self.steps });
        }
        if self.kind == TurnKind::Takata && self.steps >= self.long_move_limit {
            return Ok(SowState::TooLong);
        }

        let hole = self.cursor.hole();
        if !hole.in_field(self.field) {
            self.reenter();
            return Ok(SowState::Sowing);
        }

        if self.cursor.stock() > 0 {
            self.cursor.sow(Some(1))?;
        } else if let Some(stop) = self.empty_hand()? {
            return Ok(SowState::Stopped(stop));
        }

        let hole = self.cursor.hole();
        (self.observer)(hole, self.cursor.count());
        if self.cursor.stock() > 0 && hole.in_field(self.field) {
            self.cursor.step();
        }
        self.steps += 1;
        Ok(SowState::Sowing)
    }

    /// Decides what happens when the last seed in hand has been sown.
    /// Returns the stop if the move ends here.
    fn empty_hand(&mut self) -> Result<Option<Stop>, GameError> {
        let hole = self.cursor.hole();
        let count = self.cursor.count();

        if count == 1 {
            return Ok(Some(match self.kind {
                TurnKind::Takata => Stop::Free,
                TurnKind::Mtaji => Stop::Forced,
            }));
        }

        if self.kind == TurnKind::Mtaji && hole.in_front_row() && self.cursor.board().get(hole.rival()) > 0
        {
            self.cursor.switch_field();
            self.cursor.capture(None)?;
            if self.cursor.hole().is_house() {
                self.houses[self.field.rival()] = false;
            }
            return Ok(None);
        }

        if self.kind == TurnKind::Takata && self.takasia == Some(hole) {
            return Ok(Some(Stop::Repetition));
        }

        if hole.is_house() && self.houses[self.field] {
            return Ok(Some(match (self.kind, self.cursor.direction()) {
                (TurnKind::Takata, _) => Stop::Free,
                (TurnKind::Mtaji, Direction::Left) => Stop::HouseLeft,
                (TurnKind::Mtaji, Direction::Right) => Stop::HouseRight,
            }));
        }

        self.cursor.capture(None)?;
        Ok(None)
    }

    /// Brings captured seeds back to the mover's front row. Seeds taken near
    /// an end enter from that end; otherwise they enter from the end the
    /// walk was heading away from.
    fn reenter(&mut self) {
        self.cursor.switch_field();
        let hole = self.cursor.hole();
        let (column, direction) = match hole.column() {
            1 | 2 => (1, Direction::Right),
            c if c >= ROW_LEN - 1 => (ROW_LEN, Direction::Left),
            _ => match self.cursor.direction() {
                Direction::Left => (ROW_LEN, Direction::Left),
                Direction::Right => (1, Direction::Right),
            },
        };
        self.cursor.jump(hole.with_column(column), direction);
    }
}

impl State {
    /// Plays `mv` in place as a turn of the given kind.
    ///
    /// On `TooLong` the state is left mid-walk and must be discarded.
    pub(crate) fn apply(
        &mut self,
        mv: Move,
        kind: TurnKind,
        observer: &mut dyn FnMut(Hole, u32),
    ) -> Result<Applied, GameError> {
        let field = self.player;
        let hole = mv.hole;
        if !hole.in_field(field) || self.board.get(hole) == 0 {
            return Ok(Applied::Rejected);
        }

        if mv.modifier == Modifier::ForcedEnd {
            self.last_stop = Some(Stop::Forced);
            self.hand_over(kind);
            return Ok(Applied::Done);
        }

        let sowing_phase = self.in_sowing_phase();
        let holds_house = hole.is_house() && self.houses[field];
        let sow_all = mv.modifier == Modifier::SowAll;
        let takasia = self.takasia;
        let long_move_limit = self.rules.long_move_limit;

        let State { board, houses, .. } = self;
        let (cursor, steps) = if sowing_phase {
            if hole.in_back_row() {
                return Ok(Applied::Rejected);
            }
            if holds_house && sow_all {
                houses[field] = false;
                (Cursor::new(board, hole, mv.direction, 0), 0)
            } else {
                let store = field.store();
                let mut cursor = Cursor::new(board, store, mv.direction, 0);
                cursor.capture(Some(1))?;
                observer(store, cursor.count());
                cursor.jump(hole, mv.direction);
                if holds_house && kind == TurnKind::Takata {
                    // Tax the house: take one more seed and sow from the next hole.
                    cursor.capture(Some(1))?;
                    observer(hole, cursor.count());
                    cursor.step();
                    (cursor, 2)
                } else {
                    (cursor, 1)
                }
            }
        } else {
            if board.get(hole) == 1 || (holds_house && !sow_all) {
                return Ok(Applied::Rejected);
            }
            let mut cursor = Cursor::new(board, hole, mv.direction, 0);
            cursor.capture(None)?;
            if holds_house {
                houses[field] = false;
            }
            observer(hole, cursor.count());
            cursor.step();
            (cursor, 1)
        };

        let mut sower = Sower {
            cursor,
            houses,
            field,
            kind,
            takasia,
            long_move_limit,
            steps,
            observer,
        };
        match sower.run()? {
            SowState::Stopped(stop) => {
                self.last_stop = Some(stop);
                self.hand_over(kind);
                Ok(Applied::Done)
            }
            SowState::TooLong | SowState::Sowing => Ok(Applied::TooLong),
        }
    }

    /// Finishes a turn: updates takasia and passes the move on, unless the
    /// walk paused in the mover's house.
    fn hand_over(&mut self, kind: TurnKind) {
        if kind == TurnKind::Takata && !self.in_sowing_phase() && self.rules.use_takasia {
            // No carry-over hole is derived; a finished takata turn clears it.
            self.takasia = None;
        }
        let paused = self.last_stop.and_then(Stop::house_direction).is_some();
        if !paused {
            self.player = self.player.rival();
        }
        self.transitions = Default::default();
    }
}
