//! Game positions, legal move generation and move execution.

pub mod history;
pub mod movegen;
pub mod sowing;
pub mod state;

use thiserror::Error;

use crate::board::{BoardError, Move, MoveParseError};
use crate::rules::Rules;

pub use history::{History, HistoryNode, HistoryOp, ObserverId};
pub use sowing::{SowState, Stop, OVERRUN_LIMIT};
pub use state::{MoveOutcome, State, Transition, Transitions, TurnKind};

/// Errors raised while generating or playing moves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move {0}")]
    IllegalMove(Move),

    #[error("move {0} exceeds the long-move limit")]
    LongMove(Move),

    #[error("move {0} is marked takata but the turn is mtaji")]
    TakataMarker(Move),

    #[error("move execution overran after {steps} steps")]
    ExecutionOverrun { steps: u32 },

    #[error(transparent)]
    Parse(#[from] MoveParseError),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Starts a new game under `rules` and returns its history.
pub fn new_game(rules: Rules) -> History {
    History::new(State::new(rules))
}
