//! Search and move selection.
//!
//! Looks ahead through the legal-move tree to pick a move for the side to
//! move, or picks one at random.

pub mod negamax;

pub use negamax::{
    random_move, search, SearchInfo, SearchLimits, SearchResult, DEFAULT_DEPTH,
};
