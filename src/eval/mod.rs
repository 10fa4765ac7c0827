//! Position evaluation.
//!
//! Scores a position from one field's perspective for the search.

pub(crate) mod heuristic;

pub use heuristic::{evaluate, evaluate_for_mover, safe_holes, WIN_SCORE};
