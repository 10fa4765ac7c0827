//! bawo engine library.
//!
//! Exposes the board representation, rules, game logic, search and
//! protocol modules for use by integration tests and the binaries.

pub mod board;
pub mod engine;
pub mod eval;
pub mod game;
pub mod protocol;
pub mod rules;
pub mod search;
pub mod selfplay;
