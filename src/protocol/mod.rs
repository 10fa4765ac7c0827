//! Front-end protocol handling.
//!
//! A line-oriented protocol on stdin/stdout in the style of UCI: the front
//! end sends one command per line and the engine answers with response
//! lines. This module holds the command parser.

pub mod parser;

pub use parser::{parse_command, Command, GoParams};
