//! Move tokens.
//!
//! A move names the hole to play, the sowing direction and an optional
//! modifier. The text form is `<hole><direction>[<modifier>]`, e.g. `A3L`,
//! `a5R>` or `A5L$`; inside the engine a move is always the parsed struct.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hole::{Direction, Hole, Row, ROW_LEN};

/// Errors that can occur when parsing a move token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid move '{0}': expected 3 or 4 characters")]
    InvalidLength(String),

    #[error("invalid move '{0}': unknown row letter")]
    InvalidRow(String),

    #[error("invalid move '{0}': column must be 1-8")]
    InvalidColumn(String),

    #[error("invalid move '{0}': direction must be L or R")]
    InvalidDirection(String),

    #[error("invalid move '{0}': modifier must be '>' or '$'")]
    InvalidModifier(String),
}

/// Optional trailing modifier of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Modifier {
    #[default]
    None,
    /// `>`: sow the whole house, forfeiting its status.
    SowAll,
    /// `$`: end the turn immediately, closing a house-interrupted sow.
    ForcedEnd,
}

impl Modifier {
    pub const fn symbol(self) -> Option<char> {
        match self {
            Modifier::None => None,
            Modifier::SowAll => Some('>'),
            Modifier::ForcedEnd => Some('$'),
        }
    }

    pub fn from_symbol(c: char) -> Option<Modifier> {
        match c {
            '>' => Some(Modifier::SowAll),
            '$' => Some(Modifier::ForcedEnd),
            _ => None,
        }
    }
}

/// A single move: the hole played, the direction sown, and a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    pub hole: Hole,
    pub direction: Direction,
    pub modifier: Modifier,
}

impl Move {
    pub const fn new(hole: Hole, direction: Direction) -> Self {
        Move { hole, direction, modifier: Modifier::None }
    }

    pub const fn with_modifier(self, modifier: Modifier) -> Self {
        Move { hole: self.hole, direction: self.direction, modifier }
    }

    /// The same move without its modifier.
    pub const fn plain(self) -> Self {
        self.with_modifier(Modifier::None)
    }

    /// Returns the hole reached after `n_steps` steps from this move's hole.
    ///
    /// Used to look ahead at where `n_steps` sown seeds end without touching
    /// the board.
    pub fn marker_hole(&self, n_steps: u32) -> Hole {
        let (mut hole, mut direction) = (self.hole, self.direction);
        for _ in 0..n_steps {
            (hole, direction) = hole.step(direction);
        }
        hole
    }
}

/// Splits a move token into its hole, direction and modifier.
pub fn split(token: &str) -> Result<(Hole, Direction, Modifier), MoveParseError> {
    let mv: Move = token.parse()?;
    Ok((mv.hole, mv.direction, mv.modifier))
}

/// Returns the hole `n_steps` ahead of the move written as `token`.
pub fn marker_hole(token: &str, n_steps: u32) -> Result<Hole, MoveParseError> {
    Ok(token.parse::<Move>()?.marker_hole(n_steps))
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.hole, self.direction.letter())?;
        if let Some(symbol) = self.modifier.symbol() {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Move, MoveParseError> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 && chars.len() != 4 {
            return Err(MoveParseError::InvalidLength(s.to_string()));
        }

        let row = Row::from_letter(chars[0])
            .ok_or_else(|| MoveParseError::InvalidRow(s.to_string()))?;
        let column = chars[1]
            .to_digit(10)
            .filter(|c| (1..=u32::from(ROW_LEN)).contains(c))
            .ok_or_else(|| MoveParseError::InvalidColumn(s.to_string()))?;
        let hole = Hole::new(row, column as u8)
            .map_err(|_| MoveParseError::InvalidColumn(s.to_string()))?;
        let direction = Direction::from_letter(chars[2])
            .ok_or_else(|| MoveParseError::InvalidDirection(s.to_string()))?;
        let modifier = match chars.get(3) {
            None => Modifier::None,
            Some(&c) => Modifier::from_symbol(c)
                .ok_or_else(|| MoveParseError::InvalidModifier(s.to_string()))?,
        };

        Ok(Move { hole, direction, modifier })
    }
}

impl TryFrom<String> for Move {
    type Error = MoveParseError;

    fn try_from(s: String) -> Result<Move, MoveParseError> {
        s.parse()
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> String {
        mv.to_string()
    }
}
