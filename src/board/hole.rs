//! Hole addressing for the Bao board.
//!
//! The board has two fields, one per player. Each field has a front row and
//! a back row of eight holes plus a reserve store. Holes are written as a
//! row letter and a column digit (`A5`, `b2`); the letter's case tells the
//! field apart. Column 9 is a synthetic alias for the field's store.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::BoardError;

/// Number of real holes in a single row.
pub const ROW_LEN: u8 = 8;

/// Column reserved for the store alias (`A9`, `B9`, `a9`, `b9`).
pub const STORE_COLUMN: u8 = 9;

/// Column of the house (nyumba) within a field's front row.
pub const HOUSE_COLUMN: u8 = 5;

/// One player's half of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Rows `A` (front) and `B` (back).
    Upper,
    /// Rows `a` (front) and `b` (back).
    Lower,
}

/// Both fields in index order.
pub const ALL_FIELDS: [Field; 2] = [Field::Upper, Field::Lower];

impl Field {
    /// Returns the field opposing this one.
    pub const fn rival(self) -> Field {
        match self {
            Field::Upper => Field::Lower,
            Field::Lower => Field::Upper,
        }
    }

    /// Index into per-field arrays.
    pub const fn index(self) -> usize {
        match self {
            Field::Upper => 0,
            Field::Lower => 1,
        }
    }

    /// The front row of this field.
    pub const fn front_row(self) -> Row {
        match self {
            Field::Upper => Row::UpperFront,
            Field::Lower => Row::LowerFront,
        }
    }

    /// The back row of this field.
    pub const fn back_row(self) -> Row {
        match self {
            Field::Upper => Row::UpperBack,
            Field::Lower => Row::LowerBack,
        }
    }

    /// The field's house hole (front row, column 5).
    pub const fn house(self) -> Hole {
        Hole { row: self.front_row(), column: HOUSE_COLUMN }
    }

    /// The store alias for this field (front row letter, column 9).
    pub const fn store(self) -> Hole {
        Hole { row: self.front_row(), column: STORE_COLUMN }
    }

    /// The field's conventional two-letter name: `AB` or `ab`.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Upper => "AB",
            Field::Lower => "ab",
        }
    }

    /// Parses a field from `AB`/`ab` or `upper`/`lower`.
    pub fn from_name(s: &str) -> Option<Field> {
        match s {
            "AB" | "upper" | "Upper" => Some(Field::Upper),
            "ab" | "lower" | "Lower" => Some(Field::Lower),
            _ => None,
        }
    }

    /// The 16 real holes of this field: front row 1..=8 then back row 1..=8.
    pub fn holes(self) -> impl Iterator<Item = Hole> {
        [self.front_row(), self.back_row()]
            .into_iter()
            .flat_map(|row| (1..=ROW_LEN).map(move |column| Hole { row, column }))
    }

    /// The 8 front-row holes of this field.
    pub fn front_holes(self) -> impl Iterator<Item = Hole> {
        let row = self.front_row();
        (1..=ROW_LEN).map(move |column| Hole { row, column })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per field, indexable by `Field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PerField<T> {
    pub upper: T,
    pub lower: T,
}

impl<T> PerField<T> {
    pub const fn new(upper: T, lower: T) -> Self {
        PerField { upper, lower }
    }
}

impl<T: Clone> PerField<T> {
    pub fn both(value: T) -> Self {
        PerField { upper: value.clone(), lower: value }
    }
}

impl<T> Index<Field> for PerField<T> {
    type Output = T;

    fn index(&self, field: Field) -> &T {
        match field {
            Field::Upper => &self.upper,
            Field::Lower => &self.lower,
        }
    }
}

impl<T> IndexMut<Field> for PerField<T> {
    fn index_mut(&mut self, field: Field) -> &mut T {
        match field {
            Field::Upper => &mut self.upper,
            Field::Lower => &mut self.lower,
        }
    }
}

/// A row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Row {
    UpperFront = 0,
    UpperBack = 1,
    LowerFront = 2,
    LowerBack = 3,
}

/// All rows in index order.
pub const ALL_ROWS: [Row; 4] = [Row::UpperFront, Row::UpperBack, Row::LowerFront, Row::LowerBack];

impl Row {
    /// Returns the row letter used in move notation.
    pub const fn letter(self) -> char {
        match self {
            Row::UpperFront => 'A',
            Row::UpperBack => 'B',
            Row::LowerFront => 'a',
            Row::LowerBack => 'b',
        }
    }

    /// Parses a row from its notation letter.
    pub fn from_letter(c: char) -> Option<Row> {
        match c {
            'A' => Some(Row::UpperFront),
            'B' => Some(Row::UpperBack),
            'a' => Some(Row::LowerFront),
            'b' => Some(Row::LowerBack),
            _ => None,
        }
    }

    /// The field this row belongs to.
    pub const fn field(self) -> Field {
        match self {
            Row::UpperFront | Row::UpperBack => Field::Upper,
            Row::LowerFront | Row::LowerBack => Field::Lower,
        }
    }

    pub const fn is_front(self) -> bool {
        matches!(self, Row::UpperFront | Row::LowerFront)
    }

    /// The other row of the same field.
    pub const fn sibling(self) -> Row {
        match self {
            Row::UpperFront => Row::UpperBack,
            Row::UpperBack => Row::UpperFront,
            Row::LowerFront => Row::LowerBack,
            Row::LowerBack => Row::LowerFront,
        }
    }

    /// The row playing the same role on the rival field.
    pub const fn rival(self) -> Row {
        match self {
            Row::UpperFront => Row::LowerFront,
            Row::UpperBack => Row::LowerBack,
            Row::LowerFront => Row::UpperFront,
            Row::LowerBack => Row::UpperBack,
        }
    }
}

/// Direction a hand travels along a row. `Left` decreases the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub const fn letter(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_letter(c: char) -> Option<Direction> {
        match c {
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    pub const fn reversed(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A hole identifier: a row and a column 1..=9 (9 aliases the store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hole {
    row: Row,
    column: u8,
}

impl Hole {
    /// Creates a hole, failing with `InvalidHole` for columns outside 1..=9.
    pub fn new(row: Row, column: u8) -> Result<Hole, BoardError> {
        if (1..=STORE_COLUMN).contains(&column) {
            Ok(Hole { row, column })
        } else {
            Err(BoardError::InvalidHole(format!("{}{}", row.letter(), column)))
        }
    }

    pub const fn row(self) -> Row {
        self.row
    }

    pub const fn column(self) -> u8 {
        self.column
    }

    pub const fn field(self) -> Field {
        self.row.field()
    }

    /// True for the store aliases (column 9).
    pub const fn is_store(self) -> bool {
        self.column == STORE_COLUMN
    }

    /// True for the front-row hole in column 5 of either field.
    pub const fn is_house(self) -> bool {
        self.row.is_front() && self.column == HOUSE_COLUMN
    }

    /// Returns the hole on the rival field that faces this one.
    ///
    /// The column is mirrored (`9 - column`); a store maps to the rival store.
    pub const fn rival(self) -> Hole {
        if self.is_store() {
            Hole { row: self.row.rival(), column: STORE_COLUMN }
        } else {
            Hole { row: self.row.rival(), column: STORE_COLUMN - self.column }
        }
    }

    /// Tests if this real (non-store) hole is contained in `field`.
    pub const fn in_field(self, field: Field) -> bool {
        !self.is_store() && self.field().index() == field.index()
    }

    pub const fn in_front_row(self) -> bool {
        self.row.is_front()
    }

    pub const fn in_back_row(self) -> bool {
        !self.row.is_front()
    }

    /// Advances one column in `direction` within this hole's field.
    ///
    /// Past either end of a row the hand wraps onto the other row of the same
    /// field, keeping the column and reversing the direction. Stores never
    /// move.
    pub const fn step(self, direction: Direction) -> (Hole, Direction) {
        if self.is_store() {
            return (self, direction);
        }
        match direction {
            Direction::Right if self.column == ROW_LEN => {
                (Hole { row: self.row.sibling(), column: self.column }, Direction::Left)
            }
            Direction::Left if self.column == 1 => {
                (Hole { row: self.row.sibling(), column: self.column }, Direction::Right)
            }
            Direction::Right => (Hole { row: self.row, column: self.column + 1 }, direction),
            Direction::Left => (Hole { row: self.row, column: self.column - 1 }, direction),
        }
    }

    /// Same row, different column. Used when a capture re-enters the front row.
    pub(crate) const fn with_column(self, column: u8) -> Hole {
        Hole { row: self.row, column }
    }
}

/// Returns the hole on the other field symmetric to `hole`.
pub const fn rival_hole(hole: Hole) -> Hole {
    hole.rival()
}

/// Returns the other field.
pub const fn rival_field(field: Field) -> Field {
    field.rival()
}

/// Tests if `hole` is one of `field`'s real holes.
pub const fn hole_in_field(hole: Hole, field: Field) -> bool {
    hole.in_field(field)
}

pub const fn hole_in_front_row(hole: Hole) -> bool {
    hole.in_front_row()
}

pub const fn hole_in_back_row(hole: Hole) -> bool {
    hole.in_back_row()
}

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row.letter(), self.column)
    }
}

impl FromStr for Hole {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Hole, BoardError> {
        let mut chars = s.chars();
        let (Some(r), Some(c), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(BoardError::InvalidHole(s.to_string()));
        };
        let row = Row::from_letter(r).ok_or_else(|| BoardError::InvalidHole(s.to_string()))?;
        let column = c
            .to_digit(10)
            .ok_or_else(|| BoardError::InvalidHole(s.to_string()))?;
        Hole::new(row, column as u8).map_err(|_| BoardError::InvalidHole(s.to_string()))
    }
}

impl TryFrom<String> for Hole {
    type Error = BoardError;

    fn try_from(s: String) -> Result<Hole, BoardError> {
        s.parse()
    }
}

impl From<Hole> for String {
    fn from(hole: Hole) -> String {
        hole.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Hole {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        for s in ["A1", "B8", "a5", "b3", "A9", "b9"] {
            assert_eq!(h(s).to_string(), s);
        }
    }

    #[test]
    fn parse_rejects_bad_holes() {
        for s in ["", "A", "A0", "C1", "A10", "x5", "a-"] {
            assert!(matches!(s.parse::<Hole>(), Err(BoardError::InvalidHole(_))), "{s}");
        }
    }

    #[test]
    fn rival_mirrors_column() {
        assert_eq!(rival_hole(h("A1")), h("a8"));
        assert_eq!(rival_hole(h("a5")), h("A4"));
        assert_eq!(rival_hole(h("B3")), h("b6"));
        assert_eq!(rival_hole(h("b8")), h("B1"));
        assert_eq!(rival_hole(h("A9")), h("a9"));
    }

    #[test]
    fn rival_is_an_involution() {
        for row in ALL_ROWS {
            for column in 1..=STORE_COLUMN {
                let hole = Hole::new(row, column).unwrap();
                assert_eq!(hole.rival().rival(), hole);
            }
        }
    }

    #[test]
    fn rival_field_swaps() {
        assert_eq!(rival_field(Field::Upper), Field::Lower);
        assert_eq!(rival_field(Field::Lower), Field::Upper);
    }

    #[test]
    fn membership_predicates() {
        assert!(hole_in_field(h("A3"), Field::Upper));
        assert!(hole_in_field(h("B3"), Field::Upper));
        assert!(!hole_in_field(h("a3"), Field::Upper));
        assert!(!hole_in_field(h("A9"), Field::Upper));
        assert!(hole_in_front_row(h("a2")));
        assert!(!hole_in_front_row(h("b2")));
        assert!(hole_in_back_row(h("B7")));
        assert!(h("A5").is_house());
        assert!(!h("B5").is_house());
    }

    #[test]
    fn step_wraps_within_field() {
        assert_eq!(h("A3").step(Direction::Right), (h("A4"), Direction::Right));
        assert_eq!(h("A3").step(Direction::Left), (h("A2"), Direction::Left));
        assert_eq!(h("A8").step(Direction::Right), (h("B8"), Direction::Left));
        assert_eq!(h("B1").step(Direction::Left), (h("A1"), Direction::Right));
        assert_eq!(h("a1").step(Direction::Left), (h("b1"), Direction::Right));
    }

    #[test]
    fn full_lap_returns_to_start() {
        let start = h("A4");
        let (mut hole, mut dir) = (start, Direction::Right);
        for _ in 0..16 {
            (hole, dir) = hole.step(dir);
            assert!(hole.in_field(Field::Upper));
        }
        assert_eq!((hole, dir), (start, Direction::Right));
    }

    #[test]
    fn field_holes_cover_both_rows() {
        let holes: Vec<Hole> = Field::Lower.holes().collect();
        assert_eq!(holes.len(), 16);
        assert_eq!(holes[0], h("a1"));
        assert_eq!(holes[15], h("b8"));
        assert_eq!(Field::Upper.house(), h("A5"));
        assert_eq!(Field::Lower.store(), h("a9"));
    }

    #[test]
    fn per_field_indexing() {
        let mut houses = PerField::both(true);
        houses[Field::Lower] = false;
        assert!(houses[Field::Upper]);
        assert!(!houses[Field::Lower]);
        assert_eq!(houses, PerField::new(true, false));
    }

    #[test]
    fn hole_serializes_as_string() {
        let json = serde_json::to_string(&h("B7")).unwrap();
        assert_eq!(json, "\"B7\"");
        let back: Hole = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h("B7"));
        assert!(serde_json::from_str::<Hole>("\"Z1\"").is_err());
    }
}
