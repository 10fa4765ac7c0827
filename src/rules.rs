//! Game variants and their rule constants.
//!
//! A `Rules` value is fixed for the lifetime of a game and shared by every
//! state derived from it. Three variants are built in; custom descriptors
//! can be read from JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Field, Hole, PerField, ALL_ROWS, ROW_LEN};

/// Default step bound for takata moves before they are rejected as too long.
pub const DEFAULT_LONG_MOVE_LIMIT: u32 = 250;

/// Default seed ceiling above which a move is never classified mtaji.
pub const DEFAULT_MTAJI_SEED_CEILING: u32 = 16;

/// Errors that can occur when resolving a rules descriptor.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    #[error("invalid rules descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rules place seeds on store alias {0}; use the front-row alias")]
    StoreAlias(Hole),
}

/// Immutable per-variant configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Initial seed count per hole; store aliases (`A9`, `a9`) seed the stores.
    /// Holes not listed start empty.
    pub layout: BTreeMap<Hole, u32>,
    /// Whether each field starts with its house (nyumba).
    pub houses: PerField<bool>,
    /// Whether the anti-repetition (takasia) rule is active.
    #[serde(default = "default_true")]
    pub use_takasia: bool,
    /// Steps a takata move may take before it is rejected as too long.
    #[serde(default = "default_long_move_limit")]
    pub long_move_limit: u32,
    /// Field that moves first.
    pub starting_field: Field,
    /// Largest hole that can still start a mtaji move after the sowing phase.
    #[serde(default = "default_mtaji_seed_ceiling")]
    pub mtaji_seed_ceiling: u32,
}

fn default_true() -> bool {
    true
}

fn default_long_move_limit() -> u32 {
    DEFAULT_LONG_MOVE_LIMIT
}

fn default_mtaji_seed_ceiling() -> u32 {
    DEFAULT_MTAJI_SEED_CEILING
}

impl Rules {
    /// Parses a custom descriptor from JSON.
    pub fn from_json(s: &str) -> Result<Rules, RulesError> {
        let rules: Rules = serde_json::from_str(s)?;
        if let Some(hole) = rules
            .layout
            .keys()
            .find(|h| h.is_store() && h.in_back_row())
        {
            return Err(RulesError::StoreAlias(*hole));
        }
        Ok(rules)
    }

    pub fn to_json(&self) -> String {
        // A map keyed by holes with u32 values cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Seeds `hole` holds when the game starts.
    pub fn initial_seeds(&self, hole: Hole) -> u32 {
        self.layout.get(&hole).copied().unwrap_or(0)
    }

    /// Builds the starting board.
    pub fn initial_board(&self) -> Board {
        let mut board = Board::empty();
        for (&hole, &count) in &self.layout {
            board.set(hole, count);
        }
        board
    }

    /// Returns the same rules with a different starting field.
    pub fn starting_with(mut self, field: Field) -> Rules {
        self.starting_field = field;
        self
    }
}

/// The built-in variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Ntchuwa,
    Yabambo,
    Yawana,
}

/// All built-in variants.
pub const ALL_VARIANTS: [Variant; 3] = [Variant::Ntchuwa, Variant::Yabambo, Variant::Yawana];

impl Variant {
    pub const fn name(self) -> &'static str {
        match self {
            Variant::Ntchuwa => "ntchuwa",
            Variant::Yabambo => "yabambo",
            Variant::Yawana => "yawana",
        }
    }

    pub fn from_name(s: &str) -> Result<Variant, RulesError> {
        ALL_VARIANTS
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RulesError::UnknownVariant(s.to_string()))
    }

    /// The rule constants of this variant.
    pub fn rules(self) -> Rules {
        let mut layout = BTreeMap::new();
        let houses = match self {
            Variant::Ntchuwa => {
                // One seed in every front-row hole, 24 in each store.
                for field in [Field::Upper, Field::Lower] {
                    for hole in field.front_holes() {
                        layout.insert(hole, 1);
                    }
                    layout.insert(field.store(), 24);
                }
                PerField::both(false)
            }
            Variant::Yabambo => {
                for field in [Field::Upper, Field::Lower] {
                    let row = field.front_row();
                    for (column, count) in [(5, 10), (6, 2), (7, 2)] {
                        if let Ok(hole) = Hole::new(row, column) {
                            layout.insert(hole, count);
                        }
                    }
                    layout.insert(field.store(), 20);
                }
                PerField::both(true)
            }
            Variant::Yawana => {
                for row in ALL_ROWS {
                    for column in 1..=ROW_LEN {
                        if let Ok(hole) = Hole::new(row, column) {
                            layout.insert(hole, 2);
                        }
                    }
                }
                PerField::both(false)
            }
        };

        Rules {
            layout,
            houses,
            use_takasia: true,
            long_move_limit: DEFAULT_LONG_MOVE_LIMIT,
            starting_field: Field::Upper,
            mtaji_seed_ceiling: DEFAULT_MTAJI_SEED_CEILING,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the names of the built-in variants.
pub fn variant_names() -> [&'static str; 3] {
    ALL_VARIANTS.map(Variant::name)
}
