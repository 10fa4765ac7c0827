//! Game position and its public contract.
//!
//! A `State` is one position: the board, which houses still stand, who is
//! to move, and how the previous move ended. The legal-move set is computed
//! lazily and cached; every mutation produces a new `State` with an empty
//! cache, so the move set and its turn classification never go stale.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::board::{Board, Field, Hole, Modifier, Move, PerField};
use crate::rules::Rules;

use super::sowing::{Applied, Stop};
use super::GameError;

/// Classification of the mover's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnKind {
    /// A capture is available, so only capturing moves are legal.
    Mtaji,
    /// No capture is available; moves are bound by the long-move limit.
    Takata,
}

/// Where a legal move leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The move completes and yields this position.
    Legal(State),
    /// The move may be attempted but exceeds the long-move limit.
    TooLong,
    /// The walk never ends; it was abandoned after `steps` steps.
    Overrun { steps: u32 },
}

impl Transition {
    pub fn state(&self) -> Option<&State> {
        match self {
            Transition::Legal(state) => Some(state),
            Transition::TooLong | Transition::Overrun { .. } => None,
        }
    }

    pub fn is_legal(&self) -> bool {
        matches!(self, Transition::Legal(_))
    }
}

/// Result of looking a move up in a position's move set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome<'a> {
    Legal(&'a State),
    TooLong,
    Overrun { steps: u32 },
    /// The move is not in the move set at all.
    NotApplicable,
}

/// The generated move set together with the turn classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transitions {
    pub(crate) kind: TurnKind,
    pub(crate) moves: BTreeMap<Move, Transition>,
}

impl Transitions {
    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn moves(&self) -> &BTreeMap<Move, Transition> {
        &self.moves
    }
}

/// A Bao position.
pub struct State {
    pub(crate) board: Board,
    pub(crate) houses: PerField<bool>,
    pub(crate) player: Field,
    pub(crate) takasia: Option<Hole>,
    pub(crate) last_stop: Option<Stop>,
    pub(crate) rules: Arc<Rules>,
    pub(crate) transitions: OnceLock<Transitions>,
}

impl State {
    /// Creates the starting position of a game played under `rules`.
    pub fn new(rules: Rules) -> Self {
        State::with_rules(Arc::new(rules))
    }

    /// Creates the starting position from shared rules.
    pub fn with_rules(rules: Arc<Rules>) -> Self {
        State {
            board: rules.initial_board(),
            houses: rules.houses,
            player: rules.starting_field,
            takasia: None,
            last_stop: None,
            rules,
            transitions: OnceLock::new(),
        }
    }

    /// Creates an arbitrary position under `rules` with `player` to move.
    ///
    /// House flags start as the rules give them.
    pub fn from_position(rules: Rules, board: Board, player: Field) -> Self {
        let rules = Arc::new(rules);
        State {
            board,
            houses: rules.houses,
            player,
            takasia: None,
            last_stop: None,
            rules,
            transitions: OnceLock::new(),
        }
    }

    /// Returns this position with the given house flags.
    pub fn with_houses(mut self, houses: PerField<bool>) -> Self {
        self.houses = houses;
        self.transitions = OnceLock::new();
        self
    }

    /// Returns this position with the given anti-repetition hole.
    pub fn with_takasia(mut self, takasia: Option<Hole>) -> Self {
        self.takasia = takasia;
        self.transitions = OnceLock::new();
        self
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// An independent copy of the board.
    pub fn board_snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn current_player(&self) -> Field {
        self.player
    }

    pub fn has_house(&self, field: Field) -> bool {
        self.houses[field]
    }

    pub fn houses(&self) -> PerField<bool> {
        self.houses
    }

    pub fn takasia(&self) -> Option<Hole> {
        self.takasia
    }

    /// How the move that produced this position ended.
    pub fn last_stop(&self) -> Option<Stop> {
        self.last_stop
    }

    /// True while the mover still has seeds in their store (namua phase).
    pub fn in_sowing_phase(&self) -> bool {
        self.board.store(self.player) > 0
    }

    /// The generated move set, computed on first use.
    pub fn transitions(&self) -> Result<&Transitions, GameError> {
        if let Some(transitions) = self.transitions.get() {
            return Ok(transitions);
        }
        let generated = self.generate()?;
        Ok(self.transitions.get_or_init(|| generated))
    }

    /// Every move the mover may attempt, mapped to its result.
    pub fn legal_moves(&self) -> Result<&BTreeMap<Move, Transition>, GameError> {
        Ok(&self.transitions()?.moves)
    }

    /// Moves of the move set that complete within the long-move limit.
    pub fn playable_moves(&self) -> Result<Vec<Move>, GameError> {
        Ok(self
            .legal_moves()?
            .iter()
            .filter(|(_, t)| t.is_legal())
            .map(|(mv, _)| *mv)
            .collect())
    }

    pub fn turn_kind(&self) -> Result<TurnKind, GameError> {
        Ok(self.transitions()?.kind)
    }

    pub fn is_mtaji(&self) -> Result<bool, GameError> {
        Ok(self.turn_kind()? == TurnKind::Mtaji)
    }

    /// True for takata turns: no capture is available and the mover is
    /// held to a non-capturing move bounded by the long-move limit.
    pub fn is_forced_turn(&self) -> Result<bool, GameError> {
        Ok(self.turn_kind()? == TurnKind::Takata)
    }

    /// Looks `mv` up in the move set.
    pub fn outcome(&self, mv: &Move) -> Result<MoveOutcome<'_>, GameError> {
        Ok(match self.legal_moves()?.get(mv) {
            Some(Transition::Legal(child)) => MoveOutcome::Legal(child),
            Some(Transition::TooLong) => MoveOutcome::TooLong,
            Some(Transition::Overrun { steps }) => MoveOutcome::Overrun { steps: *steps },
            None => MoveOutcome::NotApplicable,
        })
    }

    /// The position `mv` leads to.
    pub fn child(&self, mv: &Move) -> Result<&State, GameError> {
        match self.outcome(mv)? {
            MoveOutcome::Legal(child) => Ok(child),
            MoveOutcome::TooLong => Err(GameError::LongMove(*mv)),
            MoveOutcome::Overrun { steps } => Err(GameError::ExecutionOverrun { steps }),
            MoveOutcome::NotApplicable => Err(GameError::IllegalMove(*mv)),
        }
    }

    /// Resolves a move as typed by a player to its modifier-qualified legal
    /// form: the move itself, else with `>`, else with `$`.
    pub fn closest_legal(&self, mv: Move) -> Result<Option<Move>, GameError> {
        let moves = self.legal_moves()?;
        Ok([mv, mv.with_modifier(Modifier::SowAll), mv.with_modifier(Modifier::ForcedEnd)]
            .into_iter()
            .find(|candidate| moves.contains_key(candidate)))
    }

    /// True when the mover has no move that completes.
    pub fn is_game_over(&self) -> Result<bool, GameError> {
        Ok(!self.legal_moves()?.values().any(Transition::is_legal))
    }

    /// Plays `mv` on a copy of this position, reporting every seed
    /// relocation to `observer` as `(hole, new count)`.
    ///
    /// The move must be in the move set; moves over the long-move limit fail
    /// with `LongMove` and endless walks with `ExecutionOverrun`. `self` is
    /// never modified.
    pub fn execute<F>(&self, mv: Move, mut observer: F) -> Result<State, GameError>
    where
        F: FnMut(Hole, u32),
    {
        let kind = self.turn_kind()?;
        match self.outcome(&mv)? {
            MoveOutcome::NotApplicable => return Err(GameError::IllegalMove(mv)),
            MoveOutcome::TooLong => return Err(GameError::LongMove(mv)),
            MoveOutcome::Overrun { steps } => return Err(GameError::ExecutionOverrun { steps }),
            MoveOutcome::Legal(_) => {}
        }
        let mut next = self.clone();
        match next.apply(mv, kind, &mut observer)? {
            Applied::Done => Ok(next),
            Applied::TooLong => Err(GameError::LongMove(mv)),
            Applied::Rejected => Err(GameError::IllegalMove(mv)),
        }
    }
}

impl Clone for State {
    /// Copies the position; the move-set cache is not carried over.
    fn clone(&self) -> Self {
        State {
            board: self.board.clone(),
            houses: self.houses,
            player: self.player,
            takasia: self.takasia,
            last_stop: self.last_stop,
            rules: Arc::clone(&self.rules),
            transitions: OnceLock::new(),
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.houses == other.houses
            && self.player == other.player
            && self.takasia == other.takasia
            && self.last_stop == other.last_stop
            && self.rules == other.rules
    }
}

impl Eq for State {}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("board", &self.board.to_string())
            .field("houses", &self.houses)
            .field("player", &self.player)
            .field("takasia", &self.takasia)
            .field("last_stop", &self.last_stop)
            .finish_non_exhaustive()
    }
}
