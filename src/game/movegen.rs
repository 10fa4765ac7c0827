//! Legal move generation.
//!
//! Every candidate is ranked and only the best-ranked class survives:
//! capturing (mtaji) moves first, then, depending on the phase, the house or
//! ordinary front-row moves, and back-row moves last. Each surviving
//! candidate is executed on a copy to find its resulting position; a
//! candidate whose walk never ends stays in the set as an overrun.

use std::collections::BTreeMap;

use crate::board::{Direction, Hole, Modifier, Move};

use super::sowing::Applied;
use super::state::{State, Transition, Transitions, TurnKind};
use super::GameError;

/// Precedence class of a candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Mtaji,
    House,
    FrontRow,
    BackRow,
}

impl Class {
    /// Higher ranks pre-empt lower ones. While sowing from the store the
    /// house outranks the rest of the front row; afterwards it only plays
    /// when no other front-row move exists.
    fn rank(self, sowing_phase: bool) -> u8 {
        match (self, sowing_phase) {
            (Class::Mtaji, _) => 4,
            (Class::House, true) | (Class::FrontRow, false) => 3,
            (Class::FrontRow, true) | (Class::House, false) => 2,
            (Class::BackRow, _) => 1,
        }
    }
}

impl State {
    pub(crate) fn generate(&self) -> Result<Transitions, GameError> {
        if let Some(direction) = self.last_stop.and_then(|stop| stop.house_direction()) {
            return self.continuation(direction);
        }

        let field = self.player;
        if field.front_holes().all(|hole| self.board.get(hole) == 0) {
            return Ok(Transitions { kind: TurnKind::Takata, moves: BTreeMap::new() });
        }

        let sowing_phase = self.in_sowing_phase();
        let mut best_rank = 0;
        let mut candidates = Vec::new();
        for direction in [Direction::Left, Direction::Right] {
            for hole in field.holes() {
                if !self.is_playable(hole, sowing_phase) {
                    continue;
                }
                let mv = Move::new(hole, direction);
                let class = self.classify(mv, sowing_phase);
                let rank = class.rank(sowing_phase);
                if rank > best_rank {
                    best_rank = rank;
                    candidates.clear();
                }
                if rank == best_rank {
                    candidates.push(self.qualify(mv, class, sowing_phase));
                }
            }
        }

        let kind = if best_rank == Class::Mtaji.rank(sowing_phase) {
            TurnKind::Mtaji
        } else {
            TurnKind::Takata
        };
        self.expand(candidates, kind)
    }

    /// After a mtaji move paused in the house, the mover either sows the
    /// whole house onward or ends the turn.
    fn continuation(&self, direction: Direction) -> Result<Transitions, GameError> {
        let house = Move::new(self.player.house(), direction);
        let candidates = vec![
            house.with_modifier(Modifier::SowAll),
            house.with_modifier(Modifier::ForcedEnd),
        ];
        self.expand(candidates, TurnKind::Mtaji)
    }

    fn expand(&self, candidates: Vec<Move>, kind: TurnKind) -> Result<Transitions, GameError> {
        let mut moves = BTreeMap::new();
        for mv in candidates {
            let mut child = self.clone();
            match child.apply(mv, kind, &mut |_, _| {}) {
                Ok(Applied::Done) => {
                    moves.insert(mv, Transition::Legal(child));
                }
                Ok(Applied::TooLong) => {
                    moves.insert(mv, Transition::TooLong);
                }
                Ok(Applied::Rejected) => {}
                Err(GameError::ExecutionOverrun { steps }) => {
                    moves.insert(mv, Transition::Overrun { steps });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Transitions { kind, moves })
    }

    fn is_playable(&self, hole: Hole, sowing_phase: bool) -> bool {
        let count = self.board.get(hole);
        if sowing_phase {
            hole.in_front_row() && count > 0
        } else {
            count > 1
        }
    }

    fn classify(&self, mv: Move, sowing_phase: bool) -> Class {
        if self.captures(mv, sowing_phase) {
            Class::Mtaji
        } else if mv.hole.in_back_row() {
            Class::BackRow
        } else if mv.hole.is_house() && self.houses[self.player] {
            Class::House
        } else {
            Class::FrontRow
        }
    }

    /// True if `mv` ends its first lap on a front-row hole facing seeds.
    fn captures(&self, mv: Move, sowing_phase: bool) -> bool {
        let count = self.board.get(mv.hole);
        if sowing_phase {
            return mv.hole.in_front_row() && count > 0 && self.board.get(mv.hole.rival()) > 0;
        }
        if count < 2 || count > self.rules.mtaji_seed_ceiling {
            return false;
        }
        let end = mv.marker_hole(count);
        end.in_front_row() && self.board.get(end) > 0 && self.board.get(end.rival()) > 0
    }

    /// Attaches the house modifier where one is required. A standing house
    /// is always sown whole after the sowing phase; during it, only once it
    /// has dropped below its starting count.
    fn qualify(&self, mv: Move, class: Class, sowing_phase: bool) -> Move {
        if !(mv.hole.is_house() && self.houses[self.player]) {
            return mv;
        }
        let depleted = self.board.get(mv.hole) < self.rules.initial_seeds(mv.hole);
        if !sowing_phase || (class == Class::House && depleted) {
            mv.with_modifier(Modifier::SowAll)
        } else {
            mv
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Field, PerField};
    use crate::game::sowing::Stop;
    use crate::rules::{Rules, Variant};

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    fn tokens(state: &State) -> Vec<String> {
        state.legal_moves().unwrap().keys().map(|m| m.to_string()).collect()
    }

    fn post_sowing(houses: PerField<bool>, seeds: &[(&str, u32)]) -> State {
        let rules = Rules { layout: Default::default(), houses, ..Variant::Yawana.rules() };
        let mut board = Board::empty();
        for (name, count) in seeds {
            board.set_named(name, *count).unwrap();
        }
        State::from_position(rules, board, Field::Upper)
    }

    #[test]
    fn ntchuwa_opening_is_all_captures() {
        let state = State::new(Variant::Ntchuwa.rules());
        assert_eq!(state.legal_moves().unwrap().len(), 16);
        assert!(state.is_mtaji().unwrap());
        assert!(!state.is_forced_turn().unwrap());
        assert!(state.legal_moves().unwrap().keys().all(|m| m.hole.in_front_row()));
    }

    #[test]
    fn yabambo_opening_plays_the_house() {
        let state = State::new(Variant::Yabambo.rules());
        assert_eq!(tokens(&state), ["A5L", "A5R"]);
        assert!(state.is_forced_turn().unwrap());
    }

    #[test]
    fn yawana_opening_captures() {
        let state = State::new(Variant::Yawana.rules());
        assert!(state.is_mtaji().unwrap());
        assert!(!state.legal_moves().unwrap().is_empty());
    }

    #[test]
    fn capture_preempts_takata() {
        let state = post_sowing(PerField::both(false), &[("A1", 2), ("A3", 1), ("A8", 3), ("a6", 2)]);
        assert_eq!(tokens(&state), ["A1R"]);
        assert!(state.is_mtaji().unwrap());
    }

    #[test]
    fn front_row_preempts_back_row() {
        let state = post_sowing(PerField::both(false), &[("A2", 2), ("B4", 3)]);
        assert_eq!(tokens(&state), ["A2L", "A2R"]);
        assert!(state.is_forced_turn().unwrap());
    }

    #[test]
    fn back_row_plays_when_front_row_cannot() {
        let state = post_sowing(PerField::both(false), &[("A2", 1), ("B4", 3)]);
        assert_eq!(tokens(&state), ["B4L", "B4R"]);
    }

    #[test]
    fn house_yields_to_front_row_after_sowing() {
        let houses = PerField::new(true, false);
        let state = post_sowing(houses, &[("A5", 6), ("A1", 2)]);
        assert_eq!(tokens(&state), ["A1L", "A1R"]);

        let state = post_sowing(houses, &[("A5", 6), ("B1", 2)]);
        assert_eq!(tokens(&state), ["A5L>", "A5R>"]);
    }

    #[test]
    fn depleted_house_is_sown_whole_while_sowing() {
        let rules = Variant::Yabambo.rules();
        let mut board = rules.initial_board();
        board.set_named("A5", 9).unwrap();
        board.set_named("A1", 1).unwrap();
        let state = State::from_position(rules, board, Field::Upper);
        assert_eq!(tokens(&state), ["A5L>", "A5R>"]);
    }

    #[test]
    fn empty_front_row_ends_game() {
        let state = post_sowing(PerField::both(false), &[("B1", 3), ("a1", 2)]);
        assert!(state.legal_moves().unwrap().is_empty());
        assert!(state.is_game_over().unwrap());
    }

    #[test]
    fn paused_house_offers_continuation() {
        let houses = PerField::new(true, false);
        let state = post_sowing(houses, &[("A1", 2), ("A3", 1), ("A5", 3), ("a6", 5)]);
        let paused = state.child(&mv("A1R")).unwrap();
        assert_eq!(paused.last_stop(), Some(Stop::HouseRight));
        assert_eq!(tokens(paused), ["A5R>", "A5R$"]);
        assert!(paused.is_mtaji().unwrap());

        let ended = paused.child(&mv("A5R$")).unwrap();
        assert_eq!(ended.current_player(), Field::Lower);
        assert!(ended.has_house(Field::Upper));
    }

    #[test]
    fn generation_is_deterministic() {
        let state = State::new(Variant::Yawana.rules());
        let first = state.legal_moves().unwrap().clone();
        let again = state.clone();
        assert_eq!(again.legal_moves().unwrap(), &first);
    }
}
