//! Heuristic position evaluation.
//!
//! Scores a position by material and safety: every seed on the scoring
//! side's field (store included) counts one point, and so does every rival
//! hole too small to start a capture from.

use crate::board::{Field, Hole};
use crate::game::State;

/// Score of a won position. A side with no playable move has lost.
pub const WIN_SCORE: i32 = 10_000;

/// Returns true if `hole` is harmless to its owner's opponent in the given
/// phase: empty while sowing from the store, at most one seed afterwards.
fn is_safe(count: u32, sowing_phase: bool) -> bool {
    if sowing_phase {
        count == 0
    } else {
        count <= 1
    }
}

/// Counts the holes of `field` that cannot start a capture.
pub fn safe_holes(field: Field, state: &State) -> i32 {
    let sowing_phase = state.in_sowing_phase();
    field
        .holes()
        .filter(|&hole: &Hole| is_safe(state.board().get(hole), sowing_phase))
        .count() as i32
}

/// Evaluates `state` from `field`'s perspective.
pub fn evaluate(field: Field, state: &State) -> i32 {
    let material = state.board().field_seeds(field) as i32;
    material + safe_holes(field.rival(), state)
}

/// Evaluates `state` for the side to move, the form negamax expects.
pub fn evaluate_for_mover(state: &State) -> i32 {
    evaluate(state.current_player(), state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, PerField};
    use crate::rules::{Rules, Variant};

    #[test]
    fn opening_is_symmetric() {
        for variant in [Variant::Ntchuwa, Variant::Yabambo, Variant::Yawana] {
            let state = State::new(variant.rules());
            assert_eq!(
                evaluate(Field::Upper, &state),
                evaluate(Field::Lower, &state),
                "{variant}"
            );
        }
    }

    #[test]
    fn ntchuwa_opening_score() {
        let state = State::new(Variant::Ntchuwa.rules());
        // 8 front seeds + 24 in store, plus 8 empty rival back-row holes.
        assert_eq!(evaluate(Field::Upper, &state), 40);
    }

    #[test]
    fn single_seeds_are_safe_after_sowing() {
        let rules = Rules { layout: Default::default(), houses: PerField::both(false), ..Variant::Yawana.rules() };
        let mut board = Board::empty();
        board.set_named("A1", 3).unwrap();
        board.set_named("a1", 1).unwrap();
        board.set_named("a2", 2).unwrap();
        let state = State::from_position(rules, board, Field::Upper);
        assert_eq!(safe_holes(Field::Lower, &state), 15);
        assert_eq!(evaluate(Field::Upper, &state), 3 + 15);
        assert_eq!(evaluate_for_mover(&state), evaluate(Field::Upper, &state));
    }
}
