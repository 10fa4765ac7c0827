//! Negamax search with alpha-beta pruning.
//!
//! Root moves are scored in parallel; below the root the search is
//! sequential. A move that leaves the same side to move (a turn paused in
//! the house) is searched one ply deeper without flipping the score.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::board::Move;
use crate::eval::{evaluate_for_mover, WIN_SCORE};
use crate::game::{GameError, State, Transition};

/// Window bound beyond any reachable score.
const INFINITY: i32 = WIN_SCORE + 1;

/// Default search depth in plies.
pub const DEFAULT_DEPTH: u32 = 4;

/// Constraints for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: u32,
    pub movetime: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits { depth: DEFAULT_DEPTH, movetime: None }
    }
}

/// Search statistics emitted via `info` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: u32,
    pub nodes: u64,
    pub score: i32,
    pub elapsed_ms: u64,
}

/// Result of a search: the best move found and associated info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the side to move has no playable move.
    pub best: Option<Move>,
    pub score: i32,
    pub nodes: u64,
    /// Deepest iteration that completed.
    pub depth: u32,
}

struct Context<'a> {
    nodes: AtomicU64,
    stop: &'a AtomicBool,
    deadline: Option<Instant>,
}

impl Context<'_> {
    fn cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Runs an iteratively deepened negamax search from `state`.
///
/// Emits one `info` line per completed depth to `out`. An iteration
/// interrupted by `stop` or the time limit is discarded; the result then
/// comes from the last completed depth.
pub fn search<W: Write>(
    state: &State,
    limits: &SearchLimits,
    out: &mut W,
    stop: &AtomicBool,
) -> Result<SearchResult, GameError> {
    let start = Instant::now();
    let ctx = Context {
        nodes: AtomicU64::new(0),
        stop,
        deadline: limits.movetime.map(|t| start + t),
    };

    // Searched subtrees stay cached on the root; keep them off the caller's state.
    let root = state.clone();
    let mut result = SearchResult { best: None, score: 0, nodes: 0, depth: 0 };
    if root.is_game_over()? {
        result.score = -WIN_SCORE;
        return Ok(result);
    }

    for depth in 1..=limits.depth.max(1) {
        let Some((best, score)) = search_root(&root, depth, &ctx)? else {
            break;
        };
        result = SearchResult {
            best: Some(best),
            score,
            nodes: ctx.nodes.load(Ordering::Relaxed),
            depth,
        };
        let info = SearchInfo {
            depth,
            nodes: result.nodes,
            score,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        let _ = writeln!(
            out,
            "info depth {} nodes {} score {} time {} pv {}",
            info.depth, info.nodes, info.score, info.elapsed_ms, best
        );
        if score.abs() >= WIN_SCORE {
            break;
        }
    }

    if result.best.is_none() {
        // Interrupted before depth 1 finished: fall back to the first move.
        result.best = root.playable_moves()?.first().copied();
        result.nodes = ctx.nodes.load(Ordering::Relaxed);
    }
    Ok(result)
}

/// Scores every root move in parallel. Returns `None` when cancelled.
fn search_root(state: &State, depth: u32, ctx: &Context) -> Result<Option<(Move, i32)>, GameError> {
    let moves: Vec<(Move, &State)> = state
        .legal_moves()?
        .iter()
        .filter_map(|(mv, t)| t.state().map(|child| (*mv, child)))
        .collect();

    let scored = moves
        .into_par_iter()
        .map(|(mv, child)| -> Result<(Move, i32), GameError> {
            Ok((mv, score_child(state, child, depth, -INFINITY, INFINITY, ctx)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ctx.cancelled() {
        return Ok(None);
    }
    // Ties go to the first move in move order.
    Ok(scored
        .into_iter()
        .fold(None, |best: Option<(Move, i32)>, (mv, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((mv, score)),
        }))
}

/// Scores `child` from the perspective of the side to move in `parent`.
fn score_child(
    parent: &State,
    child: &State,
    depth: u32,
    alpha: i32,
    beta: i32,
    ctx: &Context,
) -> Result<i32, GameError> {
    if child.current_player() == parent.current_player() {
        negamax(child, depth, alpha, beta, ctx)
    } else {
        Ok(-negamax(child, depth - 1, -beta, -alpha, ctx)?)
    }
}

fn negamax(state: &State, depth: u32, mut alpha: i32, beta: i32, ctx: &Context) -> Result<i32, GameError> {
    ctx.nodes.fetch_add(1, Ordering::Relaxed);
    if ctx.cancelled() {
        return Ok(0);
    }

    let children: Vec<&State> = state.legal_moves()?.values().filter_map(Transition::state).collect();
    if children.is_empty() {
        return Ok(-WIN_SCORE);
    }
    if depth == 0 {
        return Ok(evaluate_for_mover(state));
    }

    let mut best = -INFINITY;
    for child in children {
        let score = score_child(state, child, depth, alpha, beta, ctx)?;
        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    Ok(best)
}

/// Picks a uniformly random playable move, or `None` if there is none.
pub fn random_move<R: Rng>(state: &State, rng: &mut R) -> Result<Option<Move>, GameError> {
    Ok(state.playable_moves()?.choose(rng).copied())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::board::{Board, Field, PerField};
    use crate::rules::{Rules, Variant};

    fn limits(depth: u32) -> SearchLimits {
        SearchLimits { depth, movetime: None }
    }

    #[test]
    fn search_returns_a_legal_move() {
        let state = State::new(Variant::Ntchuwa.rules());
        let mut out = Vec::new();
        let result = search(&state, &limits(2), &mut out, &AtomicBool::new(false)).unwrap();
        let best = result.best.expect("opening has moves");
        assert!(state.child(&best).is_ok());
        assert_eq!(result.depth, 2);
        assert!(result.nodes > 0);
    }

    #[test]
    fn search_emits_info_lines() {
        let state = State::new(Variant::Yawana.rules());
        let mut out = Vec::new();
        search(&state, &limits(2), &mut out, &AtomicBool::new(false)).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("info depth 1"), "got: {output}");
        assert!(output.contains("info depth 2"), "got: {output}");
    }

    #[test]
    fn search_does_not_fill_callers_cache_beyond_root() {
        let state = State::new(Variant::Ntchuwa.rules());
        search(&state, &limits(1), &mut Vec::new(), &AtomicBool::new(false)).unwrap();
        assert!(state.transitions.get().is_none());
    }

    #[test]
    fn stopped_search_still_answers() {
        let state = State::new(Variant::Ntchuwa.rules());
        let mut out = Vec::new();
        let result = search(&state, &limits(6), &mut out, &AtomicBool::new(true)).unwrap();
        assert_eq!(result.depth, 0);
        assert!(result.best.is_some());
        assert!(out.is_empty());
    }

    #[test]
    fn finished_game_has_no_best_move() {
        let rules = Rules { layout: Default::default(), houses: PerField::both(false), ..Variant::Yawana.rules() };
        let mut board = Board::empty();
        board.set_named("B1", 3).unwrap();
        board.set_named("a1", 2).unwrap();
        let state = State::from_position(rules, board, Field::Upper);
        let result = search(&state, &limits(3), &mut Vec::new(), &AtomicBool::new(false)).unwrap();
        assert_eq!(result.best, None);
        assert_eq!(result.score, -WIN_SCORE);
    }

    #[test]
    fn search_takes_winning_capture() {
        // Capturing a6 leaves Lower with a single-seed front row and no move.
        let rules = Rules { layout: Default::default(), houses: PerField::both(false), ..Variant::Yawana.rules() };
        let mut board = Board::empty();
        for (name, count) in [("A1", 2), ("A3", 1), ("A8", 3), ("a6", 2)] {
            board.set_named(name, count).unwrap();
        }
        let state = State::from_position(rules, board, Field::Upper);
        let result = search(&state, &limits(2), &mut Vec::new(), &AtomicBool::new(false)).unwrap();
        assert_eq!(result.best, Some("A1R".parse().unwrap()));
        assert_eq!(result.score, WIN_SCORE);
    }

    #[test]
    fn random_move_is_playable() {
        let state = State::new(Variant::Yawana.rules());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let mv = random_move(&state, &mut rng).unwrap().unwrap();
            assert!(state.child(&mv).is_ok());
        }
    }
}
