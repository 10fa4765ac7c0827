//! Self-play game generation.
//!
//! Plays complete games with the engine on both sides, optionally mixing in
//! random moves for variety, and records every game as a `GameRecord`.
//! Seed conservation is checked after every move.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Field};
use crate::game::{new_game, GameError, Transition};
use crate::rules::Variant;
use crate::search::{random_move, search, SearchLimits};

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Variant every game is played under.
    pub variant: Variant,
    /// Search depth per move in plies.
    pub depth: u32,
    /// Moves after which a game is abandoned.
    pub max_plies: usize,
    /// Probability of playing a random move instead of the searched one.
    pub random_move_rate: f64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            variant: Variant::Ntchuwa,
            depth: 3,
            max_plies: 300,
            random_move_rate: 0.1,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// How a recorded game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The side to move had no playable move.
    GameOver,
    /// The ply cap was reached.
    MoveCap,
    /// The side to move was left only with walks that never end.
    Overrun,
}

/// A complete self-play game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    pub variant: String,
    /// Move labels in order, takata moves marked with `*`.
    pub moves: Vec<String>,
    /// The side that left its opponent without a move, if any.
    pub winner: Option<Field>,
    pub termination: Termination,
    pub final_board: Board,
}

/// Errors that abort a self-play game.
#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("seed count changed after ply {ply}: expected {expected}, found {found}")]
    SeedsNotConserved { ply: usize, expected: u32, found: u32 },
}

/// Plays a single self-play game and returns the game record.
pub fn play_game(
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameRecord, SelfPlayError> {
    let mut history = new_game(config.variant.rules());
    let expected = history.current().board().total_seeds();
    let limits = SearchLimits { depth: config.depth, movetime: None };
    let stop = AtomicBool::new(false);
    let mut null_out = std::io::sink();
    let mut winner = None;

    let termination = loop {
        if history.ply() >= config.max_plies {
            break Termination::MoveCap;
        }
        let state = history.current();
        if state.is_game_over()? {
            let overrun = state
                .legal_moves()?
                .values()
                .any(|t| matches!(t, Transition::Overrun { .. }));
            if overrun {
                break Termination::Overrun;
            }
            winner = Some(state.current_player().rival());
            break Termination::GameOver;
        }

        let choice = if rng.gen::<f64>() < config.random_move_rate {
            random_move(state, rng)
        } else {
            search(state, &limits, &mut null_out, &stop).map(|result| result.best)
        };
        let Some(mv) = choice? else {
            break Termination::GameOver;
        };
        history.branch(mv, false)?;

        let found = history.current().board().total_seeds();
        if found != expected {
            return Err(SelfPlayError::SeedsNotConserved { ply: history.ply(), expected, found });
        }
    };

    Ok(GameRecord {
        game_id,
        variant: config.variant.name().to_string(),
        moves: history.labels(),
        winner,
        termination,
        final_board: history.current().board_snapshot(),
    })
}

fn game_rng(seed: u64, game_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn report(game: &Result<GameRecord, SelfPlayError>, n: usize, total: usize, elapsed: f64) {
    match game {
        Ok(game) => {
            let outcome = match game.winner {
                Some(field) => format!("{} wins", field),
                None => "no result".to_string(),
            };
            eprintln!(
                "Game {}/{}: {} after {} moves ({:.1}s)",
                n,
                total,
                outcome,
                game.moves.len(),
                elapsed
            );
        }
        Err(e) => eprintln!("Game {}/{}: aborted: {}", n, total, e),
    }
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
/// Aborted games are reported to stderr and left out.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    });
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs self-play generation, calling `on_game` with each completed game record.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let mut rng = game_rng(config.seed, i);
        let game_start = Instant::now();
        let game = play_game(config, i, &mut rng);
        if !config.quiet || game.is_err() {
            report(&game, i + 1, config.num_games, game_start.elapsed().as_secs_f64());
        }
        if let Ok(game) = game {
            on_game(game);
        }
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback on this thread.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("selfplay: cannot build thread pool ({}); playing sequentially", e);
            return run_self_play_sequential(config, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        let completed = &completed;
        scope.spawn(move || {
            pool.install(|| {
                (0..config.num_games).into_par_iter().for_each_with(tx, |tx, i| {
                    let mut rng = game_rng(config.seed, i);
                    let game_start = Instant::now();
                    let game = play_game(config, i, &mut rng);
                    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if !config.quiet || game.is_err() {
                        report(&game, n, config.num_games, game_start.elapsed().as_secs_f64());
                    }
                    if let Ok(game) = game {
                        let _ = tx.send(game);
                    }
                });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let wins = |field| games.iter().filter(|g| g.winner == Some(field)).count();
    let ended = |t| games.iter().filter(|g| g.termination == t).count();
    let total_moves: usize = games.iter().map(|g| g.moves.len()).sum();

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Avg moves/game: {:.1}", total_moves as f64 / total.max(1) as f64);
    for field in [Field::Upper, Field::Lower] {
        let n = wins(field);
        eprintln!(
            "  {:>2} wins: {} ({:.1}%)",
            field,
            n,
            100.0 * n as f64 / total.max(1) as f64
        );
    }
    eprintln!("Move cap reached: {}", ended(Termination::MoveCap));
    eprintln!("Overruns: {}", ended(Termination::Overrun));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(variant: Variant) -> SelfPlayConfig {
        SelfPlayConfig {
            num_games: 2,
            variant,
            depth: 1,
            max_plies: 40,
            random_move_rate: 0.5,
            threads: 1,
            seed: 42,
            quiet: true,
        }
    }

    #[test]
    fn play_single_game_completes() {
        for variant in [Variant::Ntchuwa, Variant::Yabambo, Variant::Yawana] {
            let config = quick_config(variant);
            let mut rng = SmallRng::seed_from_u64(42);
            let game = play_game(&config, 0, &mut rng).unwrap();
            assert!(game.moves.len() <= config.max_plies);
            assert_eq!(game.final_board.total_seeds(), variant.rules().initial_board().total_seeds());
            if game.termination == Termination::MoveCap {
                assert_eq!(game.moves.len(), config.max_plies);
            }
        }
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let config = quick_config(Variant::Yawana);
        let a = play_game(&config, 0, &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = play_game(&config, 0, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn run_self_play_collects_every_game() {
        let games = run_self_play(&quick_config(Variant::Ntchuwa));
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, 0);
        assert_eq!(games[1].game_id, 1);
    }

    #[test]
    fn parallel_run_collects_every_game() {
        let config = SelfPlayConfig { threads: 2, num_games: 3, ..quick_config(Variant::Yawana) };
        let games = run_self_play(&config);
        assert_eq!(games.len(), 3);
    }

    #[test]
    fn jsonl_has_one_game_per_line() {
        let games = run_self_play(&quick_config(Variant::Ntchuwa));
        let mut out = Vec::new();
        write_jsonl(&games, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), games.len());
        let back: GameRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(back, games[0]);
    }
}
