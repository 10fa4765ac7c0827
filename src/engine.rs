//! Engine state management.
//!
//! Holds the game being played, engine options and the random source, and
//! answers the protocol commands that query or change them.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::Field;
use crate::game::{new_game, History, Transition};
use crate::protocol::GoParams;
use crate::rules::{Rules, RulesError, Variant};
use crate::search::{random_move, search, SearchLimits, SearchResult, DEFAULT_DEPTH};

/// Default number of search threads.
const DEFAULT_THREADS: usize = 1;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub history: History,
    pub options: HashMap<String, String>,
    rng: SmallRng,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine with a fresh ntchuwa game.
    pub fn new() -> Self {
        Engine {
            history: new_game(Variant::Ntchuwa.rules()),
            options: HashMap::new(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Starts a new game of `variant` (ntchuwa by default).
    pub fn new_game(&mut self, variant: Option<Variant>, starting_field: Option<Field>) {
        let mut rules = variant.unwrap_or(Variant::Ntchuwa).rules();
        if let Some(field) = starting_field {
            rules = rules.starting_with(field);
        }
        self.history = new_game(rules);
    }

    /// Starts a new game from a JSON rules descriptor. On error the current
    /// game is kept.
    pub fn set_rules(&mut self, json: &str) -> Result<(), RulesError> {
        self.history = new_game(Rules::from_json(json)?);
        Ok(())
    }

    /// Sets an engine option. Setting `Seed` reseeds the random source.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        if name == "Seed" {
            self.rng = match value.as_deref().and_then(|v| v.parse::<u64>().ok()) {
                Some(seed) if seed != 0 => SmallRng::seed_from_u64(seed),
                _ => SmallRng::from_entropy(),
            };
        }
        self.options.insert(name, value.unwrap_or_default());
    }

    fn option<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.options.get(name).and_then(|v| v.parse::<T>().ok())
    }

    /// Returns the configured search depth from options, or the default.
    fn depth(&self) -> u32 {
        self.option("PonderDepth").unwrap_or(DEFAULT_DEPTH).max(1)
    }

    /// Returns the configured thread count from options, or the default.
    fn threads(&self) -> usize {
        self.option("Threads").unwrap_or(DEFAULT_THREADS).max(1)
    }

    /// Handles the handshake: writes id, options, protocol_version, and baook.
    pub fn handle_bao<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name bawo")?;
        writeln!(out, "id author bawo")?;
        writeln!(
            out,
            "option name PonderDepth type spin default {} min 1 max 12",
            DEFAULT_DEPTH
        )?;
        writeln!(
            out,
            "option name Threads type spin default {} min 1 max 64",
            DEFAULT_THREADS
        )?;
        writeln!(out, "option name Seed type spin default 0 min 0")?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "baook")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `move <label>`: plays the move or reports why it was refused.
    pub fn handle_move<W: Write>(&mut self, label: &str, out: &mut W) -> io::Result<()> {
        match self.history.branch_label(label, true) {
            Ok(node) => writeln!(out, "accepted {}", node.label().unwrap_or_default())?,
            Err(e) => writeln!(out, "rejected {}", e)?,
        }
        out.flush()
    }

    /// Handles `undo`.
    pub fn handle_undo<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.history.ply() == 0 {
            writeln!(out, "rejected nothing to undo")?;
        } else {
            let node = self.history.pop();
            writeln!(out, "undone {}", node.label().unwrap_or_default())?;
        }
        out.flush()
    }

    /// Handles `moves`: lists the move set, too-long moves suffixed `!` and
    /// endless ones `?`.
    pub fn handle_moves<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.history.current().legal_moves() {
            Ok(moves) => {
                write!(out, "moves")?;
                for (mv, transition) in moves {
                    match transition {
                        Transition::Legal(_) => write!(out, " {}", mv)?,
                        Transition::TooLong => write!(out, " {}!", mv)?,
                        Transition::Overrun { .. } => write!(out, " {}?", mv)?,
                    }
                }
                writeln!(out)?;
            }
            Err(e) => writeln!(out, "error {}", e)?,
        }
        out.flush()
    }

    /// Handles `board`: the position and the side to move.
    pub fn handle_board<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let state = self.history.current();
        writeln!(out, "board {}", state.board())?;
        writeln!(out, "player {}", state.current_player())?;
        out.flush()
    }

    /// Runs the search for the current position on the configured threads.
    fn run_search(
        &self,
        limits: &SearchLimits,
        info: &mut Vec<u8>,
        stop: &AtomicBool,
    ) -> Option<SearchResult> {
        let state = self.history.current();
        let result = match rayon::ThreadPoolBuilder::new().num_threads(self.threads()).build() {
            Ok(pool) => pool.install(|| search(state, limits, info, stop)),
            Err(e) => {
                eprintln!("go: cannot build thread pool ({}); searching on the global pool", e);
                search(state, limits, info, stop)
            }
        };
        match result {
            Ok(result) => Some(result),
            Err(e) => {
                eprintln!("go: search failed: {}", e);
                None
            }
        }
    }

    /// Handles the `go` command. Setting `stop` ends the search early with
    /// the best move found so far. Falls back to a random move if the search
    /// fails.
    pub fn handle_go<W: Write>(
        &mut self,
        params: &GoParams,
        out: &mut W,
        stop: &AtomicBool,
    ) -> io::Result<()> {
        let limits = SearchLimits {
            depth: params.depth.unwrap_or_else(|| self.depth()).max(1),
            movetime: params.movetime.map(Duration::from_millis),
        };

        let mut info = Vec::new();
        let best = match self.run_search(&limits, &mut info, stop) {
            Some(result) => result.best,
            None => random_move(self.history.current(), &mut self.rng).unwrap_or(None),
        };
        out.write_all(&info)?;

        match best {
            Some(mv) => writeln!(out, "bestmove {}", mv)?,
            None => writeln!(out, "bestmove none")?,
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn new_engine_starts_ntchuwa() {
        let engine = Engine::new();
        assert_eq!(engine.history.len(), 1);
        assert!(engine.options.is_empty());
        assert_eq!(engine.history.current().board().store(Field::Upper), 24);
    }

    #[test]
    fn new_game_picks_variant_and_side() {
        let mut engine = Engine::new();
        engine.new_game(Some(Variant::Yabambo), Some(Field::Lower));
        let state = engine.history.current();
        assert_eq!(state.current_player(), Field::Lower);
        assert!(state.has_house(Field::Upper));
    }

    #[test]
    fn set_rules_rejects_bad_json() {
        let mut engine = Engine::new();
        engine.handle_move("A1L", &mut Vec::new()).unwrap();
        assert!(engine.set_rules("{").is_err());
        assert_eq!(engine.history.len(), 2);
    }

    #[test]
    fn set_option_stores_value() {
        let mut engine = Engine::new();
        engine.set_option("PonderDepth".to_string(), Some("2".to_string()));
        engine.set_option("Seed".to_string(), Some("5".to_string()));
        assert_eq!(engine.options.get("PonderDepth"), Some(&"2".to_string()));
        assert_eq!(engine.depth(), 2);
        assert_eq!(engine.threads(), DEFAULT_THREADS);
    }

    #[test]
    fn handle_bao_outputs_handshake() {
        let engine = Engine::new();
        let text = output(|out| engine.handle_bao(out));
        assert!(text.contains("id name bawo"));
        assert!(text.contains("option name PonderDepth"));
        assert!(text.contains("protocol_version 1"));
        assert_eq!(text.lines().last(), Some("baook"));
    }

    #[test]
    fn handle_isready_outputs_readyok() {
        let engine = Engine::new();
        assert_eq!(output(|out| engine.handle_isready(out)).trim(), "readyok");
    }

    #[test]
    fn move_and_undo() {
        let mut engine = Engine::new();
        assert_eq!(output(|out| engine.handle_move("A1L", out)).trim(), "accepted A1L");
        assert!(output(|out| engine.handle_move("A1L", out)).starts_with("rejected "));
        assert!(output(|out| engine.handle_move("Q1L", out)).starts_with("rejected "));
        assert_eq!(output(|out| engine.handle_undo(out)).trim(), "undone A1L");
        assert_eq!(output(|out| engine.handle_undo(out)).trim(), "rejected nothing to undo");
    }

    #[test]
    fn takata_moves_are_accepted_with_marker() {
        let mut engine = Engine::new();
        engine.new_game(Some(Variant::Yabambo), None);
        assert_eq!(output(|out| engine.handle_move("A5L", out)).trim(), "accepted A5L*");
    }

    #[test]
    fn handle_moves_lists_tokens() {
        let mut engine = Engine::new();
        engine.new_game(Some(Variant::Yabambo), None);
        assert_eq!(output(|out| engine.handle_moves(out)).trim(), "moves A5L A5R");
    }

    #[test]
    fn handle_board_shows_player() {
        let engine = Engine::new();
        let text = output(|out| engine.handle_board(out));
        assert!(text.starts_with("board "));
        assert!(text.contains("player AB"));
    }

    #[test]
    fn handle_go_outputs_bestmove() {
        let mut engine = Engine::new();
        let params = GoParams { depth: Some(2), movetime: None };
        let text = output(|out| engine.handle_go(&params, out, &AtomicBool::new(false)));
        assert!(text.contains("info depth"), "got: {text}");
        let best = text
            .lines()
            .find_map(|l| l.strip_prefix("bestmove "))
            .unwrap();
        let mv = best.parse().unwrap();
        assert!(engine.history.current().child(&mv).is_ok());
    }

    #[test]
    fn stopped_go_still_answers() {
        let mut engine = Engine::new();
        let params = GoParams { depth: Some(8), movetime: None };
        let text = output(|out| engine.handle_go(&params, out, &AtomicBool::new(true)));
        assert!(!text.contains("info depth"), "got: {text}");
        let best = text.lines().find_map(|l| l.strip_prefix("bestmove ")).unwrap();
        let mv = best.parse().unwrap();
        assert!(engine.history.current().child(&mv).is_ok());
    }

    #[test]
    fn handle_moves_marks_endless_walks() {
        let json = r#"{"layout": {"B1": 5, "B2": 2, "B4": 3, "B6": 3, "B7": 3, "A7": 1, "A8": 1,
            "a1": 4, "a2": 3, "a3": 7, "a4": 2, "a5": 6, "a7": 1, "a8": 3,
            "b1": 1, "b2": 2, "b3": 7, "b4": 2, "b5": 1, "b6": 2, "b7": 1, "b8": 4},
            "houses": {"upper": false, "lower": false}, "starting_field": "lower"}"#;
        let mut engine = Engine::new();
        engine.set_rules(json).unwrap();
        let text = output(|out| engine.handle_moves(out));
        let tokens: Vec<&str> = text.trim().split(' ').skip(1).collect();
        assert!(tokens.contains(&"a4L?"), "got: {text}");
        assert!(tokens.contains(&"b2L"), "got: {text}");
    }
}
