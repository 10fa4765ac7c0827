//! bawo -- a Bao/Bawo rules engine speaking a line-oriented protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use bawo::engine::Engine;
use bawo::protocol::parser::{parse_command, Command};
use bawo::protocol::GoParams;

/// How often input is polled for `stop` while a search runs.
const STOP_POLL: Duration = Duration::from_millis(10);

/// Reads stdin on its own thread so a running search can be stopped.
fn spawn_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Watches input until `searching` clears. `stop` raises the stop flag;
/// every other line is held back and returned.
fn watch(input: Receiver<String>, stop: &AtomicBool, searching: &AtomicBool) -> (Receiver<String>, Vec<String>) {
    let mut deferred = Vec::new();
    while searching.load(Ordering::Relaxed) {
        match input.recv_timeout(STOP_POLL) {
            Ok(line) => {
                if matches!(parse_command(&line), Some(Command::Stop)) {
                    stop.store(true, Ordering::Relaxed);
                } else {
                    deferred.push(line);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    (input, deferred)
}

/// A protocol session: the engine plus the input queue.
struct Session {
    engine: Engine,
    input: Option<Receiver<String>>,
    pending: VecDeque<String>,
}

impl Session {
    fn next_line(&mut self) -> Option<String> {
        match self.pending.pop_front() {
            Some(line) => Some(line),
            None => self.input.as_ref()?.recv().ok(),
        }
    }

    /// Dispatches one command. Returns `Ok(false)` when the session should end.
    fn dispatch<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<bool> {
        let engine = &mut self.engine;
        match cmd {
            Command::Bao => engine.handle_bao(out)?,
            Command::IsReady => engine.handle_isready(out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame { variant, starting_field } => engine.new_game(variant, starting_field),
            Command::Rules { json } => {
                if let Err(e) = engine.set_rules(&json) {
                    eprintln!("{}", e);
                }
            }
            Command::Move { label } => engine.handle_move(&label, out)?,
            Command::Undo => engine.handle_undo(out)?,
            Command::Moves => engine.handle_moves(out)?,
            Command::Board => engine.handle_board(out)?,
            Command::Go(params) => self.go(&params, out)?,
            Command::Stop => {
                // Only meaningful while a search runs; see `watch`.
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Runs `go` while a watcher thread listens for `stop`. Lines that
    /// arrive during the search are handled after it.
    fn go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> io::Result<()> {
        let Some(input) = self.input.take() else {
            return self.engine.handle_go(params, out, &AtomicBool::new(false));
        };
        let stop = AtomicBool::new(false);
        let searching = AtomicBool::new(true);
        let engine = &mut self.engine;

        let (result, watched) = thread::scope(|scope| {
            let watcher = scope.spawn(|| watch(input, &stop, &searching));
            let result = engine.handle_go(params, out, &stop);
            searching.store(false, Ordering::Relaxed);
            (result, watcher.join())
        });

        match watched {
            Ok((input, deferred)) => {
                self.input = Some(input);
                self.pending.extend(deferred);
            }
            Err(_) => eprintln!("input watcher panicked; ending session after queued commands"),
        }
        result
    }
}

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut session = Session {
        engine: Engine::new(),
        input: Some(spawn_reader()),
        pending: VecDeque::new(),
    };

    while let Some(line) = session.next_line() {
        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match session.dispatch(cmd, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("output error: {}", e);
                break;
            }
        }
    }
}
