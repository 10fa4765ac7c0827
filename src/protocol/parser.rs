//! Front-end command parser.
//!
//! Parses incoming protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

use crate::board::Field;
use crate::rules::Variant;

/// Search constraints passed with the `go` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
}

/// A parsed front-end-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize the protocol handshake.
    Bao,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a new game: `newgame [variant] [upper|lower]`.
    NewGame {
        variant: Option<Variant>,
        starting_field: Option<Field>,
    },

    /// Start a new game from a JSON rules descriptor.
    Rules { json: String },

    /// Play a move given in record notation (a trailing `*` marks takata).
    Move { label: String },

    /// Take back the last move.
    Undo,

    /// List the legal moves of the current position.
    Moves,

    /// Print the current position.
    Board,

    /// Search for the best move with optional constraints.
    Go(GoParams),

    /// Interrupt the current search.
    Stop,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging to stderr.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "bao" => Some(Command::Bao),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "stop" => Some(Command::Stop),
        "undo" => Some(Command::Undo),
        "moves" => Some(Command::Moves),
        "board" => Some(Command::Board),

        "setoption" => parse_setoption(&tokens),
        "newgame" => parse_newgame(&tokens),
        "rules" => parse_rules(trimmed),
        "move" => parse_move(&tokens),
        "go" => parse_go(&tokens),

        other => {
            eprintln!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        eprintln!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let (name, value) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                eprintln!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `newgame [variant] [upper|lower]`, arguments in either order.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    let mut variant = None;
    let mut starting_field = None;

    for &token in &tokens[1..] {
        match token.to_ascii_lowercase().as_str() {
            "upper" => starting_field = Some(Field::Upper),
            "lower" => starting_field = Some(Field::Lower),
            name => match Variant::from_name(name) {
                Ok(v) => variant = Some(v),
                Err(e) => {
                    eprintln!("malformed newgame: {}", e);
                    return None;
                }
            },
        }
    }

    Some(Command::NewGame { variant, starting_field })
}

/// Parses `rules <json>`, keeping the JSON text verbatim.
fn parse_rules(line: &str) -> Option<Command> {
    let json = line.strip_prefix("rules").unwrap_or("").trim();
    if json.is_empty() {
        eprintln!("malformed rules: expected 'rules <json>'");
        return None;
    }
    Some(Command::Rules { json: json.to_string() })
}

/// Parses `move <label>`.
fn parse_move(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 2 {
        eprintln!("malformed move: expected 'move <token>'");
        return None;
    }
    Some(Command::Move { label: tokens[1].to_string() })
}

/// Parses `go [depth <n>] [movetime <ms>]`.
fn parse_go(tokens: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u32>()) {
                    Some(Ok(v)) => params.depth = Some(v),
                    _ => eprintln!("invalid depth value: '{}'", tokens.get(i).unwrap_or(&"")),
                }
            }
            "movetime" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u64>()) {
                    Some(Ok(v)) => params.movetime = Some(v),
                    _ => eprintln!("invalid movetime value: '{}'", tokens.get(i).unwrap_or(&"")),
                }
            }
            other => {
                eprintln!("unknown go parameter: '{}'", other);
            }
        }
        i += 1;
    }

    Some(Command::Go(params))
}
