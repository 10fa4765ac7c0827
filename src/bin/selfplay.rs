//! Self-play game generation CLI.
//!
//! Plays Bao games engine against engine and outputs the records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --variant NAME  ntchuwa, yabambo or yawana (default: ntchuwa)
//!   --depth N       Search depth per move (default: 3)
//!   --max-plies N   Moves before a game is abandoned (default: 300)
//!   --random P      Probability of a random move (default: 0.1)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use bawo::rules::Variant;
use bawo::selfplay::{self, SelfPlayConfig};

/// Parses the value following `flag`, exiting with usage on failure.
fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, flag);
            }
            "--variant" => {
                i += 1;
                let name: String = value(&args, i, flag);
                config.variant = match Variant::from_name(&name) {
                    Ok(v) => v,
                    Err(e) => {
                        eprintln!("{}", e);
                        process::exit(1);
                    }
                };
            }
            "--depth" => {
                i += 1;
                config.depth = value(&args, i, flag);
            }
            "--max-plies" => {
                i += 1;
                config.max_plies = value(&args, i, flag);
            }
            "--random" => {
                i += 1;
                config.random_move_rate = value(&args, i, flag);
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, flag);
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, flag);
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, flag));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !config.quiet {
        eprintln!(
            "Self-play: {} {} games, depth {}, max {} plies, random {:.2}, {} threads",
            config.num_games,
            config.variant,
            config.depth,
            config.max_plies,
            config.random_move_rate,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        selfplay::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| selfplay::write_jsonl(&games, &mut BufWriter::new(file))),
        None => {
            let stdout = io::stdout();
            selfplay::write_jsonl(&games, &mut BufWriter::new(stdout.lock()))
        }
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }
    if let (Some(path), false) = (&output_path, config.quiet) {
        eprintln!("Wrote {} games to {}", games.len(), path);
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --variant NAME   ntchuwa, yabambo or yawana (default: ntchuwa)");
    eprintln!("  --depth N        Search depth per move (default: 3)");
    eprintln!("  --max-plies N    Moves before a game is abandoned (default: 300)");
    eprintln!("  --random P       Probability of a random move (default: 0.1)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
