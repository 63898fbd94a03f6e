use std::io;
use std::io::BufRead;
use std::thread::sleep;
use std::time::Duration;

use clap::Parser;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

use uci_annotate::input::protocol_interpreter::{EngineCommand, ProtocolInterpreter};
use uci_annotate::input::uci_interpreter::UciInterpreter;

/// A stand-in UCI engine with scripted answers, for exercising the annotator end to end.
/// Chatter goes to standard error, the way real engines print their banners.

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The name given in `id name`.
    #[arg(long, default_value = "Scripted Engine 1.0")]
    name: String,

    /// Never send `id name`.
    #[arg(long)]
    anonymous: bool,

    /// The text after `Total Evaluation: `. Without it `eval` prints no total.
    #[arg(long, allow_hyphen_values = true)]
    eval: Option<String>,

    /// The move to answer every `go` with, instead of the first legal move.
    #[arg(long)]
    bestmove: Option<String>,

    /// How long a search takes, in milliseconds.
    #[arg(long, default_value_t = 0)]
    think_ms: u64,

    /// Answer at once while the position's full move number is at most this.
    #[arg(long)]
    book_until: Option<u32>,

    /// Never answer `isready`.
    #[arg(long)]
    silent_ready: bool,

    /// Print `id name` and `Total Evaluation:` on standard error.
    #[arg(long)]
    stderr: bool,

    /// Answer `uci` with an endless stream of `id name` lines, ignoring everything after.
    #[arg(long)]
    chatty_id: bool,
}

impl Cli {
    fn reply(&self, line: &str) {
        match self.stderr {
            true => eprintln!("{line}"),
            false => println!("{line}"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut fen = None;

    eprintln!("{} by the test suite", cli.name);

    for line in io::stdin().lock().lines() {
        let line = line?;

        let Some(command) = UciInterpreter::line_to_command(&line) else {
            eprintln!("Unknown command: {line}");
            continue;
        };

        match command {
            EngineCommand::Uci => {
                while cli.chatty_id {
                    println!("id name {}", cli.name);
                    sleep(Duration::from_millis(50));
                }

                if !cli.anonymous {
                    cli.reply(&format!("id name {}", cli.name));
                    println!("id author uci_annotate");
                }
                println!("option name Threads type spin default 1 min 1 max 512");
                println!("option name BookPath type string default <empty>");
                println!("uciok");
            },
            EngineCommand::SetOption { name, value } => eprintln!("info string {name} set to {value}"),
            EngineCommand::IsReady => {
                if !cli.silent_ready {
                    println!("readyok");
                }
            },
            EngineCommand::UciNewGame => (),
            EngineCommand::PositionFen(position) => fen = Some(position),
            EngineCommand::Eval => {
                println!("     Term    |    White    |    Black    |    Total   ");
                println!(" ------------+-------------+-------------+------------");
                if let Some(eval) = &cli.eval {
                    println!();
                    cli.reply(&format!("Total Evaluation: {eval} (white side)"));
                }
            },
            EngineCommand::GoMoveTime(_) => {
                let fen = fen.as_deref().unwrap_or_default();
                let in_book = match (cli.book_until, full_move_number(fen)) {
                    (Some(last), Some(number)) => number <= last,
                    _ => false,
                };

                if !in_book {
                    sleep(Duration::from_millis(cli.think_ms));
                    println!("info depth 1 score cp 20 time {}", cli.think_ms);
                }

                let mv = match &cli.bestmove {
                    Some(mv) => mv.clone(),
                    None => first_legal_move(fen).unwrap_or_else(|| "(none)".to_string()),
                };
                println!("bestmove {mv}");
            },
            EngineCommand::Quit => break,
        }
    }

    Ok(())
}

fn full_move_number(fen: &str) -> Option<u32> {
    fen.split_whitespace().nth(5)?.parse().ok()
}

fn first_legal_move(fen: &str) -> Option<String> {
    let position: Chess = Fen::from_ascii(fen.as_bytes())
        .ok()?
        .into_position(CastlingMode::Standard)
        .ok()?;

    position
        .legal_moves()
        .first()
        .map(|m| m.to_uci(CastlingMode::Standard).to_string())
}
