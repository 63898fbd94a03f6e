use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::analysis::annotation::{AnnotateOptions, BookMode, DEFAULT_BOOK_MOVE_LIMIT};
use crate::engine::book::BookProbe;
use crate::engine::session::TimeoutPolicy;
use crate::engine::{EngineConfig, DEFAULT_BOOK_PATH};


#[derive(Parser, Debug)]
#[command(author, version)]
#[command(about = "Annotates the games of a PGN file with a UCI engine's evaluations and book moves.")]
pub struct Args {
    /// The PGN file to read the games from.
    #[arg(short, long, default_value = "src.pgn")]
    pub input: PathBuf,

    /// The PGN file to write the annotated games to. Replaced when it exists.
    #[arg(short, long, default_value = "out_src.pgn")]
    pub output: PathBuf,

    /// The UCI engine executable.
    #[arg(short, long)]
    pub engine: PathBuf,

    /// Extra command line argument for the engine. Can be repeated.
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Which opening book to show the engine's choices from.
    #[arg(short, long, value_enum, default_value = "off")]
    pub book: BookMode,

    /// Comment every move with the engine's static evaluation.
    #[arg(short, long, default_value_t = false)]
    pub static_eval: bool,

    /// The book file handed to the engine.
    #[arg(long, default_value = DEFAULT_BOOK_PATH)]
    pub book_path: PathBuf,

    /// The move number after which a game out of book stops being probed.
    #[arg(long, default_value_t = DEFAULT_BOOK_MOVE_LIMIT)]
    pub book_move_limit: u32,

    /// Time in milliseconds the engine gets to answer a book probe.
    #[arg(long, default_value_t = 200)]
    book_search_time: u64,

    /// Share of the book search time under which an answer counts as a book move.
    #[arg(long, default_value_t = 0.25, value_parser = parse_ratio)]
    book_ratio: f64,

    /// Time in milliseconds to wait for `uciok` and `readyok`. 0 waits forever.
    #[arg(long, default_value_t = 10000)]
    handshake_timeout: u64,
}

fn parse_ratio(value: &str) -> Result<f64, String> {
    let ratio: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;

    match (0.0..=1.0).contains(&ratio) {
        true => Ok(ratio),
        false => Err(format!("{ratio} is not between 0 and 1")),
    }
}


impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::new(&self.engine).with_args(self.engine_args.iter().cloned());
        config.book_path = self.book_path.clone();
        config.handshake_timeout = TimeoutPolicy::from_millis(self.handshake_timeout);

        config
    }

    pub fn book_probe(&self) -> BookProbe {
        BookProbe {
            search_time: Duration::from_millis(self.book_search_time),
            book_ratio: self.book_ratio,
        }
    }

    pub fn annotate_options(&self) -> AnnotateOptions {
        AnnotateOptions {
            book_mode: self.book,
            static_eval: self.static_eval,
            book_move_limit: self.book_move_limit,
        }
    }
}

#[test]
fn check_defaults() {
    let args = Args::parse_from(["uci_annotate", "--engine", "engines/Brainfish.exe"]);

    assert_eq!(args.input, PathBuf::from("src.pgn"));
    assert_eq!(args.output, PathBuf::from("out_src.pgn"));
    assert_eq!(args.annotate_options(), AnnotateOptions::default());
    assert_eq!(args.book_probe(), BookProbe::default());

    let config = args.engine_config();
    assert_eq!(config.book_path, PathBuf::from("Cerebellum_Light.bin"));
    assert_eq!(config.handshake_timeout, TimeoutPolicy::Within(Duration::from_secs(10)));
    assert!(config.args.is_empty());
}

#[test]
fn check_options() {
    let args = Args::parse_from([
        "uci_annotate", "-e", "sf", "-b", "cerebellum", "-s",
        "--engine-arg=--eval=+0.25", "--book-ratio", "0.5", "--handshake-timeout", "0",
    ]);

    assert_eq!(args.book, BookMode::Cerebellum);
    assert!(args.static_eval);
    assert_eq!(args.engine_config().args, vec!["--eval=+0.25"]);
    assert_eq!(args.engine_config().handshake_timeout, TimeoutPolicy::Unbounded);
    assert_eq!(args.book_probe().threshold(), Duration::from_millis(100));
}

#[test]
fn check_ratio_out_of_range() {
    assert!(Args::try_parse_from(["uci_annotate", "-e", "sf", "--book-ratio", "1.5"]).is_err());
    assert!(Args::try_parse_from(["uci_annotate", "-e", "sf", "--book-ratio", "abc"]).is_err());
}
