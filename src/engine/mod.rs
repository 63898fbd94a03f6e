// Everything that talks to the engine process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode};

use crate::engine::session::{Session, TimeoutPolicy};

pub mod error;
pub mod score;
pub mod session;
pub mod evaluation;
pub mod book;

pub use error::EngineError;

pub const DEFAULT_BOOK_PATH: &str = "Cerebellum_Light.bin";
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub const BOOK_PATH_OPTION: &str = "BookPath";
pub const THREADS_OPTION: &str = "Threads";

/// How to start the engine, and how to set it up. Fixed for a whole run.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub book_path: PathBuf,
    pub threads: u32,  // kept at 1 so repeated queries give the same answer
    pub handshake_timeout: TimeoutPolicy,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            book_path: PathBuf::from(DEFAULT_BOOK_PATH),
            threads: 1,
            handshake_timeout: TimeoutPolicy::Within(DEFAULT_HANDSHAKE_TIMEOUT),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>, S: Into<String> {

        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The name used when the engine does not introduce itself: the executable's file stem.
    pub fn default_display_name(&self) -> String {
        display_name_from_path(&self.path)
    }
}

fn display_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "engine".to_string())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineIdentity {
    pub name: String,
    pub reported: bool,  // false when the name fell back to the default
}

/// Starts the engine just long enough to learn its name.
pub fn identify(config: &EngineConfig) -> Result<EngineIdentity, EngineError> {
    let mut session = Session::open(config)?;
    let identity = session.handshake()?;
    session.close()?;

    Ok(identity)
}

/// The FEN sent over the wire. The en passant square is only given when a capture is possible.
pub fn fen_of(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
}

#[test]
fn check_default_display_name() {
    assert_eq!(EngineConfig::new("engines/Brainfish.exe").default_display_name(), "Brainfish");
    assert_eq!(EngineConfig::new("/usr/bin/stockfish").default_display_name(), "stockfish");
    assert_eq!(EngineConfig::new("").default_display_name(), "engine");
}

#[test]
fn check_fen_of_start_position() {
    assert_eq!(fen_of(&Chess::default()), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
}
