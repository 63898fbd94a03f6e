use std::time::Duration;

use shakmaty::{CastlingMode, Chess, Position};

use crate::analysis::analyzer::PositionAnalyzer;
use crate::analysis::annotation::{annotate, AnnotateOptions, AnnotationError, AnnotationSummary};
use crate::engine::book::{uci_to_san, BookMove};
use crate::engine::score::StaticEval;
use crate::engine::{fen_of, EngineError, EngineIdentity};


pub const RUY_LOPEZ: &str = include_str!("assets/ruy_lopez.pgn");
pub const TWO_GAMES: &str = include_str!("assets/two_games.pgn");
pub const BLACK_TO_MOVE: &str = include_str!("assets/black_to_move.pgn");

type EvalFn = Box<dyn FnMut(&Chess) -> Result<StaticEval, EngineError>>;
type BookFn = Box<dyn FnMut(&Chess) -> Result<BookMove, EngineError>>;

/// An analyzer answering from closures, keeping the FEN of every position it was asked about.
pub struct ScriptedAnalyzer {
    pub name: Option<String>,
    pub eval: EvalFn,
    pub book: BookFn,
    pub evaluated: Vec<String>,
    pub probed: Vec<String>,
}

impl ScriptedAnalyzer {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            eval: Box::new(|_: &Chess| Ok(StaticEval::new(0.0))),
            book: Box::new(|position: &Chess| out_of_book(position, "")),
            evaluated: Vec::new(),
            probed: Vec::new(),
        }
    }

    pub fn with_eval<F>(mut self, eval: F) -> Self
        where F: FnMut(&Chess) -> Result<StaticEval, EngineError> + 'static {

        self.eval = Box::new(eval);
        self
    }

    pub fn with_book<F>(mut self, book: F) -> Self
        where F: FnMut(&Chess) -> Result<BookMove, EngineError> + 'static {

        self.book = Box::new(book);
        self
    }
}

impl PositionAnalyzer for ScriptedAnalyzer {
    fn identify(&mut self) -> Result<EngineIdentity, EngineError> {
        match &self.name {
            Some(name) => Ok(EngineIdentity { name: name.clone(), reported: true }),
            None => Err(EngineError::Timeout {
                expected: "uciok".to_string(),
                waited: Duration::from_secs(10),
            }),
        }
    }

    fn fallback_name(&self) -> String {
        "scripted".to_string()
    }

    fn static_eval(&mut self, position: &Chess) -> Result<StaticEval, EngineError> {
        self.evaluated.push(fen_of(position));
        (self.eval)(position)
    }

    fn book_move(&mut self, position: &Chess) -> Result<BookMove, EngineError> {
        self.probed.push(fen_of(position));
        (self.book)(position)
    }
}

fn book_answer(position: &Chess, uci: &str, from_book: bool) -> Result<BookMove, EngineError> {
    let san = uci_to_san(position, uci)?;

    Ok(BookMove {
        uci: uci.to_string(),
        san,
        from_book,
        elapsed: match from_book {
            true => Duration::from_millis(2),
            false => Duration::from_millis(200),
        },
    })
}

/// A book hit with the given move.
pub fn in_book(position: &Chess, uci: &str) -> Result<BookMove, EngineError> {
    book_answer(position, uci, true)
}

/// A searched move; the first legal move unless `uci` names one.
pub fn out_of_book(position: &Chess, uci: &str) -> Result<BookMove, EngineError> {
    match uci {
        "" => {
            let first = position.legal_moves().first().map(|m| m.to_uci(CastlingMode::Standard).to_string());
            book_answer(position, &first.unwrap_or_default(), false)
        },
        uci => book_answer(position, uci, false),
    }
}

/// Annotates `pgn` and returns the summary next to the text written.
pub fn annotate_to_string(pgn: &str, analyzer: &mut ScriptedAnalyzer, options: &AnnotateOptions) -> (Result<AnnotationSummary, AnnotationError>, String) {
    let mut output = Vec::new();
    let result = annotate(pgn.as_bytes(), &mut output, analyzer, options);

    (result, String::from_utf8_lossy(&output).into_owned())
}
