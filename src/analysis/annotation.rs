use std::fmt::{Display, Formatter};
use std::io;
use std::io::{Read, Write};

use clap::ValueEnum;
use log::{debug, info, warn};
use shakmaty::Position;
use thiserror::Error;

use crate::analysis::analyzer::PositionAnalyzer;
use crate::analysis::game_record::{GameRecord, GameRecords, RecordError};
use crate::analysis::movetext::{write_result, write_tags, AnnotationRecord, BookVariation, LineCounter};
use crate::engine::EngineError;

/// Moves past which a game that has left the book is not probed any more.
pub const DEFAULT_BOOK_MOVE_LIMIT: u32 = 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum BookMode {
    Off,
    Cerebellum,
}

impl BookMode {
    pub fn is_active(&self) -> bool {
        *self != BookMode::Off
    }

    /// What the engine's name has to contain for this book to be available.
    pub fn required_engine_marker(&self) -> Option<&'static str> {
        match self {
            BookMode::Off => None,
            BookMode::Cerebellum => Some("Brainfish"),
        }
    }

    pub fn comment(&self) -> &'static str {
        match self {
            BookMode::Off => "",
            BookMode::Cerebellum => "cerebellum book",
        }
    }
}

impl Display for BookMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BookMode::Off => write!(f, "off"),
            BookMode::Cerebellum => write!(f, "cerebellum"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AnnotateOptions {
    pub book_mode: BookMode,
    pub static_eval: bool,
    pub book_move_limit: u32,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            book_mode: BookMode::Off,
            static_eval: false,
            book_move_limit: DEFAULT_BOOK_MOVE_LIMIT,
        }
    }
}

/// Something went wrong, but not badly enough to stop the run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnnotationWarning {
    IdentificationFailed {
        reason: String,
        fallback: String,
    },
    EngineIdentityMismatch {
        engine: String,
        required: String,
        book_mode: BookMode,
    },
}

impl Display for AnnotationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationWarning::IdentificationFailed { reason, fallback } => {
                write!(f, "could not identify the engine ({reason}), annotating as {fallback}")
            },
            AnnotationWarning::EngineIdentityMismatch { engine, required, book_mode } => {
                write!(f, "engine {engine} is not {required}, {book_mode} book is disabled")
            },
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnnotationSummary {
    pub engine_name: String,
    pub games: u32,
    pub moves: u32,
    pub book_hits: u32,
    pub warnings: Vec<AnnotationWarning>,
}

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("engine query failed: {0}")]
    Engine(#[from] EngineError),
    #[error("bad game record: {0}")]
    Record(#[from] RecordError),
    #[error("failed to write annotations: {0}")]
    Io(#[from] io::Error),
}

/// What the pipeline tracks within one game. Started afresh for every game.
#[derive(Clone, Debug, Default)]
struct GameState {
    line: LineCounter,
    book_exhausted: bool,
}

/// Reads every game from `input` and writes it to `output` with the requested
/// annotations. Games are written as they are annotated; a failed query stops
/// the run, leaving what was written before it.
pub fn annotate<R, W, A>(input: R, output: &mut W, analyzer: &mut A, options: &AnnotateOptions) -> Result<AnnotationSummary, AnnotationError>
    where R: Read, W: Write, A: PositionAnalyzer {

    let mut summary = AnnotationSummary::default();

    summary.engine_name = match analyzer.identify() {
        Ok(identity) => identity.name,
        Err(error) if error.is_spawn_failure() => return Err(error.into()),
        Err(error) => {
            let warning = AnnotationWarning::IdentificationFailed {
                reason: error.to_string(),
                fallback: analyzer.fallback_name(),
            };
            warn!("{warning}");
            summary.warnings.push(warning);
            analyzer.fallback_name()
        },
    };

    let mut book_mode = options.book_mode;
    if let Some(required) = book_mode.required_engine_marker() {
        if !summary.engine_name.contains(required) {
            let warning = AnnotationWarning::EngineIdentityMismatch {
                engine: summary.engine_name.clone(),
                required: required.to_string(),
                book_mode,
            };
            warn!("{warning}");
            summary.warnings.push(warning);
            book_mode = BookMode::Off;
        }
    }

    for game in GameRecords::new(input) {
        let game = game?;
        summary.games += 1;
        info!("Annotating game {}...", summary.games);

        annotate_game(&game, output, analyzer, options, book_mode, &mut summary)?;
    }

    Ok(summary)
}

fn annotate_game<W, A>(game: &GameRecord, output: &mut W, analyzer: &mut A, options: &AnnotateOptions, book_mode: BookMode, summary: &mut AnnotationSummary) -> Result<(), AnnotationError>
    where W: Write, A: PositionAnalyzer {

    let plies = game.plies()?;
    let mut state = GameState::default();

    write_tags(output, &game.export_tags(), &summary.engine_name)?;

    for ply in plies {
        let side = ply.before.turn();
        let move_number = ply.before.fullmoves().get();

        let mut book = None;
        if book_mode.is_active() && !state.book_exhausted {
            let book_move = analyzer.book_move(&ply.before)?;

            if book_move.from_book {
                summary.book_hits += 1;
                book = Some(BookVariation {
                    san: book_move.san,
                    comment: book_mode.comment().to_string(),
                });
            } else if move_number > options.book_move_limit {
                debug!("out of book after move {move_number}");
                state.book_exhausted = true;
            }
        }

        let eval = match options.static_eval {
            true => Some(analyzer.static_eval(&ply.after)?),
            false => None,
        };

        let record = AnnotationRecord {
            move_number,
            side,
            san: ply.san,
            eval,
            book,
        };
        output.write_all(record.render(&mut state.line).as_bytes())?;
        summary.moves += 1;
    }

    write_result(output, &game.result_marker())?;
    output.flush()?;

    Ok(())
}

#[test]
fn check_book_mode_markers() {
    assert_eq!(BookMode::Cerebellum.required_engine_marker(), Some("Brainfish"));
    assert_eq!(BookMode::Off.required_engine_marker(), None);
    assert!(!BookMode::Off.is_active());
    assert_eq!(BookMode::Cerebellum.comment(), "cerebellum book");
    assert_eq!(BookMode::Cerebellum.to_string(), "cerebellum");
}
