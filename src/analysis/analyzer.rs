use shakmaty::Chess;

use crate::engine::book::{lookup_book, BookMove, BookProbe};
use crate::engine::evaluation::evaluate;
use crate::engine::score::StaticEval;
use crate::engine::{fen_of, identify, EngineConfig, EngineError, EngineIdentity};

/// Answers the questions the annotation pipeline asks about positions.
pub trait PositionAnalyzer {
    fn identify(&mut self) -> Result<EngineIdentity, EngineError>;

    /// The name to annotate with when identification fails.
    fn fallback_name(&self) -> String;

    fn static_eval(&mut self, position: &Chess) -> Result<StaticEval, EngineError>;

    fn book_move(&mut self, position: &Chess) -> Result<BookMove, EngineError>;
}

/// Asks a real UCI engine, starting a new process for every query.
#[derive(Clone, Debug)]
pub struct UciAnalyzer {
    pub config: EngineConfig,
    pub probe: BookProbe,
}

impl UciAnalyzer {
    pub fn new(config: EngineConfig, probe: BookProbe) -> Self {
        Self { config, probe }
    }
}

impl PositionAnalyzer for UciAnalyzer {
    fn identify(&mut self) -> Result<EngineIdentity, EngineError> {
        identify(&self.config)
    }

    fn fallback_name(&self) -> String {
        self.config.default_display_name()
    }

    fn static_eval(&mut self, position: &Chess) -> Result<StaticEval, EngineError> {
        evaluate(&self.config, &fen_of(position))
    }

    fn book_move(&mut self, position: &Chess) -> Result<BookMove, EngineError> {
        lookup_book(&self.config, position, &self.probe)
    }
}
