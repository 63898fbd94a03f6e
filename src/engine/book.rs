use std::time::{Duration, Instant};

use log::debug;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::Chess;

use crate::engine::session::{Session, TimeoutPolicy};
use crate::engine::{fen_of, EngineConfig, EngineError, BOOK_PATH_OPTION, THREADS_OPTION};
use crate::input::protocol_interpreter::{EngineCommand, EngineReply, Milestone};

pub const DEFAULT_SEARCH_TIME: Duration = Duration::from_millis(200);
pub const DEFAULT_BOOK_RATIO: f64 = 0.25;

/// How a book probe is run, and how its answer is judged.
///
/// The engine is given `search_time` to find a move. A book move comes back almost
/// at once, a searched one uses the budget, so an answer arriving before
/// `book_ratio` of the budget has passed counts as a book move.
///
/// This is a timing heuristic and nothing more. A loaded machine can push a book
/// answer past the cut, and a very fast search can come in under it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BookProbe {
    pub search_time: Duration,
    pub book_ratio: f64,
}

impl Default for BookProbe {
    fn default() -> Self {
        Self {
            search_time: DEFAULT_SEARCH_TIME,
            book_ratio: DEFAULT_BOOK_RATIO,
        }
    }
}

impl BookProbe {
    pub fn threshold(&self) -> Duration {
        Duration::try_from_secs_f64(self.search_time.as_secs_f64() * self.book_ratio)
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_book_hit(&self, elapsed: Duration) -> bool {
        elapsed < self.threshold()
    }

    fn search_millis(&self) -> u64 {
        u64::try_from(self.search_time.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BookMove {
    pub uci: String,
    pub san: String,
    pub from_book: bool,
    pub elapsed: Duration,
}

/// Lets a fresh engine process pick a move for `position` under the probe's time
/// budget, and judges from the time it took whether the move came from its book.
pub fn lookup_book(config: &EngineConfig, position: &Chess, probe: &BookProbe) -> Result<BookMove, EngineError> {
    let fen = fen_of(position);
    let mut session = Session::open(config)?;

    session.handshake()?;
    session.configure(&[
        (BOOK_PATH_OPTION, config.book_path.display().to_string()),
        (THREADS_OPTION, config.threads.to_string()),
    ])?;
    session.ready()?;

    session.send(&EngineCommand::UciNewGame)?;
    session.send(&EngineCommand::PositionFen(fen.clone()))?;

    let started = Instant::now();
    session.send(&EngineCommand::GoMoveTime(probe.search_millis()))?;
    let (reply, line) = session.await_reply(Milestone::BestMove, TimeoutPolicy::Unbounded)?;
    let elapsed = line.received.saturating_duration_since(started);

    session.close()?;

    let EngineReply::BestMove { mv: uci, .. } = reply else {
        return Err(EngineError::BookParse(format!("unexpected reply `{}`", line.text)));
    };

    let san = uci_to_san(position, &uci)?;
    let from_book = probe.is_book_hit(elapsed);
    debug!("{fen}: {uci} ({san}) after {elapsed:?}, book move: {from_book}");

    Ok(BookMove {
        uci,
        san,
        from_book,
        elapsed,
    })
}

/// The SAN of an engine move, check and mate suffixes included.
pub fn uci_to_san(position: &Chess, uci: &str) -> Result<String, EngineError> {
    let uci_move = UciMove::from_ascii(uci.as_bytes())
        .map_err(|_| EngineError::BookParse(format!("`{uci}` is not a move")))?;

    let chess_move = uci_move
        .to_move(position)
        .map_err(|_| EngineError::BookParse(format!("`{uci}` is illegal in {}", fen_of(position))))?;

    Ok(SanPlus::from_move(position.clone(), &chess_move).to_string())
}
