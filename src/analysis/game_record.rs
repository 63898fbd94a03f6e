use std::io;
use std::io::Read;
use std::mem;

use pgn_reader::{BufferedReader, RawHeader, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::{CastlingMode, Chess, Outcome, Position};
use thiserror::Error;

use crate::engine::fen_of;

/// The tags every exported game starts with, in order, with their placeholder values.
pub const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("failed to read game record: {0}")]
    Io(#[from] io::Error),
    #[error("game has an invalid FEN tag `{0}`")]
    InvalidFen(String),
    #[error("illegal move {san} in position {fen}")]
    IllegalMove {
        san: String,
        fen: String,
    },
}

/// One game of a PGN file: its tags and its main line. Variations and comments are not kept.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub tags: Vec<(String, String)>,
    pub start: Chess,
    pub moves: Vec<San>,
    pub outcome: Option<Outcome>,
}

/// A move of the main line, with the positions on either side of it.
#[derive(Clone, Debug)]
pub struct Ply {
    pub before: Chess,
    pub san: String,
    pub after: Chess,
}

impl GameRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag_key, _)| tag_key == key)
            .map(|(_, value)| value.as_str())
    }

    /// The game termination marker: the `Result` tag, or else the one in the movetext.
    pub fn result_marker(&self) -> String {
        match (self.tag("Result"), self.outcome) {
            (Some(result), _) => result.to_string(),
            (None, Some(outcome)) => outcome.to_string(),
            (None, None) => "*".to_string(),
        }
    }

    /// The Seven Tag Roster first, placeholders filling the gaps, then every other tag as read.
    pub fn export_tags(&self) -> Vec<(String, String)> {
        let mut tags: Vec<(String, String)> = SEVEN_TAG_ROSTER
            .iter()
            .map(|(key, placeholder)| {
                let value = self.tag(key).unwrap_or(*placeholder);
                (key.to_string(), value.to_string())
            })
            .collect();

        tags.extend(
            self.tags
                .iter()
                .filter(|(key, _)| !SEVEN_TAG_ROSTER.iter().any(|(roster_key, _)| roster_key == key))
                .cloned(),
        );

        tags
    }

    /// Replays the main line from the start position. The SAN is rendered anew,
    /// so check marks are right whatever the input wrote.
    pub fn plies(&self) -> Result<Vec<Ply>, RecordError> {
        let mut position = self.start.clone();
        let mut plies = Vec::with_capacity(self.moves.len());

        for san in self.moves.iter() {
            let chess_move = san.to_move(&position).map_err(|_| RecordError::IllegalMove {
                san: san.to_string(),
                fen: fen_of(&position),
            })?;

            let before = position.clone();
            let san = SanPlus::from_move(before.clone(), &chess_move).to_string();
            position.play_unchecked(&chess_move);

            plies.push(Ply {
                before,
                san,
                after: position.clone(),
            });
        }

        Ok(plies)
    }
}

#[derive(Default)]
struct GameCollector {
    tags: Vec<(String, String)>,
    moves: Vec<San>,
    outcome: Option<Outcome>,
}

impl Visitor for GameCollector {
    type Result = Result<GameRecord, RecordError>;

    fn begin_game(&mut self) {
        *self = GameCollector::default();
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        self.tags.push((
            String::from_utf8_lossy(key).into_owned(),
            value.decode_utf8_lossy().into_owned(),
        ));
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.moves.push(san_plus.san);
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true)  // main line only
    }

    fn outcome(&mut self, outcome: Option<Outcome>) {
        self.outcome = outcome;
    }

    fn end_game(&mut self) -> Self::Result {
        let tags = mem::take(&mut self.tags);

        let start = match tags.iter().find(|(key, _)| key == "FEN") {
            Some((_, fen)) => Fen::from_ascii(fen.as_bytes())
                .ok()
                .and_then(|fen| fen.into_position(CastlingMode::Standard).ok())
                .ok_or_else(|| RecordError::InvalidFen(fen.clone()))?,
            None => Chess::default(),
        };

        Ok(GameRecord {
            tags,
            start,
            moves: mem::take(&mut self.moves),
            outcome: self.outcome.take(),
        })
    }
}

/// Reads the games of a PGN source one at a time.
pub struct GameRecords<R: Read> {
    reader: BufferedReader<R>,
    collector: GameCollector,
}

impl<R: Read> GameRecords<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufferedReader::new(source),
            collector: GameCollector::default(),
        }
    }
}

impl<R: Read> Iterator for GameRecords<R> {
    type Item = Result<GameRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_game(&mut self.collector) {
            Ok(Some(game)) => Some(game),
            Ok(None) => None,
            Err(error) => Some(Err(error.into())),
        }
    }
}
