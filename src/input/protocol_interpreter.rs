use std::fmt::{Display, Formatter};

/// The commands the annotator sends to an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCommand {
    Uci,  // request identification, answered with `uciok`
    SetOption {
        name: String,
        value: String,
    },
    IsReady,  // answered with `readyok` once all previous commands are processed
    UciNewGame,
    PositionFen(String),
    GoMoveTime(u64),  // search for the given amount of ms
    Eval,  // print the static evaluation of the current position
    Quit,
}

impl EngineCommand {
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        EngineCommand::SetOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// The replies of an engine that mean something to the annotator.
/// Every other line of output is noise.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineReply {
    Id {
        name: String,
    },
    UciOk,
    ReadyOk,
    BestMove {
        mv: String,
        ponder: Option<String>,
    },
    TotalEvaluation(Option<f64>),  // None: the label was there, the number wasn't
}

/// The points in a conversation an exchange can wait for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Milestone {
    Identification,
    UciOk,
    ReadyOk,
    BestMove,
    TotalEvaluation,
}

impl EngineReply {
    pub fn milestone(&self) -> Milestone {
        match self {
            EngineReply::Id { .. } => Milestone::Identification,
            EngineReply::UciOk => Milestone::UciOk,
            EngineReply::ReadyOk => Milestone::ReadyOk,
            EngineReply::BestMove { .. } => Milestone::BestMove,
            EngineReply::TotalEvaluation(_) => Milestone::TotalEvaluation,
        }
    }
}

impl Display for Milestone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Milestone::Identification => write!(f, "id name"),
            Milestone::UciOk => write!(f, "uciok"),
            Milestone::ReadyOk => write!(f, "readyok"),
            Milestone::BestMove => write!(f, "bestmove"),
            Milestone::TotalEvaluation => write!(f, "Total Evaluation"),
        }
    }
}

pub trait ProtocolInterpreter {
    /// The line to write to the engine, without the line terminator.
    fn command_to_line(command: &EngineCommand) -> String;

    /// The engine side view: which command a received line is.
    fn line_to_command(line: &str) -> Option<EngineCommand>;

    fn line_to_reply(line: &str) -> Option<EngineReply>;
}
