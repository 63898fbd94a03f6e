use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start engine `{}`: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("engine did not answer with `{expected}` within {waited:?}")]
    Timeout {
        expected: String,
        waited: Duration,
    },
    #[error("engine terminated while waiting for `{expected}`")]
    Terminated {
        expected: String,
    },
    #[error("engine session is already closed")]
    Closed,
    #[error("engine pipe error: {0}")]
    Io(#[from] io::Error),
    #[error("engine produced no usable evaluation: {0}")]
    EvalParse(String),
    #[error("engine produced no usable book move: {0}")]
    BookParse(String),
}

impl EngineError {
    /// The engine could not be started at all, as opposed to misbehaving once running.
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, EngineError::Spawn { .. })
    }
}
