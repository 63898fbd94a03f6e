use log::debug;

use crate::engine::score::StaticEval;
use crate::engine::session::{Session, TimeoutPolicy};
use crate::engine::{EngineConfig, EngineError, THREADS_OPTION};
use crate::input::protocol_interpreter::{EngineCommand, EngineReply, Milestone};

/// Asks a fresh engine process for the static evaluation of `fen`.
///
/// An `isready` goes out right after `eval`; engines answer commands in order, so a
/// `readyok` arriving first means the evaluation output held no total.
pub fn evaluate(config: &EngineConfig, fen: &str) -> Result<StaticEval, EngineError> {
    let mut session = Session::open(config)?;

    session.handshake()?;
    session.configure(&[(THREADS_OPTION, config.threads.to_string())])?;
    session.ready()?;

    session.send(&EngineCommand::UciNewGame)?;
    session.send(&EngineCommand::PositionFen(fen.to_string()))?;
    session.send(&EngineCommand::Eval)?;
    session.send(&EngineCommand::IsReady)?;

    let awaited = session.await_any(&[Milestone::TotalEvaluation, Milestone::ReadyOk], TimeoutPolicy::Unbounded);

    let score = match awaited {
        Ok((EngineReply::TotalEvaluation(Some(score)), _)) => score,
        Ok((EngineReply::TotalEvaluation(None), line)) => {
            return Err(EngineError::EvalParse(format!("unreadable score in `{}`", line.text)));
        },
        Ok(_) => {
            return Err(EngineError::EvalParse(format!("no total evaluation reported for {fen}")));
        },
        Err(EngineError::Terminated { .. }) => {
            return Err(EngineError::EvalParse(format!("engine exited without a total evaluation for {fen}")));
        },
        Err(error) => return Err(error),
    };

    session.close()?;
    debug!("{fen}: {score}");

    Ok(StaticEval::new(score))
}
