use std::io;
use std::io::{BufWriter, ErrorKind, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, trace, warn};

use crate::engine::{EngineConfig, EngineError, EngineIdentity};
use crate::input::listener::{listen_to_output, ReplyLine};
use crate::input::protocol_interpreter::{EngineCommand, EngineReply, Milestone, ProtocolInterpreter};
use crate::input::uci_interpreter::UciInterpreter;

/// How long an engine gets to exit by itself after `quit`.
const QUIT_GRACE: Duration = Duration::from_secs(2);
const EXIT_POLL: Duration = Duration::from_millis(5);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TimeoutPolicy {
    Unbounded,
    Within(Duration),
}

impl TimeoutPolicy {
    /// `0` means no timeout at all.
    pub fn from_millis(millis: u64) -> TimeoutPolicy {
        match millis {
            0 => TimeoutPolicy::Unbounded,
            millis => TimeoutPolicy::Within(Duration::from_millis(millis)),
        }
    }
}

/// One running engine process.
///
/// Standard output and standard error are the same pipe, read by one listener
/// thread, so replies arrive in the order the engine wrote them whatever stream
/// it used. The process is reaped on `close`, which also runs on drop: whatever
/// path a query takes out, the engine goes with it.
pub struct Session {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    replies: Receiver<ReplyLine>,
    handshake_timeout: TimeoutPolicy,
    default_name: String,
    closed: bool,
}

impl Session {
    pub fn open(config: &EngineConfig) -> Result<Session, EngineError> {
        let (output, output_writer) = os_pipe::pipe()?;
        let error_writer = output_writer.try_clone()?;

        // The command owns our copies of the write end; it must be gone for EOF to arrive
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(output_writer)
            .stderr(error_writer)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::Io(io::Error::new(ErrorKind::BrokenPipe, "engine stdin is not available")));
        };

        let (reply_tx, reply_rx) = channel();
        listen_to_output(output, reply_tx);

        debug!("started engine {} (pid {})", config.path.display(), child.id());

        Ok(Session {
            child,
            stdin: Some(BufWriter::new(stdin)),
            replies: reply_rx,
            handshake_timeout: config.handshake_timeout,
            default_name: config.default_display_name(),
            closed: false,
        })
    }

    pub fn send(&mut self, command: &EngineCommand) -> Result<(), EngineError> {
        let line = UciInterpreter::command_to_line(command);
        let stdin = self.stdin.as_mut().ok_or(EngineError::Closed)?;

        trace!("engine < {line}");
        writeln!(stdin, "{line}")?;
        stdin.flush()?;

        Ok(())
    }

    pub fn await_reply(&mut self, milestone: Milestone, timeout: TimeoutPolicy) -> Result<(EngineReply, ReplyLine), EngineError> {
        self.await_any(&[milestone], timeout)
    }

    /// Reads replies until one reaches any of `milestones`. Everything before it is dropped.
    pub fn await_any(&mut self, milestones: &[Milestone], timeout: TimeoutPolicy) -> Result<(EngineReply, ReplyLine), EngineError> {
        self.await_since(milestones, timeout, Instant::now())
    }

    /// As `await_any`, with the timeout counted from `started` rather than from now.
    fn await_since(&mut self, milestones: &[Milestone], timeout: TimeoutPolicy, started: Instant) -> Result<(EngineReply, ReplyLine), EngineError> {
        let expected = || milestones.iter().join(" or ");

        loop {
            let line = match timeout {
                TimeoutPolicy::Unbounded => self.replies.recv().map_err(|_| EngineError::Terminated {
                    expected: expected(),
                })?,
                TimeoutPolicy::Within(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());

                    match self.replies.recv_timeout(remaining) {
                        Ok(line) => line,
                        Err(RecvTimeoutError::Timeout) => return Err(EngineError::Timeout {
                            expected: expected(),
                            waited: limit,
                        }),
                        Err(RecvTimeoutError::Disconnected) => return Err(EngineError::Terminated {
                            expected: expected(),
                        }),
                    }
                },
            };

            if let Some(reply) = UciInterpreter::line_to_reply(&line.text) {
                if milestones.contains(&reply.milestone()) {
                    return Ok((reply, line));
                }
            }
        }
    }

    /// `uci` up to `uciok`, remembering the name the engine gives itself on the way.
    pub fn handshake(&mut self) -> Result<EngineIdentity, EngineError> {
        self.send(&EngineCommand::Uci)?;

        let started = Instant::now();
        let mut name = None;
        loop {
            let (reply, _) = self.await_since(&[Milestone::Identification, Milestone::UciOk], self.handshake_timeout, started)?;

            match reply {
                EngineReply::Id { name: id_name } => name = Some(id_name),
                _ => break,
            }
        }

        let identity = match name {
            Some(name) => EngineIdentity { name, reported: true },
            None => EngineIdentity { name: self.default_name.clone(), reported: false },
        };
        debug!("engine identified as {:?}", identity);

        Ok(identity)
    }

    pub fn configure(&mut self, options: &[(&str, String)]) -> Result<(), EngineError> {
        for (name, value) in options {
            self.send(&EngineCommand::set_option(name, value))?;
        }

        Ok(())
    }

    /// `isready`, and wait until the engine has caught up with everything sent so far.
    pub fn ready(&mut self) -> Result<(), EngineError> {
        self.send(&EngineCommand::IsReady)?;
        self.await_reply(Milestone::ReadyOk, self.handshake_timeout)?;

        Ok(())
    }

    /// Sends `quit` and reaps the process, killing it when it does not leave by itself.
    /// Calling it again does nothing.
    pub fn close(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }

        // The engine may already be gone, in which case the pipe is broken
        if self.stdin.is_some() {
            if let Err(error) = self.send(&EngineCommand::Quit) {
                debug!("could not send quit: {error}");
            }
        }
        self.stdin = None;

        let reaped = self.await_exit();
        if reaped.is_err() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
        self.closed = true;

        reaped
    }

    fn await_exit(&mut self) -> Result<(), EngineError> {
        let started = Instant::now();

        loop {
            if let Some(status) = self.child.try_wait()? {
                debug!("engine (pid {}) exited with {status}", self.child.id());
                return Ok(());
            }

            if started.elapsed() >= QUIT_GRACE {
                warn!("engine (pid {}) ignored quit, killing it", self.child.id());
                self.child.kill()?;
                self.child.wait()?;
                return Ok(());
            }

            thread::sleep(EXIT_POLL);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!("failed to shut down engine: {error}");
        }
    }
}
