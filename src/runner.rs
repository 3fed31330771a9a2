use std::io::{self, Write};

use log::{error, info, warn};
use thiserror::Error;

use crate::{
    command::Command,
    redis_session::ConnectError,
    reply::Reply,
    session::{Connection, ExecuteError, Session},
};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("{0}")]
    Connect(ConnectError),
    #[error("{0}")]
    Execute(ExecuteError),
    #[error("cannot write report: {0}")]
    Output(io::Error),
}

impl RunError {
    /// The line printed before the final exit message, if any.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Connect(ConnectError::Allocation(reason)) => {
                Some(format!("redis client error: {}", reason))
            }
            Self::Connect(ConnectError::Connection(reason)) => {
                Some(format!("redis connection error: {}", reason))
            }
            Self::Execute(err) => Some(format!("redis command error: {}", err)),
            Self::Output(_) => None,
        }
    }
}

/// Runs a fixed list of commands over one connection and writes a plain-text
/// report to `out`.
pub struct CommandRunner<W: Write> {
    out: W,
}

impl<W: Write> CommandRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
    pub fn into_inner(self) -> W {
        self.out
    }
    fn line(&mut self, line: &str) -> Result<(), RunError> {
        writeln!(self.out, "{}", line).map_err(RunError::Output)
    }
    pub fn run<S, F>(&mut self, connect: F, commands: &[Command]) -> Result<(), RunError>
    where
        S: Session,
        F: FnOnce() -> Result<S, ConnectError>,
    {
        self.line("rediscmd start running ...")?;
        match self.sequence(connect, commands) {
            Ok(()) => self.line("rediscmd exit with success."),
            Err(err) => {
                error!("{}", err);
                if let Some(diagnostic) = err.diagnostic() {
                    self.line(&diagnostic)?;
                }
                self.line("rediscmd exit with error.")?;
                Err(err)
            }
        }
    }
    /// Reports a failure that happened before any connection was attempted,
    /// keeping the same start and exit lines as every other run.
    pub fn abort(&mut self, diagnostic: &str) -> Result<(), RunError> {
        error!("{}", diagnostic);
        self.line("rediscmd start running ...")?;
        self.line(diagnostic)?;
        self.line("rediscmd exit with error.")
    }
    fn sequence<S, F>(&mut self, connect: F, commands: &[Command]) -> Result<(), RunError>
    where
        S: Session,
        F: FnOnce() -> Result<S, ConnectError>,
    {
        let mut connection: Connection<S> = Connection::new(connect().map_err(RunError::Connect)?);
        for command in commands {
            let reply: Reply = connection.execute(command).map_err(RunError::Execute)?;
            if reply.is_error() {
                warn!("{} failed: {}", command.name(), reply);
            } else {
                info!("{} answered with {} reply", command.name(), reply.kind());
            }
            writeln!(self.out, "redis reply: {}", reply).map_err(RunError::Output)?;
        }
        connection.shutdown();
        Ok(())
    }
}
