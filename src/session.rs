use std::time::Duration;

use thiserror::Error;

use crate::{command::Command, reply::Reply};

pub struct ConnectionParameters {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Option<Duration>,
}

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("connection to the server was lost: {0}")]
    ConnectionLost(String),
    #[error("command timed out: {0}")]
    Timeout(String),
    #[error("{0}")]
    Client(String),
    #[error("connection already closed")]
    Closed,
}

/// One open session to a Redis-compatible server.
pub trait Session {
    /// Sends `command` and blocks for its reply. Error replies from the
    /// server come back as `Ok(Reply::Error(_))`; `Err` means the transport
    /// failed.
    fn execute(&mut self, command: &Command) -> Result<Reply, ExecuteError>;
    fn close(&mut self);
}

/// Owns a session and closes it exactly once, either through `shutdown` or
/// when dropped on an early return.
pub struct Connection<S: Session> {
    session: Option<S>,
}

impl<S: Session> Connection<S> {
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }
    pub fn execute(&mut self, command: &Command) -> Result<Reply, ExecuteError> {
        match self.session.as_mut() {
            Some(session) => session.execute(command),
            None => Err(ExecuteError::Closed),
        }
    }
    pub fn shutdown(mut self) {
        self.release();
    }
    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}

impl<S: Session> Drop for Connection<S> {
    fn drop(&mut self) {
        self.release();
    }
}
