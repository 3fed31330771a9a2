use log::{debug, info};
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError, Value};
use thiserror::Error;

use crate::{
    command::Command,
    reply::{Reply, ServerError},
    session::{ConnectionParameters, ExecuteError, Session},
};

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("cannot create redis client: {0}")]
    Allocation(String),
    #[error("{0}")]
    Connection(String),
}

// No password or db here: AUTH goes out as an ordinary command, and with
// CLIENT SETINFO compiled out the connect phase is a bare TCP connect.
fn connection_info(host: &str, port: u16) -> Result<ConnectionInfo, ConnectError> {
    if host.is_empty() {
        return Err(ConnectError::Allocation("empty host".to_owned()));
    }
    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host.to_owned(), port),
        redis: RedisConnectionInfo::default(),
    })
}

fn execute_error(err: RedisError) -> ExecuteError {
    if err.is_timeout() {
        ExecuteError::Timeout(err.to_string())
    } else if err.is_io_error() || err.is_connection_dropped() {
        ExecuteError::ConnectionLost(err.to_string())
    } else {
        ExecuteError::Client(err.to_string())
    }
}

/// Blocking session backed by the `redis` crate.
pub struct RedisSession {
    connection: Option<redis::Connection>,
}

impl RedisSession {
    pub fn connect(params: &ConnectionParameters) -> Result<Self, ConnectError> {
        let info: ConnectionInfo = connection_info(&params.host, params.port)?;
        let client: Client = Client::open(info)
            .map_err(|err: RedisError| ConnectError::Allocation(err.to_string()))?;
        debug!(
            "connecting to {}:{} (timeout {} ms)",
            params.host,
            params.port,
            params.connect_timeout.as_millis()
        );
        let connection: redis::Connection = client
            .get_connection_with_timeout(params.connect_timeout)
            .map_err(|err: RedisError| ConnectError::Connection(err.to_string()))?;
        if let Some(timeout) = params.command_timeout {
            connection
                .set_read_timeout(Some(timeout))
                .map_err(|err: RedisError| ConnectError::Connection(err.to_string()))?;
            connection
                .set_write_timeout(Some(timeout))
                .map_err(|err: RedisError| ConnectError::Connection(err.to_string()))?;
        }
        info!("connected to {}:{}", params.host, params.port);
        Ok(Self {
            connection: Some(connection),
        })
    }
}

impl Session for RedisSession {
    fn execute(&mut self, command: &Command) -> Result<Reply, ExecuteError> {
        let connection: &mut redis::Connection =
            self.connection.as_mut().ok_or(ExecuteError::Closed)?;
        debug!("sending {}", command);
        match command.to_redis_cmd().query::<Value>(connection) {
            Ok(value) => Ok(Reply::from(value)),
            Err(err) => match ServerError::from_redis_error(&err) {
                Some(server_error) => Ok(Reply::Error(server_error)),
                None => Err(execute_error(err)),
            },
        }
    }
    fn close(&mut self) {
        if self.connection.take().is_some() {
            info!("connection closed");
        }
    }
}
