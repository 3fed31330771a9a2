use std::fmt::{self, Display, Formatter};

use redis::{RedisError, Value};

/// An error reply sent by the server, e.g. `-ERR unknown command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Returns the server error carried by `err`, or `None` when the failure
    /// happened on the client side (I/O, timeout, dropped connection).
    pub fn from_redis_error(err: &RedisError) -> Option<Self> {
        if err.is_io_error() || err.is_timeout() || err.is_connection_dropped() {
            return None;
        }
        let code: &str = err.code()?;
        Some(Self {
            code: code.to_owned(),
            message: err.detail().unwrap_or_default().to_owned(),
        })
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message)
        }
    }
}

/// The outcome of one command. Callers must match on it before touching a
/// payload; a missing key and an error reply are values, not payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Status(String),
    Integer(i64),
    Bulk(Vec<u8>),
    Array(Vec<Reply>),
    Error(ServerError),
}

impl Reply {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
    /// The bulk payload, if the server answered with one.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Bulk(data) => Some(data),
            _ => None,
        }
    }
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Status(_) => "status",
            Self::Integer(_) => "integer",
            Self::Bulk(_) => "bulk",
            Self::Array(_) => "array",
            Self::Error(_) => "error",
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Okay => Self::Status("OK".to_owned()),
            Value::Status(status) => Self::Status(status),
            Value::Int(int) => Self::Integer(int),
            Value::Data(data) => Self::Bulk(data),
            Value::Bulk(items) => Self::Array(items.into_iter().map(Reply::from).collect()),
            // RESP3-only shapes never appear on a RESP2 connection.
            #[allow(unreachable_patterns)]
            other => Self::Status(format!("{:?}", other)),
        }
    }
}

fn is_plain_text(data: &[u8]) -> Option<&str> {
    let text: &str = std::str::from_utf8(data).ok()?;
    if text.chars().any(char::is_control) {
        return None;
    }
    Some(text)
}

fn quote_bytes(data: &[u8]) -> String {
    let mut quoted: String = String::with_capacity(data.len() + 2);
    quoted.push('"');
    for byte in data {
        quoted.extend(std::ascii::escape_default(*byte).map(char::from));
    }
    quoted.push('"');
    quoted
}

fn render_array(items: &[Reply], f: &mut Formatter<'_>) -> fmt::Result {
    if items.is_empty() {
        return write!(f, "(empty array)");
    }
    let width: usize = items.len().to_string().len();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            writeln!(f)?;
        }
        let prefix: String = format!("{:>width$}) ", index + 1, width = width);
        let indent: String = " ".repeat(prefix.len());
        let rendered: String = item.to_string();
        for (line_number, line) in rendered.lines().enumerate() {
            if line_number == 0 {
                write!(f, "{}{}", prefix, line)?;
            } else {
                write!(f, "\n{}{}", indent, line)?;
            }
        }
    }
    Ok(())
}

impl Display for Reply {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "(nil)"),
            Self::Status(status) => write!(f, "{}", status),
            Self::Integer(int) => write!(f, "(integer) {}", int),
            Self::Bulk(data) => match is_plain_text(data) {
                Some(text) => write!(f, "{}", text),
                None => write!(f, "{}", quote_bytes(data)),
            },
            Self::Array(items) => render_array(items, f),
            Self::Error(err) => write!(f, "(error) {}", err),
        }
    }
}
