use std::fmt::Display;

/// A command name plus its arguments, each kept as a separate protocol field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            args: Vec::new(),
        }
    }
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_owned());
        self
    }
    pub fn auth(username: Option<&str>, password: &str) -> Self {
        match username {
            Some(username) => Self::new("AUTH").arg(username).arg(password),
            None => Self::new("AUTH").arg(password),
        }
    }
    pub fn get(key: &str) -> Self {
        Self::new("GET").arg(key)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn args(&self) -> &[String] {
        &self.args
    }
    pub fn to_redis_cmd(&self) -> redis::Cmd {
        let mut cmd: redis::Cmd = redis::cmd(&self.name);
        for arg in &self.args {
            cmd.arg(arg.as_str());
        }
        cmd
    }
}

// Arguments are left out on purpose so AUTH never leaks a password into logs.
impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} args)", self.name, self.args.len())
    }
}
