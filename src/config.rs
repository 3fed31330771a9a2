use std::time::Duration;

use anyhow::Context;
use clap::ArgMatches;

use crate::{command::Command, session::ConnectionParameters};

pub const DEFAULT_HOST: &str = "hacl-node1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1500);
pub const DEFAULT_PASSWORD: &str = "test";
pub const DEFAULT_KEY: &str = "name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Option<Duration>,
    pub credentials: Option<Credentials>,
    pub key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: None,
            credentials: Some(Credentials {
                username: None,
                password: DEFAULT_PASSWORD.to_owned(),
            }),
            key: DEFAULT_KEY.to_owned(),
        }
    }
}

impl Config {
    /// Builds the config from parsed arguments. `prompt` is only called when
    /// `--askpass` was given.
    pub fn from_matches<P>(args: &ArgMatches, prompt: P) -> anyhow::Result<Self>
    where
        P: FnOnce() -> std::io::Result<String>,
    {
        let defaults: Config = Config::default();
        let credentials: Option<Credentials> = if args.get_flag("no-auth") {
            None
        } else {
            let password: String = if args.get_flag("askpass") {
                prompt().context("cannot read password from the terminal")?
            } else {
                args.get_one::<String>("pass")
                    .map(|pass: &String| pass.to_owned())
                    .unwrap_or_else(|| DEFAULT_PASSWORD.to_owned())
            };
            Some(Credentials {
                username: args.get_one::<String>("user").cloned(),
                password,
            })
        };
        Ok(Self {
            host: args.get_one::<String>("host").cloned().unwrap_or(defaults.host),
            port: args.get_one::<u16>("port").copied().unwrap_or(defaults.port),
            connect_timeout: args
                .get_one::<u64>("timeout")
                .map(|timeout_ms: &u64| Duration::from_millis(*timeout_ms))
                .unwrap_or(defaults.connect_timeout),
            command_timeout: args
                .get_one::<u64>("command-timeout")
                .map(|timeout_ms: &u64| Duration::from_millis(*timeout_ms)),
            credentials,
            key: args.get_one::<String>("key").cloned().unwrap_or(defaults.key),
        })
    }
    pub fn connection_parameters(&self) -> ConnectionParameters {
        ConnectionParameters {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout,
            command_timeout: self.command_timeout,
        }
    }
    /// The smoke-test sequence: optional AUTH, then GET of the configured key.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands: Vec<Command> = Vec::with_capacity(2);
        if let Some(credentials) = &self.credentials {
            commands.push(Command::auth(
                credentials.username.as_deref(),
                &credentials.password,
            ));
        }
        commands.push(Command::get(&self.key));
        commands
    }
}
