use std::{
    io::{stdout, Stdout},
    process::ExitCode,
};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::{Config, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_KEY, DEFAULT_PASSWORD, DEFAULT_PORT};
use env_logger::Env;
use redis_session::RedisSession;
use runner::CommandRunner;
use session::ConnectionParameters;
use util::{fatal, FAILURE_EXIT_CODE};

mod command;
mod config;
mod redis_session;
mod reply;
mod runner;
mod session;
#[cfg(test)]
mod test_support;
mod util;

fn cli() -> Command {
    Command::new("rediscmd")
        .about("Connects to a redis server, authenticates and reads one key")
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .help("print help")
                .long("help")
                .action(ArgAction::Help),
        )
        .arg(
            Arg::new("host")
                .help("server hostname")
                .short('h')
                .long("host")
                .env("REDISCMD_HOST")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .default_value(DEFAULT_HOST),
        )
        .arg(
            Arg::new("port")
                .help(format!("server port (default: {})", DEFAULT_PORT))
                .short('p')
                .long("port")
                .env("REDISCMD_PORT")
                .value_parser(value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("timeout")
                .help(format!(
                    "connect timeout in ms (default: {} ms)",
                    DEFAULT_CONNECT_TIMEOUT.as_millis()
                ))
                .short('t')
                .long("timeout")
                .env("REDISCMD_TIMEOUT")
                .value_parser(value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("command-timeout")
                .help("read/write timeout for each command in ms (default: none)")
                .long("command-timeout")
                .env("REDISCMD_COMMAND_TIMEOUT")
                .value_parser(value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("user")
                .help("ACL username sent with AUTH")
                .long("user")
                .env("REDISCMD_USER"),
        )
        .arg(
            Arg::new("pass")
                .help("password sent with AUTH")
                .short('a')
                .long("pass")
                .env("REDISCMD_AUTH")
                .hide_env_values(true)
                .default_value(DEFAULT_PASSWORD),
        )
        .arg(
            Arg::new("askpass")
                .help("prompt for the password instead of using --pass")
                .long("askpass")
                .action(ArgAction::SetTrue)
                .conflicts_with("no-auth"),
        )
        .arg(
            Arg::new("no-auth")
                .help("skip the AUTH command")
                .long("no-auth")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("key")
                .help("key to read with GET")
                .short('k')
                .long("key")
                .env("REDISCMD_KEY")
                .default_value(DEFAULT_KEY),
        )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args: ArgMatches = cli().get_matches();
    let mut runner: CommandRunner<Stdout> = CommandRunner::new(stdout());
    let config: Config = match Config::from_matches(&args, || {
        rpassword::prompt_password("Enter password: ")
    }) {
        Ok(config) => config,
        Err(err) => return fatal(&mut runner, &format!("{err:#}")),
    };
    let params: ConnectionParameters = config.connection_parameters();
    match runner.run(|| RedisSession::connect(&params), &config.commands()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(FAILURE_EXIT_CODE),
    }
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use super::*;
    use crate::config::Credentials;

    fn parse(argv: &[&str]) -> Config {
        let args: ArgMatches = cli().try_get_matches_from(argv).unwrap();
        Config::from_matches(&args, || Ok("prompted".to_owned())).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn defaults_reproduce_the_smoke_test() {
        let config: Config = parse(&["rediscmd"]);
        assert_eq!(config, Config::default());
        assert_eq!(config.connect_timeout, Duration::from_millis(1500));
        assert_eq!(
            config.commands(),
            vec![command::Command::auth(None, "test"), command::Command::get("name")]
        );
    }

    #[test]
    fn flags_override_defaults() {
        let config: Config = parse(&[
            "rediscmd",
            "-h",
            "127.0.0.1",
            "-p",
            "6380",
            "-t",
            "250",
            "--command-timeout",
            "900",
            "--user",
            "alice",
            "-a",
            "secret",
            "-k",
            "greeting",
        ]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6380);
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.command_timeout, Some(Duration::from_millis(900)));
        assert_eq!(
            config.credentials,
            Some(Credentials {
                username: Some("alice".to_owned()),
                password: "secret".to_owned(),
            })
        );
        assert_eq!(
            config.commands(),
            vec![
                command::Command::auth(Some("alice"), "secret"),
                command::Command::get("greeting")
            ]
        );
    }

    #[test]
    fn no_auth_only_reads_the_key() {
        let config: Config = parse(&["rediscmd", "--no-auth"]);
        assert_eq!(config.credentials, None);
        assert_eq!(config.commands(), vec![command::Command::get("name")]);
    }

    #[test]
    fn askpass_uses_the_prompt() {
        let config: Config = parse(&["rediscmd", "--askpass"]);
        assert_eq!(
            config.credentials.map(|credentials: Credentials| credentials.password),
            Some("prompted".to_owned())
        );
    }

    #[test]
    fn prompt_failure_is_reported() {
        let args: ArgMatches = cli().try_get_matches_from(["rediscmd", "--askpass"]).unwrap();
        let result: anyhow::Result<Config> = Config::from_matches(&args, || {
            Err(io::Error::new(io::ErrorKind::NotFound, "no tty"))
        });
        let message: String = format!("{:#}", result.unwrap_err());
        assert!(message.contains("cannot read password"));
        assert!(message.contains("no tty"));
    }

    #[test]
    fn rejects_zero_timeout_and_port() {
        assert!(cli().try_get_matches_from(["rediscmd", "-t", "0"]).is_err());
        assert!(cli().try_get_matches_from(["rediscmd", "-p", "0"]).is_err());
        assert!(cli().try_get_matches_from(["rediscmd", "-h", ""]).is_err());
    }
}
