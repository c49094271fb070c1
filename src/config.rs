//! Runtime settings from the command line and the environment.
//!
//! Every option falls back to an environment variable, and `main` loads a
//! `.env` file first, so a deployment is usually configured with variables
//! alone.

use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;

/// Team task tracker: projects, teams, tasks, comments and notifications.
#[derive(Debug, Clone, Parser)]
#[command(name = "teamboard", version, about)]
pub struct Settings {
    /// What to run; defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Key signing session tokens.
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Development mode: relaxed host checks and non-secure cookies.
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Host names this server answers to, comma-separated. `*` allows any.
    #[arg(long, env = "ALLOWED_HOSTS", value_delimiter = ',')]
    pub allowed_hosts: Vec<String>,

    /// `PostgreSQL` connection string. Without it data lives in memory.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    pub database_pool_size: u32,

    /// Address the HTTP server binds.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub bind_addr: SocketAddr,

    /// Interface language advertised in pages.
    #[arg(long, env = "LANGUAGE_CODE", default_value = "uk")]
    pub language_code: String,

    /// Zone used to display and interpret dates.
    #[arg(long, env = "TIME_ZONE", default_value = "Europe/Kyiv", value_parser = parse_zone)]
    pub time_zone: Tz,

    /// Seconds between client notification polls.
    #[arg(
        long,
        env = "NOTIFICATION_POLL_SECONDS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub notification_poll_seconds: u64,

    /// Hours a sign-in stays valid.
    #[arg(
        long,
        env = "SESSION_TTL_HOURS",
        default_value_t = 336,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub session_ttl_hours: i64,

    /// Bootstrap superuser as `username:email:password`.
    #[arg(long, env = "TEAMBOARD_SUPERUSER", hide_env_values = true, value_parser = parse_superuser)]
    pub superuser: Option<SuperuserSpec>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Top-level commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the web server.
    Serve,
    /// Create missing database tables and exit.
    Migrate,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Credentials of the account ensured at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct SuperuserSpec {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Plain password, hashed before storage.
    pub password: String,
}

impl std::fmt::Debug for SuperuserSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperuserSpec")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// The command to run.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    /// Non-blank allowed host entries, lower-cased.
    #[must_use]
    pub fn allowed_hosts(&self) -> Vec<String> {
        self.allowed_hosts
            .iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect()
    }
}

fn parse_zone(raw: &str) -> Result<Tz, String> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|err| format!("unknown time zone '{raw}': {err}"))
}

fn parse_superuser(raw: &str) -> Result<SuperuserSpec, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(username), Some(email), Some(password)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err("expected username:email:password".to_owned());
    };
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("username, email and password must all be set".to_owned());
    }
    Ok(SuperuserSpec {
        username: username.trim().to_owned(),
        email: email.trim().to_owned(),
        password: password.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Command, LogFormat, Settings, parse_superuser};
    use clap::Parser;
    use rstest::rstest;

    #[rstest]
    fn explicit_flags_are_parsed() {
        let settings = Settings::try_parse_from([
            "teamboard",
            "--secret-key",
            "s3cret",
            "--allowed-hosts",
            "Example.com, .internal,",
            "--time-zone",
            "Europe/Warsaw",
            "--log-format",
            "json",
            "migrate",
        ])
        .expect("settings parse");

        assert_eq!(settings.command(), Command::Migrate);
        assert_eq!(settings.allowed_hosts(), vec!["example.com", ".internal"]);
        assert_eq!(settings.time_zone, chrono_tz::Europe::Warsaw);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[rstest]
    fn unknown_zone_is_rejected() {
        let parsed = Settings::try_parse_from([
            "teamboard",
            "--secret-key",
            "s3cret",
            "--time-zone",
            "Mars/Olympus",
        ]);
        assert!(parsed.is_err());
    }

    #[rstest]
    #[case("admin:admin@example.com:pa:ss", Some("pa:ss"))]
    #[case("admin:admin@example.com", None)]
    #[case("admin::secret", None)]
    fn superuser_spec_keeps_colons_in_the_password(
        #[case] raw: &str,
        #[case] password: Option<&str>,
    ) {
        let parsed = parse_superuser(raw).ok();
        assert_eq!(parsed.as_ref().map(|account| account.password.as_str()), password);
    }
}
