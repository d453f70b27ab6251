use anyhow::{Context, Result};
use clap::{Arg, Command};

pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_PKCE_TTL_SECONDS: &str = "pkce-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Public site URL used to build email redirect links")
                .env("CENTRAL_SITE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("CENTRAL_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_PKCE_TTL_SECONDS)
                .long(ARG_PKCE_TTL_SECONDS)
                .help("PKCE verifier cookie TTL in seconds")
                .env("CENTRAL_PKCE_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub site_url: String,
    pub session_ttl_seconds: i64,
    pub pkce_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if the site URL is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let site_url = matches
            .get_one::<String>(ARG_SITE_URL)
            .cloned()
            .with_context(|| format!("missing required argument: --{ARG_SITE_URL}"))?;

        Ok(Self {
            site_url,
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(43_200),
            pkce_ttl_seconds: matches
                .get_one::<i64>(ARG_PKCE_TTL_SECONDS)
                .copied()
                .unwrap_or(3_600),
        })
    }
}
