use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_IDENTITY_ANON_KEY: &str = "identity-anon-key";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity provider project URL, example: https://<ref>.supabase.co")
                .env("CENTRAL_IDENTITY_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_ANON_KEY)
                .long(ARG_IDENTITY_ANON_KEY)
                .help("Identity provider public (anon) API key")
                .env("CENTRAL_IDENTITY_ANON_KEY")
                .hide_env_values(true)
                .required(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: String,
    pub anon_key: SecretString,
}

impl Options {
    /// # Errors
    /// Returns an error if a required identity argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_IDENTITY_URL)
            .cloned()
            .with_context(|| format!("missing required argument: --{ARG_IDENTITY_URL}"))?;
        let anon_key = matches
            .get_one::<String>(ARG_IDENTITY_ANON_KEY)
            .cloned()
            .with_context(|| format!("missing required argument: --{ARG_IDENTITY_ANON_KEY}"))?;

        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
        })
    }
}
