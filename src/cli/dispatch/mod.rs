//! Map validated command-line arguments to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, identity};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let identity_opts = identity::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        identity_url: identity_opts.url,
        identity_anon_key: identity_opts.anon_key,
        site_url: auth_opts.site_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        pkce_ttl_seconds: auth_opts.pkce_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_env() {
        temp_env::with_vars(
            [
                ("CENTRAL_PORT", Some("9090")),
                ("CENTRAL_DSN", Some("postgres://localhost:5432/central")),
                ("CENTRAL_IDENTITY_URL", Some("https://project.supabase.co")),
                ("CENTRAL_IDENTITY_ANON_KEY", Some("anon-key")),
                ("CENTRAL_SITE_URL", None),
                ("CENTRAL_SESSION_TTL_SECONDS", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["central"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 9090);
                    assert_eq!(args.dsn, "postgres://localhost:5432/central");
                    assert_eq!(args.identity_url, "https://project.supabase.co");
                    assert_eq!(args.identity_anon_key.expose_secret(), "anon-key");
                    assert_eq!(args.site_url, "http://localhost:3000");
                    assert_eq!(args.session_ttl_seconds, 43_200);
                    assert_eq!(args.pkce_ttl_seconds, 3_600);
                }
            },
        );
    }
}
