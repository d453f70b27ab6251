//! Auth configuration and shared handler state.

use std::sync::Arc;

use crate::flows::{UPDATE_PASSWORD_PATH, VERIFIED_PATH};
use crate::identity::IdentityProvider;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;
const DEFAULT_PKCE_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    site_url: String,
    session_ttl_seconds: i64,
    pkce_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            pkce_ttl_seconds: DEFAULT_PKCE_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_pkce_ttl_seconds(mut self, seconds: i64) -> Self {
        self.pkce_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Lifetime of the access token cookie: the token's own lifetime, capped
    /// at the session TTL. Providers that omit `expires_in` get the TTL.
    pub(crate) fn access_cookie_max_age(&self, expires_in: u64) -> i64 {
        match i64::try_from(expires_in) {
            Ok(seconds) if seconds > 0 => seconds.min(self.session_ttl_seconds),
            _ => self.session_ttl_seconds,
        }
    }

    pub(crate) fn pkce_ttl_seconds(&self) -> i64 {
        self.pkce_ttl_seconds
    }

    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }

    /// Target of the confirmation email sent on sign-up.
    pub(crate) fn sign_up_redirect_url(&self) -> String {
        format!("{}{VERIFIED_PATH}", self.site_url)
    }

    /// Target of the password reset email; the resolver forwards the code to
    /// the reset gate because of `next`.
    pub(crate) fn reset_redirect_url(&self) -> String {
        format!(
            "{}{}",
            self.site_url,
            crate::flows::with_query("/auth/confirm", "next", UPDATE_PASSWORD_PATH)
        )
    }
}

pub struct AuthState {
    config: AuthConfig,
    identity: Arc<dyn IdentityProvider>,
}

impl AuthState {
    pub fn new(config: AuthConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { config, identity }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }
}
