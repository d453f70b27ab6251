//! # Central (auth and profile backend)
//!
//! `central` serves the authentication flow and the student dashboard backend
//! of the Central learning platform. Credential checks, token issuance and
//! session storage belong to a hosted identity provider; this crate only drives
//! its client surface and reacts to success or error outcomes.
//!
//! ## Email links
//!
//! Verification and password-reset emails point at `GET /auth/confirm`. The
//! resolver classifies the link (PKCE `code` or legacy `token_hash` + `type`)
//! and always answers with a redirect; provider errors travel as a
//! human-readable `error` query parameter, never as a failed request.
//!
//! ## Sessions
//!
//! Provider sessions are kept in `HttpOnly` cookies. The service never inspects
//! a session beyond "is there one", and every request builds its view of the
//! session from the incoming cookies.
//!
//! ## Profiles
//!
//! Profiles live in the `users` table keyed by the provider's user id. A
//! profile is synthesized from the provider user on first visit and only
//! persisted on the first save.

pub mod api;
pub mod cli;
pub mod flows;
pub mod identity;
pub mod store;

#[cfg(test)]
mod testing;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
