//! Authentication and profile flows.
//!
//! Each submodule is a small state machine driven by the HTTP handlers in
//! [`crate::api`]. They only talk to the outside world through the
//! [`IdentityProvider`](crate::identity::IdentityProvider) and
//! [`ProfileStore`](crate::store::ProfileStore) traits, so they can be tested
//! with in-memory fakes.

pub mod credentials;
pub mod profile;
pub mod redirect;
pub mod reset_gate;
pub mod verification;

/// Landing page for signed-in users.
pub const PROTECTED_PATH: &str = "/protected";
pub const VERIFIED_PATH: &str = "/auth/verified";
pub const UPDATE_PASSWORD_PATH: &str = "/auth/update-password";
pub const PASSWORD_UPDATED_PATH: &str = "/auth/password-updated";
pub const SIGN_UP_SUCCESS_PATH: &str = "/auth/sign-up-success";
pub const LOGIN_PATH: &str = "/auth/login";
pub const AUTH_ERROR_PATH: &str = "/auth/error";

/// Append a single URL-encoded query pair to a site-relative path.
pub(crate) fn with_query(path: &str, key: &str, value: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    format!("{path}?{query}")
}
