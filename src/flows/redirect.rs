//! Email link resolver.
//!
//! Every email the identity provider sends lands on `/auth/confirm`. The
//! resolver looks at the link shape and answers with exactly one redirect:
//!
//! * `code` (PKCE links): forwarded untouched to the page that exchanges it.
//!   Reset links go to the password gate, everything else to the verified page.
//! * `token_hash` + `type` (legacy links): verified right here.
//! * anything else: error page.

use serde::Deserialize;
use tracing::{debug, warn};
use utoipa::IntoParams;

use super::{
    with_query, AUTH_ERROR_PATH, PROTECTED_PATH, UPDATE_PASSWORD_PATH, VERIFIED_PATH,
};
use crate::identity::{EmailOtpType, IdentityProvider, Session};

pub const NO_TOKEN_MESSAGE: &str = "No verification code or token found";
pub const VERIFICATION_FAILED_MESSAGE: &str = "Verification failed";

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerificationParams {
    /// Legacy link token.
    pub token_hash: Option<String>,
    /// OTP type for `token_hash` links (`signup`, `recovery`, ...).
    #[serde(rename = "type")]
    pub otp_type: Option<String>,
    /// PKCE authorization code.
    pub code: Option<String>,
    /// Where to go after verification, defaults to `/protected`.
    pub next: Option<String>,
}

/// The shape of an incoming link.
#[derive(Debug, PartialEq, Eq)]
pub enum LinkShape<'a> {
    Code(&'a str),
    TokenHash {
        token_hash: &'a str,
        otp_type: &'a str,
    },
    Invalid,
}

/// Empty query values (`?code=`) are treated the same as missing ones.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.is_empty())
}

impl VerificationParams {
    #[must_use]
    pub fn shape(&self) -> LinkShape<'_> {
        if let Some(code) = present(self.code.as_ref()) {
            return LinkShape::Code(code);
        }
        match (
            present(self.token_hash.as_ref()),
            present(self.otp_type.as_ref()),
        ) {
            (Some(token_hash), Some(otp_type)) => LinkShape::TokenHash {
                token_hash,
                otp_type,
            },
            _ => LinkShape::Invalid,
        }
    }

    /// Raw `next`, or the protected area when absent.
    #[must_use]
    pub fn next(&self) -> &str {
        present(self.next.as_ref()).unwrap_or(PROTECTED_PATH)
    }

    fn is_password_reset(&self) -> bool {
        self.next().contains(UPDATE_PASSWORD_PATH)
    }
}

/// Only site-relative paths are echoed back; anything else lands on
/// `/protected`.
#[must_use]
pub fn safe_next(next: &str) -> &str {
    let relative = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.contains("://")
        && !next.chars().any(char::is_control);
    if relative {
        next
    } else {
        warn!("Ignoring non-relative redirect target");
        PROTECTED_PATH
    }
}

/// Outcome of resolving a link: where to send the browser, plus the session
/// when a legacy link verified and the provider handed one out.
#[derive(Debug)]
pub struct Resolution {
    pub location: String,
    pub session: Option<Session>,
}

impl Resolution {
    fn redirect(location: String) -> Self {
        Self {
            location,
            session: None,
        }
    }

    fn error(message: &str) -> Self {
        Self::redirect(with_query(AUTH_ERROR_PATH, "error", message))
    }
}

/// Resolve an email link into a redirect. Never fails: every problem ends on
/// the error page.
pub async fn resolve(params: &VerificationParams, identity: &dyn IdentityProvider) -> Resolution {
    match params.shape() {
        LinkShape::Code(code) => {
            let target = if params.is_password_reset() {
                UPDATE_PASSWORD_PATH
            } else {
                VERIFIED_PATH
            };
            debug!(target, "Forwarding PKCE code");
            Resolution::redirect(with_query(target, "code", code))
        }
        LinkShape::TokenHash {
            token_hash,
            otp_type,
        } => {
            let otp_type = match otp_type.parse::<EmailOtpType>() {
                Ok(otp_type) => otp_type,
                Err(message) => return Resolution::error(&message),
            };
            match identity.verify_otp(otp_type, token_hash).await {
                Ok(session) => Resolution {
                    location: safe_next(params.next()).to_string(),
                    session,
                },
                Err(err) => {
                    debug!("OTP verification failed: {err}");
                    Resolution::error(err.provider_message().unwrap_or(VERIFICATION_FAILED_MESSAGE))
                }
            }
        }
        LinkShape::Invalid => Resolution::error(NO_TOKEN_MESSAGE),
    }
}
