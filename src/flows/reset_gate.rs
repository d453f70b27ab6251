//! Two-phase password reset: prove possession of a reset link (or an active
//! session) first, only then accept a new password.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::PASSWORD_UPDATED_PATH;
use crate::identity::{IdentityProvider, Session};

pub const INVALID_LINK_MESSAGE: &str =
    "Invalid or expired reset link. Please request a new password reset.";
pub const NO_SESSION_MESSAGE: &str =
    "No valid session found. Please use the password reset link from your email.";
pub const MIN_PASSWORD_LENGTH: usize = 6;
const PASSWORD_TOO_SHORT_MESSAGE: &str = "Password must be at least 6 characters";
const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResetGate {
    #[default]
    Initializing,
    Established,
    Denied {
        message: String,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The gate never opened; carries the denial message.
    NotEstablished(String),
    /// Rejected before reaching the provider.
    Invalid(String),
    /// The provider refused the update.
    Provider(String),
}

impl SubmitError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotEstablished(message) | Self::Invalid(message) | Self::Provider(message) => {
                message
            }
        }
    }
}

impl ResetGate {
    /// Gate for a request that carries no reset code: open iff a session is
    /// already active.
    #[must_use]
    pub fn from_session(has_session: bool) -> Self {
        if has_session {
            Self::Established
        } else {
            Self::Denied {
                message: NO_SESSION_MESSAGE.to_string(),
            }
        }
    }

    /// Resolve the gate on entry. With a code, the code alone decides: it is
    /// exchanged once and a rejection denies access even if an older session
    /// exists.
    pub async fn establish(
        code: Option<&str>,
        code_verifier: Option<&str>,
        has_session: bool,
        identity: &dyn IdentityProvider,
    ) -> (Self, Option<Session>) {
        let Some(code) = code.filter(|code| !code.is_empty()) else {
            return (Self::from_session(has_session), None);
        };

        match identity.exchange_code_for_session(code, code_verifier).await {
            Ok(Some(session)) => (Self::Established, Some(session)),
            Ok(None) => (Self::Established, None),
            Err(err) => {
                debug!("Reset code exchange failed: {err}");
                (
                    Self::Denied {
                        message: INVALID_LINK_MESSAGE.to_string(),
                    },
                    None,
                )
            }
        }
    }

    #[must_use]
    pub fn accepts_password(&self) -> bool {
        matches!(self, Self::Established)
    }

    /// Submit the new password. Exactly one provider call is made, and only
    /// when the gate is open and the password passes validation.
    ///
    /// # Errors
    /// See [`SubmitError`].
    pub async fn submit(
        &self,
        access_token: &str,
        password: &SecretString,
        identity: &dyn IdentityProvider,
    ) -> Result<&'static str, SubmitError> {
        match self {
            Self::Established => {}
            Self::Denied { message } => return Err(SubmitError::NotEstablished(message.clone())),
            Self::Initializing => {
                return Err(SubmitError::NotEstablished(NO_SESSION_MESSAGE.to_string()))
            }
        }

        validate_new_password(password.expose_secret()).map_err(SubmitError::Invalid)?;

        match identity.update_user_password(access_token, password).await {
            Ok(_) => Ok(PASSWORD_UPDATED_PATH),
            Err(err) => {
                if err.provider_message().is_none() {
                    error!("Password update failed: {err}");
                }
                Err(SubmitError::Provider(
                    err.provider_message()
                        .unwrap_or(GENERIC_ERROR_MESSAGE)
                        .to_string(),
                ))
            }
        }
    }
}

/// # Errors
/// Returns the field message when the password is too short.
pub fn validate_new_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Err(PASSWORD_TOO_SHORT_MESSAGE.to_string())
    } else {
        Ok(())
    }
}
