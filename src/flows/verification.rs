//! Turns a one-time code from an email link into a live session.

use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::PROTECTED_PATH;
use crate::identity::{AuthError, IdentityProvider, Session};

/// Delay before the browser follows the success redirect.
pub const REDIRECT_DELAY_MS: u64 = 2000;

pub const MISSING_CODE_MESSAGE: &str = "No verification code found in URL.";
pub const NO_SESSION_MESSAGE: &str = "No session created after verification.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred during verification.";
const DEFAULT_FAILURE_MESSAGE: &str = "Verification failed";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    Loading,
    /// `redirect_to` doubles as the manual fallback link.
    Success {
        redirect_to: String,
        redirect_after_ms: u64,
    },
    Error {
        message: String,
    },
}

impl VerificationState {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Exchange `code` exactly once and map the outcome to a terminal state.
///
/// The session is returned alongside a `Success` state so the caller can
/// persist it (cookies).
pub async fn establish_session(
    code: Option<&str>,
    code_verifier: Option<&str>,
    identity: &dyn IdentityProvider,
) -> (VerificationState, Option<Session>) {
    let Some(code) = code.filter(|code| !code.is_empty()) else {
        return (VerificationState::error(MISSING_CODE_MESSAGE), None);
    };

    match identity.exchange_code_for_session(code, code_verifier).await {
        Ok(Some(session)) => (
            VerificationState::Success {
                redirect_to: PROTECTED_PATH.to_string(),
                redirect_after_ms: REDIRECT_DELAY_MS,
            },
            Some(session),
        ),
        Ok(None) => (VerificationState::error(NO_SESSION_MESSAGE), None),
        Err(err @ AuthError::Api { .. }) => {
            debug!("Code exchange rejected: {err}");
            let message = err.provider_message().unwrap_or(DEFAULT_FAILURE_MESSAGE);
            (VerificationState::error(message), None)
        }
        Err(err) => {
            error!("Code exchange failed: {err}");
            (VerificationState::error(UNEXPECTED_MESSAGE), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeIdentity, Reply};

    #[tokio::test]
    async fn missing_code_errors_without_provider_call() {
        let identity = FakeIdentity::default();
        for code in [None, Some("")] {
            let (state, session) = establish_session(code, None, &identity).await;
            assert_eq!(state, VerificationState::error(MISSING_CODE_MESSAGE));
            assert!(session.is_none());
        }
        assert_eq!(identity.total_calls(), 0);
    }

    #[tokio::test]
    async fn success_schedules_redirect() {
        let identity = FakeIdentity::default();
        let (state, session) = establish_session(Some("abc"), Some("verifier"), &identity).await;
        assert_eq!(
            state,
            VerificationState::Success {
                redirect_to: "/protected".to_string(),
                redirect_after_ms: 2000,
            }
        );
        assert!(session.is_some());
        assert_eq!(identity.details("exchange"), vec!["abc:verifier".to_string()]);
    }

    #[tokio::test]
    async fn provider_error_surfaces_message() {
        let identity = FakeIdentity {
            exchange: Reply::Reject("invalid flow state, no valid flow state found".to_string()),
            ..FakeIdentity::default()
        };
        let (state, _) = establish_session(Some("abc"), None, &identity).await;
        assert_eq!(
            state,
            VerificationState::error("invalid flow state, no valid flow state found")
        );
        assert_eq!(identity.count("exchange"), 1);
    }

    #[tokio::test]
    async fn blank_provider_message_uses_default() {
        let identity = FakeIdentity {
            exchange: Reply::Reject("  ".to_string()),
            ..FakeIdentity::default()
        };
        let (state, _) = establish_session(Some("abc"), None, &identity).await;
        assert_eq!(state, VerificationState::error("Verification failed"));
    }

    #[tokio::test]
    async fn no_session_is_an_error() {
        let identity = FakeIdentity {
            exchange: Reply::Ok(None),
            ..FakeIdentity::default()
        };
        let (state, session) = establish_session(Some("abc"), None, &identity).await;
        assert_eq!(state, VerificationState::error(NO_SESSION_MESSAGE));
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn transport_failure_maps_to_generic_error() {
        let identity = FakeIdentity {
            exchange: Reply::Broken,
            ..FakeIdentity::default()
        };
        let (state, _) = establish_session(Some("abc"), None, &identity).await;
        assert_eq!(state, VerificationState::error(UNEXPECTED_MESSAGE));
        assert!(state.is_terminal());
        assert!(!VerificationState::default().is_terminal());
    }

    #[test]
    fn state_serializes_with_status_tag() -> anyhow::Result<()> {
        let value = serde_json::to_value(VerificationState::Success {
            redirect_to: "/protected".to_string(),
            redirect_after_ms: REDIRECT_DELAY_MS,
        })?;
        assert_eq!(
            value,
            serde_json::json!({
                "status": "success",
                "redirect_to": "/protected",
                "redirect_after_ms": 2000
            })
        );
        Ok(())
    }
}
