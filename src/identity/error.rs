use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider answered and rejected the request.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// Provider rejection built from a message, mostly for tests and fakes.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Message suitable for showing to the user, `None` when the failure did
    /// not come from the provider itself.
    #[must_use]
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// True when the provider answered and refused the request itself, as
    /// opposed to failing or being unreachable.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status < 500)
    }

    /// Build an `Api` error from a provider error body.
    ///
    /// The provider is not consistent about field names: `msg`,
    /// `error_description`, `message` and `error` all show up depending on the
    /// endpoint. A server error without a JSON body came from something in
    /// front of the provider and its text is never shown to users.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        if parsed.is_none() && status >= 500 {
            return Self::InvalidResponse(format!("status {status} without a JSON body"));
        }
        let message = parsed
            .as_ref()
            .and_then(|value| {
                ["msg", "error_description", "message", "error"]
                    .iter()
                    .find_map(|key| value.get(*key).and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("Request failed with status {status}")
                } else {
                    trimmed.to_string()
                }
            });
        let code = parsed.as_ref().and_then(|value| {
            value
                .get("error_code")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        Self::Api {
            status,
            code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_body_prefers_msg() {
        let err = AuthError::from_body(
            400,
            r#"{"code":400,"error_code":"otp_expired","msg":"Email link is invalid or has expired"}"#,
        );
        assert_eq!(
            err.provider_message(),
            Some("Email link is invalid or has expired")
        );
        if let AuthError::Api { status, code, .. } = err {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("otp_expired"));
        }
    }

    #[test]
    fn from_body_reads_oauth_style_errors() {
        let err = AuthError::from_body(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.provider_message(), Some("Invalid login credentials"));
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn from_body_falls_back_to_raw_text() {
        let err = AuthError::from_body(429, "too many requests");
        assert_eq!(err.provider_message(), Some("too many requests"));

        let err = AuthError::from_body(404, "  ");
        assert_eq!(
            err.provider_message(),
            Some("Request failed with status 404")
        );
    }

    #[test]
    fn gateway_pages_are_not_provider_messages() {
        let err = AuthError::from_body(
            502,
            "<html><body><h1>502 Bad Gateway</h1></body></html>",
        );
        assert_eq!(err.provider_message(), None);
        assert!(matches!(err, AuthError::InvalidResponse(_)));
        assert!(!err.is_rejection());

        let err = AuthError::from_body(503, "");
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[test]
    fn server_errors_are_not_rejections() {
        assert!(AuthError::api(401, "invalid JWT").is_rejection());
        let err = AuthError::from_body(500, r#"{"msg":"Database error"}"#);
        assert_eq!(err.provider_message(), Some("Database error"));
        assert!(!err.is_rejection());
    }

    #[test]
    fn non_api_errors_have_no_provider_message() {
        let err = AuthError::InvalidResponse("missing field".to_string());
        assert_eq!(err.provider_message(), None);
    }
}
