//! Wire types shared with the identity provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Email OTP kinds accepted by the provider's `verify` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailOtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

impl EmailOtpType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Invite => "invite",
            Self::Magiclink => "magiclink",
            Self::Recovery => "recovery",
            Self::EmailChange => "email_change",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for EmailOtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailOtpType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "signup" => Ok(Self::Signup),
            "invite" => Ok(Self::Invite),
            "magiclink" => Ok(Self::Magiclink),
            "recovery" => Ok(Self::Recovery),
            "email_change" => Ok(Self::EmailChange),
            "email" => Ok(Self::Email),
            other => Err(format!("Unsupported verification type: {other}")),
        }
    }
}

/// Provider user record. Unknown fields are ignored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    /// Linked identities. The provider answers a sign-up for an existing,
    /// confirmed address with a user whose identity list is empty.
    #[serde(default)]
    pub identities: Option<Vec<Value>>,
}

impl User {
    /// Non-empty string entry from `user_metadata`.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Local part of the email, used as a short display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
    }
}

/// Provider session. Opaque to this crate beyond carrying the tokens around.
#[derive(Clone, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<User>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user.as_ref().map(|user| user.id))
            .finish()
    }
}

/// Result of a sign-up: either a pending user (email confirmation required) or
/// a session when the provider auto-confirms.
#[derive(Clone, Debug, Default)]
pub struct SignUp {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl SignUp {
    /// The provider returns an existing account with no identities instead of an error.
    #[must_use]
    pub fn is_existing_account(&self) -> bool {
        self.user
            .as_ref()
            .and_then(|user| user.identities.as_ref())
            .is_some_and(Vec::is_empty)
    }
}

/// Extra sign-up parameters.
#[derive(Clone, Debug, Default)]
pub struct SignUpOptions {
    pub email_redirect_to: String,
    pub code_challenge: Option<String>,
}
