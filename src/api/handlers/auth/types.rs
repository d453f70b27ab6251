//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::flows::credentials::{Check, FieldErrors, PasswordStrength};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub repeat_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignUpCheckRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct SignUpCheckResponse {
    pub email_checks: Vec<Check>,
    pub password_checks: Vec<Check>,
    pub strength: PasswordStrength,
    /// Corrected address when the domain looks like a known typo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CodeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Where the browser should go next.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RedirectResponse {
    pub redirect_to: String,
}

impl RedirectResponse {
    pub fn to(path: &str) -> Self {
        Self {
            redirect_to: path.to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ValidationErrorResponse {
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_confirmed: bool,
}
