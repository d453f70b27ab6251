//! Auth handlers and supporting modules.
//!
//! Credentials, tokens and sessions are owned by the identity provider. These
//! handlers validate input, call the provider once per request and keep the
//! resulting access token in an `HttpOnly` cookie.
//!
//! ## PKCE
//!
//! Sign-up and password reset emails use the PKCE flow. The code verifier is
//! generated here and kept in a short-lived cookie (`central_pkce`); it is
//! replayed when the code from the email is exchanged and cleared once a
//! session exists.

pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod session;
pub(crate) mod signup;
mod state;
pub(crate) mod types;
pub(crate) mod user;
pub(crate) mod verified;

pub use state::{AuthConfig, AuthState};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::flows::credentials::FieldErrors;
use types::ValidationErrorResponse;

/// `422` with field-level messages.
pub(crate) fn validation_error(errors: FieldErrors, suggestion: Option<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorResponse { errors, suggestion }),
    )
        .into_response()
}
