//! Email and password sign-in.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

use super::{
    session::session_headers,
    state::AuthState,
    types::{LoginRequest, RedirectResponse, ValidationErrorResponse},
    validation_error,
};
use crate::flows::{
    credentials::{login_error_message, validate_login},
    PROTECTED_PATH,
};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = RedirectResponse),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Provider rejected the credentials", body = String),
        (status = 422, description = "Invalid form", body = ValidationErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if let Err(errors) = validate_login(&request.email, &request.password) {
        return validation_error(errors, None);
    }

    let password = SecretString::from(request.password);
    match auth_state
        .identity()
        .sign_in_with_password(&request.email, &password)
        .await
    {
        Ok(session) => {
            let headers = session_headers(auth_state.config(), Some(&session));
            (
                StatusCode::OK,
                headers,
                Json(RedirectResponse::to(PROTECTED_PATH)),
            )
                .into_response()
        }
        Err(err) => {
            debug!("Sign-in rejected: {err}");
            (StatusCode::UNAUTHORIZED, login_error_message(&err)).into_response()
        }
    }
}
