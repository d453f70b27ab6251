//! Password reset: request the email, open the gate, set the new password.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, error};

use super::{
    session::{
        extract_cookie, session_headers, session_token, verifier_cookie, PKCE_COOKIE_NAME,
    },
    state::AuthState,
    types::{
        CodeRequest, ForgotPasswordRequest, MessageResponse, RedirectResponse,
        UpdatePasswordRequest, ValidationErrorResponse,
    },
    validation_error,
};
use crate::{
    flows::{
        credentials::{valid_email, FieldErrors},
        reset_gate::{ResetGate, SubmitError},
    },
    identity::pkce::PkcePair,
};

const RESET_EMAIL_SENT_MESSAGE: &str =
    "If an account exists for this email, a password reset link is on its way.";

#[utoipa::path(
    post,
    path = "/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email requested", body = MessageResponse),
        (status = 400, description = "Provider rejected the request", body = String),
        (status = 422, description = "Invalid email", body = ValidationErrorResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_email(&request.email) {
        let errors = FieldErrors {
            email: Some("Please enter a valid email address".to_string()),
            ..FieldErrors::default()
        };
        return validation_error(errors, None);
    }

    let config = auth_state.config();
    let pkce = PkcePair::generate();
    match auth_state
        .identity()
        .reset_password_for_email(
            &request.email,
            &config.reset_redirect_url(),
            Some(pkce.challenge()),
        )
        .await
    {
        Ok(()) => {
            let mut headers = HeaderMap::new();
            match verifier_cookie(config, pkce.verifier()) {
                Ok(cookie) => {
                    headers.insert(SET_COOKIE, cookie);
                }
                Err(err) => error!("Failed to build PKCE cookie: {err}"),
            }
            let body = MessageResponse {
                message: RESET_EMAIL_SENT_MESSAGE.to_string(),
            };
            (StatusCode::OK, headers, Json(body)).into_response()
        }
        Err(err) => {
            debug!("Reset request rejected: {err}");
            let message = err.provider_message().unwrap_or("An error occurred");
            (StatusCode::BAD_REQUEST, message.to_string()).into_response()
        }
    }
}

/// Open the reset gate. With a `code` the link is exchanged once; without it
/// an existing session is required.
#[utoipa::path(
    post,
    path = "/v1/auth/password-reset/session",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "Gate state", body = ResetGate)
    ),
    tag = "auth"
)]
pub async fn reset_session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CodeRequest>>,
) -> impl IntoResponse {
    let code = payload
        .and_then(|Json(request)| request.code)
        .filter(|code| !code.is_empty());
    let verifier = extract_cookie(&headers, PKCE_COOKIE_NAME);

    // A code alone decides the gate, so the existing session only matters
    // without one.
    let (has_session, refreshed) = if code.is_some() {
        (false, HeaderMap::new())
    } else {
        let (token, cookies) = session_token(&headers, &auth_state).await;
        (token.is_some(), cookies)
    };

    let (gate, session) = ResetGate::establish(
        code.as_deref(),
        verifier.as_deref(),
        has_session,
        auth_state.identity(),
    )
    .await;

    let headers = match session {
        Some(session) => session_headers(auth_state.config(), Some(&session)),
        None => refreshed,
    };
    (StatusCode::OK, headers, Json(gate))
}

#[utoipa::path(
    post,
    path = "/v1/auth/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = RedirectResponse),
        (status = 400, description = "Provider rejected the update", body = String),
        (status = 401, description = "No reset session", body = String),
        (status = 422, description = "Invalid password", body = ValidationErrorResponse)
    ),
    tag = "auth"
)]
pub async fn update_password(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdatePasswordRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let (token, cookies) = session_token(&headers, &auth_state).await;
    let gate = ResetGate::from_session(token.is_some());
    let password = SecretString::from(request.password);
    let response = match gate
        .submit(
            token.as_deref().unwrap_or_default(),
            &password,
            auth_state.identity(),
        )
        .await
    {
        Ok(redirect_to) => {
            (StatusCode::OK, Json(RedirectResponse::to(redirect_to))).into_response()
        }
        Err(SubmitError::NotEstablished(message)) => {
            (StatusCode::UNAUTHORIZED, message).into_response()
        }
        Err(SubmitError::Invalid(message)) => validation_error(
            FieldErrors {
                password: Some(message),
                ..FieldErrors::default()
            },
            None,
        ),
        Err(SubmitError::Provider(message)) => (StatusCode::BAD_REQUEST, message).into_response(),
    };
    (cookies, response).into_response()
}
