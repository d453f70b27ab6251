//! Sign-up and the live form checklist.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::error;

use super::{
    session::{session_headers, verifier_cookie},
    state::AuthState,
    types::{
        RedirectResponse, SignUpCheckRequest, SignUpCheckResponse, SignUpRequest,
        ValidationErrorResponse,
    },
    validation_error,
};
use crate::{
    flows::{
        credentials::{
            email_checklist, password_checklist, password_strength, sign_up_outcome,
            suggest_email, validate_sign_up, SignUpError,
        },
        SIGN_UP_SUCCESS_PATH,
    },
    identity::{pkce::PkcePair, SignUpOptions},
};

#[utoipa::path(
    post,
    path = "/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created, confirmation email sent", body = RedirectResponse),
        (status = 400, description = "Provider rejected the sign-up", body = String),
        (status = 409, description = "Account already exists", body = String),
        (status = 422, description = "Invalid form", body = ValidationErrorResponse),
        (status = 502, description = "Unexpected provider answer", body = String)
    ),
    tag = "auth"
)]
pub async fn sign_up(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignUpRequest>>,
) -> impl IntoResponse {
    let request: SignUpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if let Err(errors) =
        validate_sign_up(&request.email, &request.password, &request.repeat_password)
    {
        return validation_error(errors, suggest_email(&request.email));
    }

    let config = auth_state.config();
    let pkce = PkcePair::generate();
    let options = SignUpOptions {
        email_redirect_to: config.sign_up_redirect_url(),
        code_challenge: Some(pkce.challenge().to_string()),
    };
    let password = SecretString::from(request.password);
    let result = auth_state
        .identity()
        .sign_up(&request.email, &password, &options)
        .await;

    match sign_up_outcome(result) {
        Ok(sign_up) => {
            // Auto-confirmed projects hand out a session right away.
            let mut headers = session_headers(config, sign_up.session.as_ref());
            if sign_up.session.is_none() {
                match verifier_cookie(config, pkce.verifier()) {
                    Ok(cookie) => {
                        headers.append(SET_COOKIE, cookie);
                    }
                    Err(err) => error!("Failed to build PKCE cookie: {err}"),
                }
            }
            (
                StatusCode::OK,
                headers,
                Json(RedirectResponse::to(SIGN_UP_SUCCESS_PATH)),
            )
                .into_response()
        }
        Err(err) => {
            let status = match err {
                SignUpError::AlreadyRegistered => StatusCode::CONFLICT,
                SignUpError::Rejected(_) => StatusCode::BAD_REQUEST,
                SignUpError::NoUser | SignUpError::Unexpected => StatusCode::BAD_GATEWAY,
            };
            (status, err.message().to_string()).into_response()
        }
    }
}

/// Live feedback for the sign-up form. Never calls the provider.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-up/check",
    request_body = SignUpCheckRequest,
    responses(
        (status = 200, description = "Checklist for the current input", body = SignUpCheckResponse),
        (status = 400, description = "Missing payload", body = String)
    ),
    tag = "auth"
)]
pub async fn sign_up_check(payload: Option<Json<SignUpCheckRequest>>) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let response = SignUpCheckResponse {
        email_checks: email_checklist(&request.email),
        password_checks: password_checklist(&request.password),
        strength: password_strength(&request.password),
        suggestion: suggest_email(&request.email),
    };
    (StatusCode::OK, Json(response)).into_response()
}
