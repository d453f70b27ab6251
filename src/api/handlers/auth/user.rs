//! Current user and sign-out.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use super::{
    session::{authenticate, cleared_headers, extract_session_token},
    state::AuthState,
    types::{RedirectResponse, UserSummary},
};
use crate::flows::LOGIN_PATH;

#[utoipa::path(
    get,
    path = "/v1/auth/user",
    responses(
        (status = 200, description = "Signed-in user", body = UserSummary),
        (status = 401, description = "No active session"),
        (status = 502, description = "Identity provider unavailable")
    ),
    tag = "auth"
)]
pub async fn current_user(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match authenticate(&headers, &auth_state).await {
        Ok(session) => {
            let user = session.user;
            let summary = UserSummary {
                id: user.id,
                display_name: user.display_name().map(str::to_string),
                email_confirmed: user.email_confirmed_at.is_some(),
                email: user.email,
            };
            (StatusCode::OK, session.cookies, Json(summary)).into_response()
        }
        Err(status) => status.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = RedirectResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(err) = auth_state.identity().sign_out(&token).await {
            warn!("Failed to revoke provider session: {err}");
        }
    }

    // Always clear the cookies, even if the provider call failed.
    let headers = cleared_headers(auth_state.config());
    (StatusCode::OK, headers, Json(RedirectResponse::to(LOGIN_PATH)))
}
