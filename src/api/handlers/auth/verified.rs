//! Session establishment for `/auth/verified`.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{
    session::{extract_cookie, session_headers, PKCE_COOKIE_NAME},
    state::AuthState,
    types::CodeRequest,
};
use crate::flows::verification::{establish_session, VerificationState};

/// Exchange the code from a confirmation email. Always answers `200` with the
/// terminal state; failures are part of the state.
#[utoipa::path(
    post,
    path = "/v1/auth/verified",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "Terminal verification state", body = VerificationState)
    ),
    tag = "auth"
)]
pub async fn verified(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CodeRequest>>,
) -> impl IntoResponse {
    let code = payload.and_then(|Json(request)| request.code);
    let verifier = extract_cookie(&headers, PKCE_COOKIE_NAME);

    let (state, session) =
        establish_session(code.as_deref(), verifier.as_deref(), auth_state.identity()).await;

    let headers = session_headers(auth_state.config(), session.as_ref());
    (StatusCode::OK, headers, Json(state))
}
