use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;

use super::auth::{session::session_headers, AuthState};
use crate::flows::redirect::{resolve, VerificationParams};

/// Landing endpoint for every email link. Only ever answers with a redirect.
#[utoipa::path(
    get,
    path = "/auth/confirm",
    params(VerificationParams),
    responses(
        (status = 307, description = "Redirect to the next page or to /auth/error")
    ),
    tag = "auth"
)]
pub async fn confirm(
    auth_state: Extension<Arc<AuthState>>,
    params: Option<Query<VerificationParams>>,
) -> impl IntoResponse {
    let params = params.map(|Query(params)| params).unwrap_or_default();
    let resolution = resolve(&params, auth_state.identity()).await;
    let headers = session_headers(auth_state.config(), resolution.session.as_ref());
    (headers, Redirect::temporary(&resolution.location))
}
