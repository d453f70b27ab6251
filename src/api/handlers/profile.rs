//! Profile of the signed-in user.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::auth::{session::authenticate, AuthState};
use crate::{
    flows::profile::{ProfileDraft, ProfileEditor},
    identity::User,
    store::{ProfileStore, UserProfile},
};

#[derive(ToSchema, Serialize, Debug)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub completion_percent: u8,
    pub last_sign_in_at: Option<String>,
    pub member_since: Option<String>,
}

impl ProfileResponse {
    fn new(editor: &ProfileEditor, user: &User) -> Self {
        Self {
            profile: editor.profile().clone(),
            completion_percent: editor.completion_percent(),
            last_sign_in_at: user.last_sign_in_at.clone(),
            member_since: user.created_at.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/profile",
    responses(
        (status = 200, description = "Stored or synthesized profile", body = ProfileResponse),
        (status = 401, description = "No active session")
    ),
    tag = "profile"
)]
pub async fn get_profile(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProfileStore>>,
) -> impl IntoResponse {
    let session = match authenticate(&headers, &auth_state).await {
        Ok(session) => session,
        Err(status) => return status.into_response(),
    };

    let editor = ProfileEditor::load(&session.user, store.as_ref()).await;
    let body = ProfileResponse::new(&editor, &session.user);
    (StatusCode::OK, session.cookies, Json(body)).into_response()
}

#[utoipa::path(
    put,
    path = "/v1/profile",
    request_body = ProfileDraft,
    responses(
        (status = 200, description = "Profile saved", body = ProfileResponse),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "No active session"),
        (status = 500, description = "Profile could not be saved", body = String)
    ),
    tag = "profile"
)]
pub async fn update_profile(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProfileStore>>,
    payload: Option<Json<ProfileDraft>>,
) -> impl IntoResponse {
    let Some(Json(draft)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let session = match authenticate(&headers, &auth_state).await {
        Ok(session) => session,
        Err(status) => return status.into_response(),
    };

    let mut editor = ProfileEditor::load(&session.user, store.as_ref()).await;
    editor.begin_edit();
    editor.update_draft(draft);
    match editor.save(&session.user, store.as_ref()).await {
        Ok(()) => {
            let body = ProfileResponse::new(&editor, &session.user);
            (StatusCode::OK, session.cookies, Json(body)).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            session.cookies,
            err.to_string(),
        )
            .into_response(),
    }
}
