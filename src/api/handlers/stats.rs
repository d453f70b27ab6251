use axum::{extract::Extension, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::{
    flows::profile::{format_user_count, APPROXIMATE_USER_COUNT},
    store::ProfileStore,
};

#[derive(ToSchema, Serialize, Debug)]
pub struct UserStats {
    pub count: i64,
    /// `2.4K` style label for the landing page.
    pub formatted: String,
    /// Set when the count could not be read and a placeholder is returned.
    pub approximate: bool,
}

#[utoipa::path(
    get,
    path = "/v1/stats/users",
    responses(
        (status = 200, description = "Community size", body = UserStats)
    ),
    tag = "profile"
)]
pub async fn user_stats(store: Extension<Arc<dyn ProfileStore>>) -> impl IntoResponse {
    let (count, approximate) = match store.count().await {
        Ok(count) => (count, false),
        Err(err) => {
            warn!("Failed to count users: {err:#}");
            (APPROXIMATE_USER_COUNT, true)
        }
    };
    Json(UserStats {
        count,
        formatted: format_user_count(count),
        approximate,
    })
}
