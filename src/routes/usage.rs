// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Usage stats and admin reset routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::UserUsage;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes requiring user authentication.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/usage", get(get_usage))
}

/// Routes requiring the admin token.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/usage/reset", post(reset_usage))
}

/// Usage counters plus the derived remaining allowances.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UsageResponse {
    pub user_id: String,
    pub story_continuations_used: u32,
    pub story_continuations_limit: u32,
    pub remaining_continuations: u32,
    pub stories_created_this_month: u32,
    pub stories_created_limit: u32,
    pub remaining_stories: u32,
    pub last_reset_date: String,
}

impl From<UserUsage> for UsageResponse {
    fn from(usage: UserUsage) -> Self {
        Self {
            remaining_continuations: usage.remaining_continuations(),
            remaining_stories: usage.remaining_stories(),
            user_id: usage.user_id,
            story_continuations_used: usage.story_continuations_used,
            story_continuations_limit: usage.story_continuations_limit,
            stories_created_this_month: usage.stories_created_this_month,
            stories_created_limit: usage.stories_created_limit,
            last_reset_date: usage.last_reset_date,
        }
    }
}

/// Get the current user's usage stats.
async fn get_usage(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UsageResponse>> {
    let usage = state.usage.get_usage(&user.user_id).await?;
    Ok(Json(usage.into()))
}

#[derive(Deserialize)]
struct ResetUsageRequest {
    user_id: String,
}

/// Admin reset of a user's continuation counter.
async fn reset_usage(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetUsageRequest>,
) -> Result<Json<UsageResponse>> {
    let usage = state.usage.reset_continuations(&request.user_id).await?;

    tracing::info!(user_id = %request.user_id, "Admin reset of usage counters");
    Ok(Json(usage.into()))
}
