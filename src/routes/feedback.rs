// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User feedback routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Feedback, FeedbackRequest};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Routes requiring user authentication.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/feedback", post(submit_feedback))
}

/// Routes requiring the admin token.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/feedback", get(list_feedback))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmitFeedbackResponse {
    pub success: bool,
    pub id: String,
}

/// Submit feedback from the current user.
async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<SubmitFeedbackResponse>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if !request.has_valid_type() {
        return Err(AppError::BadRequest(format!(
            "Unknown feedback type: {}",
            request.feedback_type
        )));
    }

    let feedback = Feedback::from_request(&user.user_id, request);
    state.storage.save_feedback(&feedback).await?;

    tracing::info!(
        feedback_id = %feedback.id,
        feedback_type = %feedback.feedback_type,
        "Feedback submitted"
    );
    Ok(Json(SubmitFeedbackResponse {
        success: true,
        id: feedback.id,
    }))
}

/// List all feedback submissions (admin only).
async fn list_feedback(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Feedback>>> {
    let feedback = state.storage.list_feedback().await?;
    Ok(Json(feedback))
}
