// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin authentication middleware.
//!
//! Admin endpoints (usage reset, feedback listing) are guarded by a shared
//! secret in the `X-Admin-Token` header. If no ADMIN_TOKEN is configured,
//! the endpoints are disabled outright.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

const ADMIN_HEADER: &str = "x-admin-token";

/// Require the configured admin token for `/api/usage/reset` style routes.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        tracing::warn!("Blocked admin request: no ADMIN_TOKEN configured");
        return Err(StatusCode::FORBIDDEN);
    };

    let provided = request
        .headers()
        .get(ADMIN_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if !tokens_match(provided, expected) {
        tracing::warn!("Blocked admin request: invalid admin token");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

/// Constant-time token comparison.
fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
