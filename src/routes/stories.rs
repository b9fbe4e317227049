// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Story CRUD and progression routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::story::{new_node_id, INITIAL_NODE_ID};
use crate::models::{Story, StoryCreationParams, StoryMemory, StoryMetadata, StoryNode};
use crate::services::planner;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const SHARE_TOKEN_BYTES: usize = 24;

/// Story routes with optional authentication.
/// The optional-auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stories", get(list_stories).post(create_story))
        .route("/api/stories/{id}", get(get_story).delete(delete_story))
        .route(
            "/api/stories/{id}/choices/{choice_id}",
            post(make_choice),
        )
}

/// Story routes that require authentication.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/stories/{id}/share", post(share_story))
}

/// Public story routes (no auth of any kind).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/shared/{token}", get(get_shared_story))
}

// ─── Listing & Fetch ─────────────────────────────────────────

/// List stories: the user's own when authenticated, all otherwise.
async fn list_stories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<AuthUser>>,
) -> Result<Json<Vec<StoryMetadata>>> {
    let stories = match &user {
        Some(user) => state.storage.list_stories_for_user(&user.user_id).await?,
        None => state.storage.list_stories().await?,
    };

    tracing::debug!(count = stories.len(), authenticated = user.is_some(), "Listed stories");
    Ok(Json(stories))
}

/// Fetch a single story by id.
async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<String>,
) -> Result<Json<Story>> {
    let story = state
        .storage
        .get_story(&story_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Story {} not found", story_id)))?;

    Ok(Json(story))
}

// ─── Creation ────────────────────────────────────────────────

/// Request body for creating a story.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoryRequest {
    #[validate(length(min = 1, max = 60))]
    pub character_name: String,
    #[serde(default = "default_gender")]
    #[validate(length(max = 20))]
    pub character_gender: String,
    #[serde(default = "default_setting")]
    #[validate(length(min = 1, max = 40))]
    pub setting: String,
    #[serde(default = "default_tone")]
    #[validate(length(min = 1, max = 40))]
    pub tone: String,
    #[serde(default = "default_origin")]
    #[validate(length(min = 1, max = 40))]
    pub character_origin: String,
}

fn default_gender() -> String {
    "unspecified".to_string()
}
fn default_setting() -> String {
    "cultivation".to_string()
}
fn default_tone() -> String {
    "adventure".to_string()
}
fn default_origin() -> String {
    "normal".to_string()
}

/// Create a story: plan, generate the opening chapter, persist.
async fn create_story(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<AuthUser>>,
    Json(request): Json<CreateStoryRequest>,
) -> Result<Json<Story>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let params = StoryCreationParams {
        character_name: request.character_name,
        character_gender: request.character_gender,
        setting: request.setting,
        tone: request.tone,
        character_origin: request.character_origin,
        user_id: user.as_ref().map(|u| u.user_id.clone()),
    };

    if let Some(user_id) = &params.user_id {
        if !state.usage.can_create_story(user_id).await? {
            return Err(AppError::UsageLimit(
                "Monthly story creation limit reached".to_string(),
            ));
        }
    }

    tracing::info!(
        character = %params.character_name,
        setting = %params.setting,
        tone = %params.tone,
        "Creating story"
    );

    let opening = state.generator.generate_opening(&params).await;

    let node = StoryNode::new(INITIAL_NODE_ID, opening.content, opening.choices);

    // Cultivation stories carry memory so continuations can track arcs.
    let memory = (params.setting == "cultivation").then(|| StoryMemory {
        character_name: params.character_name.clone(),
        character_gender: params.character_gender.clone(),
        character_origin: params.character_origin.clone(),
        setting: params.setting.clone(),
        big_story_goal: opening.big_story_goal.clone(),
        current_arc_goal: opening.arc_goal.clone(),
        arc_history: opening.arc_goal.clone().into_iter().collect(),
        characters: Vec::new(),
    });

    let story = Story::new(params, node, memory, opening.big_story_goal);
    state.storage.save_story(&story).await?;

    if let Some(user_id) = &story.user_id {
        state.usage.record_story_created(user_id).await?;
    }

    tracing::info!(story_id = %story.id, title = %story.title, "Created story");
    Ok(Json(story))
}

// ─── Deletion ────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteStoryResponse {
    pub success: bool,
}

/// Delete a story. Owned stories may only be deleted by their owner, and
/// give the owner back a creation slot for the month.
async fn delete_story(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<AuthUser>>,
    Path(story_id): Path<String>,
) -> Result<Json<DeleteStoryResponse>> {
    let story = state
        .storage
        .get_story(&story_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Story {} not found", story_id)))?;

    check_owner(&story, user.as_ref())?;

    state.storage.delete_story(&story_id).await?;

    if let Some(owner) = &story.user_id {
        state.usage.record_story_deleted(owner).await?;
    }

    tracing::info!(story_id = %story_id, "Deleted story");
    Ok(Json(DeleteStoryResponse { success: true }))
}

// ─── Choice Progression ──────────────────────────────────────

/// Advance a story by taking a choice on its current node.
async fn make_choice(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<AuthUser>>,
    Path((story_id, choice_id)): Path<(String, String)>,
) -> Result<Json<Story>> {
    let mut story = state
        .storage
        .get_story(&story_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Story {} not found", story_id)))?;

    check_owner(&story, user.as_ref())?;

    let current = story.current_node().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "Story {} current node {} missing",
            story.id,
            story.current_node_id
        ))
    })?;

    let choice = current.find_choice(&choice_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Choice {} not found on node {}",
            choice_id, current.id
        ))
    })?;

    if let Some(user) = &user {
        if !state.usage.can_continue_story(&user.user_id).await? {
            return Err(AppError::UsageLimit(
                "Story continuation limit reached".to_string(),
            ));
        }
    }

    let parent_node_id = current.id.clone();
    let previous_content = current.content.clone();
    let selected_text = choice.text.clone();

    // Keep the arc goal alive for cultivation stories created before
    // planning existed, or after an arc was retired.
    if let Some(memory) = story.memory.as_mut() {
        if memory.current_arc_goal.is_none() {
            if let Some(big_goal) = memory.big_story_goal.clone() {
                let arc = planner::new_arc_goal(&big_goal, &memory.arc_history);
                tracing::info!(story_id = %story.id, arc = %arc, "Initialized arc goal");
                memory.arc_history.push(arc.clone());
                memory.current_arc_goal = Some(arc);
            }
        }
    }

    let big_story_goal = story.big_story_goal.clone();
    let arc_goal = story
        .memory
        .as_ref()
        .and_then(|m| m.current_arc_goal.clone());

    story.record_choice(&parent_node_id, &choice_id);

    let (content, choices) = state
        .generator
        .generate_continuation(
            &story.character_name,
            &story.character_gender,
            &story.setting,
            big_story_goal.as_deref(),
            arc_goal.as_deref(),
            &previous_content,
            &selected_text,
        )
        .await;

    let mut node = StoryNode::new(new_node_id(), content, choices);
    node.parent_node_id = Some(parent_node_id);
    story.add_node(node);

    state.storage.save_story(&story).await?;

    if let Some(user) = &user {
        state.usage.record_continuation(&user.user_id).await?;
    }

    tracing::info!(
        story_id = %story.id,
        node = %story.current_node_id,
        choice = %choice_id,
        "Story advanced"
    );
    Ok(Json(story))
}

// ─── Sharing ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ShareStoryResponse {
    pub share_token: String,
    pub share_url: String,
}

/// Make a story shareable via a random url-safe token.
async fn share_story(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(story_id): Path<String>,
) -> Result<Json<ShareStoryResponse>> {
    let mut story = state
        .storage
        .get_story(&story_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Story {} not found", story_id)))?;

    if story.user_id.as_deref() != Some(user.user_id.as_str()) {
        return Err(AppError::Forbidden(
            "Only the story owner can share it".to_string(),
        ));
    }

    // Reuse an existing token so shared links stay stable.
    let share_token = match &story.share_token {
        Some(token) if story.is_shareable => token.clone(),
        _ => {
            let token = generate_share_token()?;
            story.share_token = Some(token.clone());
            story.is_shareable = true;
            state.storage.save_story(&story).await?;
            token
        }
    };

    let share_url = format!("{}/shared/{}", state.config.frontend_url, share_token);

    tracing::info!(story_id = %story_id, "Story shared");
    Ok(Json(ShareStoryResponse {
        share_token,
        share_url,
    }))
}

/// Fetch a shared story by its token.
async fn get_shared_story(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<Story>> {
    let story = state
        .storage
        .get_story_by_share_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("Shared story not found".to_string()))?;

    Ok(Json(story))
}

// ─── Helpers ─────────────────────────────────────────────────

/// Owned stories may only be touched by their owner; unowned stories by anyone.
fn check_owner(story: &Story, user: Option<&AuthUser>) -> Result<()> {
    match &story.user_id {
        Some(owner) if user.map(|u| u.user_id.as_str()) != Some(owner.as_str()) => Err(
            AppError::Forbidden("Story belongs to another user".to_string()),
        ),
        _ => Ok(()),
    }
}

fn generate_share_token() -> Result<String> {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Share token generation failed")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_tokens_are_unique_and_url_safe() {
        let a = generate_share_token().unwrap();
        let b = generate_share_token().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.len(), 32); // 24 bytes, base64 no-pad
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_check_owner() {
        let user = AuthUser {
            user_id: "user-1".to_string(),
            email: None,
        };
        let other = AuthUser {
            user_id: "user-2".to_string(),
            email: None,
        };

        let mut story = Story::new(
            StoryCreationParams {
                character_name: "Jin".to_string(),
                character_gender: "male".to_string(),
                setting: "fantasy".to_string(),
                tone: "epic".to_string(),
                character_origin: "normal".to_string(),
                user_id: Some("user-1".to_string()),
            },
            StoryNode::new(INITIAL_NODE_ID, "Opening.".to_string(), vec![]),
            None,
            None,
        );

        assert!(check_owner(&story, Some(&user)).is_ok());
        assert!(check_owner(&story, Some(&other)).is_err());
        assert!(check_owner(&story, None).is_err());

        story.user_id = None;
        assert!(check_owner(&story, None).is_ok());
        assert!(check_owner(&story, Some(&other)).is_ok());
    }
}
