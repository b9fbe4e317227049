// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Stories (full documents plus listing projections)
//! - Usage (per-user counters)
//! - Feedback (user submissions)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Feedback, Story, StoryMetadata, UserUsage};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Connect using application-default credentials.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Connect with an in-memory service-account JSON document.
    ///
    /// Used in production where the key material arrives via environment
    /// variables rather than a mounted file.
    pub async fn with_service_account_json(
        project_id: &str,
        service_account_json: String,
    ) -> Result<Self, AppError> {
        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::Json(service_account_json),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!(
                "Failed to connect to Firestore with inline credentials: {}",
                e
            ))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore (env credentials)");

        Ok(Self { client })
    }

    /// Connect with a service-account credentials file.
    pub async fn with_credentials_file(
        project_id: &str,
        credentials_path: &str,
    ) -> Result<Self, AppError> {
        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::File(credentials_path.into()),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!(
                "Failed to connect to Firestore with credentials file: {}",
                e
            ))
        })?;

        tracing::info!(
            project = project_id,
            path = credentials_path,
            "Connected to Firestore (credentials file)"
        );

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without needing a
        // custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Story Operations ────────────────────────────────────────

    /// Create or replace a story document.
    pub async fn save_story(&self, story: &Story) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::STORIES)
            .document_id(&story.id)
            .object(story)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a story by id.
    pub async fn get_story(&self, story_id: &str) -> Result<Option<Story>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::STORIES)
            .obj()
            .one(story_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a story document.
    pub async fn delete_story(&self, story_id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::STORIES)
            .document_id(story_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Metadata for every story, newest first.
    pub async fn list_stories(&self) -> Result<Vec<StoryMetadata>, AppError> {
        let stories: Vec<Story> = self
            .client
            .fluent()
            .select()
            .from(collections::STORIES)
            .order_by([(
                "last_updated",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stories.iter().map(Story::metadata).collect())
    }

    /// Metadata for stories owned by `user_id`, newest first.
    pub async fn list_stories_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<StoryMetadata>, AppError> {
        let user_id = user_id.to_string();
        let stories: Vec<Story> = self
            .client
            .fluent()
            .select()
            .from(collections::STORIES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([(
                "last_updated",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stories.iter().map(Story::metadata).collect())
    }

    /// Look up a shareable story by its share token.
    pub async fn get_story_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<Story>, AppError> {
        let share_token = share_token.to_string();
        let stories: Vec<Story> = self
            .client
            .fluent()
            .select()
            .from(collections::STORIES)
            .filter(move |q| {
                q.for_all([
                    q.field("share_token").eq(share_token.clone()),
                    q.field("is_shareable").eq(true),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stories.into_iter().next())
    }

    // ─── Usage Operations ────────────────────────────────────────

    /// Get usage counters for a user.
    pub async fn get_usage(&self, user_id: &str) -> Result<Option<UserUsage>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USAGE)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store usage counters for a user.
    pub async fn set_usage(&self, usage: &UserUsage) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USAGE)
            .document_id(&usage.user_id)
            .object(usage)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Feedback Operations ─────────────────────────────────────

    /// Store a feedback submission.
    pub async fn save_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::FEEDBACK)
            .document_id(&feedback.id)
            .object(feedback)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All feedback submissions, newest first.
    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::FEEDBACK)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
