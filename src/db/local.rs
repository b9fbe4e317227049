// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local JSON-file storage for development.
//!
//! One file per story under the data directory, plus a `stories_index.json`
//! id index. Usage and feedback records live in subdirectories. Index
//! mutations are serialized through an RwLock; story files themselves are
//! written whole, so concurrent writers of *different* stories never clash.

use crate::error::AppError;
use crate::models::{Feedback, Story, StoryMetadata, UserUsage};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use futures_util::{stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

const STORIES_INDEX: &str = "stories_index.json";
const USAGE_DIR: &str = "usage";
const FEEDBACK_DIR: &str = "feedback";
const MAX_CONCURRENT_READS: usize = 16;

/// Development storage backend backed by the local filesystem.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

struct Inner {
    data_dir: PathBuf,
    index_lock: RwLock<()>,
}

impl LocalStore {
    /// Open (and create if needed) the data directory layout.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let data_dir = data_dir.into();
        for dir in [
            data_dir.clone(),
            data_dir.join(USAGE_DIR),
            data_dir.join(FEEDBACK_DIR),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Database(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        Ok(Self {
            inner: Arc::new(Inner {
                data_dir,
                index_lock: RwLock::new(()),
            }),
        })
    }

    fn story_path(&self, story_id: &str) -> PathBuf {
        self.inner.data_dir.join(format!("{}.json", story_id))
    }

    fn index_path(&self) -> PathBuf {
        self.inner.data_dir.join(STORIES_INDEX)
    }

    fn usage_path(&self, user_id: &str) -> PathBuf {
        // User ids come from token claims and are not filesystem-safe.
        let encoded = URL_SAFE_NO_PAD.encode(user_id.as_bytes());
        self.inner
            .data_dir
            .join(USAGE_DIR)
            .join(format!("{}.json", encoded))
    }

    fn feedback_path(&self, feedback_id: &str) -> PathBuf {
        self.inner
            .data_dir
            .join(FEEDBACK_DIR)
            .join(format!("{}.json", feedback_id))
    }

    // ─── Story Operations ────────────────────────────────────────

    pub async fn save_story(&self, story: &Story) -> Result<(), AppError> {
        write_json(&self.story_path(&story.id), story).await?;

        let _guard = self.inner.index_lock.write().await;
        let mut ids = self.read_index().await?;
        if !ids.iter().any(|id| id == &story.id) {
            ids.push(story.id.clone());
            write_json(&self.index_path(), &ids).await?;
        }
        Ok(())
    }

    pub async fn get_story(&self, story_id: &str) -> Result<Option<Story>, AppError> {
        read_json(&self.story_path(story_id)).await
    }

    pub async fn delete_story(&self, story_id: &str) -> Result<(), AppError> {
        let path = self.story_path(story_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to delete {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        let _guard = self.inner.index_lock.write().await;
        let mut ids = self.read_index().await?;
        if ids.iter().any(|id| id == story_id) {
            ids.retain(|id| id != story_id);
            write_json(&self.index_path(), &ids).await?;
        }
        Ok(())
    }

    pub async fn list_stories(&self) -> Result<Vec<StoryMetadata>, AppError> {
        self.collect_metadata(|_| true).await
    }

    pub async fn list_stories_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<StoryMetadata>, AppError> {
        self.collect_metadata(|story| story.user_id.as_deref() == Some(user_id))
            .await
    }

    pub async fn get_story_by_share_token(
        &self,
        share_token: &str,
    ) -> Result<Option<Story>, AppError> {
        let ids = {
            let _guard = self.inner.index_lock.read().await;
            self.read_index().await?
        };

        for id in ids {
            if let Some(story) = self.get_story(&id).await? {
                if story.is_shareable && story.share_token.as_deref() == Some(share_token) {
                    return Ok(Some(story));
                }
            }
        }
        Ok(None)
    }

    async fn collect_metadata<F>(&self, keep: F) -> Result<Vec<StoryMetadata>, AppError>
    where
        F: Fn(&Story) -> bool,
    {
        let ids = {
            let _guard = self.inner.index_lock.read().await;
            self.read_index().await?
        };

        // Missing files happen if a story was deleted out-of-band; skip them.
        let stories: Vec<Option<Story>> = stream::iter(ids)
            .map(|id| async move { self.get_story(&id).await })
            .buffer_unordered(MAX_CONCURRENT_READS)
            .collect::<Vec<Result<Option<Story>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<Story>>, AppError>>()?;

        let mut metadata: Vec<StoryMetadata> = stories
            .into_iter()
            .flatten()
            .filter(|story| keep(story))
            .map(|story| story.metadata())
            .collect();

        // Newest first
        metadata.sort_by(|a, b| {
            b.last_updated
                .partial_cmp(&a.last_updated)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(metadata)
    }

    async fn read_index(&self) -> Result<Vec<String>, AppError> {
        Ok(read_json(&self.index_path()).await?.unwrap_or_default())
    }

    // ─── Usage Operations ────────────────────────────────────────

    pub async fn get_usage(&self, user_id: &str) -> Result<Option<UserUsage>, AppError> {
        read_json(&self.usage_path(user_id)).await
    }

    pub async fn set_usage(&self, usage: &UserUsage) -> Result<(), AppError> {
        write_json(&self.usage_path(&usage.user_id), usage).await
    }

    // ─── Feedback Operations ─────────────────────────────────────

    pub async fn save_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        write_json(&self.feedback_path(&feedback.id), feedback).await
    }

    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, AppError> {
        let dir = self.inner.data_dir.join(FEEDBACK_DIR);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", dir.display(), e)))?;

        let mut feedback = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(item) = read_json::<Feedback>(&entry.path()).await? {
                    feedback.push(item);
                }
            }
        }

        feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedback)
    }
}

/// Read and deserialize a JSON file; None if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::Database(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| AppError::Database(format!("Corrupt JSON in {}: {}", path.display(), e)))
}

/// Serialize and write a JSON file.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| AppError::Database(format!("Failed to serialize {}: {}", path.display(), e)))?;

    tokio::fs::write(path, bytes).await.map_err(|e| {
        AppError::Database(format!("Failed to write {}: {}", path.display(), e))
    })
}
