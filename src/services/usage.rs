// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Usage accounting service.
//!
//! Read-modify-write of a user's counters is serialized through a per-user
//! async lock so concurrent requests cannot lose updates. The locks live in
//! a DashMap shared across handlers within this server instance.

use crate::db::Storage;
use crate::error::AppError;
use crate::models::UserUsage;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-user usage limit tracking over the storage backend.
#[derive(Clone)]
pub struct UsageService {
    storage: Storage,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UsageService {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            locks: Arc::new(DashMap::new()),
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load a user's usage record, creating it on first sight and applying
    /// the monthly rollover. The record is persisted whenever it changed.
    pub async fn get_usage(&self, user_id: &str) -> Result<UserUsage, AppError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;
        self.load_current(user_id).await
    }

    /// Whether the user may create another story this month.
    pub async fn can_create_story(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.get_usage(user_id).await?.can_create_story())
    }

    /// Whether the user may continue a story.
    pub async fn can_continue_story(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.get_usage(user_id).await?.can_continue_story())
    }

    /// Count a story creation against the monthly limit.
    pub async fn record_story_created(&self, user_id: &str) -> Result<UserUsage, AppError> {
        self.mutate(user_id, |usage| usage.increment_stories_created())
            .await
    }

    /// Give back a creation slot when a story is deleted.
    pub async fn record_story_deleted(&self, user_id: &str) -> Result<UserUsage, AppError> {
        self.mutate(user_id, |usage| usage.decrement_stories_created())
            .await
    }

    /// Count a continuation against the limit.
    pub async fn record_continuation(&self, user_id: &str) -> Result<UserUsage, AppError> {
        self.mutate(user_id, |usage| usage.increment_continuations())
            .await
    }

    /// Admin reset of a user's continuation counter.
    pub async fn reset_continuations(&self, user_id: &str) -> Result<UserUsage, AppError> {
        self.mutate(user_id, |usage| usage.reset_continuations())
            .await
    }

    async fn mutate<F>(&self, user_id: &str, apply: F) -> Result<UserUsage, AppError>
    where
        F: FnOnce(&mut UserUsage),
    {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut usage = self.load_current(user_id).await?;
        apply(&mut usage);
        self.storage.set_usage(&usage).await?;
        Ok(usage)
    }

    /// Load (or create) the record and apply rollover. Caller holds the lock.
    async fn load_current(&self, user_id: &str) -> Result<UserUsage, AppError> {
        match self.storage.get_usage(user_id).await? {
            Some(mut usage) => {
                if usage.rollover_if_new_month(chrono::Utc::now()) {
                    tracing::info!(user_id, "Monthly usage rollover");
                    self.storage.set_usage(&usage).await?;
                }
                Ok(usage)
            }
            None => {
                let usage = UserUsage::new(user_id);
                self.storage.set_usage(&usage).await?;
                tracing::info!(user_id, "Created new usage record");
                Ok(usage)
            }
        }
    }
}
