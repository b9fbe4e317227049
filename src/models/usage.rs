// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user usage accounting for the free tier.

use crate::config::{FREE_CONTINUATIONS_LIMIT, FREE_STORIES_LIMIT};
use crate::time_utils::now_rfc3339;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Usage counters for a single user.
///
/// Stored in the `usage` collection, keyed by user id. `stories_created_this_month`
/// rolls over when the calendar month of `last_reset_date` differs from now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUsage {
    pub user_id: String,
    #[serde(default)]
    pub story_continuations_used: u32,
    #[serde(default = "default_continuations_limit")]
    pub story_continuations_limit: u32,
    #[serde(default)]
    pub stories_created_this_month: u32,
    #[serde(default = "default_stories_limit")]
    pub stories_created_limit: u32,
    /// RFC3339; when the counters were last reset
    #[serde(default)]
    pub last_reset_date: String,
}

fn default_continuations_limit() -> u32 {
    FREE_CONTINUATIONS_LIMIT
}

fn default_stories_limit() -> u32 {
    FREE_STORIES_LIMIT
}

impl UserUsage {
    /// Fresh usage record at the free-tier limits.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            story_continuations_used: 0,
            story_continuations_limit: FREE_CONTINUATIONS_LIMIT,
            stories_created_this_month: 0,
            stories_created_limit: FREE_STORIES_LIMIT,
            last_reset_date: now_rfc3339(),
        }
    }

    pub fn can_continue_story(&self) -> bool {
        self.story_continuations_used < self.story_continuations_limit
    }

    pub fn remaining_continuations(&self) -> u32 {
        self.story_continuations_limit
            .saturating_sub(self.story_continuations_used)
    }

    pub fn can_create_story(&self) -> bool {
        self.stories_created_this_month < self.stories_created_limit
    }

    pub fn remaining_stories(&self) -> u32 {
        self.stories_created_limit
            .saturating_sub(self.stories_created_this_month)
    }

    pub fn increment_continuations(&mut self) {
        self.story_continuations_used += 1;
    }

    pub fn increment_stories_created(&mut self) {
        self.stories_created_this_month += 1;
    }

    /// Decrement the monthly creation counter (when a story is deleted).
    pub fn decrement_stories_created(&mut self) {
        self.stories_created_this_month = self.stories_created_this_month.saturating_sub(1);
    }

    /// Admin reset of the continuation counter.
    pub fn reset_continuations(&mut self) {
        self.story_continuations_used = 0;
        self.last_reset_date = now_rfc3339();
    }

    /// Reset counters if the calendar month has changed since the last reset.
    ///
    /// Returns true when a rollover happened (record needs saving). An
    /// unparseable `last_reset_date` counts as stale and triggers a rollover.
    pub fn rollover_if_new_month(&mut self, now: DateTime<Utc>) -> bool {
        let stale = match DateTime::parse_from_rfc3339(&self.last_reset_date) {
            Ok(last) => {
                let last = last.with_timezone(&Utc);
                (last.year(), last.month()) != (now.year(), now.month())
            }
            Err(_) => true,
        };

        if stale {
            self.story_continuations_used = 0;
            self.stories_created_this_month = 0;
            self.last_reset_date = crate::time_utils::format_utc_rfc3339(now);
        }
        stale
    }
}
