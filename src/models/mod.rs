// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod feedback;
pub mod story;
pub mod usage;

pub use feedback::{Feedback, FeedbackRequest};
pub use story::{Choice, Story, StoryCreationParams, StoryMemory, StoryMetadata, StoryNode};
pub use usage::UserUsage;
