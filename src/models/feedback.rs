//! User feedback model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A feedback submission stored in the `feedback` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    /// `feedback_{unix_secs}_{8 hex}`, also the document id
    pub id: String,
    pub user_id: String,
    /// 'bug', 'feature' or 'general'
    pub feedback_type: String,
    pub message: String,
    #[serde(default)]
    pub contact_email: String,
    /// 'open', 'resolved' or 'spam'
    pub status: String,
    /// RFC3339
    pub created_at: String,
}

/// Request body for submitting feedback.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackRequest {
    pub feedback_type: String,
    #[validate(length(min = 1, max = 500))]
    pub message: String,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub contact_email: String,
}

impl FeedbackRequest {
    /// Whether the feedback type is one the frontend offers.
    pub fn has_valid_type(&self) -> bool {
        matches!(self.feedback_type.as_str(), "bug" | "feature" | "general")
    }
}

impl Feedback {
    /// Build a stored feedback record from a validated request.
    pub fn from_request(user_id: &str, request: FeedbackRequest) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: format!(
                "feedback_{}_{}",
                now.timestamp(),
                &uuid::Uuid::new_v4().simple().to_string()[..8]
            ),
            user_id: user_id.to_string(),
            feedback_type: request.feedback_type,
            message: request.message,
            contact_email: request.contact_email,
            status: "open".to_string(),
            created_at: crate::time_utils::format_utc_rfc3339(now),
        }
    }
}
