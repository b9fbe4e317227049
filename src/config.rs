//! Application configuration loaded from environment variables.
//!
//! All values are read once at startup. Firebase credentials may come from
//! individual environment variables (production) or a service-account file
//! (development); which of the two is present decides the storage backend.

use std::env;

/// Default free-tier limit for story continuations.
pub const FREE_CONTINUATIONS_LIMIT: u32 = 25;
/// Default free-tier limit for stories created per month.
pub const FREE_STORIES_LIMIT: u32 = 5;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS
    pub frontend_url: String,

    // --- OpenAI ---
    /// OpenAI API key
    pub openai_api_key: String,
    /// Completion model name
    pub openai_model: String,

    // --- Firebase / Firestore ---
    /// GCP project ID (unset selects local file storage)
    pub firebase_project_id: Option<String>,
    /// Service-account private key (PEM, possibly with literal `\n` escapes)
    pub firebase_private_key: Option<String>,
    /// Service-account client email
    pub firebase_client_email: Option<String>,
    /// Path to a service-account JSON file
    pub google_application_credentials: Option<String>,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Shared secret for admin endpoints; unset disables them
    pub admin_token: Option<String>,

    // --- Local storage ---
    /// Directory for local JSON storage (development backend)
    pub data_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            openai_api_key: env::var("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("OPENAI_API_KEY"))?,
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),

            firebase_project_id: env::var("FIREBASE_PROJECT_ID").ok(),
            firebase_private_key: env::var("FIREBASE_PRIVATE_KEY").ok(),
            firebase_client_email: env::var("FIREBASE_CLIENT_EMAIL")
                .ok()
                .map(|v| v.trim().to_string()),
            google_application_credentials: env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            admin_token: env::var("ADMIN_TOKEN").ok().map(|v| v.trim().to_string()),

            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        })
    }

    /// Whether complete inline Firebase credentials are present.
    ///
    /// All three variables must be set; a partial set falls through to the
    /// credentials file or application-default credentials.
    pub fn has_inline_firebase_credentials(&self) -> bool {
        self.firebase_project_id.is_some()
            && self.firebase_private_key.is_some()
            && self.firebase_client_email.is_some()
    }

    /// Config for tests: no network, local storage, fixed secrets.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            openai_api_key: "test_openai_key".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            firebase_project_id: None,
            firebase_private_key: None,
            firebase_client_email: None,
            google_application_credentials: None,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            admin_token: Some("test_admin_token".to_string()),
            data_dir: "data".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_credentials_require_all_three() {
        let mut config = Config::test_default();
        assert!(!config.has_inline_firebase_credentials());

        config.firebase_project_id = Some("proj".to_string());
        config.firebase_private_key = Some("key".to_string());
        assert!(!config.has_inline_firebase_credentials());

        config.firebase_client_email = Some("svc@proj.iam.gserviceaccount.com".to_string());
        assert!(config.has_inline_firebase_credentials());
    }

    #[test]
    fn test_test_default_uses_local_storage() {
        let config = Config::test_default();
        assert!(config.firebase_project_id.is_none());
        assert!(!config.jwt_signing_key.is_empty());
    }
}
