// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use storyteller::config::Config;
use storyteller::db::{LocalStore, Storage};
use storyteller::routes::create_router;
use storyteller::services::{OpenAiClient, StoryGenerator, UsageService};
use storyteller::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Fresh local storage rooted in a unique temp directory.
#[allow(dead_code)]
pub fn test_storage() -> Storage {
    let dir = std::env::temp_dir().join(format!(
        "storyteller-test-{}",
        uuid::Uuid::new_v4().simple()
    ));
    Storage::Local(LocalStore::new(dir).expect("Failed to create test storage"))
}

/// Create a test app with local storage and a mock story generator.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let storage = test_storage();
    let generator = StoryGenerator::new(OpenAiClient::new_mock());
    let usage = UsageService::new(storage.clone());

    let state = Arc::new(AppState {
        config,
        storage,
        generator,
        usage,
    });

    (create_router(state.clone()), state)
}

/// Create a test JWT for a user id, signed with the test config key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    storyteller::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}
