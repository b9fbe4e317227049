// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! StoryTeller API Server
//!
//! Interactive fiction backend: stories are generated by an LLM, advanced
//! through player choices, and persisted to Firestore or local files.

use std::sync::Arc;
use storyteller::{
    config::Config,
    db::Storage,
    services::{StoryGenerator, UsageService},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting StoryTeller API");

    // Select and connect the storage backend (Firestore or local files)
    let storage = Storage::connect(&config)
        .await
        .expect("Failed to initialize storage");

    // Story generation over the OpenAI API
    let generator = StoryGenerator::from_config(&config);
    tracing::info!(model = %config.openai_model, "Story generator initialized");

    // Per-user usage accounting
    let usage = UsageService::new(storage.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        storage,
        generator,
        usage,
    });

    // Build router
    let app = storyteller::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storyteller=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
