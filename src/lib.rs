// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! StoryTeller: an AI-powered interactive fiction API.
//!
//! This crate provides the backend API for creating stories, advancing them
//! through player choices, and persisting them to Firestore (production) or
//! local JSON files (development).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Storage;
use services::{StoryGenerator, UsageService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub generator: StoryGenerator,
    pub usage: UsageService,
}
