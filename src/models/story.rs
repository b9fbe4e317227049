// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Story, node and choice models for storage and API.

use crate::time_utils::now_unix_secs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Node ID of the opening scene of every story.
pub const INITIAL_NODE_ID: &str = "initial";

/// A choice presented to the player at the end of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Choice {
    pub id: String,
    pub text: String,
}

/// A single scene in the story with content and follow-up choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StoryNode {
    pub id: String,
    pub content: String,
    pub choices: Vec<Choice>,
    /// Node this one extends; None only for the initial node
    pub parent_node_id: Option<String>,
    /// Choice the player took *from* this node, once made
    pub selected_choice_id: Option<String>,
    /// Unix seconds
    pub timestamp: f64,
}

impl StoryNode {
    pub fn new(id: impl Into<String>, content: String, choices: Vec<Choice>) -> Self {
        Self {
            id: id.into(),
            content,
            choices,
            parent_node_id: None,
            selected_choice_id: None,
            timestamp: now_unix_secs(),
        }
    }

    /// Find a choice on this node by its id.
    pub fn find_choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A supporting character and their relationship to the protagonist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    /// e.g. Ally, Enemy, Rival, Mentor
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Narrative state carried across continuations of cultivation stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryMemory {
    pub character_name: String,
    #[serde(default)]
    pub character_gender: String,
    #[serde(default)]
    pub character_origin: String,
    pub setting: String,
    /// Protagonist's long-term goal (revenge, immortality, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_story_goal: Option<String>,
    /// Goal of the arc currently in progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_arc_goal: Option<String>,
    /// Arc goals already used, newest last
    #[serde(default)]
    pub arc_history: Vec<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

/// The persisted story document: all nodes plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub character_name: String,
    #[serde(default)]
    pub character_gender: String,
    pub setting: String,
    pub tone: String,
    pub character_origin: String,
    pub nodes: HashMap<String, StoryNode>,
    pub current_node_id: String,
    /// Unix seconds
    pub last_updated: f64,
    /// The AI decides the appropriate power system
    #[serde(default = "default_power_system")]
    pub power_system: String,
    /// Progress indicator shown in listings (setting-dependent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivation_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    #[serde(default)]
    pub is_shareable: bool,
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<StoryMemory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_story_goal: Option<String>,
}

fn default_power_system() -> String {
    "auto".to_string()
}

impl Story {
    /// Build a new story from creation parameters and its opening node.
    pub fn new(
        params: StoryCreationParams,
        node: StoryNode,
        memory: Option<StoryMemory>,
        big_story_goal: Option<String>,
    ) -> Self {
        let title = story_title(&params);
        let cultivation_stage = initial_stage(&params.setting).map(String::from);

        Self {
            id: new_story_id(),
            title,
            character_name: params.character_name,
            character_gender: params.character_gender,
            setting: params.setting,
            tone: params.tone,
            character_origin: params.character_origin,
            current_node_id: node.id.clone(),
            last_updated: node.timestamp,
            nodes: HashMap::from([(node.id.clone(), node)]),
            power_system: default_power_system(),
            cultivation_stage,
            user_id: params.user_id,
            share_token: None,
            is_shareable: false,
            memory,
            big_story_goal,
        }
    }

    /// The node the story currently sits at.
    pub fn current_node(&self) -> Option<&StoryNode> {
        self.nodes.get(&self.current_node_id)
    }

    /// Record the choice the player took from `node_id`.
    ///
    /// Returns false if the node does not exist.
    pub fn record_choice(&mut self, node_id: &str, choice_id: &str) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.selected_choice_id = Some(choice_id.to_string());
                self.last_updated = now_unix_secs();
                true
            }
            None => false,
        }
    }

    /// Append a node and advance the story to it.
    pub fn add_node(&mut self, node: StoryNode) {
        self.current_node_id = node.id.clone();
        self.last_updated = node.timestamp;
        self.nodes.insert(node.id.clone(), node);
    }

    /// Listing projection of this story.
    pub fn metadata(&self) -> StoryMetadata {
        StoryMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            character_name: self.character_name.clone(),
            setting: self.setting.clone(),
            last_updated: self.last_updated,
            cultivation_stage: self.cultivation_stage.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

/// Metadata about a story for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StoryMetadata {
    pub id: String,
    pub title: String,
    pub character_name: String,
    pub setting: String,
    pub last_updated: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivation_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Parameters for creating a new story.
#[derive(Debug, Clone)]
pub struct StoryCreationParams {
    pub character_name: String,
    pub character_gender: String,
    pub setting: String,
    pub tone: String,
    pub character_origin: String,
    pub user_id: Option<String>,
}

/// Generate a story document id: `story_{unix_secs}_{8 hex}`.
pub fn new_story_id() -> String {
    format!(
        "story_{}_{}",
        chrono::Utc::now().timestamp(),
        short_hex()
    )
}

/// Generate a node id: `node_{8 hex}`.
pub fn new_node_id() -> String {
    format!("node_{}", short_hex())
}

fn short_hex() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Generate a display title from the creation parameters.
pub fn story_title(params: &StoryCreationParams) -> String {
    let tone_title = match params.tone.as_str() {
        "romantic" => "Love Story",
        "mystery" => "Mystery",
        "adventure" => "Adventure",
        "thriller" => "Thriller",
        "comedy" => "Comedy",
        "horror" => "Horror Tale",
        "epic" => "Epic",
        "philosophical" => "Journey",
        _ => "Story",
    };

    let setting_title = match params.setting.as_str() {
        "modern" => Some("Urban"),
        "fantasy" => Some("Fantasy"),
        "scifi" => Some("Space"),
        "academy" => Some("Academy"),
        "historical" => Some("Historical"),
        "gamelike" => Some("Game"),
        "cultivation" => Some("Cultivation"),
        "apocalypse" => Some("Survival"),
        _ => None,
    };

    match setting_title {
        Some(setting) => format!("{}'s {} {}", params.character_name, setting, tone_title),
        None => format!("{}'s {}", params.character_name, tone_title),
    }
}

/// Progress indicator a fresh story starts at, per setting.
///
/// Slice-of-life settings get none.
pub fn initial_stage(setting: &str) -> Option<&'static str> {
    match setting {
        "cultivation" => Some("Qi Condensation Stage (Level 1)"),
        "fantasy" => Some("Novice Adventurer (Level 1)"),
        "academy" => Some("First Year Student (Rank F)"),
        "gamelike" => Some("Level 1 Adventurer"),
        "apocalypse" => Some("Rookie Survivor"),
        "scifi" => Some("Cadet"),
        "modern" => Some("Rookie Investigator"),
        "historical" => Some("Aspiring Apprentice"),
        _ => None,
    }
}
