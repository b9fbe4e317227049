// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Story generation service.
//!
//! Wraps the completion client with prompt assembly, response parsing and
//! retry. Generation never fails the request: after the retry budget is
//! spent (or on a rate limit) a canned fallback scene is returned so the
//! player always gets a playable chapter.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Choice, StoryCreationParams};
use crate::services::openai::OpenAiClient;
use crate::services::{planner, prompts};
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const COMPLETION_MAX_TOKENS: u32 = 1200;
const COMPLETION_TEMPERATURE: f32 = 0.8;
/// Choices shorter than this are parser noise, not real options.
const MIN_CHOICE_LEN: usize = 8;
const MIN_STORY_LEN: usize = 20;

/// Generated opening chapter plus the planning state it was built with.
#[derive(Debug)]
pub struct GeneratedOpening {
    pub content: String,
    pub choices: Vec<Choice>,
    pub big_story_goal: Option<String>,
    pub arc_goal: Option<String>,
}

/// Story generation service over the completion API.
#[derive(Clone)]
pub struct StoryGenerator {
    client: OpenAiClient,
}

impl StoryGenerator {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        ))
    }

    /// Generate the opening chapter for a new story.
    ///
    /// Cultivation stories additionally get a big story goal and an initial
    /// arc goal from the planner, woven into the prompt and returned so the
    /// caller can seed the story memory.
    pub async fn generate_opening(&self, params: &StoryCreationParams) -> GeneratedOpening {
        let (big_story_goal, arc_goal) = if params.setting == "cultivation" {
            let goal = planner::big_story_goal(&params.setting);
            let arc = planner::new_arc_goal(&goal, &[]);
            tracing::info!(goal = %goal, arc = %arc, "Planned cultivation story");
            (Some(goal), Some(arc))
        } else {
            (None, None)
        };

        let system =
            prompts::opening_system_prompt(params, big_story_goal.as_deref(), arc_goal.as_deref());
        let user = prompts::opening_user_prompt(params);

        let (content, choices) = match self.generate_with_retry(&system, &user).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    character = %params.character_name,
                    error = %e,
                    "Opening generation failed, using fallback scene"
                );
                fallback_opening(params)
            }
        };

        GeneratedOpening {
            content,
            choices,
            big_story_goal,
            arc_goal,
        }
    }

    /// Generate the next chapter after a player choice.
    pub async fn generate_continuation(
        &self,
        character_name: &str,
        character_gender: &str,
        setting: &str,
        big_story_goal: Option<&str>,
        arc_goal: Option<&str>,
        previous_content: &str,
        selected_choice: &str,
    ) -> (String, Vec<Choice>) {
        let system = prompts::continuation_system_prompt(
            character_name,
            character_gender,
            big_story_goal,
            arc_goal,
        );
        let user =
            prompts::continuation_user_prompt(character_name, previous_content, selected_choice);

        match self.generate_with_retry(&system, &user).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    character = character_name,
                    error = %e,
                    "Continuation generation failed, using fallback scene"
                );
                fallback_continuation(character_name, setting, selected_choice)
            }
        }
    }

    /// Generate and parse, retrying on transient failures.
    ///
    /// A rate limit aborts immediately; retrying would only burn quota.
    async fn generate_with_retry(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<(String, Vec<Choice>), AppError> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self
                .client
                .chat_completion(
                    system_prompt,
                    user_prompt,
                    COMPLETION_MAX_TOKENS,
                    COMPLETION_TEMPERATURE,
                )
                .await
            {
                Ok(raw) => match parse_story_response(&raw) {
                    Ok(parsed) => return Ok(parsed),
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Unparseable completion");
                        last_error = Some(e);
                    }
                },
                Err(e) if e.is_openai_rate_limit() => return Err(e),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Completion request failed");
                    last_error = Some(e);
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::OpenAi("Story generation failed".to_string())))
    }
}

/// Parse a completion into story content and exactly three choices.
///
/// Accepts, in order of preference:
/// 1. `[STORY]...[/STORY]` with `[CHOICES]...[/CHOICES]`
/// 2. `STORY:` / `CHOICES:` sections
/// 3. Free-form text ending in numbered choice lines
pub fn parse_story_response(raw: &str) -> Result<(String, Vec<Choice>), AppError> {
    let raw = raw.trim();
    let mut story_content = String::new();
    let mut choices: Vec<Choice> = Vec::new();

    if let Some(body) = section_between(raw, "[STORY]", "[/STORY]") {
        story_content = body.trim().to_string();

        if let Some(choice_section) = section_between(raw, "[CHOICES]", "[/CHOICES]")
            .or_else(|| section_after(raw, "[CHOICES]"))
        {
            choices = choices_from_lines(&choice_section);
        }
    } else if let (Some(story_start), Some(choices_start)) =
        (raw.find("STORY:"), raw.find("CHOICES:"))
    {
        if choices_start > story_start {
            story_content = raw[story_start + "STORY:".len()..choices_start]
                .trim()
                .to_string();
            choices = choices_from_lines(&raw[choices_start + "CHOICES:".len()..]);
        }
    }

    // Lax fallback: treat leading lines as story, trailing numbered lines as choices.
    if story_content.len() < MIN_STORY_LEN || choices.len() < 3 {
        let mut story_lines: Vec<&str> = Vec::new();
        let mut choice_lines: Vec<&str> = Vec::new();
        let mut in_choices = false;

        for line in raw.lines() {
            let trimmed = line.trim();
            if strip_choice_prefix(trimmed).is_some() {
                in_choices = true;
                choice_lines.push(trimmed);
            } else if !in_choices && !is_format_marker(trimmed) {
                story_lines.push(line);
            }
        }

        if story_content.len() < MIN_STORY_LEN {
            story_content = story_lines.join("\n").trim().to_string();
        }
        if choices.len() < 3 {
            choices = choices_from_lines(&choice_lines.join("\n"));
        }
    }

    if story_content.len() < MIN_STORY_LEN {
        return Err(AppError::OpenAi(format!(
            "Story content too short: {} characters",
            story_content.len()
        )));
    }
    if choices.len() < 3 {
        return Err(AppError::OpenAi(format!(
            "Not enough choices found: {} (need 3)",
            choices.len()
        )));
    }

    choices.truncate(3);
    Ok((story_content, choices))
}

/// Text between two markers, if both are present in order.
fn section_between(text: &str, open: &str, close: &str) -> Option<String> {
    let start = text.find(open)? + open.len();
    let end = text[start..].find(close)? + start;
    Some(text[start..end].to_string())
}

/// Text after a marker, if present.
fn section_after(text: &str, open: &str) -> Option<String> {
    let start = text.find(open)? + open.len();
    Some(text[start..].to_string())
}

fn is_format_marker(line: &str) -> bool {
    matches!(
        line,
        "[STORY]" | "[/STORY]" | "[CHOICES]" | "[/CHOICES]" | "STORY:" | "CHOICES:"
    )
}

/// Extract up to three numbered choices from a block of lines.
fn choices_from_lines(section: &str) -> Vec<Choice> {
    let mut choices = Vec::new();
    for line in section.lines() {
        if let Some(text) = strip_choice_prefix(line.trim()) {
            if text.len() > MIN_CHOICE_LEN {
                choices.push(Choice {
                    id: (choices.len() + 1).to_string(),
                    text: text.to_string(),
                });
                if choices.len() >= 3 {
                    break;
                }
            }
        }
    }
    choices
}

/// Strip a `1.` / `2)` style prefix; None if the line is not numbered.
fn strip_choice_prefix(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return None;
    }
    let rest = rest.strip_prefix(['.', ')'])?;
    Some(rest.trim())
}

/// Canned opening used when generation fails entirely.
fn fallback_opening(params: &StoryCreationParams) -> (String, Vec<Choice>) {
    let content = format!(
        "{name} stands at the beginning of their journey in this {setting} world. \
         As someone with a {origin} background, they face unique challenges and \
         opportunities ahead.",
        name = params.character_name,
        setting = params.setting,
        origin = params.character_origin,
    );

    let choices = vec![
        Choice {
            id: "1".to_string(),
            text: format!("Explore the {} world carefully", params.setting),
        },
        Choice {
            id: "2".to_string(),
            text: "Seek out allies and companions".to_string(),
        },
        Choice {
            id: "3".to_string(),
            text: "Take bold action to make a name for yourself".to_string(),
        },
    ];

    (content, choices)
}

/// Canned continuation used when generation fails entirely.
fn fallback_continuation(
    character_name: &str,
    setting: &str,
    selected_choice: &str,
) -> (String, Vec<Choice>) {
    let content = format!(
        "Following their decision to {choice}, {name} discovers new opportunities \
         in this {setting} world. The path ahead becomes clearer with each step.",
        choice = selected_choice.to_lowercase(),
        name = character_name,
        setting = setting,
    );

    let choices = vec![
        Choice {
            id: "1".to_string(),
            text: "Continue with confidence".to_string(),
        },
        Choice {
            id: "2".to_string(),
            text: "Proceed with caution".to_string(),
        },
        Choice {
            id: "3".to_string(),
            text: "Take a different approach".to_string(),
        },
    ];

    (content, choices)
}
