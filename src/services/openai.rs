// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenAI chat-completion client.
//!
//! Handles:
//! - Completion requests with system + user messages
//! - Rate limit detection (callers stop retrying on 429)
//! - Auth failure detection (bad or missing API key)
//! - A mock mode returning canned content for tests and offline development

use crate::error::AppError;
use serde::{Deserialize, Serialize};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Canned completion used in mock mode. Valid against the response parser.
const MOCK_COMPLETION: &str = "[STORY]\n\
    The morning mist clung to the training grounds as the day's first bell rang. \
    A sealed letter waited on the doorstep, marked with an emblem no one in the \
    village could name, and the choice of what to do with it could not be put off.\n\
    [/STORY]\n\n\
    [CHOICES]\n\
    1. Break the seal immediately and read the letter alone\n\
    2. Carry the letter to the village elder for counsel\n\
    3. Hide the letter and watch who comes looking for it\n\
    [/CHOICES]";

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    mock: bool,
}

impl OpenAiClient {
    /// Create a new client with an API key and model name.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            model,
            mock: false,
        }
    }

    /// Create a mock client that never touches the network.
    pub fn new_mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: String::new(),
            model: "mock".to_string(),
            mock: true,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock
    }

    /// Run a chat completion and return the first choice's content.
    pub async fn chat_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError> {
        if self.mock {
            return Ok(MOCK_COMPLETION.to_string());
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OpenAi(e.to_string()))?;

        let completion: ChatResponse = self.check_response_json(response).await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| AppError::OpenAi("Completion returned no choices".to_string()))
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("OpenAI rate limit hit (429)");
                return Err(AppError::OpenAi(AppError::OPENAI_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::OpenAi(AppError::OPENAI_AUTH_ERROR.to_string()));
            }

            return Err(AppError::OpenAi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OpenAi(format!("JSON parse error: {}", e)))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_returns_parseable_completion() {
        let client = OpenAiClient::new_mock();
        let content = client
            .chat_completion("system", "user", 1200, 0.8)
            .await
            .unwrap();

        assert!(content.contains("[STORY]"));
        assert!(content.contains("[CHOICES]"));
        assert!(client.is_mock());
    }

    #[test]
    fn test_chat_request_serializes_messages_in_order() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be brief",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            max_tokens: 100,
            temperature: 0.8,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 100);
    }
}
