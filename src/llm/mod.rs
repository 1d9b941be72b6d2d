//! Completion service client
//!
//! Thin blocking client for an OpenAI-compatible chat-completions endpoint.
//! The API key is resolved from the environment at call time, so a missing
//! credential fails the triggered step rather than program startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{self, TourConfig};

pub mod prompt;

pub use prompt::PromptTemplate;

/// Completion endpoint contract used by tutorial actions.
pub trait CompletionClient {
    /// Complete a prompt, returning the model's text.
    fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Blocking client for an OpenAI-compatible completion API.
pub struct OpenAiCompletion {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    temperature: f32,
    /// Explicit key override; when None the environment is consulted per call.
    api_key: Option<String>,
}

impl OpenAiCompletion {
    pub fn new(config: &TourConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.completion_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn resolve_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => config::require_env(config::OPENAI_API_KEY),
        }
    }
}

impl CompletionClient for OpenAiCompletion {
    fn complete(&self, prompt: &str) -> Result<String> {
        let key = self.resolve_key()?;

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!("Requesting completion ({} chars prompt)", prompt.len());

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&request)
            .send()
            .context("Completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Completion service returned {}: {}", status, body);
        }

        let parsed: ChatResponse = response
            .json()
            .context("Completion service returned malformed JSON")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("Completion service returned no choices")?;

        Ok(choice.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Canned completion client for tests and offline passes.
pub struct MockCompletion {
    reply: String,
}

impl MockCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl CompletionClient for MockCompletion {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
