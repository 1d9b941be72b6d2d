//! Walkthrough configuration
//!
//! Paths and service settings for the live steps. Credentials are looked up
//! from the environment when an action runs, never at startup: a missing key
//! fails the step that needs it and nothing else.

use anyhow::Result;
use std::path::PathBuf;

/// Environment variable holding the completion-service API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable holding the parsing-service API key.
pub const LLAMA_CLOUD_API_KEY: &str = "LLAMA_CLOUD_API_KEY";

/// Settings shared by all walkthrough steps.
#[derive(Debug, Clone)]
pub struct TourConfig {
    /// Directory holding the raw tutorial documents.
    pub docs_dir: PathBuf,
    /// Directory used as the persisted-index read/write location.
    pub index_dir: PathBuf,
    /// Completion model name.
    pub model: String,
    /// Sampling temperature for completions.
    pub temperature: f32,
    /// Base URL of the OpenAI-compatible completion API.
    pub completion_base_url: String,
    /// Base URL of the structured-parsing API.
    pub parse_base_url: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("data"),
            index_dir: PathBuf::from("index"),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.2,
            completion_base_url: "https://api.openai.com/v1".to_string(),
            parse_base_url: "https://api.cloud.llamaindex.ai".to_string(),
        }
    }
}

/// Load `.env` into the process environment if present.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        tracing::debug!("Loaded environment from .env");
    }
}

/// Look up a required credential, failing with an actionable message.
pub fn require_env(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} is not set; export it or add it to .env", name))?;
    if value.is_empty() {
        anyhow::bail!("{} is set but empty", name);
    }
    Ok(value)
}
