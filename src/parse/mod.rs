//! Structured document parsing service
//!
//! Client for a hosted parsing API (LlamaParse-style) that turns rich
//! documents, like scanned tax slips with tables, into markdown or plain
//! text. Upload the file, poll the job, fetch the result. The API key is
//! resolved from the environment when `parse` runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::config::{self, TourConfig};
use crate::data::{document_id_for, Document};

/// Output format requested from the parsing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Markdown,
    Text,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Markdown => "markdown",
            ResultType::Text => "text",
        }
    }
}

/// Parsing service contract used by tutorial actions.
pub trait StructuredParser {
    /// Parse a file into one or more documents in the requested format.
    fn parse(&self, file_path: &Path, result_type: ResultType) -> Result<Vec<Document>>;
}

#[derive(Deserialize)]
struct ParseJob {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct MarkdownResult {
    markdown: String,
}

#[derive(Deserialize)]
struct TextResult {
    text: String,
}

/// Blocking client for the hosted parsing API.
pub struct LlamaCloudParser {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
    max_polls: usize,
}

impl LlamaCloudParser {
    pub fn new(config: &TourConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.parse_base_url.trim_end_matches('/').to_string(),
            api_key: None,
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn resolve_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => config::require_env(config::LLAMA_CLOUD_API_KEY),
        }
    }

    fn upload(&self, key: &str, file_path: &Path) -> Result<ParseJob> {
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", file_path)
            .with_context(|| format!("Failed to read file for upload: {:?}", file_path))?;

        let response = self
            .http
            .post(format!("{}/api/v1/parsing/upload", self.base_url))
            .bearer_auth(key)
            .multipart(form)
            .send()
            .context("Parse upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Parsing service rejected upload with {}: {}", status, body);
        }

        response.json().context("Malformed upload response")
    }

    fn wait_for_job(&self, key: &str, job_id: &str) -> Result<()> {
        for _ in 0..self.max_polls {
            let job: ParseJob = self
                .http
                .get(format!("{}/api/v1/parsing/job/{}", self.base_url, job_id))
                .bearer_auth(key)
                .send()
                .context("Parse status request failed")?
                .json()
                .context("Malformed job status response")?;

            match job.status.as_str() {
                "SUCCESS" => return Ok(()),
                "ERROR" | "CANCELED" => {
                    anyhow::bail!("Parse job {} ended with status {}", job.id, job.status)
                }
                _ => std::thread::sleep(self.poll_interval),
            }
        }

        anyhow::bail!("Parse job {} did not finish in time", job_id)
    }

    fn fetch_result(&self, key: &str, job_id: &str, result_type: ResultType) -> Result<String> {
        let url = format!(
            "{}/api/v1/parsing/job/{}/result/{}",
            self.base_url,
            job_id,
            result_type.as_str()
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(key)
            .send()
            .context("Parse result request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Parsing service returned {}: {}", status, body);
        }

        match result_type {
            ResultType::Markdown => {
                let result: MarkdownResult =
                    response.json().context("Malformed markdown result")?;
                Ok(result.markdown)
            }
            ResultType::Text => {
                let result: TextResult = response.json().context("Malformed text result")?;
                Ok(result.text)
            }
        }
    }
}

impl StructuredParser for LlamaCloudParser {
    fn parse(&self, file_path: &Path, result_type: ResultType) -> Result<Vec<Document>> {
        let key = self.resolve_key()?;

        tracing::info!("Uploading {:?} for parsing", file_path);
        let job = self.upload(&key, file_path)?;
        self.wait_for_job(&key, &job.id)?;
        let content = self.fetch_result(&key, &job.id, result_type)?;

        Ok(vec![Document::new(
            document_id_for(file_path),
            file_path.to_string_lossy(),
            content,
            result_type.as_str(),
        )])
    }
}

/// Canned parser for tests and offline passes.
pub struct MockParser {
    content: String,
}

impl MockParser {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl StructuredParser for MockParser {
    fn parse(&self, file_path: &Path, result_type: ResultType) -> Result<Vec<Document>> {
        Ok(vec![Document::new(
            document_id_for(file_path),
            file_path.to_string_lossy(),
            self.content.clone(),
            result_type.as_str(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_type_wire_names() {
        assert_eq!(ResultType::Markdown.as_str(), "markdown");
        assert_eq!(ResultType::Text.as_str(), "text");
    }

    #[test]
    fn test_mock_parser_tags_result_type() {
        let parser = MockParser::new("| Tuition | 8500 |");
        let docs = parser
            .parse(Path::new("data/T2202.pdf"), ResultType::Markdown)
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_type, "markdown");
        assert!(docs[0].content.contains("8500"));
        assert!(docs[0].source.ends_with("T2202.pdf"));
    }

    #[test]
    fn test_explicit_key_bypasses_environment() {
        let parser = LlamaCloudParser::new(&TourConfig::default())
            .unwrap()
            .with_api_key("llx-test");
        assert_eq!(parser.resolve_key().unwrap(), "llx-test");
    }

    #[test]
    fn test_missing_key_fails_at_call_time() {
        let parser = LlamaCloudParser::new(&TourConfig::default()).unwrap();
        std::env::remove_var(config::LLAMA_CLOUD_API_KEY);

        let err = parser
            .parse(Path::new("data/T2202.pdf"), ResultType::Markdown)
            .unwrap_err();
        assert!(err.to_string().contains(config::LLAMA_CLOUD_API_KEY));
    }
}
