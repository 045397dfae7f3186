//! Completion service client
//!
//! Talks to an Ollama-style `/api/generate` endpoint with a single
//! non-streaming request. A scripted fake is provided for tests.

use crate::error::AnalysisError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Completion service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Request body for `/api/generate`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Text completion backend
pub trait CompletionClient: Send + Sync {
    /// Submit `prompt` and return the generated text
    fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Blocking HTTP client for the completion service
pub struct HttpCompletionClient {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl HttpCompletionClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'))
    }
}

impl CompletionClient for HttpCompletionClient {
    fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let url = self.generate_url();
        debug!("POST {} (model {}, {} prompt bytes)", url, self.config.model, prompt.len());

        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout(self.config.timeout_secs)
            } else {
                AnalysisError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Service(status.as_u16()));
        }

        let body: GenerateResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout(self.config.timeout_secs)
            } else {
                AnalysisError::MalformedResponse(e.to_string())
            }
        })?;

        Ok(body.response)
    }
}

/// Fake completion client for testing
pub struct FakeCompletionClient {
    responses: std::sync::Mutex<Vec<Result<String, AnalysisError>>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl FakeCompletionClient {
    /// Create a fake client with pre-defined responses. The last response
    /// repeats once the others are used up.
    pub fn new(responses: Vec<Result<String, AnalysisError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: AnalysisError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionClient for FakeCompletionClient {
    fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(AnalysisError::MalformedResponse("no scripted response".to_string())),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}
