//! Generative text backend.
//!
//! The service only needs one operation from the model: given a system
//! instruction and a prompt, return free text. `TextGenerator` is that seam;
//! `OllamaClient` talks to a local or remote Ollama instance and
//! `MockGenerator` stands in for it in tests.

pub mod ollama;

use std::sync::Mutex;

use thiserror::Error;

pub use ollama::OllamaClient;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot connect to generation service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Generation service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Failed to parse generation response: {0}")]
    ResponseParsing(String),

    #[error("Generation service returned an empty response")]
    EmptyResponse,
}

/// Blocking text generation. Call from a blocking context
/// (`tokio::task::spawn_blocking` inside the HTTP layer).
pub trait TextGenerator: Send + Sync {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Name of the backing model, for logging.
    fn model_name(&self) -> &str;
}

/// Mock generator for testing: returns a configurable response
/// and remembers every prompt it was given.
pub struct MockGenerator {
    response: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with a connection error.
    pub fn unavailable() -> Self {
        Self {
            response: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.response
            .clone()
            .ok_or_else(|| LlmError::Connection("mock://unavailable".into()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
