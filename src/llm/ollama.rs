use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{LlmError, TextGenerator};
use crate::config::LlmConfig;

/// Ollama HTTP client for LLM inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client from explicit configuration.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the configured model is installed on the Ollama instance.
    pub fn is_model_available(&self) -> Result<bool, LlmError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(&self.model)))
    }

    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::HttpClient(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl TextGenerator for OllamaClient {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        tracing::debug!(model = %self.model, chars = text.len(), "Generation complete");
        Ok(text.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> LlmConfig {
        LlmConfig {
            base_url: url.into(),
            model: "medgemma".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn constructor_keeps_settings() {
        let client = OllamaClient::new(&config("http://localhost:11434")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model_name(), "medgemma");
        assert_eq!(client.timeout_secs, 5);
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OllamaClient::new(&config("http://localhost:11434/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn generate_request_serializes_without_streaming() {
        let body = OllamaGenerateRequest {
            model: "medgemma",
            prompt: "p",
            system: "s",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["model"], "medgemma");
    }

    #[test]
    fn unreachable_server_is_connection_error() {
        // Port 9 (discard) is closed on test machines.
        let client = OllamaClient::new(&config("http://127.0.0.1:9")).unwrap();
        let err = client.generate("sys", "prompt").unwrap_err();
        assert!(matches!(err, LlmError::Connection(_) | LlmError::HttpClient(_)));
    }
}
