//! OpenAI-compatible HTTP generation provider.

use crate::config::Config;
use crate::error::{AuditorError, Result};
use crate::generation::Generator;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpGenerator {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: usize,
    temperature: f64,
    client: Client,
}

impl HttpGenerator {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config
            .model
            .endpoint
            .clone()
            .ok_or_else(|| AuditorError::Config {
                message: "http provider requires model.endpoint (or AUDITOR_ENDPOINT)".to_string(),
            })?;

        // Ensure endpoint has the correct path if not provided
        let endpoint = if endpoint.ends_with("/v1/chat/completions") {
            endpoint
        } else {
            format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(config.runtime.http_timeout_ms))
            .build()
            .map_err(|e| AuditorError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint,
            model: config.model.model_id.clone(),
            api_key: config.runtime.api_key.clone(),
            max_tokens: config.generation.max_new_tokens,
            temperature: config.generation.temperature,
            client,
        })
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting generation (model={}, chars={})",
            self.model,
            prompt.len()
        );

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        // No retries; a failed call surfaces to the caller directly
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AuditorError::Generation {
                message: format!("endpoint returned {}: {}", status, text),
            });
        }

        let response_json: Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(content)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
