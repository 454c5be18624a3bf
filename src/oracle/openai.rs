use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::client::Oracle;
use crate::config::Config;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 500;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

/// [`Oracle`] backed by an OpenAI-compatible chat-completions endpoint.
///
/// Requests are retried up to the configured limit and bounded by the
/// configured timeout.
pub struct OpenAiOracle {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OpenAiOracle {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: config.oracle_api_key.clone(),
            base_url: config.oracle_base_url.trim_end_matches('/').to_string(),
            model: config.oracle_model.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send completion request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Oracle returned status {}: {}", status, body));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse completion response: {}", e))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("Oracle response contained no choices"))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut last_err = None;

        for attempt in 1..=self.max_retries {
            match self.send(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(attempt, max_retries = self.max_retries, error = %e, "Oracle request failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Oracle retries exhausted")))
    }
}
