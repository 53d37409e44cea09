//! Remote sentiment model adapter
//!
//! Calls a hosted language model over HTTP and parses a structured sentiment
//! reading from its reply. Supports Anthropic and OpenAI-compatible APIs
//! (including self-hosted endpoints).

use super::{ModelAdapter, ModelScore};
use crate::config::RemoteModelConfig;
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Remote model for sentiment estimation.
pub struct RemoteModel {
    http: Client,
    provider: Provider,
}

#[derive(Debug, Clone)]
pub enum Provider {
    Anthropic {
        api_key: String,
        model: String,
    },
    OpenAi {
        api_key: String,
        model: String,
        base_url: String,
    },
    /// OpenAI-compatible API (Ollama, vLLM, etc.)
    Compatible {
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: String,
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

impl RemoteModel {
    pub fn new(provider: Provider) -> Self {
        Self {
            http: Client::new(),
            provider,
        }
    }

    /// Create from config.
    pub fn from_config(config: &RemoteModelConfig) -> Result<Self> {
        let provider = match config.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => Provider::Anthropic {
                api_key: config.api_key.clone(),
                model: config
                    .model
                    .clone()
                    .unwrap_or_else(|| "claude-3-5-haiku-latest".to_string()),
            },
            "openai" | "gpt" => Provider::OpenAi {
                api_key: config.api_key.clone(),
                model: config
                    .model
                    .clone()
                    .unwrap_or_else(|| "gpt-4o-mini".to_string()),
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com".to_string()),
            },
            "compatible" | "custom" | "ollama" => Provider::Compatible {
                api_key: if config.api_key.is_empty() {
                    None
                } else {
                    Some(config.api_key.clone())
                },
                model: config.model.clone().ok_or_else(|| {
                    MonitorError::Config("model required for compatible provider".into())
                })?,
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
            },
            other => {
                return Err(MonitorError::Config(format!(
                    "unknown remote model provider: {other}"
                )))
            }
        };

        Ok(Self::new(provider))
    }

    fn build_prompt(&self, text: &str) -> String {
        format!(
            r#"You are a sentiment rater for short social-media posts. Rate the sentiment of the following post.

Post: {text}

Respond with ONLY a JSON object in this exact format:
{{"compound": <number -1.0 to 1.0>, "positive": <number 0-1>, "negative": <number 0-1>, "neutral": <number 0-1>, "confidence": <number 0-1>}}
"#,
        )
    }

    async fn call_openai_compatible(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        prompt: &str,
    ) -> Result<String> {
        let request = OpenAiRequest {
            model: model.to_string(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url))
            .header("content-type", "application/json");

        if let Some(key) = api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.json(&request).send().await?;
        let text = resp.text().await?;
        tracing::debug!("remote model raw response: {}", truncate(&text, 500));

        let response: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            MonitorError::Api(format!(
                "JSON parse error: {} - response: {}",
                e,
                truncate(&text, 200)
            ))
        })?;

        response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| MonitorError::Api("empty response from remote model".into()))
    }

    async fn call_anthropic(&self, api_key: &str, model: &str, prompt: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: 200,
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response: AnthropicResponse = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| MonitorError::Api("empty response from Anthropic".into()))
    }

    async fn call_model(&self, prompt: &str) -> Result<String> {
        match &self.provider {
            Provider::Anthropic { api_key, model } => {
                self.call_anthropic(api_key, model, prompt).await
            }
            Provider::OpenAi {
                api_key,
                model,
                base_url,
            } => {
                self.call_openai_compatible(base_url, Some(api_key), model, prompt)
                    .await
            }
            Provider::Compatible {
                api_key,
                model,
                base_url,
            } => {
                self.call_openai_compatible(base_url, api_key.as_deref(), model, prompt)
                    .await
            }
        }
    }

    fn parse_response(&self, response: &str) -> Result<ModelScore> {
        // The model may wrap the JSON in prose; take the outermost braces.
        let json_str = match (response.find('{'), response.rfind('}')) {
            (Some(start), Some(end)) if end > start => &response[start..=end],
            _ => response,
        };

        let parsed: serde_json::Value = serde_json::from_str(json_str)
            .map_err(|e| MonitorError::Api(format!("failed to parse model response: {e}")))?;

        let field = |name: &str| -> Result<f64> {
            parsed[name]
                .as_f64()
                .ok_or_else(|| MonitorError::Api(format!("missing {name} in response")))
        };

        Ok(ModelScore {
            compound: field("compound")?.clamp(-1.0, 1.0),
            positive: field("positive").unwrap_or(0.0).clamp(0.0, 1.0),
            negative: field("negative").unwrap_or(0.0).clamp(0.0, 1.0),
            neutral: field("neutral").unwrap_or(0.0).clamp(0.0, 1.0),
            confidence: field("confidence")?.clamp(0.0, 1.0),
        })
    }
}

#[async_trait]
impl ModelAdapter for RemoteModel {
    async fn score(&self, text: &str) -> Result<ModelScore> {
        let prompt = self.build_prompt(text);
        let response = self.call_model(&prompt).await?;
        self.parse_response(&response)
    }

    fn name(&self) -> &str {
        match &self.provider {
            Provider::Anthropic { .. } => "anthropic",
            Provider::OpenAi { .. } => "openai",
            Provider::Compatible { model, .. } => model,
        }
    }
}
