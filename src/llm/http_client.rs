//! Reference `LlmClient` implementation over an OpenAI-compatible chat
//! completions endpoint, grounded on the same reqwest usage as the
//! project's other HTTP-backed LLM client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::EnrichmentError;

use super::{LlmClient, LlmFactory};

#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub api_base: String,
    pub api_key: String,
    pub model_name: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

pub struct HttpLlmClient {
    http_client: Client,
    provider: LlmProviderConfig,
}

impl HttpLlmClient {
    pub fn new(provider: LlmProviderConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(provider.timeout_seconds.max(1)))
            .build()
            .expect("failed to build reqwest client");
        Self { http_client, provider }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate_response(
        &self,
        prompt: &str,
        system_message: &str,
        temperature: f64,
    ) -> Result<String, EnrichmentError> {
        let request = ChatCompletionRequest {
            model: self.provider.model_name.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system_message.to_string() },
                ChatMessage { role: "user".to_string(), content: prompt.to_string() },
            ],
            max_tokens: Some(self.provider.max_tokens),
            temperature: Some(temperature),
            response_format: Some(ResponseFormat { r#type: "json_object".to_string() }),
        };

        let url = format!("{}/chat/completions", self.provider.api_base.trim_end_matches('/'));

        tracing::debug!(url = %url, model = %self.provider.model_name, "calling llm api");

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.provider.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.provider.timeout_seconds))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichmentError::LlmTimeout(self.provider.timeout_seconds)
                } else {
                    EnrichmentError::LlmApi(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(EnrichmentError::LlmRateLimited(retry_after));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(EnrichmentError::LlmAuth(format!("provider rejected credentials ({status})")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(EnrichmentError::LlmApi(format!("api error {status}: {body}")));
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| EnrichmentError::LlmParse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EnrichmentError::LlmParse("empty response from llm".to_string()))
    }

    async fn close(&self) {}
}

/// Resolves a project's configured provider and produces an `HttpLlmClient`
/// bound to it.
pub struct HttpLlmFactory {
    provider: LlmProviderConfig,
}

impl HttpLlmFactory {
    pub fn new(provider: LlmProviderConfig) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl LlmFactory for HttpLlmFactory {
    async fn create_for_project(&self, _project_id: i64) -> Result<Box<dyn LlmClient>, EnrichmentError> {
        Ok(Box::new(HttpLlmClient::new(self.provider.clone())))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
