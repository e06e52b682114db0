//! Advisory backend speaking the OpenAI chat-completions protocol.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use wegfinder_core::prompt::{proposal_prompt, score_prompt};
use wegfinder_core::{Advisory, AdvisoryError, ProposalRequest, ScoreRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

pub struct OpenAiAdvisory {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiAdvisory {
    pub fn new(config: OpenAiConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| anyhow::anyhow!("Invalid api key: {e}"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn check_response(response: Response) -> Result<Response, AdvisoryError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(body);
        Err(AdvisoryError::Api { status, message })
    }

    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, AdvisoryError> {
        debug!(model = %self.config.model, max_tokens, "chat completion request");
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt),
            }],
            max_tokens,
        };

        let response = self
            .client
            .post(self.url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        let response = Self::check_response(response).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AdvisoryError::EmptyResponse)
    }
}

#[async_trait]
impl Advisory for OpenAiAdvisory {
    async fn propose_action(&self, req: &ProposalRequest<'_>) -> Result<String, AdvisoryError> {
        self.complete(proposal_prompt(req), req.max_tokens).await
    }

    async fn score_outcome(&self, req: &ScoreRequest<'_>) -> Result<String, AdvisoryError> {
        self.complete(score_prompt(req), req.max_tokens).await
    }
}
