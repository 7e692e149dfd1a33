//! OpenAI-compatible chat completions invoker.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mockexam_core::{InvocationError, InvocationFailure, ModelInvoker};

use crate::error::{classify_status, classify_transport};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const SYSTEM_PROMPT: &str = "You write exam questions. Respond ONLY with the requested JSON array.";

/// Invoker for any endpoint speaking the `/v1/chat/completions` protocol.
pub struct OpenAiInvoker {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiInvoker {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            org_id,
            timeout_secs,
            client,
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        match &self.org_id {
            Some(org) => builder.header("OpenAI-Organization", org),
            None => builder,
        }
    }

    async fn failure_from(&self, response: reqwest::Response, model: &str) -> InvocationFailure {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        classify_status(status, retry_after.as_deref(), model, body)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[async_trait]
impl ModelInvoker for OpenAiInvoker {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, InvocationError> {
        let start = Instant::now();
        let fail = |kind| InvocationError::new(model, kind);

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .request(
                self.client
                    .post(format!("{}/v1/chat/completions", self.base_url)),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(classify_transport(&e, self.timeout_secs)))?;

        if !response.status().is_success() {
            return Err(fail(self.failure_from(response, model).await));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            fail(InvocationFailure::Api {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| fail(InvocationFailure::EmptyResponse))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            response_len = text.len(),
            "chat completion received"
        );
        Ok(text)
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, InvocationError> {
        let fail = |kind| InvocationError::new("*", kind);

        let response = self
            .request(self.client.get(format!("{}/v1/models", self.base_url)))
            .send()
            .await
            .map_err(|e| fail(classify_transport(&e, self.timeout_secs)))?;

        if !response.status().is_success() {
            return Err(fail(self.failure_from(response, "*").await));
        }

        let listing: ModelsResponse = response.json().await.map_err(|e| {
            fail(InvocationFailure::Api {
                status: 0,
                message: format!("failed to parse model list: {e}"),
            })
        })?;

        let mut ids: Vec<String> = listing.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        Ok(ids)
    }
}
