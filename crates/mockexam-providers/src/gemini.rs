//! Google Gemini `generateContent` invoker.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mockexam_core::{InvocationError, InvocationFailure, ModelInvoker};

use crate::error::{classify_status, classify_transport};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";
const GENERATE_METHOD: &str = "generateContent";

/// Invoker for the Gemini REST API (`v1beta`).
pub struct GeminiInvoker {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiInvoker {
    pub fn new(api_key: &str, base_url: Option<String>, timeout_secs: u64) -> Self {
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
            timeout_secs,
            client,
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
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl GenerateResponse {
    /// Text of the first candidate; a response may be split across parts.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

#[async_trait]
impl ModelInvoker for GeminiInvoker {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, InvocationError> {
        let start = Instant::now();
        let fail = |kind| InvocationError::new(model, kind);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{model}:{GENERATE_METHOD}",
                self.base_url
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(classify_transport(&e, self.timeout_secs)))?;

        if !response.status().is_success() {
            return Err(fail(self.failure_from(response, model).await));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            fail(InvocationFailure::Api {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })
        })?;

        let text = parsed
            .into_text()
            .ok_or_else(|| fail(InvocationFailure::EmptyResponse))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            response_len = text.len(),
            "generation response received"
        );
        Ok(text)
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, InvocationError> {
        let fail = |kind| InvocationError::new("*", kind);

        let response = self
            .client
            .get(format!("{}/v1beta/models", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
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

        Ok(listing
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|g| g == GENERATE_METHOD)
            })
            .map(|m| {
                m.name
                    .strip_prefix("models/")
                    .map(str::to_string)
                    .unwrap_or(m.name)
            })
            .collect())
    }
}
