//! Mock invoker for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mockexam_core::{InvocationError, InvocationFailure, ModelInvoker};

/// A mock invoker for driving generation and sessions without real API calls.
///
/// Each model is scripted with either a response text or a failure. Models
/// without a script answer with the default response, or fail with
/// `ModelNotFound` when no default is set.
pub struct MockInvoker {
    /// Map of model id → scripted outcome.
    scripts: HashMap<String, Result<String, InvocationFailure>>,
    /// Response for models without a script.
    default_response: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Models invoked, in call order.
    invoked: Mutex<Vec<String>>,
    /// Last prompt received.
    last_prompt: Mutex<Option<String>>,
}

impl MockInvoker {
    /// Create a mock with no scripted models and no default response.
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            default_response: None,
            call_count: AtomicU32::new(0),
            invoked: Mutex::new(Vec::new()),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a mock where every model returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: Some(response.to_string()),
            ..Self::new()
        }
    }

    /// Script `model` to return `response`.
    pub fn respond(mut self, model: &str, response: impl Into<String>) -> Self {
        self.scripts.insert(model.to_string(), Ok(response.into()));
        self
    }

    /// Script `model` to fail with `failure`.
    pub fn fail(mut self, model: &str, failure: InvocationFailure) -> Self {
        self.scripts.insert(model.to_string(), Err(failure));
        self
    }

    /// Number of `invoke` calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Models invoked so far, in call order.
    pub fn invoked(&self) -> Vec<String> {
        self.invoked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The last prompt sent to any model.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelInvoker for MockInvoker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, InvocationError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.invoked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(model.to_string());
        *self.last_prompt.lock().unwrap_or_else(|e| e.into_inner()) = Some(prompt.to_string());

        match self.scripts.get(model) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(failure)) => Err(InvocationError::new(model, failure.clone())),
            None => self.default_response.clone().ok_or_else(|| {
                InvocationError::new(model, InvocationFailure::ModelNotFound(model.to_string()))
            }),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, InvocationError> {
        let mut models: Vec<String> = self
            .scripts
            .iter()
            .filter(|(_, outcome)| outcome.is_ok())
            .map(|(model, _)| model.clone())
            .collect();
        models.sort();
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_response() {
        let invoker = MockInvoker::with_fixed_response("[]");
        assert_eq!(invoker.invoke("any-model", "prompt").await.unwrap(), "[]");
        assert_eq!(invoker.call_count(), 1);
        assert_eq!(invoker.last_prompt().as_deref(), Some("prompt"));
    }

    #[tokio::test]
    async fn scripted_models() {
        let invoker = MockInvoker::new()
            .fail(
                "gemini-1.5-flash",
                InvocationFailure::QuotaExhausted { retry_after_ms: 1000 },
            )
            .respond("gemini-1.5-pro", "ok");

        let err = invoker.invoke("gemini-1.5-flash", "p").await.unwrap_err();
        assert_eq!(err.model, "gemini-1.5-flash");
        assert_eq!(invoker.invoke("gemini-1.5-pro", "p").await.unwrap(), "ok");

        let err = invoker.invoke("gemini-pro", "p").await.unwrap_err();
        assert!(matches!(err.kind, InvocationFailure::ModelNotFound(_)));

        assert_eq!(
            invoker.invoked(),
            vec!["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"]
        );
        assert_eq!(invoker.list_models().await.unwrap(), vec!["gemini-1.5-pro"]);
    }
}
