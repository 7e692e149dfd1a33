//! The generation endpoint seam and response text cleanup.
//!
//! `ModelInvoker` is implemented by the `mockexam-providers` crate.

use async_trait::async_trait;

use crate::error::InvocationError;

// ---------------------------------------------------------------------------
// Model invoker trait
// ---------------------------------------------------------------------------

/// One generation endpoint that can be asked to complete a prompt with a
/// named model.
///
/// Implementations issue exactly one outbound request per `invoke` call and
/// never retry; falling back across models is the caller's job.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Human-readable endpoint name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `prompt` to `model` and return the raw response text.
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, InvocationError>;

    /// Model identifiers the endpoint reports as able to generate content.
    async fn list_models(&self) -> Result<Vec<String>, InvocationError>;
}

// ---------------------------------------------------------------------------
// Code fence stripping
// ---------------------------------------------------------------------------

/// Strip markdown code fences from a model response.
///
/// Handles:
/// - A ```json``` block (preferred, first one wins)
/// - A generic ``` block
/// - Stray fence markers with no matching close (removed)
/// - Raw text with no fences (trimmed and returned as-is)
pub fn strip_code_fences(response: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            let slot = if is_json_block {
                &mut json_block
            } else {
                &mut generic_block
            };
            if slot.is_none() {
                *slot = Some(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    if let Some(block) = json_block.or(generic_block) {
        return block.trim().to_string();
    }

    // Unclosed or inline fences: drop the markers and keep everything else.
    response
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}
