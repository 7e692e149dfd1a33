//! Model response parser.
//!
//! Turns the raw text returned by a generation endpoint into problem drafts.
//! The response is checked against an explicit schema; a single entry that
//! does not match rejects the whole response instead of being coerced.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::Difficulty;
use crate::traits::strip_code_fences;

/// A validated problem as written by the model, before the generation
/// service assigns its final id and stamps grade and topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDraft {
    pub question: String,
    pub passage: Option<String>,
    pub choices: Vec<String>,
    /// Zero-based index of the correct choice, checked to be in range.
    pub answer: usize,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
}

/// Wire shape of one generated problem. The model's own `id` is ignored
/// because ids are reassigned.
#[derive(Debug, Deserialize)]
struct RawProblem {
    question: String,
    #[serde(default)]
    passage: Option<String>,
    choices: Vec<String>,
    answer: u64,
    difficulty: Difficulty,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse a model response into at least `minimum` problem drafts.
pub fn parse_problems(text: &str, minimum: usize) -> Result<Vec<ProblemDraft>, ValidationError> {
    let cleaned = strip_code_fences(text);

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| ValidationError::NotJson(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(ValidationError::NotArray(json_kind(&other))),
    };

    if items.len() < minimum {
        return Err(ValidationError::TooFewProblems {
            found: items.len(),
            minimum,
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_problem(index, item))
        .collect()
}

fn parse_problem(index: usize, item: Value) -> Result<ProblemDraft, ValidationError> {
    let malformed = |reason: String| ValidationError::MalformedProblem { index, reason };

    let raw: RawProblem = serde_json::from_value(item).map_err(|e| malformed(e.to_string()))?;

    if raw.question.trim().is_empty() {
        return Err(malformed("question is empty".into()));
    }
    if raw.choices.len() < 2 {
        return Err(malformed(format!(
            "expected at least 2 choices, found {}",
            raw.choices.len()
        )));
    }
    if let Some(pos) = raw.choices.iter().position(|c| c.trim().is_empty()) {
        return Err(malformed(format!("choice at index {pos} is empty")));
    }
    let answer = usize::try_from(raw.answer)
        .ok()
        .filter(|&a| a < raw.choices.len())
        .ok_or_else(|| {
            malformed(format!(
                "answer {} is out of range for {} choices",
                raw.answer,
                raw.choices.len()
            ))
        })?;

    Ok(ProblemDraft {
        question: raw.question,
        passage: raw.passage.filter(|p| !p.trim().is_empty()),
        choices: raw.choices,
        answer,
        difficulty: raw.difficulty,
        explanation: raw.explanation.filter(|e| !e.trim().is_empty()),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
