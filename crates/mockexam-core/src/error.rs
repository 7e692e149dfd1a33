//! Error types for exam generation and exam sessions.
//!
//! Per-candidate failures (`InvocationError`, `ValidationError`) are recovered
//! inside `ProblemGenerationService` by moving on to the next candidate model.
//! Only `GenerationError` escapes to the session, and session actions invoked
//! in the wrong phase are reported as `StateError` without touching state.

use thiserror::Error;

use crate::session::Phase;

/// Why a single generation request to one model failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationFailure {
    /// The API key was rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Quota exhausted or rate limited (HTTP 429).
    #[error("quota exhausted, retry after {retry_after_ms}ms")]
    QuotaExhausted { retry_after_ms: u64 },

    /// The endpoint does not know this model.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered but carried no text payload.
    #[error("response contained no text")]
    EmptyResponse,
}

/// A failed request to one named model endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model '{model}' failed: {kind}")]
pub struct InvocationError {
    /// The model identifier the request was sent to.
    pub model: String,
    /// The underlying cause.
    pub kind: InvocationFailure,
}

impl InvocationError {
    pub fn new(model: impl Into<String>, kind: InvocationFailure) -> Self {
        Self {
            model: model.into(),
            kind,
        }
    }
}

/// A response that was retrieved but is not a usable problem set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The text is not parseable JSON.
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    /// The JSON value is not an array.
    #[error("response is not a JSON array (found {0})")]
    NotArray(&'static str),

    /// Fewer problems than the minimum viable count.
    #[error("response has {found} problems, at least {minimum} required")]
    TooFewProblems { found: usize, minimum: usize },

    /// One entry does not match the problem schema.
    #[error("problem at index {index} is malformed: {reason}")]
    MalformedProblem { index: usize, reason: String },
}

/// Outcome of one failed candidate attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("model '{model}' returned an unusable response: {error}")]
    Validation {
        model: String,
        error: ValidationError,
    },
}

impl AttemptFailure {
    /// The candidate model this failure belongs to.
    pub fn model(&self) -> &str {
        match self {
            AttemptFailure::Invocation(e) => &e.model,
            AttemptFailure::Validation { model, .. } => model,
        }
    }
}

/// Every candidate model failed to produce a valid problem set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No candidate models are configured.
    #[error("no candidate models configured")]
    NoCandidates,

    /// All candidates were tried and failed.
    #[error("all {attempts} candidate models failed; last error: {last_cause}")]
    Exhausted {
        attempts: usize,
        last_cause: AttemptFailure,
    },
}

/// A session action invoked in a phase that does not accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {phase}")]
pub struct StateError {
    pub action: &'static str,
    pub phase: Phase,
}

/// A rejected answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    /// The answer sheet was sealed by submission.
    #[error("answers are sealed after submission")]
    Sealed,

    /// The problem id is not part of the live problem set.
    #[error("unknown problem id: {0}")]
    UnknownProblem(String),

    /// The one-based choice number does not exist on this problem.
    #[error("choice {choice} is out of range for problem {problem_id} ({choices} choices)")]
    ChoiceOutOfRange {
        problem_id: String,
        choice: u32,
        choices: usize,
    },
}

/// Errors surfaced by `ExamSession` actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Answer(#[from] AnswerError),
}
