//! mockexam-core: Exam generation engine and session state machine.
//!
//! This crate turns a curriculum topic into a validated problem set by
//! falling back across candidate models, and drives the learner's session
//! through answering, submission, scoring and retry.

pub mod answers;
pub mod curriculum;
pub mod error;
pub mod generation;
pub mod model;
pub mod parser;
pub mod probe;
pub mod prompt;
pub mod scoring;
pub mod session;
pub mod traits;

pub use answers::{choice_number_for, AnswerStore, ChoiceNumber};
pub use error::{
    AnswerError, AttemptFailure, GenerationError, InvocationError, InvocationFailure,
    SessionError, StateError, ValidationError,
};
pub use generation::{GenerationConfig, ProblemGenerationService};
pub use model::{Difficulty, Grade, Problem, ProblemSet, Subject, Topic};
pub use scoring::{score, ScoreReport};
pub use session::{ExamSession, GenerationTicket, Phase};
pub use traits::ModelInvoker;
