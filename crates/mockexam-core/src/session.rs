//! The exam session state machine.
//!
//! ```text
//! SelectingGrade --select_grade--> SelectingTopic --select_topic--> Generating
//!       ^                               ^   |                         |     |
//!       |                  deselect_grade   +-- failure / abandon ----+     | success
//!       |                                                                   v
//!       +---------------------- retry ---------- Submitted <--submit--- Active
//! ```
//!
//! Generation is the only suspending step. It is split into
//! [`ExamSession::begin_generation`] and [`ExamSession::finish_generation`] so a
//! caller that shares the session can release it while the request is in
//! flight; every ticket carries an epoch and results for a stale epoch are
//! discarded. [`ExamSession::select_topic`] runs both halves in one call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerStore, ChoiceNumber};
use crate::error::{AnswerError, GenerationError, SessionError, StateError};
use crate::generation::ProblemGenerationService;
use crate::model::{Problem, ProblemSet, Topic};
use crate::scoring::{score, ScoreReport};

/// Lifecycle phase of an exam session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SelectingGrade,
    SelectingTopic,
    Generating,
    Active,
    Submitted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::SelectingGrade => write!(f, "selecting a grade"),
            Phase::SelectingTopic => write!(f, "selecting a topic"),
            Phase::Generating => write!(f, "generating"),
            Phase::Active => write!(f, "taking the exam"),
            Phase::Submitted => write!(f, "submitted"),
        }
    }
}

/// Proof that a generation was started, consumed when it finishes.
#[derive(Debug)]
pub struct GenerationTicket {
    epoch: u64,
    grade: String,
    topic: Topic,
}

impl GenerationTicket {
    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// One learner's pass through grade selection, generation, answering and
/// scoring.
pub struct ExamSession {
    service: Arc<ProblemGenerationService>,
    phase: Phase,
    grade: Option<String>,
    topic: Option<Topic>,
    problem_set: Option<ProblemSet>,
    answers: AnswerStore,
    score: Option<ScoreReport>,
    epoch: u64,
}

impl ExamSession {
    pub fn new(service: Arc<ProblemGenerationService>) -> Self {
        Self {
            service,
            phase: Phase::SelectingGrade,
            grade: None,
            topic: None,
            problem_set: None,
            answers: AnswerStore::default(),
            score: None,
            epoch: 0,
        }
    }

    // -- queries ------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn problem_set(&self) -> Option<&ProblemSet> {
        self.problem_set.as_ref()
    }

    /// Problems of the live set; empty until generation succeeds.
    pub fn problems(&self) -> &[Problem] {
        self.problem_set
            .as_ref()
            .map(|s| s.problems.as_slice())
            .unwrap_or_default()
    }

    /// The learner's recorded choice for a problem.
    pub fn answer_for(&self, problem_id: &str) -> Option<ChoiceNumber> {
        self.answers.get(problem_id)
    }

    /// Answered and total problem counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.answers.len(), self.problems().len())
    }

    /// The score report; `None` until submission.
    pub fn score(&self) -> Option<&ScoreReport> {
        self.score.as_ref()
    }

    // -- transitions --------------------------------------------------------

    /// `SelectingGrade -> SelectingTopic`.
    pub fn select_grade(&mut self, grade: impl Into<String>) -> Result<(), StateError> {
        self.expect_phase(Phase::SelectingGrade, "select a grade")?;
        self.grade = Some(grade.into());
        self.phase = Phase::SelectingTopic;
        Ok(())
    }

    /// `SelectingTopic -> SelectingGrade`, forgetting the grade.
    pub fn deselect_grade(&mut self) -> Result<(), StateError> {
        self.expect_phase(Phase::SelectingTopic, "choose another grade")?;
        self.grade = None;
        self.phase = Phase::SelectingGrade;
        Ok(())
    }

    /// `SelectingTopic -> Generating -> Active | SelectingTopic`.
    ///
    /// On failure no problem set is loaded, the topic is deselected and the
    /// generation error is returned for display. A call while a generation is
    /// already in flight is rejected.
    pub async fn select_topic(&mut self, topic: Topic) -> Result<(), SessionError> {
        let ticket = self.begin_generation(topic)?;
        let service = Arc::clone(&self.service);
        let result = service
            .generate(ticket.topic.context(), &ticket.grade, &ticket.topic.title)
            .await;
        self.finish_generation(ticket, result)
    }

    /// Enter `Generating` for `topic` and hand out the ticket that must be
    /// presented to [`finish_generation`](Self::finish_generation).
    pub fn begin_generation(&mut self, topic: Topic) -> Result<GenerationTicket, StateError> {
        self.expect_phase(Phase::SelectingTopic, "select a topic")?;
        let Some(grade) = self.grade.clone() else {
            return Err(self.reject("select a topic"));
        };

        self.epoch += 1;
        self.topic = Some(topic.clone());
        self.phase = Phase::Generating;
        tracing::info!(epoch = self.epoch, grade = %grade, topic = %topic.title, "generation started");

        Ok(GenerationTicket {
            epoch: self.epoch,
            grade,
            topic,
        })
    }

    /// Apply the outcome of the generation started by `ticket`.
    ///
    /// A ticket from an abandoned or superseded generation is rejected and
    /// its result dropped without touching the session.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<ProblemSet, GenerationError>,
    ) -> Result<(), SessionError> {
        if ticket.epoch != self.epoch || self.phase != Phase::Generating {
            tracing::debug!(
                ticket = ticket.epoch,
                current = self.epoch,
                "discarding stale generation result"
            );
            return Err(self.reject("finish a stale generation").into());
        }

        match result {
            Ok(set) => {
                self.answers = AnswerStore::for_problems(&set.problems);
                self.problem_set = Some(set);
                self.score = None;
                self.phase = Phase::Active;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("generation failed: {e}");
                self.topic = None;
                self.phase = Phase::SelectingTopic;
                Err(e.into())
            }
        }
    }

    /// `Generating -> SelectingTopic` without waiting for the request; its
    /// result will be discarded when it arrives.
    pub fn abandon_generation(&mut self) -> Result<(), StateError> {
        self.expect_phase(Phase::Generating, "abandon generation")?;
        self.epoch += 1;
        self.topic = None;
        self.phase = Phase::SelectingTopic;
        Ok(())
    }

    /// Record a one-based choice for a problem while the exam is active.
    pub fn answer(&mut self, problem_id: &str, choice: u32) -> Result<(), SessionError> {
        self.expect_phase(Phase::Active, "answer")?;
        let Some(choice) = ChoiceNumber::new(choice) else {
            let choices = self
                .problem_set
                .as_ref()
                .and_then(|s| s.get(problem_id))
                .map(|p| p.choices.len());
            return Err(match choices {
                Some(choices) => AnswerError::ChoiceOutOfRange {
                    problem_id: problem_id.to_string(),
                    choice,
                    choices,
                },
                None => AnswerError::UnknownProblem(problem_id.to_string()),
            }
            .into());
        };
        self.answers.set(problem_id, choice)?;
        Ok(())
    }

    /// `Active -> Submitted`: seal the answer sheet and score it. Allowed
    /// with unanswered problems.
    pub fn submit(&mut self) -> Result<&ScoreReport, StateError> {
        self.expect_phase(Phase::Active, "submit")?;
        self.answers.seal();
        let report = score(self.problems(), &self.answers);
        tracing::info!(
            correct = report.correct,
            total = report.total,
            "exam submitted"
        );
        self.phase = Phase::Submitted;
        Ok(self.score.insert(report))
    }

    /// `Submitted -> SelectingGrade`, clearing every derived value.
    pub fn retry(&mut self) -> Result<(), StateError> {
        self.expect_phase(Phase::Submitted, "retry")?;
        self.epoch += 1;
        self.answers.clear();
        self.problem_set = None;
        self.score = None;
        self.grade = None;
        self.topic = None;
        self.phase = Phase::SelectingGrade;
        Ok(())
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), StateError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.reject(action))
        }
    }

    fn reject(&self, action: &'static str) -> StateError {
        tracing::debug!(action, phase = %self.phase, "ignoring out-of-phase action");
        StateError {
            action,
            phase: self.phase,
        }
    }
}
