//! Problem generation across an ordered list of candidate models.
//!
//! The fallback policy ([`try_candidates`]) is separate from network code so
//! the "try the next model" behavior can be tested on its own. Each candidate
//! is tried once, in order; the first structurally valid response wins.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AttemptFailure, GenerationError};
use crate::model::{Problem, ProblemSet};
use crate::parser::{parse_problems, ProblemDraft};
use crate::prompt::ExamPrompt;
use crate::traits::ModelInvoker;

/// Configuration for the generation service.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Candidate model identifiers in preference order.
    pub candidates: Vec<String>,
    /// Number of questions requested from the model.
    pub question_count: u32,
    /// Responses with fewer problems are rejected.
    pub min_viable_problems: usize,
    /// Language the questions are written in.
    pub language: String,
}

/// Candidate models used when none are configured explicitly.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-2.0-flash-exp",
    "gemini-pro",
];

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(|m| m.to_string()).collect(),
            question_count: 40,
            min_viable_problems: 5,
            language: "Korean".to_string(),
        }
    }
}

/// Run `attempt` for each candidate in order and return the first success
/// together with the candidate that produced it.
///
/// Every failure is logged and the loop moves on; the last failure is kept
/// as the cause when all candidates are exhausted.
pub async fn try_candidates<T, F, Fut>(
    candidates: &[String],
    mut attempt: F,
) -> Result<(String, T), GenerationError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, AttemptFailure>>,
{
    let mut last_failure = None;

    for model in candidates {
        tracing::info!(model = %model, "trying candidate model");
        match attempt(model.clone()).await {
            Ok(value) => return Ok((model.clone(), value)),
            Err(failure) => {
                tracing::warn!(model = %model, "candidate failed: {failure}");
                last_failure = Some(failure);
            }
        }
    }

    match last_failure {
        Some(last_cause) => {
            tracing::error!(
                attempts = candidates.len(),
                "all candidate models failed; last error: {last_cause}"
            );
            Err(GenerationError::Exhausted {
                attempts: candidates.len(),
                last_cause,
            })
        }
        None => Err(GenerationError::NoCandidates),
    }
}

/// Turns a topic into a validated problem set via an unreliable endpoint.
pub struct ProblemGenerationService {
    invoker: Arc<dyn ModelInvoker>,
    config: GenerationConfig,
}

impl ProblemGenerationService {
    pub fn new(invoker: Arc<dyn ModelInvoker>, config: GenerationConfig) -> Self {
        Self { invoker, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a problem set for one grade/topic pair.
    #[instrument(skip(self, context), fields(endpoint = %self.invoker.name()))]
    pub async fn generate(
        &self,
        context: &str,
        grade: &str,
        topic_title: &str,
    ) -> Result<ProblemSet, GenerationError> {
        let prompt = ExamPrompt {
            language: &self.config.language,
            question_count: self.config.question_count,
            grade,
            topic_title,
            context,
        }
        .render();
        let prompt = prompt.as_str();

        let (model, drafts) = try_candidates(&self.config.candidates, move |model| async move {
            self.attempt(&model, prompt).await
        })
        .await?;

        tracing::info!(model = %model, problems = drafts.len(), "problem set generated");
        Ok(assemble_problem_set(drafts, grade, topic_title, &model))
    }

    /// One request to one candidate, with its response validated.
    pub async fn attempt(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Vec<ProblemDraft>, AttemptFailure> {
        let text = self.invoker.invoke(model, prompt).await?;
        parse_problems(&text, self.config.min_viable_problems).map_err(|error| {
            AttemptFailure::Validation {
                model: model.to_string(),
                error,
            }
        })
    }
}

/// Build the live problem set: assign fresh unique ids and stamp every
/// problem with the requesting grade and topic.
pub fn assemble_problem_set(
    drafts: Vec<ProblemDraft>,
    grade: &str,
    topic_title: &str,
    model: &str,
) -> ProblemSet {
    let id = Uuid::new_v4();
    let prefix = id.simple().to_string();
    let problems = drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| Problem {
            id: format!("gen-{}-{}", &prefix[..8], i + 1),
            question: d.question,
            passage: d.passage,
            choices: d.choices,
            answer: d.answer,
            difficulty: d.difficulty,
            explanation: d.explanation,
            grade: grade.to_string(),
            topic: topic_title.to_string(),
        })
        .collect();

    ProblemSet {
        id,
        grade: grade.to_string(),
        topic_title: topic_title.to_string(),
        model: model.to_string(),
        generated_at: Utc::now(),
        problems,
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::testing::{exam_json, ScriptedInvoker};
    use super::*;
    use crate::error::{InvocationError, InvocationFailure, ValidationError};

    fn config(candidates: &[&str]) -> GenerationConfig {
        GenerationConfig {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn default_config_matches_exam_format() {
        let config = GenerationConfig::default();
        assert_eq!(config.question_count, 40);
        assert_eq!(config.min_viable_problems, 5);
        assert_eq!(config.candidates[0], "gemini-1.5-flash");
        assert_eq!(config.language, "Korean");
    }

    #[tokio::test]
    async fn policy_returns_first_success() {
        let candidates: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let mut tried = Vec::new();
        let (model, value) = try_candidates(&candidates, |m| {
            tried.push(m.clone());
            async move {
                if m == "b" {
                    Ok(42)
                } else {
                    Err(AttemptFailure::Invocation(InvocationError::new(
                        m,
                        InvocationFailure::Timeout(1),
                    )))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(model, "b");
        assert_eq!(value, 42);
        assert_eq!(tried, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn policy_keeps_last_failure() {
        let candidates: Vec<String> = vec!["a".into(), "b".into()];
        let err = try_candidates::<(), _, _>(&candidates, |m| async move {
            Err(AttemptFailure::Invocation(InvocationError::new(
                m,
                InvocationFailure::Network("down".into()),
            )))
        })
        .await
        .unwrap_err();
        match err {
            GenerationError::Exhausted {
                attempts,
                last_cause,
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(last_cause.model(), "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn policy_without_candidates() {
        let err = try_candidates::<(), _, _>(&[], |_| async { unreachable!() })
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::NoCandidates);
    }

    #[tokio::test]
    async fn falls_back_after_malformed_response() {
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .reply("modelA", "이것은 JSON이 아닙니다")
                .reply("modelB", exam_json(40)),
        );
        let service = ProblemGenerationService::new(invoker.clone(), config(&["modelA", "modelB"]));

        let set = service
            .generate("광합성", "중학교 2학년", "식물과 에너지")
            .await
            .unwrap();

        assert_eq!(set.len(), 40);
        assert_eq!(set.model, "modelB");
        assert_eq!(set.problems[0].answer, 2);
        assert_eq!(invoker.calls(), vec!["modelA", "modelB"]);
    }

    #[tokio::test]
    async fn falls_back_through_every_failure_kind() {
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .fail("m1", InvocationFailure::Authentication("bad key".into()))
                .fail("m2", InvocationFailure::QuotaExhausted { retry_after_ms: 5000 })
                .reply("m3", exam_json(3))
                .reply("m4", "{\"error\": \"nope\"}")
                .reply("m5", exam_json(40)),
        );
        let service =
            ProblemGenerationService::new(invoker.clone(), config(&["m1", "m2", "m3", "m4", "m5"]));

        let set = service.generate("ctx", "g", "t").await.unwrap();
        assert_eq!(set.len(), 40);
        assert_eq!(invoker.calls().len(), 5);
    }

    #[tokio::test]
    async fn short_response_is_never_accepted() {
        let invoker = Arc::new(ScriptedInvoker::new().reply("only", exam_json(4)));
        let service = ProblemGenerationService::new(invoker, config(&["only"]));

        let err = service.generate("ctx", "g", "t").await.unwrap_err();
        match err {
            GenerationError::Exhausted { last_cause, .. } => assert_eq!(
                last_cause,
                AttemptFailure::Validation {
                    model: "only".into(),
                    error: ValidationError::TooFewProblems {
                        found: 4,
                        minimum: 5
                    },
                }
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhaustion_carries_last_cause() {
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .reply("modelA", "garbage")
                .fail("modelB", InvocationFailure::Api {
                    status: 503,
                    message: "overloaded".into(),
                }),
        );
        let service = ProblemGenerationService::new(invoker, config(&["modelA", "modelB"]));

        let err = service.generate("ctx", "g", "t").await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("modelB"));
    }

    #[tokio::test]
    async fn stops_after_first_success() {
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .reply("first", exam_json(5))
                .reply("second", exam_json(40)),
        );
        let service = ProblemGenerationService::new(invoker.clone(), config(&["first", "second"]));

        let set = service.generate("ctx", "g", "t").await.unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(invoker.calls(), vec!["first"]);
    }

    #[tokio::test]
    async fn ids_are_unique_and_problems_stamped() {
        let invoker = Arc::new(ScriptedInvoker::new().reply("m", exam_json(40)));
        let service = ProblemGenerationService::new(invoker, config(&["m"]));

        let set = service
            .generate("ctx", "고등학교 1학년", "물질과 규칙성")
            .await
            .unwrap();

        let ids: HashSet<&str> = set.problems.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 40);
        assert!(set.problems.iter().all(|p| p.id.starts_with("gen-")));
        assert!(set
            .problems
            .iter()
            .all(|p| p.grade == "고등학교 1학년" && p.topic == "물질과 규칙성"));
        assert_eq!(set.grade, "고등학교 1학년");
        assert_eq!(set.topic_title, "물질과 규칙성");
    }

    #[test]
    fn separate_sets_get_distinct_ids() {
        let drafts = crate::parser::parse_problems(&exam_json(5), 5).unwrap();
        let a = assemble_problem_set(drafts.clone(), "g", "t", "m");
        let b = assemble_problem_set(drafts, "g", "t", "m");
        assert_ne!(a.id, b.id);
        assert_ne!(a.problems[0].id, b.problems[0].id);
    }
}
