//! Candidate model probing.
//!
//! Sends a tiny prompt to each candidate in order and stops at the first one
//! that answers. Useful for checking which configured models a key can reach
//! before a learner waits on a full exam.

use serde::Serialize;

use crate::traits::ModelInvoker;

/// Prompt sent to each probed model.
pub const PROBE_PROMPT: &str = "Reply with the single word: ok";

/// Result of probing one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub model: String,
    /// `None` when the model answered.
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn is_working(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes in candidate order, up to and including the first working model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    pub outcomes: Vec<ProbeOutcome>,
}

impl ProbeReport {
    /// The first candidate that answered, if any.
    pub fn working_model(&self) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| o.is_working())
            .map(|o| o.model.as_str())
    }
}

/// Probe `candidates` in order until one answers.
pub async fn probe_candidates(invoker: &dyn ModelInvoker, candidates: &[String]) -> ProbeReport {
    let mut report = ProbeReport::default();

    for model in candidates {
        match invoker.invoke(model, PROBE_PROMPT).await {
            Ok(_) => {
                tracing::info!(model = %model, "probe succeeded");
                report.outcomes.push(ProbeOutcome {
                    model: model.clone(),
                    error: None,
                });
                break;
            }
            Err(e) => {
                tracing::warn!(model = %model, "probe failed: {}", e.kind);
                report.outcomes.push(ProbeOutcome {
                    model: model.clone(),
                    error: Some(e.kind.to_string()),
                });
            }
        }
    }

    report
}
