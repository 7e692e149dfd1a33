//! Provider error types and HTTP status classification.

use thiserror::Error;

use mockexam_core::InvocationFailure;

/// Errors raised while turning configuration into an invoker.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selected provider has no usable API key.
    #[error("{0} API key is missing")]
    MissingApiKey(&'static str),

    /// `provider` names an entry absent from `[providers]`.
    #[error("unknown provider '{0}' (not present under [providers])")]
    UnknownProvider(String),

    /// The configuration leaves no candidate model to try.
    #[error("candidate_models must list at least one model")]
    NoCandidateModels,
}

/// Default wait when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Map a non-success HTTP response onto an invocation failure.
///
/// `retry_after` is the raw `retry-after` header value, if any.
pub(crate) fn classify_status(
    status: u16,
    retry_after: Option<&str>,
    model: &str,
    body: String,
) -> InvocationFailure {
    match status {
        401 | 403 => InvocationFailure::Authentication(body),
        // Gemini reports a bad key as 400 INVALID_ARGUMENT.
        400 if body.contains("API_KEY_INVALID") => InvocationFailure::Authentication(body),
        404 => InvocationFailure::ModelNotFound(model.to_string()),
        429 => {
            let secs = retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            InvocationFailure::QuotaExhausted {
                retry_after_ms: secs * 1000,
            }
        }
        _ => InvocationFailure::Api {
            status,
            message: body,
        },
    }
}

/// Map a transport error from `reqwest` onto an invocation failure.
pub(crate) fn classify_transport(err: &reqwest::Error, timeout_secs: u64) -> InvocationFailure {
    if err.is_timeout() {
        InvocationFailure::Timeout(timeout_secs)
    } else {
        InvocationFailure::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses() {
        assert!(matches!(
            classify_status(401, None, "m", "nope".into()),
            InvocationFailure::Authentication(_)
        ));
        assert!(matches!(
            classify_status(403, None, "m", "nope".into()),
            InvocationFailure::Authentication(_)
        ));
        let body = r#"{"error":{"code":400,"details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            classify_status(400, None, "m", body.into()),
            InvocationFailure::Authentication(_)
        ));
    }

    #[test]
    fn plain_bad_request_is_api_error() {
        assert_eq!(
            classify_status(400, None, "m", "bad".into()),
            InvocationFailure::Api {
                status: 400,
                message: "bad".into()
            }
        );
    }

    #[test]
    fn quota_uses_retry_after() {
        assert_eq!(
            classify_status(429, Some("12"), "m", String::new()),
            InvocationFailure::QuotaExhausted {
                retry_after_ms: 12_000
            }
        );
        assert_eq!(
            classify_status(429, Some("soon"), "m", String::new()),
            InvocationFailure::QuotaExhausted {
                retry_after_ms: 5_000
            }
        );
    }

    #[test]
    fn not_found_names_the_model() {
        assert_eq!(
            classify_status(404, None, "gemini-pro", String::new()),
            InvocationFailure::ModelNotFound("gemini-pro".into())
        );
    }

    #[test]
    fn missing_key_message() {
        assert_eq!(
            ConfigError::MissingApiKey("Gemini").to_string(),
            "Gemini API key is missing"
        );
    }
}
