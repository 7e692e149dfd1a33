//! Exam configuration and invoker factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mockexam_core::generation::DEFAULT_CANDIDATES;
use mockexam_core::{GenerationConfig, ModelInvoker};

use crate::error::ConfigError;
use crate::gemini::GeminiInvoker;
use crate::openai::OpenAiInvoker;

/// Configuration for a single generation endpoint.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
        }
    }
}

/// Top-level mockexam configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Key under `[providers]` of the active endpoint.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Candidate models, tried in order.
    #[serde(default = "default_candidates")]
    pub candidate_models: Vec<String>,
    /// Questions requested per exam.
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    /// Responses with fewer valid problems are rejected.
    #[serde(default = "default_min_viable")]
    pub min_viable_problems: usize,
    #[serde(default = "default_language")]
    pub language: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_candidates() -> Vec<String> {
    DEFAULT_CANDIDATES.iter().map(|m| m.to_string()).collect()
}
fn default_question_count() -> u32 {
    40
}
fn default_min_viable() -> usize {
    5
}
fn default_language() -> String {
    "Korean".to_string()
}
fn default_timeout() -> u64 {
    120
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            providers: HashMap::new(),
            candidate_models: default_candidates(),
            question_count: default_question_count(),
            min_viable_problems: default_min_viable(),
            language: default_language(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ExamConfig {
    /// The explicit generation settings handed to the generation service.
    pub fn generation_config(&self) -> Result<GenerationConfig, ConfigError> {
        if self.candidate_models.is_empty() {
            return Err(ConfigError::NoCandidateModels);
        }
        Ok(GenerationConfig {
            candidates: self.candidate_models.clone(),
            question_count: self.question_count,
            min_viable_problems: self.min_viable_problems,
            language: self.language.clone(),
        })
    }

    /// Create the invoker for the active provider.
    pub fn invoker(&self) -> Result<Arc<dyn ModelInvoker>, ConfigError> {
        match self.providers.get(&self.provider) {
            Some(config) => create_invoker(config, self.timeout_secs),
            None => match self.provider.as_str() {
                "gemini" => Err(ConfigError::MissingApiKey("Gemini")),
                "openai" => Err(ConfigError::MissingApiKey("OpenAI")),
                other => Err(ConfigError::UnknownProvider(other.to_string())),
            },
        }
    }

    /// Apply key overrides; `lookup` reads an environment variable.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty()) {
            let entry = self
                .providers
                .entry("gemini".into())
                .or_insert(ProviderConfig::Gemini {
                    api_key: String::new(),
                    base_url: None,
                });
            if let ProviderConfig::Gemini { api_key, .. } = entry {
                *api_key = key;
            }
        }

        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            let entry = self
                .providers
                .entry("openai".into())
                .or_insert(ProviderConfig::OpenAI {
                    api_key: String::new(),
                    base_url: None,
                    org_id: None,
                });
            if let ProviderConfig::OpenAI { api_key, .. } = entry {
                *api_key = key;
            }
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    resolve_with(s, |name| std::env::var(name).ok())
}

fn resolve_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&lookup(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mockexam.toml` in the current directory
/// 2. `~/.config/mockexam/config.toml`
///
/// Environment variable overrides: `GEMINI_API_KEY`, `OPENAI_API_KEY`.
pub fn load_config() -> Result<ExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mockexam.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamConfig::default(),
    };

    config.apply_env_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

/// Parse a config document and resolve `${VAR}` references.
pub fn parse_config(content: &str) -> Result<ExamConfig> {
    let mut config: ExamConfig = toml::from_str(content)?;
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mockexam"))
}

/// Create an invoker from its configuration.
pub fn create_invoker(
    config: &ProviderConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn ModelInvoker>, ConfigError> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            if api_key.trim().is_empty() {
                return Err(ConfigError::MissingApiKey("Gemini"));
            }
            Ok(Arc::new(GeminiInvoker::new(
                api_key,
                base_url.clone(),
                timeout_secs,
            )))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            if api_key.trim().is_empty() {
                return Err(ConfigError::MissingApiKey("OpenAI"));
            }
            Ok(Arc::new(OpenAiInvoker::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
                timeout_secs,
            )))
        }
    }
}
