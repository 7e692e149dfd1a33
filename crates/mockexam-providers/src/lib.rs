//! mockexam-providers: Generation endpoint integrations.
//!
//! Implements the `ModelInvoker` trait for the Gemini and OpenAI-compatible
//! APIs, plus the configuration file and the factory that picks the active
//! endpoint.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{create_invoker, load_config, load_config_from, ExamConfig, ProviderConfig};
pub use error::ConfigError;
pub use gemini::GeminiInvoker;
pub use mock::MockInvoker;
pub use openai::OpenAiInvoker;
