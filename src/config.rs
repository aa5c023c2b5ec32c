//! Runtime configuration, loaded from environment variables with
//! defaults.
//!
//! The pipeline itself is fully deterministic and needs none of this;
//! configuration only governs the optional AI-assisted strategy and
//! logging.
//!
//! # Environment Variables
//!
//! - `SCAFFIX_AI_PROVIDER`: enables the AI-assisted strategy
//!   (ollama|openai|anthropic|gemini|groq|xai) - unset by default
//! - `SCAFFIX_AI_MODEL`: model name - required for every provider
//!   except ollama, which defaults to "qwen2.5-coder:7b"
//! - `SCAFFIX_AI_TIMEOUT_SECS`: per-request timeout - default: "20"
//! - `SCAFFIX_AI_BASE_URL`: custom endpoint, read by the client
//! - `SCAFFIX_LOG_LEVEL`: logging level - default: "info"
//! - `SCAFFIX_LOG_JSON`: emit JSON log lines (true|false) - default:
//!   "false"
//!
//! Provider credentials come from the standard `genai` environment
//! variables (`OLLAMA_HOST`, `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`,
//! `GOOGLE_API_KEY`, `GROQ_API_KEY`, `XAI_API_KEY`).

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use genai::adapter::AdapterKind;
use thiserror::Error;

use crate::llm::{BackendError, GenAIClient, LLMClient};

const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid AI provider: {0}. Valid options: ollama, openai, anthropic, gemini, groq, xai")]
    InvalidProvider(String),

    #[error("SCAFFIX_AI_MODEL must be set for provider {0}")]
    MissingModel(String),

    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("AI client initialization failed: {0}")]
    BackendInit(#[from] BackendError),
}

/// Process-level settings for a repair run.
#[derive(Debug, Clone)]
pub struct ScaffixConfig {
    /// AI provider name; `None` disables the AI-assisted strategy.
    pub ai_provider: Option<String>,
    /// Model name; empty means "use the provider default, if any".
    pub ai_model: String,
    /// Per-request timeout for AI calls, in seconds.
    pub ai_timeout_secs: u64,
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Emit JSON log lines instead of the human format.
    pub log_json: bool,
}

impl Default for ScaffixConfig {
    fn default() -> Self {
        let ai_provider = env::var("SCAFFIX_AI_PROVIDER")
            .ok()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let ai_model = env::var("SCAFFIX_AI_MODEL").unwrap_or_default();

        let ai_timeout_secs = env::var("SCAFFIX_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_AI_TIMEOUT_SECS);

        let log_level = env::var("SCAFFIX_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("SCAFFIX_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            ai_provider,
            ai_model,
            ai_timeout_secs,
            log_level,
            log_json,
        }
    }
}

impl ScaffixConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ai_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "AI timeout must be at least 1 second".to_string(),
            ));
        }
        if self.ai_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "AI timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationFailed(format!(
                    "invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        if let Some(name) = &self.ai_provider {
            parse_provider(name)?;
        }
        Ok(())
    }

    /// Builds the AI client when a provider is configured; `Ok(None)`
    /// means the pipeline runs with deterministic strategies only.
    pub fn create_client(&self) -> Result<Option<Arc<dyn LLMClient>>, ConfigError> {
        let name = match &self.ai_provider {
            Some(name) => name,
            None => return Ok(None),
        };
        let provider = parse_provider(name)?;

        let model = if self.ai_model.is_empty() {
            match provider {
                AdapterKind::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
                _ => return Err(ConfigError::MissingModel(name.clone())),
            }
        } else {
            self.ai_model.clone()
        };

        let client = GenAIClient::new(
            provider,
            model,
            Duration::from_secs(self.ai_timeout_secs),
        )?;
        Ok(Some(Arc::new(client)))
    }
}

impl fmt::Display for ScaffixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scaffix Configuration:")?;
        match &self.ai_provider {
            Some(provider) => {
                writeln!(f, "  AI Provider: {}", provider)?;
                let model = if self.ai_model.is_empty() {
                    "(provider default)"
                } else {
                    &self.ai_model
                };
                writeln!(f, "  AI Model: {}", model)?;
                writeln!(f, "  AI Timeout: {}s", self.ai_timeout_secs)?;
            }
            None => writeln!(f, "  AI Provider: disabled")?,
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        Ok(())
    }
}

fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    match name {
        "ollama" => Ok(AdapterKind::Ollama),
        "openai" => Ok(AdapterKind::OpenAI),
        "anthropic" | "claude" => Ok(AdapterKind::Anthropic),
        "gemini" => Ok(AdapterKind::Gemini),
        "groq" => Ok(AdapterKind::Groq),
        "xai" | "grok" => Ok(AdapterKind::Xai),
        other => Err(ConfigError::InvalidProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Temporarily sets an environment variable, restoring the prior
    /// value on drop.
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration_has_ai_disabled() {
        let _guards = vec![
            EnvGuard::unset("SCAFFIX_AI_PROVIDER"),
            EnvGuard::unset("SCAFFIX_AI_MODEL"),
            EnvGuard::unset("SCAFFIX_AI_TIMEOUT_SECS"),
            EnvGuard::unset("SCAFFIX_LOG_LEVEL"),
            EnvGuard::unset("SCAFFIX_LOG_JSON"),
        ];

        let config = ScaffixConfig::default();
        assert!(config.ai_provider.is_none());
        assert_eq!(config.ai_timeout_secs, DEFAULT_AI_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.log_json);
        assert!(config.validate().is_ok());
        assert!(config.create_client().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("SCAFFIX_AI_PROVIDER", "Anthropic"),
            EnvGuard::set("SCAFFIX_AI_MODEL", "claude-sonnet"),
            EnvGuard::set("SCAFFIX_AI_TIMEOUT_SECS", "45"),
            EnvGuard::set("SCAFFIX_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("SCAFFIX_LOG_JSON", "true"),
        ];

        let config = ScaffixConfig::default();
        assert_eq!(config.ai_provider.as_deref(), Some("anthropic"));
        assert_eq!(config.ai_model, "claude-sonnet");
        assert_eq!(config.ai_timeout_secs, 45);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_invalid_provider_rejected() {
        let _guard = EnvGuard::set("SCAFFIX_AI_PROVIDER", "skynet");
        let config = ScaffixConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProvider(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_timeout_and_level() {
        let config = ScaffixConfig {
            ai_provider: None,
            ai_model: String::new(),
            ai_timeout_secs: 0,
            log_level: "info".to_string(),
            log_json: false,
        };
        assert!(config.validate().is_err());

        let config = ScaffixConfig {
            ai_timeout_secs: 20,
            log_level: "noisy".to_string(),
            ..config
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_required_for_non_ollama() {
        let config = ScaffixConfig {
            ai_provider: Some("openai".to_string()),
            ai_model: String::new(),
            ai_timeout_secs: 20,
            log_level: "info".to_string(),
            log_json: false,
        };
        assert!(matches!(
            config.create_client(),
            Err(ConfigError::MissingModel(_))
        ));
    }
}
