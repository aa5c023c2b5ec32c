//! Structured logging setup for scaffix.
//!
//! Scaffix is a library, so nothing here runs implicitly. Embedding
//! applications call one of the init functions once at startup, or
//! install their own `tracing` subscriber and skip this module
//! entirely; a second initialization is a no-op either way.
//!
//! `RUST_LOG` directives always win over the configured level, so a
//! deployment can turn single modules up or down without a rebuild.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ScaffixConfig;

static INIT: Once = Once::new();

/// How the subscriber formats and filters its output.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own spans and events.
    pub level: Level,
    /// Emit JSON lines instead of the human-readable format.
    pub use_json: bool,
    /// Include source file, line number and thread metadata.
    pub verbose_metadata: bool,
}

impl Default for LoggingConfig {
    /// INFO level, human-readable, targets only.
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            verbose_metadata: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for log aggregation.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            verbose_metadata: true,
        }
    }

    /// Debug level in the human format, for local work.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            verbose_metadata: false,
        }
    }
}

/// Parses a log level case-insensitively; unknown values become INFO.
///
/// ```
/// use scaffix::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Only the first call in a process
/// has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let format = fmt::layer()
            .with_target(true)
            .with_file(config.verbose_metadata)
            .with_line_number(config.verbose_metadata)
            .with_thread_ids(config.verbose_metadata);
        let format = if config.use_json {
            format.json().boxed()
        } else {
            format.boxed()
        };

        let mut filter = EnvFilter::from_default_env()
            .add_directive(format!("scaffix={}", config.level).parse().unwrap());
        // Without RUST_LOG, keep the HTTP stack under the AI client
        // quiet.
        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive("h2=warn".parse().unwrap())
                .add_directive("hyper=warn".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap());
        }

        tracing_subscriber::registry().with(format).with(filter).init();
    });
}

/// Initializes logging with the default configuration.
pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `SCAFFIX_LOG_LEVEL` and
/// `SCAFFIX_LOG_JSON`.
pub fn init_from_env() {
    init_from_config(&ScaffixConfig::default());
}

/// Initializes logging from an already-loaded [`ScaffixConfig`].
pub fn init_from_config(config: &ScaffixConfig) {
    init_logging(LoggingConfig {
        level: parse_level(&config.log_level),
        use_json: config.log_json,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_known_values() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level("INFO"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_unknown_falls_back_to_info() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_profiles() {
        let default = LoggingConfig::default();
        assert_eq!(default.level, Level::INFO);
        assert!(!default.use_json && !default.verbose_metadata);

        let production = LoggingConfig::production();
        assert!(production.use_json && production.verbose_metadata);

        let development = LoggingConfig::development();
        assert_eq!(development.level, Level::DEBUG);
        assert!(!development.use_json);

        assert_eq!(LoggingConfig::with_level(Level::WARN).level, Level::WARN);
    }

    #[test]
    fn test_scaffix_config_mapping() {
        let config = ScaffixConfig {
            ai_provider: None,
            ai_model: String::new(),
            ai_timeout_secs: 20,
            log_level: "warn".to_string(),
            log_json: true,
        };
        let logging = LoggingConfig {
            level: parse_level(&config.log_level),
            use_json: config.log_json,
            ..Default::default()
        };
        assert_eq!(logging.level, Level::WARN);
        assert!(logging.use_json);
    }
}
