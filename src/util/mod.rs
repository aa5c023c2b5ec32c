//! Cross-cutting utilities.
//!
//! Currently just logging setup; scaffix keeps everything else close
//! to the module that owns it.

pub mod logging;

// Re-export commonly used items
pub use logging::{init_default, init_from_config, init_from_env, init_logging, LoggingConfig};
