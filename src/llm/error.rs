//! Errors surfaced by LLM backends.
//!
//! A backend failure is never fatal to a repair run; the assisted
//! strategy reports it and the registry moves on to the next strategy.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The provider rejected or failed the request.
    #[error("API error: {message}")]
    Api { message: String },

    /// No reply within the configured window.
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The provider replied with something unusable.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Client-side setup problem: bad provider, missing credentials.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl BackendError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
