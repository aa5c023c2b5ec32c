//! LLM client abstraction.
//!
//! A trait-based seam so the assisted repair strategy can run against
//! any `genai` provider in production and a scripted mock in tests.

mod client;
mod error;
mod genai;
mod mock;

pub use client::{ChatMessage, LLMClient, LLMRequest, LLMResponse, MessageRole};
pub use error::BackendError;
pub use genai::GenAIClient;
pub use mock::{MockLLMClient, MockReply};
