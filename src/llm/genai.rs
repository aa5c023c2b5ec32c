//! GenAI-backed client.
//!
//! One adapter covers every provider the `genai` crate speaks (Ollama,
//! OpenAI, Anthropic, Gemini, Groq, xAI). Credentials come from the
//! provider's standard environment variables; a custom endpoint can be
//! forced with `SCAFFIX_AI_BASE_URL`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use tracing::{debug, error};

use super::client::{LLMClient, LLMRequest, LLMResponse, MessageRole};
use super::error::BackendError;

pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    timeout: Duration,
}

impl GenAIClient {
    pub fn new(
        provider: AdapterKind,
        model: String,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = match std::env::var("SCAFFIX_AI_BASE_URL").ok() {
            Some(base_url) => {
                debug!(provider = provider.as_str(), endpoint = %base_url, "using custom endpoint");
                Client::builder()
                    .with_service_target_resolver(Self::pinned_target(provider, model.clone(), base_url))
                    .build()
            }
            None => Client::default(),
        };

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    /// Resolver that sends every request to one fixed endpoint instead
    /// of the provider's default, keeping the provider's own auth.
    fn pinned_target(
        provider: AdapterKind,
        model: String,
        base_url: String,
    ) -> ServiceTargetResolver {
        ServiceTargetResolver::from_resolver_fn(
            move |_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let auth = match provider.default_key_env_name() {
                    Some(api_key_var) => AuthData::from_env(api_key_var),
                    None => AuthData::from_single(""),
                };
                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(base_url.clone()),
                    auth,
                    model: ModelIden::new(provider, &model),
                })
            },
        )
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> = request
            .messages
            .iter()
            .map(|message| match message.role {
                MessageRole::System => GenAIChatMessage::system(&message.content),
                MessageRole::User => GenAIChatMessage::user(&message.content),
                MessageRole::Assistant => GenAIChatMessage::assistant(&message.content),
            })
            .collect();

        let mut options = ChatOptions::default();
        if let Some(temperature) = request.temperature {
            options = options.with_temperature(temperature as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let call = self
            .client
            .exec_chat(&self.model, GenAIChatRequest::new(messages), Some(&options));
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(provider = self.provider.as_str(), "API error: {}", e);
                return Err(BackendError::api(format!(
                    "{} request failed: {}",
                    self.provider.as_str(),
                    e
                )));
            }
            Err(_) => {
                error!(
                    provider = self.provider.as_str(),
                    timeout_secs = self.timeout.as_secs(),
                    "request timed out"
                );
                return Err(BackendError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response.first_text().unwrap_or_default().to_string();
        if content.is_empty() {
            return Err(BackendError::invalid("empty completion"));
        }
        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
