//! Model provider trait and the OpenAI-compatible implementation.

pub mod format;
pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ModelEndpointConfig;
use crate::error::MikiError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

pub use openai::OpenAiProvider;

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by chat-completion backends.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate one assistant turn (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, MikiError>;
}

/// Create the provider described by `config`.
pub fn create_provider(config: &ModelEndpointConfig) -> Result<Arc<dyn ModelProvider>, MikiError> {
    if config.base_url.trim().is_empty() {
        return Err(MikiError::Configuration("Missing model base URL".into()));
    }
    Ok(Arc::new(OpenAiProvider::from_config(config)?))
}
