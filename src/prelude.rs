//! Convenience re-exports for common use.

pub use crate::agent::{Agent, ConversationStore, InMemoryConversationStore};
pub use crate::config::{AppConfig, ModelEndpointConfig};
pub use crate::engine::{AgentAnswer, AgentOutcome, ReasoningEngine, ToolLoopEngine};
pub use crate::error::{MikiError, Result};
pub use crate::provider::ModelProvider;
pub use crate::schema::{ResponseSchema, StructuredResponse};
pub use crate::tools::{AgentTool, AgentToolParameters, Context, Tool, ToolArguments};
pub use crate::types::{ContentPart, GenerationSettings, ModelMessage, Role, Usage};
