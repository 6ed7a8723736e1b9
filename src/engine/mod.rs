//! Reasoning engine boundary.
//!
//! The orchestrator treats the engine as a black box: it hands over the
//! working transcript, the tools, the per-call context and the response
//! schema, and gets back an [`AgentOutcome`]. [`ToolLoopEngine`] is the
//! shipped implementation, driving a chat-completion provider through a tool
//! loop.

pub mod outcome;
pub mod structured;
pub mod tool_loop;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::ResponseSchema;
use crate::tools::{Context, Tool};
use crate::types::ModelMessage;

pub use outcome::{AgentAnswer, AgentOutcome, TranscriptEntry};
pub use structured::StructuredOutputMode;
pub use tool_loop::ToolLoopEngine;

/// Inputs for one reasoning run.
pub struct ReasonRequest<'a> {
    /// Prior turns followed by the new user turn. No system prompt.
    pub transcript: Vec<ModelMessage>,
    pub tools: &'a [Arc<dyn Tool>],
    pub context: &'a Context,
    pub schema: &'a ResponseSchema,
}

/// Runs the reasoning loop for one user turn.
///
/// Implementations return either the full updated transcript (the input
/// transcript followed by every turn produced while answering) or only the
/// turns they produced, plus the structured response when the model
/// conformed to the schema. A loop that does not
/// finish within the engine's own limits is an error.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn reason(&self, request: ReasonRequest<'_>) -> Result<AgentOutcome>;
}
