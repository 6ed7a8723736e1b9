//! Per-step generation records.

use super::generation::FinishReason;
use super::message::{AgentToolCall, AgentToolResult};
use super::usage::Usage;

/// A single generation step (one model call).
#[derive(Debug, Clone)]
pub struct GenerationStep {
    /// Text generated in this step.
    pub text: String,
    /// Tool calls made in this step, if any.
    pub tool_calls: Vec<AgentToolCall>,
    /// Tool results returned in this step, if any.
    pub tool_results: Vec<AgentToolResult>,
    /// Token usage for this step.
    pub usage: Usage,
    /// Finish reason for this step.
    pub finish_reason: Option<FinishReason>,
}
