//! Chat-completion tool loop.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{MikiError, Result};
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::schema::{ResponseSchema, StructuredResponse};
use crate::tools::{Context, Tool, ToolArguments};
use crate::types::*;

use super::outcome::{AgentOutcome, TranscriptEntry};
use super::structured::{parse_structured_text, StructuredOutputMode};
use super::{ReasonRequest, ReasoningEngine};

/// Model calls allowed per user turn before the run is abandoned.
pub const MAX_TOOL_ITERATIONS: usize = 25;

/// Drives a [`ModelProvider`] until it produces a final answer.
///
/// Each iteration sends the system prompt plus the transcript so far. Tool
/// calls are executed and their results appended; a reply without tool calls
/// (or, in [`StructuredOutputMode::Tool`], a call to the schema tool) ends
/// the run.
pub struct ToolLoopEngine {
    provider: Arc<dyn ModelProvider>,
    system_prompt: Option<String>,
    settings: GenerationSettings,
    mode: StructuredOutputMode,
    max_iterations: usize,
}

impl ToolLoopEngine {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            system_prompt: None,
            settings: GenerationSettings::default(),
            mode: StructuredOutputMode::default(),
            max_iterations: MAX_TOOL_ITERATIONS,
        }
    }

    /// Set system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set generation settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_mode(mut self, mode: StructuredOutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn preamble(&self, schema: &ResponseSchema) -> Option<ModelMessage> {
        let parts: Vec<String> = self
            .system_prompt
            .iter()
            .cloned()
            .chain(self.mode.instruction(schema))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(ModelMessage::system(parts.join("\n\n")))
        }
    }

    fn tool_definitions(
        &self,
        tools: &[Arc<dyn Tool>],
        schema: &ResponseSchema,
    ) -> Option<Vec<ToolDefinition>> {
        let mut defs: Vec<ToolDefinition> = tools.iter().map(|t| t.definition()).collect();
        defs.extend(self.mode.tool_definition(schema));
        if defs.is_empty() {
            None
        } else {
            Some(defs)
        }
    }
}

#[async_trait]
impl ReasoningEngine for ToolLoopEngine {
    async fn reason(&self, request: ReasonRequest<'_>) -> Result<AgentOutcome> {
        let ReasonRequest {
            mut transcript,
            tools,
            context,
            schema,
        } = request;

        let tool_defs = self.tool_definitions(tools, schema);
        let mut settings = self.settings.clone();
        if let Some(format) = self.mode.response_format(schema) {
            settings.response_format = Some(format);
        }
        let preamble = self.preamble(schema);

        let mut steps = Vec::new();
        let mut total_usage = Usage::default();

        for iteration in 0..self.max_iterations {
            let request = ProviderRequest {
                messages: preamble
                    .iter()
                    .chain(transcript.iter())
                    .cloned()
                    .collect(),
                settings: settings.clone(),
                tools: tool_defs.clone(),
            };

            debug!(
                iteration,
                provider = self.provider.provider_name(),
                model = self.provider.model_id(),
                user_id = %context.user_id,
                "tool loop: calling provider"
            );
            let response = self.provider.generate_text(&request).await?;
            total_usage.merge(&response.usage);

            let mut step = GenerationStep {
                text: response.text.clone(),
                tool_calls: response.tool_calls.clone(),
                tool_results: Vec::new(),
                usage: response.usage,
                finish_reason: response.finish_reason,
            };

            if response.tool_calls.is_empty() {
                let structured = match self.mode {
                    StructuredOutputMode::Tool => None,
                    StructuredOutputMode::JsonSchema | StructuredOutputMode::JsonObject => {
                        parse_structured_text(schema, &response.text)
                    }
                };
                if structured.is_none() {
                    debug!(iteration, "final answer is free text");
                }
                transcript.push(ModelMessage::assistant(response.text));
                steps.push(step);
                return Ok(finish(structured, transcript, steps, total_usage));
            }

            transcript.push(ModelMessage::assistant_tool_calls(
                response.text,
                response.tool_calls.clone(),
            ));

            let mut structured = None;
            for call in &response.tool_calls {
                let result = if self.mode == StructuredOutputMode::Tool && call.name == schema.name
                {
                    match ToolArguments::new(call.arguments.clone()).deserialize::<StructuredResponse>()
                    {
                        Ok(parsed) => {
                            let result = AgentToolResult {
                                tool_call_id: call.id.clone(),
                                result: serde_json::Value::String(format!(
                                    "Returning structured response: {}",
                                    parsed.msg
                                )),
                                is_error: false,
                            };
                            structured = Some(parsed);
                            result
                        }
                        Err(e) => {
                            warn!(error = %e, "structured response did not match schema");
                            AgentToolResult {
                                tool_call_id: call.id.clone(),
                                result: serde_json::json!({"error": e.to_string()}),
                                is_error: true,
                            }
                        }
                    }
                } else {
                    execute_tool(tools, call, context).await?
                };

                step.tool_results.push(result.clone());
                transcript.push(ModelMessage::tool_result(
                    result.tool_call_id,
                    result.result,
                    result.is_error,
                ));
            }
            steps.push(step);

            if structured.is_some() {
                return Ok(finish(structured, transcript, steps, total_usage));
            }
        }

        warn!(max_iterations = self.max_iterations, "tool loop did not converge");
        Err(MikiError::IterationLimit(self.max_iterations))
    }
}

/// Run one tool call. Unknown tools are reported back to the model; a tool
/// that fails aborts the run.
async fn execute_tool(
    tools: &[Arc<dyn Tool>],
    call: &AgentToolCall,
    ctx: &Context,
) -> Result<AgentToolResult> {
    let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
        warn!(tool = %call.name, "Tool not found");
        return Ok(AgentToolResult {
            tool_call_id: call.id.clone(),
            result: serde_json::json!({"error": format!("Tool '{}' not found", call.name)}),
            is_error: true,
        });
    };

    let args = ToolArguments::new(call.arguments.clone());
    match tool.execute(&args, ctx).await {
        Ok(value) => Ok(AgentToolResult {
            tool_call_id: call.id.clone(),
            result: value,
            is_error: false,
        }),
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool execution failed");
            Err(match e {
                MikiError::ToolExecution { .. } => e,
                other => MikiError::tool(&call.name, other.to_string()),
            })
        }
    }
}

fn finish(
    structured_response: Option<StructuredResponse>,
    transcript: Vec<ModelMessage>,
    steps: Vec<GenerationStep>,
    usage: Usage,
) -> AgentOutcome {
    AgentOutcome {
        structured_response,
        messages: transcript.into_iter().map(TranscriptEntry::Message).collect(),
        steps,
        usage,
    }
}
