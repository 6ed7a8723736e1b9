//! Structured output strategies.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::provider::ToolDefinition;
use crate::schema::{ResponseSchema, StructuredResponse};
use crate::types::ResponseFormat;

/// How the model is asked to produce the structured response.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StructuredOutputMode {
    /// Advertise the schema as a tool; calling it ends the loop.
    #[default]
    Tool,
    /// Native `response_format: json_schema`.
    JsonSchema,
    /// `response_format: json_object` plus a schema instruction.
    JsonObject,
}

impl StructuredOutputMode {
    pub(crate) fn response_format(self, schema: &ResponseSchema) -> Option<ResponseFormat> {
        match self {
            Self::Tool => None,
            Self::JsonSchema => Some(ResponseFormat::JsonSchema {
                schema: schema.json_schema().clone(),
                name: schema.name.clone(),
            }),
            Self::JsonObject => Some(ResponseFormat::JsonObject),
        }
    }

    pub(crate) fn tool_definition(self, schema: &ResponseSchema) -> Option<ToolDefinition> {
        match self {
            Self::Tool => Some(ToolDefinition {
                name: schema.name.clone(),
                description: schema.description.clone(),
                parameters: schema.json_schema().clone(),
            }),
            Self::JsonSchema | Self::JsonObject => None,
        }
    }

    pub(crate) fn instruction(self, schema: &ResponseSchema) -> Option<String> {
        match self {
            Self::JsonObject => Some(format!(
                "You must respond with valid JSON matching this schema:\n```json\n{}\n```",
                serde_json::to_string_pretty(schema.json_schema()).unwrap_or_default()
            )),
            Self::Tool => Some(format!(
                "When you have the final answer, call the `{}` tool with it.",
                schema.name
            )),
            Self::JsonSchema => None,
        }
    }
}

/// Try to read a final text answer as the structured response.
///
/// Returns `None` when the text is not JSON of the right shape; the caller
/// then falls back to the raw text.
pub fn parse_structured_text(schema: &ResponseSchema, text: &str) -> Option<StructuredResponse> {
    let json_text = strip_code_fences(text);
    let value = serde_json::from_str::<serde_json::Value>(&json_text).ok()?;
    match schema.decode(value) {
        Ok(response) => Some(response),
        Err(e) => {
            debug!(error = %e, "final text is JSON but not the response schema");
            None
        }
    }
}

/// Strip markdown code fences from JSON response.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let without_opening = if let Some(rest) = trimmed.strip_prefix("```json") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("```") {
            rest
        } else {
            trimmed
        };
        if let Some(stripped) = without_opening.strip_suffix("```") {
            return stripped.trim().to_string();
        }
        return without_opening.trim().to_string();
    }
    trimmed.to_string()
}
