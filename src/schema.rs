//! Structured response shape requested from the model.

use serde::{Deserialize, Serialize};

use crate::error::{MikiError, Result};
use crate::tools::AgentToolParameters;

/// The final answer, as the model is asked to return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResponse {
    /// AI response message.
    pub msg: String,
}

impl StructuredResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Name, description and JSON Schema of the structured response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
    pub parameters: AgentToolParameters,
}

impl Default for ResponseSchema {
    fn default() -> Self {
        Self::structured_response()
    }
}

impl ResponseSchema {
    /// Schema for [`StructuredResponse`].
    pub fn structured_response() -> Self {
        Self {
            name: "ResponseFormat".to_string(),
            description: "Response schema for the agent.".to_string(),
            parameters: AgentToolParameters::object()
                .string("msg", "AI response message", true)
                .build(),
        }
    }

    /// The raw JSON Schema object.
    pub fn json_schema(&self) -> &serde_json::Value {
        &self.parameters.schema
    }

    /// Decode a JSON value into a [`StructuredResponse`].
    pub fn decode(&self, value: serde_json::Value) -> Result<StructuredResponse> {
        serde_json::from_value(value).map_err(|e| {
            MikiError::InvalidArgument(format!("{} does not match schema: {e}", self.name))
        })
    }
}
