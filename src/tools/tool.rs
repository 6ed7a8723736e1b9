//! The tool trait and a closure-backed implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::arguments::ToolArguments;
use super::context::Context;
use super::types::AgentToolParameters;
use crate::error::MikiError;
use crate::provider::ToolDefinition;

/// Value a tool hands back to the model, or why it could not.
pub type ToolOutput = Result<Value, MikiError>;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type BoxedHandler = Arc<dyn Fn(ToolArguments, Context) -> BoxFuture<ToolOutput> + Send + Sync>;

/// A capability the reasoning engine may invoke on the model's behalf.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls the tool by.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &AgentToolParameters;

    /// Run with the model-supplied arguments and the caller's context.
    async fn execute(&self, args: &ToolArguments, ctx: &Context) -> ToolOutput;

    /// How the tool is advertised to the provider.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

/// A tool whose behavior is an async closure.
#[derive(Clone)]
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: BoxedHandler,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let handler: BoxedHandler =
            Arc::new(move |args, ctx| -> BoxFuture<ToolOutput> { Box::pin(handler(args, ctx)) });
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments, ctx: &Context) -> ToolOutput {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("required", &self.parameters.required())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_mirrors_tool_metadata() {
        let tool = AgentTool::new(
            "echo",
            "Echo the input",
            AgentToolParameters::object().string("text", "Text", true).build(),
            |args, _ctx| async move { Ok(args.raw().clone()) },
        );
        let def = tool.definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.description, "Echo the input");
        assert_eq!(def.parameters["required"], json!(["text"]));
    }
}
