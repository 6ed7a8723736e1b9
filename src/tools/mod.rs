//! Tools the model can call, and the context they run in.

pub mod arguments;
pub mod builtin;
pub mod context;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use context::Context;
pub use tool::{AgentTool, Tool, ToolOutput};
pub use types::AgentToolParameters;
