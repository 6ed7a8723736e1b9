//! The assistant's built-in tools: user location and weather lookup.
//!
//! Both are stubs returning fixed placeholder values. Each tool is built
//! with [`AgentTool::new`] and returned as `Arc<dyn Tool>`.
//!
//! ```rust
//! use miki::tools::builtin::all_tools;
//!
//! let tools = all_tools();
//! assert_eq!(tools.len(), 2);
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::tools::context::Context;
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::AgentToolParameters;

pub const GET_USER_LOCATION: &str = "get_user_location";
pub const GET_WEATHER_FOR_LOCATION: &str = "get_weather_for_location";

/// Location reported for every user.
pub const PLACEHOLDER_LOCATION: &str = "San Francisco";

/// Resolve the location of the user behind `ctx`.
pub fn user_location(ctx: &Context) -> String {
    debug!(user_id = %ctx.user_id, "resolving user location");
    PLACEHOLDER_LOCATION.to_string()
}

/// Look up the current weather condition for `location`.
pub fn weather_for_location(location: &str) -> String {
    format!("It's always sunny in {location}!")
}

/// Create the `get_user_location` tool.
pub fn user_location_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        GET_USER_LOCATION,
        "Get the current user's location",
        AgentToolParameters::empty(),
        |_args, ctx: Context| async move { Ok(serde_json::Value::String(user_location(&ctx))) },
    ))
}

/// Create the `get_weather_for_location` tool.
pub fn weather_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        GET_WEATHER_FOR_LOCATION,
        "Get the weather for a specific location",
        AgentToolParameters::object()
            .string("location", "City or place name", true)
            .build(),
        |args, _ctx| async move {
            let location = args.get_str("location")?;
            Ok(serde_json::Value::String(weather_for_location(location)))
        },
    ))
}

/// Both tools, in the order they are advertised to the model.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![user_location_tool(), weather_tool()]
}
