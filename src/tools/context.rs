//! Per-invocation context shared with tools.

use serde::{Deserialize, Serialize};

/// Context for one agent invocation.
///
/// Created per request and handed to every tool call the engine makes while
/// answering it. Never stored in the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub user_id: String,
}

impl Context {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
