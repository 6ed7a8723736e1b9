//! Agent orchestration: conversation memory plus one engine run per turn.

pub mod agent;
pub mod conversation;
pub mod store;

pub use agent::{Agent, SYSTEM_PROMPT};
pub use conversation::Conversation;
pub use store::{ConversationStore, InMemoryConversationStore};
