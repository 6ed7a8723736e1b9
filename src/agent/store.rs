//! Conversation state store.
//!
//! Maps a conversation id to its ordered turns. Nothing is ever evicted:
//! every id that was appended to stays until a caller removes it.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::conversation::Conversation;
use crate::error::{MikiError, Result};
use crate::types::ModelMessage;

/// Storage for conversation turns, keyed by conversation id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Turns recorded for `conversation_id`; empty when the id is unknown.
    async fn get(&self, conversation_id: &str) -> Result<Vec<ModelMessage>>;

    /// Append one turn.
    async fn append(&self, conversation_id: &str, turn: ModelMessage) -> Result<()>;

    /// Append several turns as one operation.
    async fn append_all(&self, conversation_id: &str, turns: Vec<ModelMessage>) -> Result<()> {
        for turn in turns {
            self.append(conversation_id, turn).await?;
        }
        Ok(())
    }

    /// Drop a conversation, returning what it held.
    async fn remove(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    /// Ids of all stored conversations.
    async fn conversation_ids(&self) -> Result<Vec<String>>;
}

/// Process-local store. Each operation holds the lock only for its own
/// duration, so reads and appends on one key are individually atomic.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> MikiError {
    MikiError::Store("conversation lock poisoned".into())
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, conversation_id: &str) -> Result<Vec<ModelMessage>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions
            .get(conversation_id)
            .map(|c| c.messages().to_vec())
            .unwrap_or_default())
    }

    async fn append(&self, conversation_id: &str, turn: ModelMessage) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions
            .entry(conversation_id.to_string())
            .or_default()
            .add_message(turn);
        Ok(())
    }

    async fn append_all(&self, conversation_id: &str, turns: Vec<ModelMessage>) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions
            .entry(conversation_id.to_string())
            .or_default()
            .extend(turns);
        Ok(())
    }

    async fn remove(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions.remove(conversation_id))
    }

    async fn conversation_ids(&self) -> Result<Vec<String>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
