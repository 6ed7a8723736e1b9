//! The orchestrator: load history, run the engine, persist the new turns.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ModelEndpointConfig;
use crate::engine::{AgentOutcome, ReasonRequest, ReasoningEngine, ToolLoopEngine, TranscriptEntry};
use crate::error::Result;
use crate::provider;
use crate::schema::ResponseSchema;
use crate::tools::{builtin, Context, Tool};
use crate::types::{GenerationSettings, ModelMessage};

use super::store::{ConversationStore, InMemoryConversationStore};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that can answer questions and help users with various tasks.

You have access to the following tools:
- get_weather_for_location: use this to get the weather for a specific location
- get_user_location: use this to get the user's location

Please provide clear, helpful responses to user questions.";

/// An engine, its tools, its response schema and a conversation store,
/// invocable one user turn at a time.
pub struct Agent {
    engine: Arc<dyn ReasoningEngine>,
    store: Arc<dyn ConversationStore>,
    tools: Vec<Arc<dyn Tool>>,
    schema: ResponseSchema,
}

impl Agent {
    /// Create an agent with no tools and the default response schema.
    pub fn new(engine: Arc<dyn ReasoningEngine>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            engine,
            store,
            tools: Vec::new(),
            schema: ResponseSchema::default(),
        }
    }

    /// The weather assistant: OpenAI-compatible tool loop, both built-in
    /// tools, in-memory conversation store.
    pub fn from_config(config: &ModelEndpointConfig) -> Result<Self> {
        let provider = provider::create_provider(config)?;
        let settings = GenerationSettings::builder()
            .temperature(config.temperature)
            .build();
        let engine = ToolLoopEngine::new(provider)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_settings(settings)
            .with_mode(config.structured_output);

        Ok(Self::new(Arc::new(engine), Arc::new(InMemoryConversationStore::new()))
            .with_tools(builtin::all_tools()))
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Answer one user message within `conversation_id`.
    ///
    /// The user turn and every turn the engine added are written to the store
    /// only once the engine succeeds; a failed run leaves the conversation as
    /// it was.
    pub async fn invoke(
        &self,
        conversation_id: &str,
        user_message: &str,
        context: &Context,
    ) -> Result<AgentOutcome> {
        let mut transcript = self.store.get(conversation_id).await?;
        debug!(conversation_id, prior_turns = transcript.len(), "invoking agent");

        let user_turn = ModelMessage::user(user_message);
        transcript.push(user_turn.clone());
        let sent = transcript.clone();

        let outcome = self
            .engine
            .reason(ReasonRequest {
                transcript,
                tools: &self.tools,
                context,
                schema: &self.schema,
            })
            .await?;

        let echoed = echoed_len(&sent, &outcome.messages);
        let new_turns: Vec<ModelMessage> = std::iter::once(user_turn)
            .chain(
                outcome.messages[echoed..]
                    .iter()
                    .cloned()
                    .map(TranscriptEntry::into_message),
            )
            .collect();
        self.store.append_all(conversation_id, new_turns).await?;

        info!(
            conversation_id,
            steps = outcome.steps.len(),
            structured = outcome.structured_response.is_some(),
            input_tokens = outcome.usage.input_tokens,
            output_tokens = outcome.usage.output_tokens,
            "agent run finished"
        );
        Ok(outcome)
    }
}

/// Number of leading `output` entries that repeat the `input` transcript.
///
/// Engines may hand back the whole transcript or only what they added; the
/// input is treated as echoed only when every input turn comes back unchanged
/// and in order.
fn echoed_len(input: &[ModelMessage], output: &[TranscriptEntry]) -> usize {
    let echoed = output.len() >= input.len()
        && input
            .iter()
            .zip(output)
            .all(|(sent, entry)| matches!(entry, TranscriptEntry::Message(m) if m == sent));
    if echoed {
        input.len()
    } else {
        0
    }
}
