//! Shared test helpers: a scripted provider and scripted engines.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use miki::agent::{Agent, InMemoryConversationStore};
use miki::engine::{AgentOutcome, ReasonRequest, ReasoningEngine};
use miki::error::{MikiError, Result};
use miki::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use miki::schema::StructuredResponse;
use miki::tools::builtin;
use miki::types::*;

/// A mock provider that returns canned responses and records every request.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<Result<ProviderResponse>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push(Ok(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        }));
    }

    /// Queue a provider failure.
    pub fn queue_error(&self, error: MikiError) {
        self.responses.lock().unwrap().push(Err(error));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> std::result::Result<ProviderResponse, MikiError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            });
        }
        responses.remove(0)
    }
}

enum Script {
    /// Echo the transcript plus an assistant turn, with a structured answer.
    Structured(String),
    /// Return this outcome unchanged.
    Fixed(AgentOutcome),
    Fail(String),
}

/// Engine with a fixed behavior that records what it was asked.
pub struct ScriptedEngine {
    script: Script,
    calls: AtomicUsize,
    transcripts: Mutex<Vec<Vec<ModelMessage>>>,
    user_ids: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    fn with_script(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            transcripts: Mutex::new(Vec::new()),
            user_ids: Mutex::new(Vec::new()),
        })
    }

    pub fn structured(msg: &str) -> Arc<Self> {
        Self::with_script(Script::Structured(msg.to_string()))
    }

    pub fn fixed(outcome: AgentOutcome) -> Arc<Self> {
        Self::with_script(Script::Fixed(outcome))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_script(Script::Fail(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn transcripts(&self) -> Vec<Vec<ModelMessage>> {
        self.transcripts.lock().unwrap().clone()
    }

    pub fn user_ids(&self) -> Vec<String> {
        self.user_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn reason(&self, request: ReasonRequest<'_>) -> Result<AgentOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcripts
            .lock()
            .unwrap()
            .push(request.transcript.clone());
        self.user_ids
            .lock()
            .unwrap()
            .push(request.context.user_id.clone());

        match &self.script {
            Script::Structured(msg) => {
                let mut messages = request.transcript;
                messages.push(ModelMessage::assistant(msg.clone()));
                Ok(AgentOutcome::new(
                    Some(StructuredResponse::new(msg.clone())),
                    messages.into_iter().map(Into::into).collect(),
                ))
            }
            Script::Fixed(outcome) => Ok(outcome.clone()),
            Script::Fail(message) => Err(MikiError::api(502, message.clone())),
        }
    }
}

/// Agent over `engine` with the built-in tools and a fresh in-memory store.
pub fn agent_with(engine: Arc<dyn ReasoningEngine>) -> Agent {
    Agent::new(engine, Arc::new(InMemoryConversationStore::new()))
        .with_tools(builtin::all_tools())
}
