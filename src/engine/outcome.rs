//! Engine output and answer normalization.

use serde_json::Value;

use crate::schema::StructuredResponse;
use crate::types::{AgentToolCall, GenerationStep, ModelMessage, Role, Usage};

/// One transcript entry as an engine hands it back.
///
/// Engines may return typed messages or raw chat-completion style JSON
/// objects (`{"role": ..., "content": ...}`); both are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Message(ModelMessage),
    Raw(Value),
}

impl From<ModelMessage> for TranscriptEntry {
    fn from(message: ModelMessage) -> Self {
        Self::Message(message)
    }
}

impl From<Value> for TranscriptEntry {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl TranscriptEntry {
    /// Role of the entry. Raw entries without a recognizable role count as assistant.
    pub fn role(&self) -> Role {
        match self {
            Self::Message(message) => message.role,
            Self::Raw(value) => value
                .get("role")
                .and_then(Value::as_str)
                .and_then(|r| r.parse().ok())
                .unwrap_or(Role::Assistant),
        }
    }

    /// Text content of the entry, if it has any.
    pub fn content(&self) -> Option<String> {
        match self {
            Self::Message(message) => Some(message.text()),
            Self::Raw(value) => value.as_object()?.get("content").and_then(content_to_text),
        }
    }

    /// Convert into a typed message for storage.
    ///
    /// Raw entries keep their role; assistant tool calls and tool results in
    /// chat-completion shape are carried over even when `content` is null.
    pub fn into_message(self) -> ModelMessage {
        match self {
            Self::Message(message) => message,
            Self::Raw(value) => match serde_json::from_value::<ModelMessage>(value.clone()) {
                Ok(message) => message,
                Err(_) => raw_to_message(&value),
            },
        }
    }
}

fn raw_to_message(value: &Value) -> ModelMessage {
    let text = value
        .get("content")
        .and_then(content_to_text)
        .unwrap_or_default();
    let role = value
        .get("role")
        .and_then(Value::as_str)
        .and_then(|r| r.parse().ok())
        .unwrap_or(Role::Assistant);

    match role {
        Role::System => ModelMessage::system(text),
        Role::User => ModelMessage::user(text),
        Role::Tool => {
            let call_id = value
                .get("tool_call_id")
                .and_then(Value::as_str)
                .unwrap_or_default();
            ModelMessage::tool_result(call_id, Value::String(text), false)
        }
        Role::Assistant => ModelMessage::assistant_tool_calls(text, raw_tool_calls(value)),
    }
}

/// Tool calls of a raw assistant entry, `{id, function: {name, arguments}}` each.
fn raw_tool_calls(value: &Value) -> Vec<AgentToolCall> {
    let Some(calls) = value.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };
    calls
        .iter()
        .filter_map(|call| {
            let function = call.get("function").unwrap_or(call);
            let name = function.get("name")?.as_str()?.to_string();
            let arguments = match function.get("arguments") {
                Some(Value::String(raw)) => {
                    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
                }
                Some(other) => other.clone(),
                None => Value::Object(Default::default()),
            };
            Some(AgentToolCall {
                id: call
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                name,
                arguments,
            })
        })
        .collect()
}

fn content_to_text(content: &Value) -> Option<String> {
    match content {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        ),
        other => Some(other.to_string()),
    }
}

/// The single answer shape the rest of the service works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAnswer {
    Structured(String),
    RawTurn { role: Role, content: String },
}

impl AgentAnswer {
    pub fn text(&self) -> &str {
        match self {
            Self::Structured(text) => text,
            Self::RawTurn { content, .. } => content,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Structured(text) => text,
            Self::RawTurn { content, .. } => content,
        }
    }
}

/// What one reasoning run produced.
#[derive(Debug, Clone, Default)]
pub struct AgentOutcome {
    pub structured_response: Option<StructuredResponse>,
    pub messages: Vec<TranscriptEntry>,
    pub steps: Vec<GenerationStep>,
    pub usage: Usage,
}

impl AgentOutcome {
    pub fn new(
        structured_response: Option<StructuredResponse>,
        messages: Vec<TranscriptEntry>,
    ) -> Self {
        Self {
            structured_response,
            messages,
            ..Default::default()
        }
    }

    /// Normalize to a single answer.
    ///
    /// Precedence: the structured `msg`, then the content of the final
    /// transcript entry (typed message first, raw `content` key second),
    /// otherwise no answer.
    pub fn answer(&self) -> Option<AgentAnswer> {
        if let Some(structured) = &self.structured_response {
            return Some(AgentAnswer::Structured(structured.msg.clone()));
        }
        let last = self.messages.last()?;
        let content = last.content()?;
        Some(AgentAnswer::RawTurn {
            role: last.role(),
            content,
        })
    }

    /// Shorthand for `answer()` flattened to its text.
    pub fn answer_text(&self) -> Option<String> {
        self.answer().map(AgentAnswer::into_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentPart;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn structured_response_wins_over_transcript() {
        let outcome = AgentOutcome::new(
            Some(StructuredResponse::new("It is sunny.")),
            vec![ModelMessage::assistant("something else").into()],
        );
        assert_eq!(outcome.answer(), Some(AgentAnswer::Structured("It is sunny.".into())));
    }

    #[test]
    fn typed_message_content_is_used_without_structure() {
        let outcome = AgentOutcome::new(
            None,
            vec![
                ModelMessage::user("hi").into(),
                ModelMessage::assistant("hello there").into(),
            ],
        );
        assert_eq!(
            outcome.answer(),
            Some(AgentAnswer::RawTurn {
                role: Role::Assistant,
                content: "hello there".into()
            })
        );
    }

    #[test]
    fn mapping_content_is_used_without_structure() {
        let outcome = AgentOutcome::new(
            None,
            vec![json!({"role": "assistant", "content": "from a map"}).into()],
        );
        assert_eq!(outcome.answer_text().as_deref(), Some("from a map"));
    }

    #[test]
    fn mapping_without_content_is_absent() {
        let outcome = AgentOutcome::new(None, vec![json!({"role": "assistant"}).into()]);
        assert_eq!(outcome.answer(), None);

        let not_a_map = AgentOutcome::new(None, vec![json!("just text").into()]);
        assert_eq!(not_a_map.answer(), None);
    }

    #[test]
    fn empty_outcome_has_no_answer() {
        assert_eq!(AgentOutcome::default().answer(), None);
    }

    #[test]
    fn multipart_mapping_content_is_joined() {
        let entry: TranscriptEntry = json!({
            "role": "assistant",
            "content": [{"type": "text", "text": "Sunny "}, {"type": "text", "text": "today"}]
        })
        .into();
        assert_eq!(entry.content().as_deref(), Some("Sunny today"));
    }

    #[test]
    fn raw_entry_converts_to_message() {
        let entry: TranscriptEntry = json!({"role": "user", "content": "hi"}).into();
        let message = entry.into_message();
        assert_eq!(message.role, Role::User);
        assert_eq!(message.text(), "hi");

        let serialized = serde_json::to_value(ModelMessage::assistant("typed")).unwrap();
        let message = TranscriptEntry::Raw(serialized).into_message();
        assert_eq!(message.text(), "typed");
    }

    #[test]
    fn raw_tool_call_turn_without_content_is_kept() {
        let entry: TranscriptEntry = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "get_weather_for_location", "arguments": "{\"location\":\"Paris\"}"}
            }]
        })
        .into();

        let message = entry.into_message();

        assert_eq!(message.role, Role::Assistant);
        let calls = message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "get_weather_for_location");
        assert_eq!(calls[0].arguments, json!({"location": "Paris"}));
    }

    #[test]
    fn raw_tool_entry_stays_a_tool_result() {
        let entry: TranscriptEntry =
            json!({"role": "tool", "tool_call_id": "call_1", "content": "Sunny"}).into();

        let message = entry.into_message();

        assert_eq!(message.role, Role::Tool);
        match message.content.as_slice() {
            [ContentPart::ToolResult(result)] => {
                assert_eq!(result.tool_call_id, "call_1");
                assert_eq!(result.result, json!("Sunny"));
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }
}
