//! Request and response bodies.

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "User input received and processed successfully";

/// Body of `POST /api/input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// User input text. Must not be empty.
    pub input: String,
}

impl UserInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.input.is_empty() {
            return Err("input: String should have at least 1 character".to_string());
        }
        Ok(())
    }
}

/// Envelope returned for a processed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputResponse {
    pub success: bool,
    pub message: String,
    pub request_id: String,
    pub timestamp: String,
    pub received_input: UserInput,
    /// AI model response.
    pub ai_response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Current local time, ISO-8601 with microseconds and offset.
pub fn now_iso8601() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// First `max_chars` characters of `text`, for log lines.
pub(crate) fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
