//! Typed access to tool call arguments.

use crate::error::MikiError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, MikiError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| MikiError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    ///
    /// Arguments that arrived as a JSON-encoded string (some providers send
    /// them unparsed) are decoded first.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, MikiError> {
        let value = match &self.value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                        MikiError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
                    })?
                }
            }
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| {
            MikiError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
