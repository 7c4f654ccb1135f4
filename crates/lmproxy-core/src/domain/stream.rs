//! Incremental parts of a host model response.

use serde::{Deserialize, Serialize};

/// One unit of a host model's streamed answer.
///
/// A response stream yields these in arrival order. Text fragments and
/// tool-call requests may interleave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StreamPart {
    /// A fragment of assistant text.
    Text { value: String },
    /// A request from the model to invoke a tool.
    #[serde(rename_all = "camelCase")]
    ToolCall {
        call_id: String,
        name: String,
        input: serde_json::Value,
    },
}

impl StreamPart {
    /// Create a text part.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Create a tool-call part.
    pub fn tool_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::ToolCall {
            call_id: call_id.into(),
            name: name.into(),
            input,
        }
    }
}
