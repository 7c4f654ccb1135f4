//! Host-native message, tool and request types.
//!
//! The host only distinguishes two authors: the user and the assistant.
//! Richer roles from the OpenAI wire format are folded into these two by
//! the proxy's message translator.

use serde::{Deserialize, Serialize};

/// Author of a host message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostRole {
    User,
    Assistant,
}

impl HostRole {
    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for HostRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in the host's chat representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessage {
    pub role: HostRole,
    pub content: String,
}

impl HostMessage {
    /// Create a user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: HostRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant-authored message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: HostRole::Assistant,
            content: content.into(),
        }
    }
}

/// A tool the host model may ask the caller to invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTool {
    /// Tool name, unique within one request.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON schema of the tool input (always an object schema).
    pub input_schema: serde_json::Value,
}

/// Model options forwarded with a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Sampling temperature, when the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Whether the caller asked for a streamed answer.
    #[serde(default)]
    pub stream: bool,
}

/// Everything the host needs to answer one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRequest {
    pub messages: Vec<HostMessage>,
    pub tools: Vec<HostTool>,
    pub options: RequestOptions,
}

impl ModelRequest {
    /// Returns the content of the last user-authored message, if any.
    #[must_use]
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == HostRole::User)
            .map(|m| m.content.as_str())
    }
}
