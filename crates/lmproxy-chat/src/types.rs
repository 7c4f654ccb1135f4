//! Chat participant request, context, result and output stream.

use std::sync::Mutex;

use lmproxy_core::HostMessage;
use serde::{Deserialize, Serialize};

/// A single chat request addressed to the participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    /// Text after the command, e.g. `hello` in `/start hello`.
    pub prompt: String,
    /// Command name without the slash, if one was given.
    pub command: Option<String>,
    /// Attached references (file paths, URLs).
    pub references: Vec<String>,
    /// Model selected in the chat UI, if any.
    pub model: Option<String>,
}

impl ChatRequest {
    /// Request for `command` with `prompt`.
    pub fn command(command: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// Command name, with an absent command read as empty.
    pub fn command_name(&self) -> &str {
        self.command.as_deref().unwrap_or_default()
    }
}

/// Conversation state handed to a command. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatContext {
    pub history: Vec<HostMessage>,
}

/// Metadata attached to every chat result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResultMetadata {
    /// The command that was requested, or empty.
    pub command: String,
}

/// Outcome of handling one chat request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub metadata: ChatResultMetadata,
}

impl ChatResult {
    pub fn for_command(command: impl Into<String>) -> Self {
        Self {
            metadata: ChatResultMetadata {
                command: command.into(),
            },
        }
    }
}

/// Sink for user-visible chat output.
pub trait ChatResponseStream: Send + Sync {
    /// Append a markdown fragment to the response.
    fn markdown(&self, text: &str);
}

/// A response stream that keeps everything written to it.
#[derive(Debug, Default)]
pub struct CollectingStream {
    fragments: Mutex<Vec<String>>,
}

impl CollectingStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fragments written so far, in order.
    pub fn fragments(&self) -> Vec<String> {
        self.fragments
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Everything written so far as one string.
    pub fn contents(&self) -> String {
        self.fragments().concat()
    }
}

impl ChatResponseStream for CollectingStream {
    fn markdown(&self, text: &str) {
        if let Ok(mut fragments) = self.fragments.lock() {
            fragments.push(text.to_string());
        }
    }
}
