//! OpenAI API data models for request/response handling.
//!
//! This module contains types that match the OpenAI chat-completions wire
//! format. Host-side types live in `lmproxy-core`; the translators in this
//! crate map between the two.

use lmproxy_core::ModelDescriptor;
use serde::{Deserialize, Serialize};

use crate::validation::Violation;

// =============================================================================
// Tool Calling Types
// =============================================================================

/// Tool definition for function calling (OpenAI-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool type - expected to be "function".
    #[serde(default = "function_type")]
    pub r#type: String,
    /// Function definition.
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name.
    pub name: String,
    /// Description of what the function does.
    #[serde(default)]
    pub description: String,
    /// Parameter schema; only `properties` is carried to the host.
    #[serde(default)]
    pub parameters: FunctionParameters,
}

/// Parameter schema of a function tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionParameters {
    /// JSON Schema `properties` object.
    #[serde(default = "empty_object")]
    pub properties: serde_json::Value,
}

impl Default for FunctionParameters {
    fn default() -> Self {
        Self {
            properties: empty_object(),
        }
    }
}

/// A tool call made by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call.
    pub id: String,
    /// Tool type - always "function".
    pub r#type: String,
    /// Function call details.
    pub function: ToolCallFunction,
}

/// Function call details within a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    /// Name of the function to call.
    pub name: String,
    /// JSON string of arguments.
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

// =============================================================================
// Chat Completion Request/Response Types
// =============================================================================

/// Role of a request message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// All accepted role spellings, in schema order.
    pub const ALL: [&'static str; 4] = ["system", "user", "assistant", "tool"];
}

/// Request to /v1/chat/completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model id to use; empty or absent selects the host's first model.
    #[serde(default)]
    pub model: Option<String>,
    /// Array of chat messages.
    pub messages: Vec<RequestMessage>,
    /// Tool definitions for function calling.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
}

/// A single chat message of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Who authored the message.
    pub role: Role,
    /// Message content; `null` messages are dropped before translation.
    pub content: Option<String>,
    /// Optional participant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool call ID this message is responding to (role="tool" only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Response from /v1/chat/completions endpoint (non-streaming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
}

/// Why the model stopped producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
}

/// A single chat completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    pub finish_reason: FinishReason,
    pub index: u32,
}

/// Assistant message inside a choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from /v1/chat/models endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Body returned when request validation fails.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidBodyResponse {
    pub error: String,
    pub details: Vec<Violation>,
}

impl InvalidBodyResponse {
    pub fn new(details: Vec<Violation>) -> Self {
        Self {
            error: "Invalid request body".to_string(),
            details,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: u16,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(message: impl Into<String>, error_type: impl Into<String>, code: u16) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code,
            },
        }
    }

    /// Create a 400 error response for a request the proxy cannot serve.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(message, "invalid_request", 400)
    }

    /// Create a 500 error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, "internal_server_error", 500)
    }
}
