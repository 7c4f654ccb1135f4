//! Encoding of collected host answers as OpenAI completions.

use chrono::{DateTime, Utc};

use crate::invoke::CollectedResponse;
use crate::models::{
    ChatChoice, ChatCompletionResponse, FinishReason, ResponseMessage, ToolCall, ToolCallFunction,
};

/// Completion id for a response produced at `now`.
pub fn completion_id(now: DateTime<Utc>) -> String {
    format!("chatcmpl-{}", now.timestamp_millis())
}

/// Build the single-choice completion object.
///
/// Any collected tool call turns the response into a `tool_calls` finish
/// with empty content; otherwise the concatenated text is returned with a
/// `stop` finish. `model` is echoed as the caller sent it.
pub fn encode_response(
    model: &str,
    collected: CollectedResponse,
    now: DateTime<Utc>,
) -> ChatCompletionResponse {
    let (message, finish_reason) = if collected.tool_calls.is_empty() {
        (
            ResponseMessage {
                role: "assistant".to_string(),
                content: Some(collected.text),
                tool_calls: None,
            },
            FinishReason::Stop,
        )
    } else {
        let tool_calls = collected
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call.call_id,
                r#type: "function".to_string(),
                function: ToolCallFunction {
                    name: call.name,
                    arguments: call.input.to_string(),
                },
            })
            .collect();
        (
            ResponseMessage {
                role: "assistant".to_string(),
                content: Some(String::new()),
                tool_calls: Some(tool_calls),
            },
            FinishReason::ToolCalls,
        )
    };

    ChatCompletionResponse {
        id: completion_id(now),
        object: "chat.completion".to_string(),
        created: now.timestamp(),
        model: model.to_string(),
        choices: vec![ChatChoice {
            message,
            finish_reason,
            index: 0,
        }],
    }
}
