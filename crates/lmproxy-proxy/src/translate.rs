//! Translation from OpenAI request shapes to host shapes.
//!
//! Both translators are pure and order-preserving.

use lmproxy_core::{HostMessage, HostTool};
use serde_json::json;

use crate::models::{RequestMessage, Role, ToolDefinition};

/// Prefix the host sees in front of a tool result.
pub const TOOL_RESULT_PREFIX: &str = "Here's the result of the tool call: ";

/// Map request messages to host messages.
///
/// The host only knows user and assistant authors:
/// - `user` stays a user message;
/// - `assistant` and `system` both become assistant messages;
/// - `tool` becomes a user message announcing the tool result.
///
/// Messages with `null` content are dropped.
pub fn translate_messages(messages: &[RequestMessage]) -> Vec<HostMessage> {
    messages
        .iter()
        .filter_map(|message| {
            let content = message.content.as_deref()?;
            let translated = match message.role {
                Role::User => HostMessage::user(content),
                Role::Assistant | Role::System => HostMessage::assistant(content),
                Role::Tool => HostMessage::user(format!("{TOOL_RESULT_PREFIX}{content}")),
            };
            Some(translated)
        })
        .collect()
}

/// Map OpenAI function tools to host tools.
///
/// The input schema is always an object schema carrying the function's
/// `parameters.properties`.
pub fn translate_tools(tools: &[ToolDefinition]) -> Vec<HostTool> {
    tools
        .iter()
        .map(|tool| HostTool {
            name: tool.function.name.clone(),
            description: tool.function.description.clone(),
            input_schema: json!({
                "type": "object",
                "properties": tool.function.parameters.properties,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmproxy_core::HostRole;
    use serde_json::json;

    fn message(role: Role, content: Option<&str>) -> RequestMessage {
        RequestMessage {
            role,
            content: content.map(str::to_string),
            name: None,
            tool_call_id: None,
        }
    }

    #[test]
    fn test_role_mapping() {
        let translated = translate_messages(&[
            message(Role::System, Some("rules")),
            message(Role::User, Some("hi")),
            message(Role::Assistant, Some("hello")),
        ]);

        assert_eq!(
            translated,
            vec![
                HostMessage::assistant("rules"),
                HostMessage::user("hi"),
                HostMessage::assistant("hello"),
            ]
        );
    }

    #[test]
    fn test_tool_result_rewritten_as_user() {
        let mut tool = message(Role::Tool, Some("{\"temp\":21}"));
        tool.tool_call_id = Some("c1".to_string());

        let translated = translate_messages(&[tool]);

        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].role, HostRole::User);
        assert_eq!(
            translated[0].content,
            "Here's the result of the tool call: {\"temp\":21}"
        );
    }

    #[test]
    fn test_null_content_dropped() {
        let input = vec![
            message(Role::User, Some("a")),
            message(Role::Assistant, None),
            message(Role::User, Some("b")),
        ];

        let translated = translate_messages(&input);

        assert_eq!(translated.len(), input.len() - 1);
        assert_eq!(translated[0].content, "a");
        assert_eq!(translated[1].content, "b");
    }

    #[test]
    fn test_empty_content_kept() {
        let translated = translate_messages(&[message(Role::User, Some(""))]);
        assert_eq!(translated, vec![HostMessage::user("")]);
    }

    #[test]
    fn test_tool_translation() {
        let tools: Vec<ToolDefinition> = serde_json::from_value(json!([
            {
                "type": "function",
                "function": {
                    "name": "get_weather",
                    "description": "Weather for a city",
                    "parameters": {
                        "type": "object",
                        "properties": {"city": {"type": "string"}},
                        "required": ["city"]
                    }
                }
            },
            {"type": "function", "function": {"name": "now"}}
        ]))
        .unwrap();

        let translated = translate_tools(&tools);

        assert_eq!(translated.len(), 2);
        assert_eq!(translated[0].name, "get_weather");
        assert_eq!(translated[0].description, "Weather for a city");
        assert_eq!(
            translated[0].input_schema,
            json!({"type": "object", "properties": {"city": {"type": "string"}}})
        );
        assert_eq!(translated[1].name, "now");
        assert_eq!(
            translated[1].input_schema,
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_no_tools() {
        assert!(translate_tools(&[]).is_empty());
    }
}
