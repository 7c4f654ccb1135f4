//! Structural validation of chat-completion request bodies.
//!
//! The check runs on the raw JSON value before typed decoding so that
//! every problem in a body is reported at once, each with the path where
//! it occurred (`messages[2].role`, `tools[0]`, ...).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::Role;

/// One structural problem found in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location of the offending value, `body` for the document itself.
    pub path: String,
    /// What is wrong with it.
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validate a chat-completion request body.
///
/// Required: `model` (string) and a non-empty `messages` array whose items
/// carry a known `role` and a `content` that is a string or `null`.
/// Optional fields are type-checked only when present.
pub fn validate_request(body: &Value) -> Result<(), Vec<Violation>> {
    let Some(object) = body.as_object() else {
        return Err(vec![Violation::new("body", "is not of a type(s) object")]);
    };

    let mut violations = Vec::new();

    match object.get("model") {
        None => violations.push(Violation::new("model", "is required")),
        Some(model) if !model.is_string() => {
            violations.push(Violation::new("model", "is not of a type(s) string"));
        }
        Some(_) => {}
    }

    match object.get("messages") {
        None => violations.push(Violation::new("messages", "is required")),
        Some(Value::Array(messages)) => {
            if messages.is_empty() {
                violations.push(Violation::new(
                    "messages",
                    "does not meet minimum length of 1",
                ));
            }
            for (index, message) in messages.iter().enumerate() {
                validate_message(&format!("messages[{index}]"), message, &mut violations);
            }
        }
        Some(_) => violations.push(Violation::new("messages", "is not of a type(s) array")),
    }

    if let Some(temperature) = object.get("temperature") {
        if !temperature.is_number() {
            violations.push(Violation::new(
                "temperature",
                "is not of a type(s) number",
            ));
        }
    }

    if let Some(stream) = object.get("stream") {
        if !stream.is_boolean() {
            violations.push(Violation::new("stream", "is not of a type(s) boolean"));
        }
    }

    match object.get("tools") {
        None => {}
        Some(Value::Array(tools)) => {
            for (index, tool) in tools.iter().enumerate() {
                if !tool.is_object() {
                    violations.push(Violation::new(
                        format!("tools[{index}]"),
                        "is not of a type(s) object",
                    ));
                }
            }
        }
        Some(_) => violations.push(Violation::new("tools", "is not of a type(s) array")),
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn validate_message(path: &str, message: &Value, violations: &mut Vec<Violation>) {
    let Some(object) = message.as_object() else {
        violations.push(Violation::new(path, "is not of a type(s) object"));
        return;
    };

    match object.get("role") {
        None => violations.push(Violation::new(format!("{path}.role"), "is required")),
        Some(Value::String(role)) if Role::ALL.contains(&role.as_str()) => {}
        Some(Value::String(_)) => violations.push(Violation::new(
            format!("{path}.role"),
            format!("is not one of enum values: {}", Role::ALL.join(",")),
        )),
        Some(_) => violations.push(Violation::new(
            format!("{path}.role"),
            "is not of a type(s) string",
        )),
    }

    match object.get("content") {
        None => violations.push(Violation::new(format!("{path}.content"), "is required")),
        Some(Value::String(_) | Value::Null) => {}
        Some(_) => violations.push(Violation::new(
            format!("{path}.content"),
            "is not of a type(s) string,null",
        )),
    }

    check_optional_string(object, path, "name", violations);
    check_optional_string(object, path, "tool_call_id", violations);
}

fn check_optional_string(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    violations: &mut Vec<Violation>,
) {
    if let Some(value) = object.get(key) {
        if !value.is_string() {
            violations.push(Violation::new(
                format!("{path}.{key}"),
                "is not of a type(s) string",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(result: Result<(), Vec<Violation>>) -> Vec<String> {
        result
            .unwrap_err()
            .into_iter()
            .map(|violation| violation.path)
            .collect()
    }

    #[test]
    fn test_minimal_valid_request() {
        let body = json!({"model": "m1", "messages": [{"role": "user", "content": "hi"}]});
        assert!(validate_request(&body).is_ok());
    }

    #[test]
    fn test_full_valid_request() {
        let body = json!({
            "model": "",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "assistant", "content": null},
                {"role": "tool", "content": "42", "tool_call_id": "c1", "name": "f"}
            ],
            "tools": [{"type": "function", "function": {"name": "f"}}],
            "temperature": 0.2,
            "stream": false
        });
        assert!(validate_request(&body).is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(paths(validate_request(&json!({}))), vec!["model", "messages"]);
    }

    #[test]
    fn test_empty_messages_rejected() {
        let body = json!({"model": "m1", "messages": []});
        let violations = validate_request(&body).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "messages");
        assert!(violations[0].message.contains("minimum length"));
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(paths(validate_request(&json!([1, 2]))), vec!["body"]);
    }

    #[test]
    fn test_collects_every_message_violation() {
        let body = json!({
            "model": 7,
            "messages": [
                {"role": "developer", "content": "x"},
                {"content": 3},
                "plain"
            ]
        });

        assert_eq!(
            paths(validate_request(&body)),
            vec![
                "model",
                "messages[0].role",
                "messages[1].role",
                "messages[1].content",
                "messages[2]",
            ]
        );
    }

    #[test]
    fn test_role_enum_message() {
        let body = json!({"model": "m", "messages": [{"role": "bot", "content": ""}]});
        let violations = validate_request(&body).unwrap_err();
        assert_eq!(
            violations[0].message,
            "is not one of enum values: system,user,assistant,tool"
        );
    }

    #[test]
    fn test_optional_field_types() {
        let body = json!({
            "model": "m",
            "messages": [{"role": "user", "content": "x", "name": 1, "tool_call_id": false}],
            "temperature": "hot",
            "stream": "yes",
            "tools": [{}, 5]
        });

        assert_eq!(
            paths(validate_request(&body)),
            vec![
                "messages[0].name",
                "messages[0].tool_call_id",
                "temperature",
                "stream",
                "tools[1]",
            ]
        );
    }

    #[test]
    fn test_tools_must_be_array() {
        let body = json!({"model": "m", "messages": [{"role": "user", "content": "x"}], "tools": {}});
        assert_eq!(paths(validate_request(&body)), vec!["tools"]);
    }
}
