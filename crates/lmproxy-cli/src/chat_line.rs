//! Parsing of chat panel input: `[@participant] [/command] [prompt]`.

use lmproxy_chat::ChatRequest;

use crate::error::CliError;

/// Names the participant answers to. Both route to the same dispatcher.
pub const PARTICIPANTS: [&str; 2] = ["llmproxy", "chat"];

/// Turn a typed line into a chat request.
///
/// The `@llmproxy` (or `@chat`) mention is optional; any other participant
/// is rejected.
pub fn parse_chat_line(line: &str) -> Result<ChatRequest, CliError> {
    let mut rest = line.trim();

    if let Some(mention) = rest.strip_prefix('@') {
        let (participant, tail) = split_word(mention);
        if !PARTICIPANTS.contains(&participant) {
            return Err(CliError::Arguments(format!(
                "Unknown chat participant: @{participant}"
            )));
        }
        rest = tail;
    }

    let mut request = ChatRequest::default();
    if let Some(command) = rest.strip_prefix('/') {
        let (name, tail) = split_word(command);
        if !name.is_empty() {
            request.command = Some(name.to_string());
        }
        rest = tail;
    }
    request.prompt = rest.to_string();
    Ok(request)
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, tail)) => (word, tail.trim()),
        None => (text, ""),
    }
}
