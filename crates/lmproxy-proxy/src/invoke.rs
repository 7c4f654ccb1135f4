//! Model selection, invocation and stream collection.

use std::sync::Arc;

use futures_util::StreamExt;
use lmproxy_core::{HostError, LanguageModelChat, ModelRequest, PartStream, StreamPart};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ProxyError;

/// A tool call captured from the host stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedToolCall {
    pub call_id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// Everything a host stream produced, split by kind.
///
/// Text fragments are concatenated in arrival order; tool calls keep their
/// arrival order. The relative order between the two kinds is not kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedResponse {
    pub text: String,
    pub tool_calls: Vec<CollectedToolCall>,
}

impl CollectedResponse {
    /// Fold one stream part into the collection.
    pub fn push(&mut self, part: StreamPart) {
        match part {
            StreamPart::Text { value } => self.text.push_str(&value),
            StreamPart::ToolCall {
                call_id,
                name,
                input,
            } => self.tool_calls.push(CollectedToolCall {
                call_id,
                name,
                input,
            }),
        }
    }
}

/// Pick the model a request targets.
///
/// A requested id must match a model's descriptor id exactly. An absent or
/// empty id selects the first model.
pub fn select_model<'a>(
    models: &'a [Arc<dyn LanguageModelChat>],
    requested: Option<&str>,
) -> Result<&'a Arc<dyn LanguageModelChat>, ProxyError> {
    match requested.filter(|id| !id.is_empty()) {
        Some(id) => models
            .iter()
            .find(|model| model.descriptor().id == id)
            .ok_or_else(|| ProxyError::ModelNotFound(id.to_string())),
        None => models.first().ok_or(ProxyError::NoModelsAvailable),
    }
}

/// Consume a host stream to its end.
///
/// Stops at the first error the stream yields.
pub async fn collect_stream(mut stream: PartStream) -> Result<CollectedResponse, HostError> {
    let mut collected = CollectedResponse::default();
    while let Some(part) = stream.next().await {
        collected.push(part?);
    }
    Ok(collected)
}

/// Send `request` to `model` and collect the whole answer.
///
/// Cancelling `cancel` aborts both the request and the collection.
pub async fn invoke_model(
    model: &dyn LanguageModelChat,
    request: ModelRequest,
    cancel: CancellationToken,
) -> Result<CollectedResponse, ProxyError> {
    let descriptor = model.descriptor();
    debug!(
        model = %descriptor.id,
        messages = request.messages.len(),
        tools = request.tools.len(),
        "Invoking host model"
    );

    let invocation = async {
        let stream = model.send_request(request, cancel.clone()).await?;
        collect_stream(stream).await
    };

    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(HostError::Cancelled),
        result = invocation => result,
    };

    match result {
        Ok(collected) => {
            debug!(
                model = %descriptor.id,
                text_len = collected.text.len(),
                tool_calls = collected.tool_calls.len(),
                "Host model answered"
            );
            Ok(collected)
        }
        Err(e) => {
            warn!(model = %descriptor.id, "Host model invocation failed: {e}");
            Err(ProxyError::Invocation(e))
        }
    }
}
