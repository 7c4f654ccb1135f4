//! A host that repeats the last user message.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use lmproxy_core::{
    HostError, LanguageModelChat, LanguageModelHost, ModelDescriptor, ModelRequest, PartStream,
    StreamPart,
};
use tokio_util::sync::CancellationToken;

/// Id of the only echo model.
pub const ECHO_MODEL_ID: &str = "echo";

/// Host offering the single [`ECHO_MODEL_ID`] model.
#[derive(Debug, Clone)]
pub struct EchoHost {
    chat: Arc<EchoChat>,
}

impl Default for EchoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoHost {
    pub fn new() -> Self {
        Self {
            chat: Arc::new(EchoChat {
                descriptor: ModelDescriptor::from_id(ECHO_MODEL_ID, "lmproxy", 4096),
            }),
        }
    }
}

#[async_trait]
impl LanguageModelHost for EchoHost {
    async fn select_chat_models(&self) -> Result<Vec<Arc<dyn LanguageModelChat>>, HostError> {
        Ok(vec![Arc::clone(&self.chat) as Arc<dyn LanguageModelChat>])
    }
}

#[derive(Debug)]
struct EchoChat {
    descriptor: ModelDescriptor,
}

#[async_trait]
impl LanguageModelChat for EchoChat {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    async fn send_request(
        &self,
        request: ModelRequest,
        cancel: CancellationToken,
    ) -> Result<PartStream, HostError> {
        if cancel.is_cancelled() {
            return Err(HostError::Cancelled);
        }

        // One part per word so callers see a multi-part stream.
        let text = request.last_user_content().unwrap_or_default();
        let parts: Vec<Result<StreamPart, HostError>> = text
            .split_inclusive(' ')
            .map(|word| Ok(StreamPart::text(word)))
            .collect();
        Ok(stream::iter(parts).boxed())
    }
}
