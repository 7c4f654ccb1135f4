//! Host language model port.
//!
//! This port is the boundary to the externally supplied model capability.
//! A host lists the chat models it offers; each model answers a request
//! with a lazy, finite stream of [`StreamPart`]s that can be consumed once.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{ModelDescriptor, ModelRequest, StreamPart};

/// Stream of response parts produced by a host model.
pub type PartStream = BoxStream<'static, Result<StreamPart, HostError>>;

/// Errors that can occur while talking to the host model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host could not be reached or refused to list models.
    #[error("Host unavailable: {0}")]
    Unavailable(String),

    /// The host rejected or failed the request.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response stream broke off or carried malformed data.
    #[error("Response stream failed: {0}")]
    Stream(String),

    /// The request was cancelled before the response completed.
    #[error("Request was cancelled")]
    Cancelled,
}

/// Port for enumerating host-provided chat models.
///
/// Implementations must return models in a stable order: the first
/// entry is the default model for requests that do not name one.
#[async_trait]
pub trait LanguageModelHost: Send + Sync + fmt::Debug {
    /// List the chat models currently available.
    ///
    /// Called once per proxy request; implementations should not cache
    /// across calls unless the host itself is static.
    async fn select_chat_models(&self) -> Result<Vec<Arc<dyn LanguageModelChat>>, HostError>;
}

/// Port for a single host chat model.
#[async_trait]
pub trait LanguageModelChat: Send + Sync + fmt::Debug {
    /// Metadata describing this model.
    fn descriptor(&self) -> &ModelDescriptor;

    /// Send a request and obtain the streamed response.
    ///
    /// The returned stream must stop early with [`HostError::Cancelled`]
    /// once `cancel` fires.
    async fn send_request(
        &self,
        request: ModelRequest,
        cancel: CancellationToken,
    ) -> Result<PartStream, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[derive(Debug)]
    struct FixedChat {
        descriptor: ModelDescriptor,
    }

    #[async_trait]
    impl LanguageModelChat for FixedChat {
        fn descriptor(&self) -> &ModelDescriptor {
            &self.descriptor
        }

        async fn send_request(
            &self,
            request: ModelRequest,
            _cancel: CancellationToken,
        ) -> Result<PartStream, HostError> {
            let echo = request.last_user_content().unwrap_or_default().to_string();
            Ok(futures_util::stream::iter(vec![Ok(StreamPart::text(echo))]).boxed())
        }
    }

    #[derive(Debug)]
    struct FixedHost;

    #[async_trait]
    impl LanguageModelHost for FixedHost {
        async fn select_chat_models(
            &self,
        ) -> Result<Vec<Arc<dyn LanguageModelChat>>, HostError> {
            Ok(vec![Arc::new(FixedChat {
                descriptor: ModelDescriptor::from_id("m1", "test", 1024),
            })])
        }
    }

    #[tokio::test]
    async fn test_host_is_object_safe() {
        let host: Arc<dyn LanguageModelHost> = Arc::new(FixedHost);
        let models = host.select_chat_models().await.unwrap();
        assert_eq!(models[0].descriptor().id, "m1");

        let request = ModelRequest {
            messages: vec![crate::HostMessage::user("ping")],
            ..ModelRequest::default()
        };
        let parts: Vec<_> = models[0]
            .send_request(request, CancellationToken::new())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].as_ref().unwrap(), &StreamPart::text("ping"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(HostError::Cancelled.to_string(), "Request was cancelled");
        assert_eq!(
            HostError::Request("boom".into()).to_string(),
            "Request failed: boom"
        );
    }
}
