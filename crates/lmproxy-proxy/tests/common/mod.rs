//! Mock host shared by the proxy integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{StreamExt, stream};
use http_body_util::BodyExt;
use lmproxy_core::{
    HostError, LanguageModelChat, LanguageModelHost, ModelDescriptor, ModelRequest, PartStream,
    StreamPart,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// A chat model that replays fixed parts and records what it was sent.
#[derive(Debug)]
pub struct ScriptedChat {
    descriptor: ModelDescriptor,
    parts: Vec<StreamPart>,
    fail: Option<HostError>,
    pub last_request: Mutex<Option<ModelRequest>>,
}

impl ScriptedChat {
    pub fn new(id: &str, parts: Vec<StreamPart>) -> Arc<Self> {
        Arc::new(Self {
            descriptor: ModelDescriptor::from_id(id, "test", 4096),
            parts,
            fail: None,
            last_request: Mutex::new(None),
        })
    }

    pub fn failing(id: &str, error: HostError) -> Arc<Self> {
        Arc::new(Self {
            descriptor: ModelDescriptor::from_id(id, "test", 4096),
            parts: vec![],
            fail: Some(error),
            last_request: Mutex::new(None),
        })
    }

    pub fn recorded(&self) -> Option<ModelRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelChat for ScriptedChat {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    async fn send_request(
        &self,
        request: ModelRequest,
        _cancel: CancellationToken,
    ) -> Result<PartStream, HostError> {
        *self.last_request.lock().unwrap() = Some(request);
        if let Some(error) = &self.fail {
            return Err(error.clone());
        }
        Ok(stream::iter(self.parts.clone().into_iter().map(Ok)).boxed())
    }
}

/// A host offering a fixed list of models.
#[derive(Debug, Default)]
pub struct MockHost {
    pub models: Vec<Arc<ScriptedChat>>,
    pub unavailable: bool,
    pub listings: AtomicUsize,
}

impl MockHost {
    pub fn with_models(models: Vec<Arc<ScriptedChat>>) -> Arc<Self> {
        Arc::new(Self {
            models,
            ..Self::default()
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            unavailable: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl LanguageModelHost for MockHost {
    async fn select_chat_models(&self) -> Result<Vec<Arc<dyn LanguageModelChat>>, HostError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(HostError::Unavailable("host is offline".into()));
        }
        Ok(self
            .models
            .iter()
            .map(|m| Arc::clone(m) as Arc<dyn LanguageModelChat>)
            .collect())
    }
}

pub fn app(host: Arc<MockHost>) -> Router {
    lmproxy_proxy::router(host, CancellationToken::new(), None)
}

/// POST a JSON body to the completions route.
pub async fn post_completion(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

/// GET a path and return status and raw body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, bytes::Bytes) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}
