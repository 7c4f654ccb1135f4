//! Host adapter backed by an OpenAI-compatible HTTP server.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use lmproxy_core::{
    HostError, HostMessage, HostTool, LanguageModelChat, LanguageModelHost, ModelDescriptor,
    ModelRequest, PartStream,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::sse::decode_parts;

/// Vendor reported for upstream models.
pub const UPSTREAM_VENDOR: &str = "openai-compatible";

/// Input window assumed for upstream models, which do not report one.
pub const DEFAULT_MAX_INPUT_TOKENS: u64 = 128_000;

/// Connection settings for the upstream server.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Sent as a bearer token when set.
    pub api_key: Option<String>,
    /// Fixed model ids. When empty the upstream is asked for its models.
    pub models: Vec<String>,
    pub max_input_tokens: u64,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            models: Vec::new(),
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_models(mut self, models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    fn descriptor(&self, id: &str) -> ModelDescriptor {
        ModelDescriptor::from_id(id, UPSTREAM_VENDOR, self.max_input_tokens)
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("models", &self.models)
            .field("max_input_tokens", &self.max_input_tokens)
            .finish()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
    model: &'a str,
    messages: Vec<UpstreamMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<UpstreamTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct UpstreamMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct UpstreamTool<'a> {
    r#type: &'static str,
    function: UpstreamFunction<'a>,
}

#[derive(Debug, Serialize)]
struct UpstreamFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

impl<'a> UpstreamRequest<'a> {
    fn new(model: &'a str, request: &'a ModelRequest) -> Self {
        Self {
            model,
            messages: request.messages.iter().map(UpstreamMessage::from).collect(),
            tools: request.tools.iter().map(UpstreamTool::from).collect(),
            temperature: request.options.temperature,
            stream: true,
        }
    }
}

impl<'a> From<&'a HostMessage> for UpstreamMessage<'a> {
    fn from(message: &'a HostMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

impl<'a> From<&'a HostTool> for UpstreamTool<'a> {
    fn from(tool: &'a HostTool) -> Self {
        Self {
            r#type: "function",
            function: UpstreamFunction {
                name: &tool.name,
                description: &tool.description,
                parameters: &tool.input_schema,
            },
        }
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Host whose models live on an OpenAI-compatible server.
#[derive(Debug, Clone)]
pub struct UpstreamHost {
    client: reqwest::Client,
    config: Arc<UpstreamConfig>,
}

impl UpstreamHost {
    pub fn new(config: UpstreamConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: UpstreamConfig) -> Self {
        info!(base_url = %config.base_url, "Using upstream model host");
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn chat(&self, id: &str) -> Arc<dyn LanguageModelChat> {
        Arc::new(UpstreamChat {
            descriptor: self.config.descriptor(id),
            client: self.client.clone(),
            config: Arc::clone(&self.config),
        })
    }

    async fn fetch_model_ids(&self) -> Result<Vec<String>, HostError> {
        let url = self.config.endpoint("models");
        debug!(url = %url, "Listing upstream models");

        let response = authorized(self.client.get(&url), &self.config)
            .send()
            .await
            .map_err(|e| HostError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::Unavailable(format!("{status}: {body}")));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| HostError::Unavailable(format!("invalid model list: {e}")))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl LanguageModelHost for UpstreamHost {
    async fn select_chat_models(&self) -> Result<Vec<Arc<dyn LanguageModelChat>>, HostError> {
        let ids = if self.config.models.is_empty() {
            self.fetch_model_ids().await?
        } else {
            self.config.models.clone()
        };
        Ok(ids.iter().map(|id| self.chat(id)).collect())
    }
}

/// One upstream model.
#[derive(Debug)]
struct UpstreamChat {
    descriptor: ModelDescriptor,
    client: reqwest::Client,
    config: Arc<UpstreamConfig>,
}

#[async_trait]
impl LanguageModelChat for UpstreamChat {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    async fn send_request(
        &self,
        request: ModelRequest,
        cancel: CancellationToken,
    ) -> Result<PartStream, HostError> {
        let url = self.config.endpoint("chat/completions");
        let body = UpstreamRequest::new(&self.descriptor.id, &request);
        debug!(
            url = %url,
            model = %self.descriptor.id,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Forwarding to upstream"
        );

        let send = authorized(self.client.post(&url), &self.config)
            .json(&body)
            .send();
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HostError::Cancelled),
            response = send => response.map_err(|e| HostError::Request(e.to_string()))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model = %self.descriptor.id, %status, "Upstream rejected request");
            return Err(HostError::Request(format!("{status}: {body}")));
        }

        Ok(decode_parts(response.bytes_stream(), cancel))
    }
}

fn authorized(builder: reqwest::RequestBuilder, config: &UpstreamConfig) -> reqwest::RequestBuilder {
    match &config.api_key {
        Some(key) => builder.bearer_auth(key),
        None => builder,
    }
}
