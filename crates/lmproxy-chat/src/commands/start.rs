//! `/start`: bring up the OpenAI-compatible proxy.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use lmproxy_core::{
    LanguageModelHost, SettingKey, SettingsSource, effective_hostname, effective_port,
};
use lmproxy_proxy::{ProxyConfig, ProxySupervisor};
use tracing::{debug, info};

use crate::handler::{ChatCommandHandler, ChatInvocation, CheckResult, CommandError};
use crate::types::ChatRequest;

/// Settings that must be present before `/start` runs.
const REQUIRED_SETTINGS: &[SettingKey] = &[];

/// Starts the proxy server and reports where it listens.
///
/// The handler owns the [`ProxySupervisor`], so there is at most one proxy
/// per handler and a second `/start` while listening is refused.
pub struct StartCommandHandler {
    supervisor: ProxySupervisor,
    settings: Arc<dyn SettingsSource>,
    host: Arc<dyn LanguageModelHost>,
    docs_assets_dir: Option<PathBuf>,
}

impl StartCommandHandler {
    pub const NAME: &'static str = "start";

    pub fn new(settings: Arc<dyn SettingsSource>, host: Arc<dyn LanguageModelHost>) -> Self {
        Self {
            supervisor: ProxySupervisor::new(),
            settings,
            host,
            docs_assets_dir: None,
        }
    }

    /// Serve Swagger UI assets from `dir` instead of a CDN.
    #[must_use]
    pub fn with_docs_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.docs_assets_dir = Some(dir.into());
        self
    }

    /// The supervisor owning the proxy started by this command.
    pub const fn supervisor(&self) -> &ProxySupervisor {
        &self.supervisor
    }

    /// Proxy configuration resolved from the `lmproxy.start` section.
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            hostname: effective_hostname(&self.setting(SettingKey::Hostname.as_str())),
            port: effective_port(&self.setting(SettingKey::Port.as_str())),
            docs_assets_dir: self.docs_assets_dir.clone(),
        }
    }
}

impl fmt::Debug for StartCommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartCommandHandler")
            .field("settings", &self.settings)
            .field("docs_assets_dir", &self.docs_assets_dir)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatCommandHandler for StartCommandHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &dyn SettingsSource {
        self.settings.as_ref()
    }

    fn preflight_check(&self) -> CheckResult {
        let required: Vec<&str> = REQUIRED_SETTINGS.iter().map(SettingKey::as_str).collect();
        self.missing_settings_check(&required)
    }

    async fn preprocess(&self, invocation: ChatInvocation<'_>) -> Result<ChatRequest, CommandError> {
        let request = invocation.request;
        Ok(ChatRequest {
            prompt: request.prompt.clone(),
            command: request.command.clone(),
            references: request.references.clone(),
            model: request.model.clone(),
        })
    }

    async fn process(
        &self,
        invocation: ChatInvocation<'_>,
    ) -> Result<Option<String>, CommandError> {
        if invocation.token.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        let config = self.proxy_config();
        debug!(hostname = %config.hostname, port = config.port, "Starting proxy from chat");

        let started = self.supervisor.start(config, Arc::clone(&self.host)).await?;
        info!("Server running at {}/", started.base_url);
        info!("API documentation available at {}", started.docs_url());

        Ok(Some(format!(
            "REST API server started successfully: {}. \nAPI Docs: {}",
            started.api_url(),
            started.docs_url()
        )))
    }

    async fn postprocess(
        &self,
        invocation: ChatInvocation<'_>,
    ) -> Result<Option<String>, CommandError> {
        Ok(Some(invocation.request.prompt.clone()))
    }
}
