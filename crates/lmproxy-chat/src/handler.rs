//! The chat command capability and the closed set of commands.
//!
//! A command runs through four stages: `preflight_check` gates it,
//! `preprocess` may rewrite the request, `process` does the work and
//! `postprocess` may rewrite the shown result.

use std::fmt;

use async_trait::async_trait;
use lmproxy_core::{CommandSettings, SettingsSource};
use lmproxy_proxy::SupervisorError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::commands::StartCommandHandler;
use crate::types::{ChatContext, ChatRequest, ChatResponseStream};

/// Outcome of a preflight check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Passed,
    Failed { message: String },
}

impl CheckResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Failure of a command stage. Shown to the user as `Error: <message>`.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("Command was cancelled")]
    Cancelled,
}

/// Everything a stage gets to see.
#[derive(Clone, Copy)]
pub struct ChatInvocation<'a> {
    pub request: &'a ChatRequest,
    pub context: &'a ChatContext,
    pub stream: &'a dyn ChatResponseStream,
    pub token: &'a CancellationToken,
}

impl<'a> ChatInvocation<'a> {
    /// The same invocation carrying a different request.
    pub fn with_request<'b>(&self, request: &'b ChatRequest) -> ChatInvocation<'b>
    where
        'a: 'b,
    {
        ChatInvocation {
            request,
            context: self.context,
            stream: self.stream,
            token: self.token,
        }
    }
}

impl fmt::Debug for ChatInvocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatInvocation")
            .field("request", self.request)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Capability implemented by every chat command.
#[async_trait]
pub trait ChatCommandHandler: Send + Sync + fmt::Debug {
    /// Command name as typed after the slash.
    fn name(&self) -> &'static str;

    /// Where this command reads its settings from.
    fn settings(&self) -> &dyn SettingsSource;

    /// Decide whether the command may run at all.
    fn preflight_check(&self) -> CheckResult;

    /// Produce the request `process` will see.
    async fn preprocess(&self, invocation: ChatInvocation<'_>) -> Result<ChatRequest, CommandError>;

    /// Do the work; the returned text is shown unless `postprocess` replaces it.
    async fn process(&self, invocation: ChatInvocation<'_>)
    -> Result<Option<String>, CommandError>;

    /// Rewrite the result. The invocation's prompt is the `process` output.
    async fn postprocess(
        &self,
        invocation: ChatInvocation<'_>,
    ) -> Result<Option<String>, CommandError>;

    /// Value of `key` in this command's settings section, empty if unset.
    fn setting(&self, key: &str) -> String {
        CommandSettings::new(self.settings(), self.name()).get(key)
    }

    /// Fail when any of `required` is unset or empty.
    fn missing_settings_check(&self, required: &[&str]) -> CheckResult {
        let missing = CommandSettings::new(self.settings(), self.name()).missing(required);
        if missing.is_empty() {
            CheckResult::Passed
        } else {
            CheckResult::failed(format!(
                "The following settings are missing: {}",
                missing.join("\n")
            ))
        }
    }
}

/// The commands this participant knows.
#[derive(Debug)]
pub enum ChatCommand {
    Start(StartCommandHandler),
}

impl ChatCommand {
    /// The capability behind this command.
    pub fn handler(&self) -> &dyn ChatCommandHandler {
        match self {
            Self::Start(handler) => handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.handler().name()
    }
}

impl From<StartCommandHandler> for ChatCommand {
    fn from(handler: StartCommandHandler) -> Self {
        Self::Start(handler)
    }
}
