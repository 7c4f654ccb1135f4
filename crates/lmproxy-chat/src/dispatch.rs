//! Runs a chat request through the command lifecycle.
//!
//! Every outcome is written to the response stream as markdown and the
//! returned [`ChatResult`] always names the requested command.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::handler::{ChatCommandHandler, ChatInvocation, CheckResult, CommandError};
use crate::registry::CommandRegistry;
use crate::types::{ChatContext, ChatRequest, ChatResponseStream, ChatResult};

/// Entry point for chat requests addressed to the participant.
#[derive(Debug, Clone, Copy)]
pub struct ChatDispatcher<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> ChatDispatcher<'r> {
    pub const fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Handle one chat request.
    pub async fn handle(
        &self,
        request: &ChatRequest,
        context: &ChatContext,
        stream: &dyn ChatResponseStream,
        token: &CancellationToken,
    ) -> ChatResult {
        let name = request.command_name();
        let result = ChatResult::for_command(name);

        let Some(command) = self.registry.get(name) else {
            debug!(command = name, "No handler for chat command");
            stream.markdown(&format!("No handler registered for chat command: {name}"));
            return result;
        };
        dispatch_to(command.handler(), request, context, stream, token).await
    }
}

/// Run `request` through `handler`'s stages and render the outcome.
pub(crate) async fn dispatch_to(
    handler: &dyn ChatCommandHandler,
    request: &ChatRequest,
    context: &ChatContext,
    stream: &dyn ChatResponseStream,
    token: &CancellationToken,
) -> ChatResult {
    let name = request.command_name();
    let result = ChatResult::for_command(name);

    if let CheckResult::Failed { message } = handler.preflight_check() {
        warn!(command = name, "Preflight check failed: {message}");
        stream.markdown(&format!("Error: {message}"));
        return result;
    }

    let invocation = ChatInvocation {
        request,
        context,
        stream,
        token,
    };

    match run_stages(handler, invocation).await {
        Ok((processed, postprocessed)) => {
            let shown = postprocessed
                .filter(|text| !text.is_empty())
                .or_else(|| processed.filter(|text| !text.is_empty()));
            match shown {
                Some(text) => stream.markdown(&text),
                None => stream.markdown(&format!("Error: No result found for command: {name}")),
            }
        }
        Err(e) => {
            warn!(command = name, "Chat command failed: {e}");
            stream.markdown(&format!("Error: {e}"));
        }
    }

    result
}

/// preprocess, process, postprocess; in order.
async fn run_stages(
    handler: &dyn ChatCommandHandler,
    invocation: ChatInvocation<'_>,
) -> Result<(Option<String>, Option<String>), CommandError> {
    let preprocessed = handler.preprocess(invocation).await?;
    let processed = handler
        .process(invocation.with_request(&preprocessed))
        .await?;

    let original = invocation.request;
    let with_result = ChatRequest {
        prompt: processed.clone().unwrap_or_default(),
        command: original.command.clone(),
        references: original.references.clone(),
        model: original.model.clone(),
    };
    let postprocessed = handler
        .postprocess(invocation.with_request(&with_result))
        .await?;

    Ok((processed, postprocessed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lmproxy_core::{MemorySettings, SettingsSource};
    use std::sync::Mutex;

    use crate::types::CollectingStream;

    /// Handler whose stage outputs are fixed up front.
    #[derive(Debug, Default)]
    struct Scripted {
        settings: MemorySettings,
        required: Vec<&'static str>,
        processed: Option<String>,
        postprocessed: Option<String>,
        fail_process: bool,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn prompts(&self) -> Vec<String> {
            self.seen_prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatCommandHandler for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn settings(&self) -> &dyn SettingsSource {
            &self.settings
        }

        fn preflight_check(&self) -> CheckResult {
            self.missing_settings_check(&self.required)
        }

        async fn preprocess(
            &self,
            invocation: ChatInvocation<'_>,
        ) -> Result<ChatRequest, CommandError> {
            Ok(ChatRequest {
                prompt: format!("pre:{}", invocation.request.prompt),
                ..invocation.request.clone()
            })
        }

        async fn process(
            &self,
            invocation: ChatInvocation<'_>,
        ) -> Result<Option<String>, CommandError> {
            self.seen_prompts
                .lock()
                .unwrap()
                .push(invocation.request.prompt.clone());
            if self.fail_process {
                return Err(CommandError::Cancelled);
            }
            Ok(self.processed.clone())
        }

        async fn postprocess(
            &self,
            invocation: ChatInvocation<'_>,
        ) -> Result<Option<String>, CommandError> {
            self.seen_prompts
                .lock()
                .unwrap()
                .push(invocation.request.prompt.clone());
            Ok(self.postprocessed.clone())
        }
    }

    async fn run(handler: &Scripted) -> (ChatResult, String) {
        let stream = CollectingStream::new();
        let result = dispatch_to(
            handler,
            &ChatRequest::command("scripted", "hello"),
            &ChatContext::default(),
            &stream,
            &CancellationToken::new(),
        )
        .await;
        (result, stream.contents())
    }

    #[tokio::test]
    async fn test_failed_preflight_reports_error_and_skips_stages() {
        let handler = Scripted {
            required: vec!["url"],
            processed: Some("never".into()),
            ..Scripted::default()
        };

        let (result, shown) = run(&handler).await;

        assert_eq!(shown, "Error: The following settings are missing: url");
        assert_eq!(result, ChatResult::for_command("scripted"));
        assert!(handler.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_postprocess_result_wins_over_process_result() {
        let handler = Scripted {
            processed: Some("from process".into()),
            postprocessed: Some("from postprocess".into()),
            ..Scripted::default()
        };

        let (result, shown) = run(&handler).await;

        assert_eq!(shown, "from postprocess");
        assert_eq!(result.metadata.command, "scripted");
        // process sees the preprocessed request, postprocess sees the process result.
        assert_eq!(handler.prompts(), vec!["pre:hello", "from process"]);
    }

    #[tokio::test]
    async fn test_process_result_shown_when_postprocess_is_empty() {
        let handler = Scripted {
            processed: Some("from process".into()),
            postprocessed: Some(String::new()),
            ..Scripted::default()
        };

        let (_, shown) = run(&handler).await;
        assert_eq!(shown, "from process");
    }

    #[tokio::test]
    async fn test_no_result_from_either_stage() {
        let handler = Scripted::default();

        let (result, shown) = run(&handler).await;

        assert_eq!(shown, "Error: No result found for command: scripted");
        assert_eq!(result.metadata.command, "scripted");
        assert_eq!(handler.prompts(), vec!["pre:hello", ""]);
    }

    #[tokio::test]
    async fn test_empty_results_count_as_none() {
        let handler = Scripted {
            processed: Some(String::new()),
            postprocessed: Some(String::new()),
            ..Scripted::default()
        };

        let (_, shown) = run(&handler).await;
        assert_eq!(shown, "Error: No result found for command: scripted");
    }

    #[tokio::test]
    async fn test_stage_error_is_rendered() {
        let handler = Scripted {
            fail_process: true,
            ..Scripted::default()
        };

        let (result, shown) = run(&handler).await;

        assert_eq!(shown, "Error: Command was cancelled");
        assert_eq!(result.metadata.command, "scripted");
    }
}
