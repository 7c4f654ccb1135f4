//! `lmproxy chat "<line>"`: play the chat panel for one line.

use anyhow::Result;
use lmproxy_chat::{ChatContext, ChatDispatcher, ChatResponseStream};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::chat_line::parse_chat_line;

/// Prints markdown fragments to stdout as they arrive.
#[derive(Debug, Default)]
pub struct StdoutStream;

impl ChatResponseStream for StdoutStream {
    fn markdown(&self, text: &str) {
        println!("{text}");
    }
}

/// Dispatch `line`, then keep a started proxy alive until Ctrl-C.
pub async fn execute(ctx: &CliContext, line: &str) -> Result<()> {
    let request = parse_chat_line(line)?;
    let token = CancellationToken::new();

    let result = ChatDispatcher::new(&ctx.registry)
        .handle(&request, &ChatContext::default(), &StdoutStream, &token)
        .await;
    info!(command = %result.metadata.command, "Chat request handled");

    let Some(start) = ctx.start_command() else {
        return Ok(());
    };
    if start.supervisor().bound_address().await.is_none() {
        return Ok(());
    }

    info!("Proxy is running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    start.supervisor().stop().await?;
    Ok(())
}
