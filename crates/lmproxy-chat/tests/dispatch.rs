//! Integration tests for chat command dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use lmproxy_chat::{
    ChatContext, ChatDispatcher, ChatRequest, CollectingStream, CommandRegistry,
    StartCommandHandler,
};
use lmproxy_core::{
    HostError, LanguageModelChat, LanguageModelHost, MemorySettings, ModelDescriptor,
    ModelRequest, PartStream, StreamPart,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

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
        _cancel: CancellationToken,
    ) -> Result<PartStream, HostError> {
        let reply = request.last_user_content().unwrap_or_default().to_string();
        Ok(stream::iter(vec![Ok(StreamPart::text(reply))]).boxed())
    }
}

#[derive(Debug)]
struct EchoHost;

#[async_trait]
impl LanguageModelHost for EchoHost {
    async fn select_chat_models(&self) -> Result<Vec<Arc<dyn LanguageModelChat>>, HostError> {
        Ok(vec![Arc::new(EchoChat {
            descriptor: ModelDescriptor::from_id("echo", "test", 1024),
        })])
    }
}

fn registry_on(port: u16) -> CommandRegistry {
    let settings = MemorySettings::new()
        .with("lmproxy.start", "hostname", "127.0.0.1")
        .with("lmproxy.start", "port", port.to_string());
    let mut registry = CommandRegistry::new();
    registry.register(StartCommandHandler::new(Arc::new(settings), Arc::new(EchoHost)));
    registry
}

fn free_port() -> u16 {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    probe.local_addr().unwrap().port()
}

async fn dispatch(registry: &CommandRegistry, request: ChatRequest) -> (String, String) {
    let stream = CollectingStream::new();
    let result = ChatDispatcher::new(registry)
        .handle(
            &request,
            &ChatContext::default(),
            &stream,
            &CancellationToken::new(),
        )
        .await;
    (stream.contents(), result.metadata.command)
}

async fn stop(registry: &CommandRegistry) {
    let Some(lmproxy_chat::ChatCommand::Start(start)) = registry.get("start") else {
        panic!("start command not registered");
    };
    start.supervisor().stop().await.unwrap();
}

#[tokio::test]
async fn unregistered_command_is_reported() {
    let registry = registry_on(free_port());

    let (shown, command) = dispatch(&registry, ChatRequest::command("deploy", "now")).await;

    assert_eq!(shown, "No handler registered for chat command: deploy");
    assert_eq!(command, "deploy");
}

#[tokio::test]
async fn missing_command_is_reported() {
    let registry = registry_on(free_port());

    let (shown, command) = dispatch(&registry, ChatRequest::default()).await;

    assert_eq!(shown, "No handler registered for chat command: ");
    assert_eq!(command, "");
}

#[tokio::test]
async fn start_reports_urls_once() {
    let port = free_port();
    let registry = registry_on(port);

    let (shown, command) = dispatch(&registry, ChatRequest::command("start", "")).await;
    assert_eq!(
        shown,
        format!(
            "REST API server started successfully: http://127.0.0.1:{port}/v1. \nAPI Docs: http://127.0.0.1:{port}/api-docs"
        )
    );
    assert_eq!(command, "start");

    let (shown, _) = dispatch(&registry, ChatRequest::command("start", "")).await;
    assert!(
        shown.starts_with("Error: Proxy is already running on 127.0.0.1:"),
        "got: {shown}"
    );

    stop(&registry).await;
}

#[tokio::test]
async fn bind_failure_is_shown_as_error() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();
    let registry = registry_on(port);

    let (shown, command) = dispatch(&registry, ChatRequest::command("start", "")).await;

    assert!(
        shown.starts_with(&format!("Error: Failed to bind to 127.0.0.1:{port}")),
        "got: {shown}"
    );
    assert_eq!(command, "start");
}

#[tokio::test]
async fn started_proxy_answers_completions() {
    let port = free_port();
    let registry = registry_on(port);
    dispatch(&registry, ChatRequest::command("start", "")).await;

    let body = r#"{"model":"echo","messages":[{"role":"user","content":"ping"}]}"#;
    let request = format!(
        "POST /v1/chat/completions HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut socket = tokio::net::TcpStream::connect(("127.0.0.1", port))
        .await
        .unwrap();
    socket.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    let json = &response[response.find("\r\n\r\n").unwrap() + 4..];
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["choices"][0]["message"]["content"], "ping");

    stop(&registry).await;
}
