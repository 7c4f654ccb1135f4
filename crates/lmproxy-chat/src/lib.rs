#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod commands;
pub mod dispatch;
pub mod handler;
pub mod registry;
pub mod types;

pub use commands::StartCommandHandler;
pub use dispatch::ChatDispatcher;
pub use handler::{ChatCommand, ChatCommandHandler, ChatInvocation, CheckResult, CommandError};
pub use registry::CommandRegistry;
pub use types::{
    ChatContext, ChatRequest, ChatResponseStream, ChatResult, ChatResultMetadata,
    CollectingStream,
};
