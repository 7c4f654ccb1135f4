//! Built-in chat commands.

pub mod start;

pub use start::StartCommandHandler;
