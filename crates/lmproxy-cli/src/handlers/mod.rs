//! Command handlers.
//!
//! Handlers follow one pattern: `pub async fn execute(ctx: &CliContext, ...)`,
//! turning CLI input into calls on the composed context and formatting the
//! result for the terminal.

pub mod chat;
pub mod models;
