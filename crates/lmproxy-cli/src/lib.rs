#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod chat_line;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod settings_file;

pub use bootstrap::{CliConfig, CliContext, HostChoice, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
