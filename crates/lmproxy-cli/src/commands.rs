//! Subcommand definitions.

use clap::Subcommand;

/// Top-level subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Send one chat line to the participant, e.g. "@llmproxy /start"
    Chat {
        /// The line as typed in a chat panel
        line: String,
    },
    /// Print the host's chat models as JSON
    Models,
}
