//! Command name lookup.

use std::collections::BTreeMap;

use tracing::debug;

use crate::handler::ChatCommand;

/// Maps command names to commands.
///
/// Built once by the composition root and lent to the dispatcher.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, ChatCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command` under its own name, replacing any earlier one.
    pub fn register(&mut self, command: impl Into<ChatCommand>) -> &mut Self {
        let command = command.into();
        let name = command.name();
        debug!(command = name, "Registering chat command");
        self.commands.insert(name, command);
        self
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&ChatCommand> {
        self.commands.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
