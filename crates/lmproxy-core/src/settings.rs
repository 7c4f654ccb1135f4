//! Settings constants and per-command lookup.
//!
//! Every chat command reads its settings from its own section,
//! `<SECTION_NAME>.<command>`. Missing keys read as empty strings so that
//! preflight checks can treat "unset" and "blank" the same way.

use crate::ports::SettingsSource;

/// Root section name for all lmproxy settings.
pub const SECTION_NAME: &str = "lmproxy";

/// Default hostname for the OpenAI-compatible proxy server.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Default port for the OpenAI-compatible proxy server.
pub const DEFAULT_PORT: u16 = 8080;

/// Keys understood by the `start` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Hostname,
    Port,
}

impl SettingKey {
    /// Convert key to its settings-file spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hostname => "hostname",
            Self::Port => "port",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings view scoped to one command's section.
#[derive(Debug, Clone, Copy)]
pub struct CommandSettings<'a> {
    source: &'a dyn SettingsSource,
    command: &'a str,
}

impl<'a> CommandSettings<'a> {
    /// Scope `source` to the section of `command`.
    pub fn new(source: &'a dyn SettingsSource, command: &'a str) -> Self {
        Self { source, command }
    }

    /// Full section name, e.g. `lmproxy.start`.
    #[must_use]
    pub fn section(&self) -> String {
        format!("{SECTION_NAME}.{}", self.command)
    }

    /// Value of `key`, or an empty string when unset.
    #[must_use]
    pub fn get(&self, key: &str) -> String {
        self.source.get(&self.section(), key).unwrap_or_default()
    }

    /// Keys from `required` whose value is unset or empty, in order.
    #[must_use]
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| self.get(key).is_empty())
            .map(|key| (*key).to_string())
            .collect()
    }
}

/// Get the effective proxy hostname (with default fallback).
///
/// Surrounding whitespace is ignored; a blank value falls back to
/// [`DEFAULT_HOSTNAME`].
#[must_use]
pub fn effective_hostname(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_HOSTNAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Get the effective proxy port (with default fallback).
///
/// Only the leading digits count, so `"9000abc"` and `"9000.5"` give 9000.
/// Values without leading digits, out-of-range values and zero fall back to
/// [`DEFAULT_PORT`].
#[must_use]
pub fn effective_port(raw: &str) -> u16 {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    match unsigned[..digits_end].parse::<u16>() {
        Ok(0) | Err(_) => DEFAULT_PORT,
        Ok(port) => port,
    }
}
