//! Settings source port.
//!
//! Settings are grouped in sections (for example `lmproxy.start`) and
//! looked up by key. Values are exposed as strings; callers parse them.

use std::collections::HashMap;
use std::fmt;

/// Read-only source of namespaced settings.
pub trait SettingsSource: Send + Sync + fmt::Debug {
    /// Look up `key` inside `section`.
    ///
    /// Returns `None` when the section or the key is absent.
    fn get(&self, section: &str, key: &str) -> Option<String>;
}

/// In-memory settings, used by tests and as the empty default.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    sections: HashMap<String, HashMap<String, String>>,
}

impl MemorySettings {
    /// Create an empty settings source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, section: &str, key: &str, value: impl Into<String>) -> Self {
        self.set(section, key, value);
        self
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }
}

impl SettingsSource for MemorySettings {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .cloned()
    }
}
