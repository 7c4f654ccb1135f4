//! JSON settings file.
//!
//! ```json
//! { "lmproxy.start": { "hostname": "127.0.0.1", "port": 9000 } }
//! ```
//!
//! Scalars are exposed as strings; `null` reads as unset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lmproxy_core::SettingsSource;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Settings {0} must be a JSON object")]
    NotAnObject(String),
}

/// Settings read from a JSON file of sections.
#[derive(Debug, Clone, Default)]
pub struct FileSettings {
    sections: HashMap<String, serde_json::Map<String, Value>>,
}

impl FileSettings {
    /// Load and parse `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&text)?;
        debug!(path = %path.display(), sections = settings.sections.len(), "Loaded settings");
        Ok(settings)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let Value::Object(root) = serde_json::from_str(text)? else {
            return Err(SettingsError::NotAnObject("top level".to_string()));
        };

        let mut sections = HashMap::new();
        for (name, value) in root {
            let Value::Object(values) = value else {
                return Err(SettingsError::NotAnObject(format!("section {name}")));
            };
            sections.insert(name, values);
        }
        Ok(Self { sections })
    }
}

impl SettingsSource for FileSettings {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        match self.sections.get(section)?.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scalars_read_as_strings() {
        let settings = FileSettings::from_json_str(
            r#"{"lmproxy.start": {"hostname": "0.0.0.0", "port": 9000, "debug": true, "x": null}}"#,
        )
        .unwrap();

        assert_eq!(settings.get("lmproxy.start", "hostname").as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.get("lmproxy.start", "port").as_deref(), Some("9000"));
        assert_eq!(settings.get("lmproxy.start", "debug").as_deref(), Some("true"));
        assert_eq!(settings.get("lmproxy.start", "x"), None);
        assert_eq!(settings.get("lmproxy.start", "absent"), None);
        assert_eq!(settings.get("lmproxy.other", "port"), None);
    }

    #[test]
    fn test_rejects_non_object_sections() {
        assert!(matches!(
            FileSettings::from_json_str("[1, 2]"),
            Err(SettingsError::NotAnObject(_))
        ));
        assert!(matches!(
            FileSettings::from_json_str(r#"{"lmproxy.start": 3}"#),
            Err(SettingsError::NotAnObject(ref what)) if what == "section lmproxy.start"
        ));
        assert!(matches!(
            FileSettings::from_json_str("{"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"lmproxy.start": {{"port": "9100"}}}}"#).unwrap();

        let settings = FileSettings::load(file.path()).unwrap();
        assert_eq!(settings.get("lmproxy.start", "port").as_deref(), Some("9100"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSettings::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
