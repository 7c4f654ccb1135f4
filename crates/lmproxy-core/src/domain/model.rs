//! Model descriptor types.

use serde::{Deserialize, Serialize};

/// Read-only metadata describing one chat model offered by the host.
///
/// Descriptors are sourced from the host on every listing; nothing in
/// lmproxy caches them beyond a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Human-readable model name.
    pub name: String,
    /// Opaque identifier, matched against the `model` field of requests.
    pub id: String,
    /// Vendor of the model (e.g., "copilot", "openai").
    pub vendor: String,
    /// Model family (e.g., "gpt-4o").
    pub family: String,
    /// Model version string.
    pub version: String,
    /// Maximum number of tokens accepted as input.
    pub max_input_tokens: u64,
}

impl ModelDescriptor {
    /// Create a descriptor whose name, family and version all derive from the id.
    ///
    /// Used by adapters that only know a model identifier.
    #[must_use]
    pub fn from_id(id: impl Into<String>, vendor: impl Into<String>, max_input_tokens: u64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            family: id.clone(),
            version: id.clone(),
            id,
            vendor: vendor.into(),
            max_input_tokens,
        }
    }
}
