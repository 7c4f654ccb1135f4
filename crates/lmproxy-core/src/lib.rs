#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    HostMessage, HostRole, HostTool, ModelDescriptor, ModelRequest, RequestOptions, StreamPart,
};
pub use ports::{
    HostError, LanguageModelChat, LanguageModelHost, MemorySettings, PartStream,
    SettingsSource,
};
pub use settings::{
    CommandSettings, DEFAULT_HOSTNAME, DEFAULT_PORT, SECTION_NAME, SettingKey, effective_hostname,
    effective_port,
};

// Silence unused dev-dependency warnings; tokio drives the async port tests
#[cfg(test)]
use tokio as _;
