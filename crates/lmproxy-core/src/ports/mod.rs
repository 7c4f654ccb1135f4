//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client or server types in any signature
//! - Streams cross the boundary boxed, as `PartStream`
//! - Cancellation is always an explicit `CancellationToken` argument

pub mod language_model;
pub mod settings_source;

pub use language_model::{HostError, LanguageModelChat, LanguageModelHost, PartStream};
pub use settings_source::{MemorySettings, SettingsSource};
