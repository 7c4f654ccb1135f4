//! Core domain types.
//!
//! These types represent what flows across the host model boundary,
//! independent of the OpenAI wire format and of any transport.
//!
//! # Structure
//!
//! - `model` - Model descriptors reported by the host
//! - `message` - Host-native messages, tools and request options
//! - `stream` - Incremental parts of a host response

mod message;
mod model;
mod stream;

pub use message::{HostMessage, HostRole, HostTool, ModelRequest, RequestOptions};
pub use model::ModelDescriptor;
pub use stream::StreamPart;
