#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod echo;
pub mod sse;
pub mod upstream;

pub use echo::{ECHO_MODEL_ID, EchoHost};
pub use sse::decode_parts;
pub use upstream::{UpstreamConfig, UpstreamHost};
