#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod docs;
pub mod encode;
pub mod error;
pub mod invoke;
pub mod models;
pub mod server;
pub mod supervisor;
pub mod translate;
pub mod validation;

pub use error::ProxyError;
pub use server::{router, serve};
pub use supervisor::{ProxyConfig, ProxyStatus, ProxySupervisor, StartedProxy, SupervisorError};
