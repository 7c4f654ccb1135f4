//! CLI-specific error types and exit codes.

use thiserror::Error;

use crate::settings_file::SettingsError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model host failed.
    #[error("Model host error: {0}")]
    Host(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code following sysexits.h where it fits.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Host(_) => 69,     // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
