//! CLI bootstrap - the composition root.
//!
//! This is the only place where the host adapter, the settings source and
//! the chat commands are wired together.

use std::path::PathBuf;
use std::sync::Arc;

use lmproxy_chat::{ChatCommand, CommandRegistry, StartCommandHandler};
use lmproxy_core::{LanguageModelHost, MemorySettings, SettingsSource};
use lmproxy_host::{EchoHost, UpstreamConfig, UpstreamHost};
use tracing::info;

use crate::error::CliError;
use crate::parser::Cli;
use crate::settings_file::FileSettings;

/// Which model host to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostChoice {
    Echo,
    Upstream(UpstreamConfig),
}

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub host: HostChoice,
    pub settings_path: Option<PathBuf>,
    pub docs_assets_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Resolve the host choice from global flags. `--echo` wins over an
    /// upstream URL.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let host = if cli.echo {
            HostChoice::Echo
        } else if let Some(url) = cli.upstream_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let mut upstream = UpstreamConfig::new(url.trim()).with_models(cli.upstream_models.clone());
            if let Some(key) = cli.api_key.as_deref().filter(|k| !k.is_empty()) {
                upstream = upstream.with_api_key(key);
            }
            HostChoice::Upstream(upstream)
        } else {
            return Err(CliError::Config(
                "No model host configured: pass --upstream-url (or LMPROXY_UPSTREAM_URL) or --echo"
                    .to_string(),
            ));
        };

        Ok(Self {
            host,
            settings_path: cli.settings.clone(),
            docs_assets_dir: cli.docs_assets.clone(),
        })
    }
}

/// Fully composed context for CLI commands.
#[derive(Debug)]
pub struct CliContext {
    pub host: Arc<dyn LanguageModelHost>,
    pub registry: CommandRegistry,
}

impl CliContext {
    /// The registered `start` command.
    pub fn start_command(&self) -> Option<&StartCommandHandler> {
        match self.registry.get(StartCommandHandler::NAME)? {
            ChatCommand::Start(start) => Some(start),
        }
    }
}

/// Build the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings: Arc<dyn SettingsSource> = match &config.settings_path {
        Some(path) => Arc::new(FileSettings::load(path)?),
        None => Arc::new(MemorySettings::new()),
    };

    let host: Arc<dyn LanguageModelHost> = match config.host {
        HostChoice::Echo => {
            info!("Using echo model host");
            Arc::new(EchoHost::new())
        }
        HostChoice::Upstream(upstream) => Arc::new(UpstreamHost::new(upstream)),
    };

    let mut start = StartCommandHandler::new(settings, Arc::clone(&host));
    if let Some(dir) = config.docs_assets_dir {
        start = start.with_docs_assets_dir(dir);
    }

    let mut registry = CommandRegistry::new();
    registry.register(start);

    Ok(CliContext { host, registry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_echo_wins() {
        let cli = Cli::parse_from(["lmproxy", "--echo", "--upstream-url", "http://x/v1", "models"]);
        assert_eq!(CliConfig::from_cli(&cli).unwrap().host, HostChoice::Echo);
    }

    #[test]
    fn test_upstream_config() {
        let cli = Cli::parse_from([
            "lmproxy",
            "--upstream-url",
            " http://x/v1 ",
            "--api-key",
            "sk",
            "--upstream-model",
            "m1",
            "models",
        ]);
        let HostChoice::Upstream(upstream) = CliConfig::from_cli(&cli).unwrap().host else {
            panic!("expected upstream host");
        };
        assert_eq!(upstream.base_url, "http://x/v1");
        assert_eq!(upstream.api_key.as_deref(), Some("sk"));
        assert_eq!(upstream.models, vec!["m1"]);
    }

    #[test]
    fn test_bootstrap_registers_start() {
        let config = CliConfig {
            host: HostChoice::Echo,
            settings_path: None,
            docs_assets_dir: None,
        };
        let ctx = bootstrap(config).unwrap();
        assert!(ctx.start_command().is_some());
        assert_eq!(ctx.registry.names().collect::<Vec<_>>(), vec!["start"]);
    }

    #[test]
    fn test_bootstrap_reads_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"lmproxy.start": {"hostname": "127.0.0.1", "port": 9100}}"#)
            .unwrap();

        let ctx = bootstrap(CliConfig {
            host: HostChoice::Echo,
            settings_path: Some(path),
            docs_assets_dir: None,
        })
        .unwrap();

        let config = ctx.start_command().unwrap().proxy_config();
        assert_eq!(config.hostname, "127.0.0.1");
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_bad_settings_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = bootstrap(CliConfig {
            host: HostChoice::Echo,
            settings_path: Some(dir.path().join("missing.json")),
            docs_assets_dir: None,
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
