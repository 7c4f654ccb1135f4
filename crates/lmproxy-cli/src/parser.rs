//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the lmproxy chat participant.
#[derive(Parser, Debug)]
#[command(name = "lmproxy")]
#[command(about = "OpenAI-compatible proxy in front of a chat model host")]
#[command(version)]
pub struct Cli {
    /// JSON settings file with `lmproxy.<command>` sections
    #[arg(long, global = true, env = "LMPROXY_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// API root of an OpenAI-compatible server, e.g. http://localhost:11434/v1
    #[arg(long = "upstream-url", global = true, env = "LMPROXY_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Bearer token for the upstream server
    #[arg(
        long = "api-key",
        global = true,
        env = "LMPROXY_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    /// Offer only these upstream models instead of asking the server
    #[arg(long = "upstream-model", global = true)]
    pub upstream_models: Vec<String>,

    /// Answer with the echo host instead of an upstream server
    #[arg(long, global = true)]
    pub echo: bool,

    /// Directory with Swagger UI assets for /api-docs (otherwise loaded from unpkg)
    #[arg(long = "docs-assets", global = true, env = "LMPROXY_DOCS_ASSETS")]
    pub docs_assets: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chat_line_and_globals() {
        let cli = Cli::parse_from([
            "lmproxy",
            "--echo",
            "-v",
            "chat",
            "@llmproxy /start",
            "--upstream-model",
            "a",
            "--upstream-model",
            "b",
        ]);
        assert!(cli.echo);
        assert!(cli.verbose);
        assert_eq!(cli.upstream_models, vec!["a", "b"]);
        assert_eq!(
            cli.command,
            Commands::Chat {
                line: "@llmproxy /start".to_string()
            }
        );
    }

    #[test]
    fn test_docs_assets_flag() {
        let cli = Cli::parse_from(["lmproxy", "chat", "/start", "--docs-assets", "/opt/swagger"]);
        assert_eq!(cli.docs_assets, Some(PathBuf::from("/opt/swagger")));
    }

    #[test]
    fn test_models_subcommand() {
        let cli = Cli::parse_from(["lmproxy", "--upstream-url", "http://x/v1", "models"]);
        assert_eq!(cli.command, Commands::Models);
        assert_eq!(cli.upstream_url.as_deref(), Some("http://x/v1"));
    }
}
