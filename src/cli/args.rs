//! CLI argument definitions using clap
//!
//! Commands:
//! - cattery init  [--config <path>] [--table <path>]
//! - cattery serve [--config <path>] [--host <host>] [--port <port>] [--table <path>]
//!
//! Settings resolve in order: defaults, config file, environment, flags.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cattery - a record service over a single CSV table of cats
#[derive(Parser, Debug)]
#[command(name = "cattery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty table file holding only the header
    Init {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Serve the HTTP API
    Serve {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Overrides shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Path to JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "CATTERY_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// CSV table file
    #[arg(long, env = "CATTERY_TABLE_PATH")]
    pub table: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "cattery", "serve", "--port", "8080", "--table", "/tmp/cats.csv", "--host", "127.0.0.1",
        ])
        .unwrap();

        match cli.command {
            Command::Serve { settings } => {
                assert_eq!(settings.port, Some(8080));
                assert_eq!(settings.table, Some(PathBuf::from("/tmp/cats.csv")));
                assert_eq!(settings.host.as_deref(), Some("127.0.0.1"));
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_init_with_config() {
        let cli = Cli::try_parse_from(["cattery", "init", "--config", "./cattery.json"]).unwrap();
        match cli.command {
            Command::Init { settings } => {
                assert_eq!(settings.config, Some(PathBuf::from("./cattery.json")));
            }
            other => panic!("expected init, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["cattery", "serve", "--port", "nine"]).is_err());
    }
}
