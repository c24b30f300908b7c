//! Ferry CLI
//!
//! Headless front end to the client core: connect to a peer, then fetch or
//! push paths through the running backend.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ferry_client::commands::TransferResponse;
use ferry_client::config::default_config_path;
use ferry_client::{AppState, ClientConfig, IpcBridge};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// Ferry - connect to a peer and move files over the native backend.
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Connect to a peer and report the session
    Connect {
        /// Peer IPv4 address
        server_address: String,
    },

    /// Connect to a peer and download one or more remote paths
    Fetch {
        /// Peer IPv4 address
        server_address: String,

        /// Remote paths, passed to the backend as typed
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Connect to a peer and upload one or more local paths
    Push {
        /// Peer IPv4 address
        server_address: String,

        /// Local paths, passed to the backend as typed
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Check that the backend is running
    Ping,

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write a configuration file holding the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing; the configured level is applied once it is known
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::new(startup_filter(cli.verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if let Commands::Config(ConfigCommands::Init { force }) = cli.command {
        init_config(&config_path, force)?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    tracing::debug!("Using config file: {:?}", config_path);
    let mut config = ClientConfig::load(&config_path)?;

    // Apply environment variable overrides
    config.apply_env_overrides();

    // Validate configuration
    config.validate().context("Invalid configuration")?;

    if let Some(directive) = configured_filter(cli.verbose, &config) {
        filter_handle
            .reload(EnvFilter::new(directive))
            .context("Failed to apply configured log level")?;
    }

    tracing::debug!("Backend socket: {}", config.socket_path.display());

    let succeeded = match cli.command {
        Commands::Ping => ping(&config).await?,
        Commands::Config(ConfigCommands::Show) => {
            print!("{}", config.to_toml()?);
            true
        }
        Commands::Config(ConfigCommands::Init { .. }) => unreachable!("handled before loading"),
        Commands::Connect { server_address } => {
            let state = AppState::from_config(&config);
            connect(&state, server_address).await?
        }
        Commands::Fetch {
            server_address,
            paths,
        } => {
            let state = AppState::from_config(&config);
            if connect(&state, server_address).await? {
                let mut all_ok = true;
                for path in paths {
                    let response = state.download(path.clone()).await?;
                    all_ok &= report_transfer("download", &path, &response);
                }
                all_ok
            } else {
                false
            }
        }
        Commands::Push {
            server_address,
            paths,
        } => {
            let state = AppState::from_config(&config);
            if connect(&state, server_address).await? {
                let mut all_ok = true;
                for path in paths {
                    let response = state.upload(path.clone()).await?;
                    all_ok &= report_transfer("upload", &path, &response);
                }
                all_ok
            } else {
                false
            }
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Filter in effect while the configuration is being loaded.
fn startup_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Filter to switch to after loading. `-v` wins over `log_level`.
fn configured_filter(verbose: bool, config: &ClientConfig) -> Option<String> {
    if verbose {
        None
    } else {
        Some(config.log_level.to_lowercase())
    }
}

/// Write the default configuration to `path`. An existing file is only
/// replaced with `force`.
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    ClientConfig::default().save(path)
}

async fn ping(config: &ClientConfig) -> anyhow::Result<bool> {
    let bridge = IpcBridge::from_config(config);
    match bridge.ping().await {
        Ok(true) => {
            println!("Backend is running at {}", bridge.socket_path().display());
            Ok(true)
        }
        Ok(false) => {
            eprintln!("Backend answered ping with an unexpected reply");
            Ok(false)
        }
        Err(e) => {
            tracing::debug!("Ping failed: {}", e);
            eprintln!("Backend is not running ({})", e);
            Ok(false)
        }
    }
}

async fn connect(state: &AppState, server_address: String) -> anyhow::Result<bool> {
    let response = state.connect(server_address.clone()).await?;

    if response.connected {
        let status = state.status().await;
        println!("Connected to {}", server_address);
        if let Some(session_id) = &response.session_id {
            println!("  Session:     {}", session_id);
        }
        if let Some(destination) = &status.local_destination {
            println!("  Downloads:   {}", destination);
        }
        Ok(true)
    } else {
        eprintln!(
            "Error: {}",
            response.form.error().unwrap_or("connection failed")
        );
        Ok(false)
    }
}

fn report_transfer(operation: &str, path: &str, response: &TransferResponse) -> bool {
    if response.submitted {
        println!("Requested {} of {:?}", operation, path);
    } else {
        eprintln!(
            "Error: {} ({:?})",
            response.form.error().unwrap_or("request failed"),
            path
        );
    }
    response.submitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_debug_assert() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_connect_command() {
        let cli = Cli::try_parse_from(["ferry", "connect", "192.168.1.10"]).unwrap();
        match cli.command {
            Commands::Connect { server_address } => assert_eq!(server_address, "192.168.1.10"),
            _ => panic!("Expected Connect command"),
        }
        assert!(!cli.verbose);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_connect_requires_address() {
        let result = Cli::try_parse_from(["ferry", "connect"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_with_multiple_paths() {
        let cli =
            Cli::try_parse_from(["ferry", "fetch", "10.0.0.2", "/srv/a.txt", "relative/dir"])
                .unwrap();
        match cli.command {
            Commands::Fetch {
                server_address,
                paths,
            } => {
                assert_eq!(server_address, "10.0.0.2");
                assert_eq!(paths, vec!["/srv/a.txt", "relative/dir"]);
            }
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_fetch_requires_a_path() {
        let result = Cli::try_parse_from(["ferry", "fetch", "10.0.0.2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_keeps_empty_path() {
        let cli = Cli::try_parse_from(["ferry", "fetch", "10.0.0.2", ""]).unwrap();
        match cli.command {
            Commands::Fetch { paths, .. } => assert_eq!(paths, vec![""]),
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_push_command() {
        let cli = Cli::try_parse_from(["ferry", "push", "10.0.0.2", "/home/ada/notes.txt"])
            .unwrap();
        match cli.command {
            Commands::Push {
                server_address,
                paths,
            } => {
                assert_eq!(server_address, "10.0.0.2");
                assert_eq!(paths, vec!["/home/ada/notes.txt"]);
            }
            _ => panic!("Expected Push command"),
        }
    }

    #[test]
    fn test_push_requires_a_path() {
        let result = Cli::try_parse_from(["ferry", "push", "10.0.0.2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ping_command() {
        let cli = Cli::try_parse_from(["ferry", "ping"]).unwrap();
        assert!(matches!(cli.command, Commands::Ping));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["ferry", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show)));

        let cli = Cli::try_parse_from(["ferry", "config", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init { force: false })
        ));

        let cli = Cli::try_parse_from(["ferry", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init { force: true })
        ));
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::try_parse_from(["ferry", "-v", "ping"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_verbose_after_command() {
        let cli = Cli::try_parse_from(["ferry", "fetch", "10.0.0.2", "/srv/a", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Fetch { paths, .. } => assert_eq!(paths, vec!["/srv/a"]),
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["ferry", "--config", "/etc/ferry.toml", "ping"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ferry.toml")));
    }

    #[test]
    fn test_config_after_command() {
        let cli =
            Cli::try_parse_from(["ferry", "connect", "10.0.0.2", "-c", "/etc/ferry.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ferry.toml")));
    }

    #[test]
    fn test_unknown_command_rejected() {
        let result = Cli::try_parse_from(["ferry", "serve"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_filter() {
        assert_eq!(startup_filter(true), "debug");
        assert_eq!(startup_filter(false), "info");
    }

    #[test]
    fn test_configured_filter_follows_log_level() {
        let config = ClientConfig {
            log_level: "WARN".to_string(),
            ..Default::default()
        };
        assert_eq!(configured_filter(false, &config), Some("warn".to_string()));
    }

    #[test]
    fn test_verbose_overrides_configured_level() {
        let config = ClientConfig {
            log_level: "error".to_string(),
            ..Default::default()
        };
        assert_eq!(configured_filter(true, &config), None);
    }

    #[test]
    fn test_init_config_writes_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("ferry").join("config.toml");

        init_config(&path, false).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded, ClientConfig::default());
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let err = init_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "log_level = \"warn\"\n"
        );

        init_config(&path, true).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), ClientConfig::default());
    }
}
