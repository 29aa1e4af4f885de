use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use meshpong_config::{ConfigLoader, WarningSeverity};
use meshpong_core::{Handle, MeshpongError};
use tracing::{info, warn};

mod run;

/// Mesh ping-pong responder node
#[derive(Parser)]
#[command(name = "meshpong", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to meshpong.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the node, plus simulated peers, on a loopback mesh
    Run {
        /// Number of simulated peer nodes
        #[arg(short, long, default_value = "1")]
        peers: usize,

        /// Command every peer is configured with
        #[arg(long, default_value = "0")]
        peer_filter: String,

        /// Command for this node, sent before stdin (repeatable)
        #[arg(long = "command", value_name = "COMMAND")]
        commands: Vec<String>,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Don't read commands from stdin
        #[arg(long)]
        no_stdin: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the command channel help
    Usage,
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub async fn run(self) -> meshpong_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level
                .as_deref()
                .unwrap_or(config.logging.level.as_str())
        };

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
        match config.logging.format.as_str() {
            "json" => tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .with_target(true)
                .init(),
            "compact" => tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .compact()
                .with_target(false)
                .init(),
            _ => tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init(),
        }

        // The loader ran before the subscriber existed; report what it saw now.
        info!(path = %config_loader.path().display(), "configuration loaded");
        for w in config_loader.warnings() {
            match w.severity {
                WarningSeverity::Info => info!("{w}"),
                WarningSeverity::Warning | WarningSeverity::Error => warn!("{w}"),
            }
        }

        match self.command {
            Commands::Run {
                peers,
                peer_filter,
                commands,
                duration_secs,
                no_stdin,
            } => {
                let opts = run::RunOptions {
                    peers,
                    peer_filter,
                    commands,
                    duration_secs,
                    no_stdin,
                };
                run::cmd_run(config, opts).await
            }
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Usage => Self::cmd_usage(config),
            Commands::Version => Self::cmd_version(),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: meshpong_config::MeshpongConfig, json: bool) -> meshpong_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| MeshpongError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_usage(config: meshpong_config::MeshpongConfig) -> meshpong_core::Result<()> {
        let handle_count = config.mesh.handle_count.min(Handle::MAX_COUNT);
        println!("{}", meshpong_runtime::usage(handle_count));
        Ok(())
    }

    fn cmd_version() -> meshpong_core::Result<()> {
        println!("meshpong v{}", env!("CARGO_PKG_VERSION"));
        println!("   Rust edition: 2024");
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> meshpong_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "meshpong", &mut std::io::stdout());
        Ok(())
    }
}
