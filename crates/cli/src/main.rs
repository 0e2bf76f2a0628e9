//! `autodial`: outbound dialing from the command line
//!
//! ```text
//! autodial --config autodial.toml run --lines numbers.txt
//! autodial --config autodial.toml check --lines numbers.txt
//! autodial --config autodial.toml count
//! autodial --config autodial.toml claim
//! ```

mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "autodial", version, about = "Outbound auto-dialer for Asterisk")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "AUTODIAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AUTODIAL_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Settings commonly supplied through the environment
#[derive(Debug, clap::Args)]
struct Overrides {
    #[arg(long, env = "AUTODIAL_AMI_HOST", global = true)]
    ami_host: Option<String>,

    #[arg(long, env = "AUTODIAL_AMI_PORT", global = true)]
    ami_port: Option<u16>,

    #[arg(long, env = "AUTODIAL_AMI_USERNAME", global = true)]
    ami_username: Option<String>,

    #[arg(long, env = "AUTODIAL_AMI_SECRET", global = true, hide_env_values = true)]
    ami_secret: Option<String>,

    #[arg(long, env = "AUTODIAL_CALLER_ID", global = true)]
    caller_id: Option<String>,

    #[arg(long, env = "AUTODIAL_STORE_URL", global = true)]
    store_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dial every new number in a line list
    Run {
        /// File with one phone number per line
        #[arg(long)]
        lines: PathBuf,

        /// Agent script to play; defaults to the first configured agent
        #[arg(long)]
        agent: Option<String>,

        /// Calls kept in flight
        #[arg(long, env = "AUTODIAL_CONCURRENT_CALLS")]
        concurrent_calls: Option<usize>,
    },
    /// Show what a line list would dial, without connecting
    Check {
        #[arg(long)]
        lines: PathBuf,
    },
    /// Count recorded responses nobody has claimed
    Count,
    /// Claim the oldest unclaimed response line
    Claim,
}

impl Overrides {
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.ami_host {
            config.manager.host = host;
        }
        if let Some(port) = self.ami_port {
            config.manager.port = port;
        }
        if let Some(username) = self.ami_username {
            config.manager.username = username;
        }
        if let Some(secret) = self.ami_secret {
            config.manager.secret = secret;
        }
        if let Some(caller_id) = self.caller_id {
            config.engine.caller_id = caller_id;
        }
        if let Some(url) = self.store_url {
            config.store.url = url;
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    if let Some(level) = cli.log_level {
        config.logging = config.logging.with_level(level);
    }
    if cli.json_logs {
        config.logging = config.logging.with_json();
    }

    logging::setup_logging(&config.logging)?;
    tracing::info!("Starting autodial v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run {
            lines,
            agent,
            concurrent_calls,
        } => {
            if let Some(concurrent_calls) = concurrent_calls {
                config.engine.concurrent_calls = concurrent_calls;
            }
            commands::run::execute(&config, &lines, agent.as_deref()).await
        }
        Command::Check { lines } => commands::check::execute(&config, &lines).await,
        Command::Count => commands::lines::count(&config).await,
        Command::Claim => commands::lines::claim(&config).await,
    }
}
