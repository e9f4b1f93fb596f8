use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cli;
mod config;
mod session;
mod tui;
mod utils;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match cli.load_config().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config, cli.is_interactive(), cli.debug) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = dotenv {
        // A missing .env file is normal
        debug!("No .env file found or error loading it: {}", e);
    }

    let interactive = cli.is_interactive();
    if let Err(e) = cli.execute(config).await {
        error!("Application error: {}", e);
        if interactive {
            // The log went to a file; say something on the restored terminal
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Log to a file while the chat UI owns the terminal, and to stderr otherwise
fn init_logging(config: &Config, interactive: bool, debug: bool) -> Result<()> {
    let default_level = if debug { "rag_chat=debug" } else { "rag_chat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if interactive {
        config.ensure_data_dir()?;
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_file())?;

        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(log_file)),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
