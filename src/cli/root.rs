use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::ask::AskCommand;
use crate::api::HttpChatBackend;
use crate::config::Config;
use crate::session::ConversationController;
use crate::tui;

/// Terminal chat client for a retrieval-augmented question answering service
#[derive(Parser, Debug)]
#[command(
    name = "rag-chat",
    version,
    about = "Ask questions about your documents from the terminal",
    long_about = r#"rag-chat talks to a RAG backend over HTTP and shows each answer
together with the document passages it was drawn from.

Examples:
  rag-chat                                         # Start the chat UI
  rag-chat ask "How is Atlas Stream Processing performing?"
  echo "Tell me about our cloud strategy" | rag-chat ask
  rag-chat --base-url http://10.0.0.5:8000/api     # Use another backend"#
)]
pub struct Cli {
    /// Current working directory
    #[arg(short = 'c', long = "cwd", global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Backend base URL; `/chat` is appended to it
    #[arg(long = "base-url", global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and print the answer
    Ask(AskCommand),
}

impl Cli {
    /// True when the full-screen chat UI will run
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    /// Resolve configuration, with command-line flags taking precedence
    pub async fn load_config(&self) -> Result<Config> {
        if let Some(cwd) = &self.cwd {
            std::env::set_current_dir(cwd).map_err(|e| {
                anyhow!("Failed to change directory to {}: {}", cwd.display(), e)
            })?;
        }

        let mut config = Config::init().await?;
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }

        Ok(config)
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }
        if let Some(cwd) = &self.cwd {
            info!("Working directory: {}", cwd.display());
        }

        config.validate()?;

        let backend = HttpChatBackend::new(&config.base_url)?;
        let controller = ConversationController::new(Arc::new(backend), config.greeting.clone());
        info!("Using chat endpoint {}", controller.endpoint());

        match self.command {
            Some(Commands::Ask(ask)) => ask.execute(controller).await,
            None => {
                info!("Starting interactive mode");
                tui::run(config, controller).await
            }
        }
    }
}
