use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TITLE: &str = "RAG Assistant";
pub const DEFAULT_SUBTITLE: &str = "Powered by AI-model: nomic-embed-text-v1";
pub const DEFAULT_GREETING: &str = "Hello! I'm your RAG Assistant. How can I assist you today?";
pub const DEFAULT_PLACEHOLDER: &str = "Ask about our financials, AI initiatives, partnerships.";
pub const LOG_FILE_NAME: &str = "rag-chat.log";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the backend; the chat route is `{base_url}/chat`
    pub base_url: String,

    /// Directory for the log file
    pub data_dir: PathBuf,

    /// Header title
    pub title: String,

    /// Header subtitle
    pub subtitle: String,

    /// First assistant message of every session
    pub greeting: String,

    /// Hint shown in the empty input box
    pub placeholder: String,

    /// Questions offered before the first submission
    pub sample_questions: Vec<String>,

    /// UI refresh interval in milliseconds
    pub tick_rate_ms: u64,

    /// Whether mouse clicks and scrolling are captured
    pub mouse_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            sample_questions: default_sample_questions(),
            tick_rate_ms: 100,
            mouse_enabled: true,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("rag-chat"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// `true`, `1`, `yes` and `on` (any case) enable a flag; anything else disables it
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn default_sample_questions() -> Vec<String> {
    vec![
        "How is Atlas Stream Processing performing?".to_string(),
        "What are the key financial highlights from the latest quarter?".to_string(),
        "Tell me about our cloud strategy".to_string(),
    ]
}

impl Config {
    /// Initialize configuration from the environment and config files
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        // Load from environment variables
        config.load_from_env();

        // Config files win over the environment
        if let Some(file_config) = Self::load_from_file(&Self::config_paths()).await? {
            config.merge_with(file_config);
        }

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.load_from_vars(|key| std::env::var(key).ok());
    }

    fn load_from_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = var("RAG_CHAT_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(data_dir) = var("RAG_CHAT_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Some(title) = var("RAG_CHAT_TITLE") {
            self.title = title;
        }

        if let Some(subtitle) = var("RAG_CHAT_SUBTITLE") {
            self.subtitle = subtitle;
        }

        if let Some(greeting) = var("RAG_CHAT_GREETING") {
            self.greeting = greeting;
        }

        if let Some(mouse) = var("RAG_CHAT_MOUSE") {
            self.mouse_enabled = parse_flag(&mouse);
        }
    }

    /// Candidate configuration files, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.rag-chat.json"),
            PathBuf::from("./rag-chat.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("rag-chat").join("rag-chat.json"));
        }

        paths
    }

    /// Read the first existing file among `paths`.
    ///
    /// Missing files are skipped; a file that exists but does not parse is
    /// an error.
    pub async fn load_from_file(paths: &[PathBuf]) -> Result<Option<PartialConfig>> {
        for path in paths {
            if path.exists() {
                debug!("Loading configuration from: {}", path.display());
                let content = tokio::fs::read_to_string(path).await?;
                let config = serde_json::from_str(&content)
                    .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
                return Ok(Some(config));
            }
        }

        Ok(None)
    }

    /// Merge another configuration into this one
    pub fn merge_with(&mut self, other: PartialConfig) {
        if let Some(base_url) = other.base_url {
            self.base_url = base_url;
        }
        if let Some(data_dir) = other.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(title) = other.title {
            self.title = title;
        }
        if let Some(subtitle) = other.subtitle {
            self.subtitle = subtitle;
        }
        if let Some(greeting) = other.greeting {
            self.greeting = greeting;
        }
        if let Some(placeholder) = other.placeholder {
            self.placeholder = placeholder;
        }
        if let Some(sample_questions) = other.sample_questions {
            self.sample_questions = sample_questions;
        }
        if let Some(tick_rate_ms) = other.tick_rate_ms {
            self.tick_rate_ms = tick_rate_ms;
        }
        if let Some(mouse_enabled) = other.mouse_enabled {
            self.mouse_enabled = mouse_enabled;
        }
    }

    /// Where interactive mode writes its log
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Create the data directory if needed
    pub fn ensure_data_dir(&self) -> Result<&Path> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                anyhow!("Failed to create data directory {}: {}", self.data_dir.display(), e)
            })?;
        }
        Ok(&self.data_dir)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| anyhow!("base_url '{}' is not a valid URL: {}", self.base_url, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if self.greeting.trim().is_empty() {
            return Err(anyhow!("greeting must not be empty"));
        }

        if self.tick_rate_ms == 0 {
            return Err(anyhow!("tick_rate_ms must be greater than 0"));
        }

        Ok(())
    }
}

/// A configuration file: every field is optional and only the ones present
/// override the current values.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PartialConfig {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub greeting: Option<String>,
    pub placeholder: Option<String>,
    pub sample_questions: Option<Vec<String>>,
    pub tick_rate_ms: Option<u64>,
    pub mouse_enabled: Option<bool>,
}
