use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const ENV_API_URL: &str = "MODEL_API_URL";
const ENV_API_KEY: &str = "TOGETHER_API_KEY";
const ENV_MODEL_NAME: &str = "MODEL_NAME";
const ENV_MAX_HISTORY: &str = "MAX_HISTORY";
const ENV_TIMEOUT_SECS: &str = "MODEL_TIMEOUT_SECS";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    #[serde(default = "ModelConfig::default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "ModelConfig::default_name")]
    pub name: String,
    /// Turn pairs kept per user.
    #[serde(default = "ModelConfig::default_max_history")]
    pub max_history: usize,
    #[serde(default = "ModelConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            api_key: None,
            name: Self::default_name(),
            max_history: Self::default_max_history(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    fn default_api_url() -> String {
        "https://api.together.xyz/v1/chat/completions".to_string()
    }

    fn default_name() -> String {
        "mistralai/Mistral-7B-Instruct-v0.1".to_string()
    }

    const fn default_max_history() -> usize {
        6
    }

    const fn default_timeout_secs() -> u64 {
        30
    }
}

impl Config {
    /// Load configuration: defaults, then `~/sophia/config.json` if present,
    /// then `.env`, then the process environment.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                debug!("Reading config file {}", path.display());
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };

        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Failed to read .env file: {e}"),
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", path.display())
        })?;
        Ok(config)
    }

    /// Override fields from environment variables found by `lookup`.
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_BOT_TOKEN) {
            self.telegram.token = token;
        }
        if let Some(url) = get(ENV_API_URL) {
            self.model.api_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.model.api_key = Some(key);
        }
        if let Some(name) = get(ENV_MODEL_NAME) {
            self.model.name = name;
        }
        if let Some(raw) = get(ENV_MAX_HISTORY) {
            self.model.max_history = raw.trim().parse().map_err(|e| {
                anyhow::anyhow!("{ENV_MAX_HISTORY} must be a positive integer, got {raw:?}: {e}")
            })?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.model.timeout_secs = raw.trim().parse().map_err(|e| {
                anyhow::anyhow!("{ENV_TIMEOUT_SECS} must be a positive integer, got {raw:?}: {e}")
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model.api_url.trim().is_empty() {
            anyhow::bail!("{ENV_API_URL} is missing");
        }
        if self.model.max_history == 0 {
            anyhow::bail!("{ENV_MAX_HISTORY} must be at least 1");
        }
        if self.model.timeout_secs == 0 {
            anyhow::bail!("{ENV_TIMEOUT_SECS} must be at least 1");
        }
        Ok(())
    }

    /// The bot token, or an error naming the variable to set.
    pub fn require_token(&self) -> anyhow::Result<&str> {
        let token = self.telegram.token.trim();
        if token.is_empty() {
            anyhow::bail!("{ENV_BOT_TOKEN} is missing");
        }
        Ok(token)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("sophia"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "telegram": {
    "token": "your-telegram-bot-token-here"
  },
  "model": {
    "api_url": "https://api.together.xyz/v1/chat/completions",
    "api_key": "your-together-api-key-here",
    "name": "mistralai/Mistral-7B-Instruct-v0.1",
    "max_history": 6,
    "timeout_secs": 30
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Telegram bot token");
        println!("   2. Add the API key of your completion provider");
        println!("   3. Run 'sophia run' to start the bot");
        println!();
        println!("🔧 Environment variables override the file:");
        println!("   {ENV_BOT_TOKEN}, {ENV_API_URL}, {ENV_API_KEY},");
        println!("   {ENV_MODEL_NAME}, {ENV_MAX_HISTORY}, {ENV_TIMEOUT_SECS}");
        println!();
        Ok(())
    }
}
