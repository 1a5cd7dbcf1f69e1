use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variables that override values from the config file.
pub mod env_keys {
    pub const BOT_TOKEN: &str = "BOT_TOKEN";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const DATABASE_URL: &str = "DATABASE_URL";
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ProviderConfig::default_model")]
    pub model: String,
    /// Prepended to every completion request when set. Never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            system_prompt: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        "gpt-3.5-turbo".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_url() -> String {
        "sqlite://parley.db?mode=rwc".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_window_millis")]
    pub window_millis: u64,
    #[serde(default = "RateLimitConfig::default_max_tracked_users")]
    pub max_tracked_users: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_millis: Self::default_window_millis(),
            max_tracked_users: Self::default_max_tracked_users(),
        }
    }
}

impl RateLimitConfig {
    const fn default_window_millis() -> u64 {
        2000
    }

    const fn default_max_tracked_users() -> usize {
        10_000
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis)
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("parley"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/parley/config.json` if it exists, then apply environment
    /// overrides. A missing file falls back to defaults so the bot can be
    /// configured from the environment alone.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            info!("Loaded config from {}", config_path.display());
            Self::from_json(&content)?
        } else {
            info!(
                "No config file at {}, using defaults and environment",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Override file values with any non-empty value `lookup` returns.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = value(env_keys::BOT_TOKEN) {
            debug!("Using {} from environment", env_keys::BOT_TOKEN);
            self.telegram.token = token;
        }
        if let Some(api_key) = value(env_keys::OPENAI_API_KEY) {
            debug!("Using {} from environment", env_keys::OPENAI_API_KEY);
            self.provider.api_key = api_key;
        }
        if let Some(base_url) = value(env_keys::OPENAI_BASE_URL) {
            self.provider.base_url = base_url;
        }
        if let Some(model) = value(env_keys::OPENAI_MODEL) {
            self.provider.model = model;
        }
        if let Some(url) = value(env_keys::DATABASE_URL) {
            debug!("Using {} from environment", env_keys::DATABASE_URL);
            self.database.url = url;
        }
    }

    /// Ensure the secrets needed to run the bot are present.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.telegram.token.trim().is_empty() {
            anyhow::bail!(
                "Telegram bot token not configured. Set \"telegram.token\" in config or {}",
                env_keys::BOT_TOKEN
            );
        }
        if self.provider.api_key.trim().is_empty() {
            anyhow::bail!(
                "Completion API key not configured. Set \"provider.api_key\" in config or {}",
                env_keys::OPENAI_API_KEY
            );
        }
        if self.rate_limit.max_tracked_users == 0 {
            anyhow::bail!("\"rate_limit.max_tracked_users\" must be greater than zero");
        }
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
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
  "provider": {
    "api_key": "your-openai-api-key-here",
    "base_url": "https://api.openai.com/v1",
    "model": "gpt-3.5-turbo",
    "timeout_secs": 60
  },
  "database": {
    "url": "sqlite://parley.db?mode=rwc"
  },
  "rate_limit": {
    "window_millis": 2000,
    "max_tracked_users": 10000
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your Telegram bot token and completion API key");
        println!("      (or export {} and {})", env_keys::BOT_TOKEN, env_keys::OPENAI_API_KEY);
        println!("   2. Point database.url at PostgreSQL, MySQL or SQLite");
        println!("   3. Run 'parley' to start the bot");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_json("{}").unwrap_or_default();

        assert_eq!(config.provider.model, "gpt-3.5-turbo");
        assert_eq!(config.provider.timeout(), Duration::from_secs(60));
        assert_eq!(config.rate_limit.window(), Duration::from_secs(2));
        assert_eq!(config.rate_limit.max_tracked_users, 10_000);
        assert!(config.provider.system_prompt.is_none());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let config =
            Config::from_json(r#"{"provider": {"api_key": "sk-test"}, "rate_limit": {"window_millis": 500}}"#)
                .unwrap_or_default();

        assert_eq!(config.provider.api_key, "sk-test");
        assert_eq!(config.provider.base_url, "https://api.openai.com/v1");
        assert_eq!(config.rate_limit.window(), Duration::from_millis(500));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        config.telegram.token = "from-file".to_string();

        let vars = env(&[
            (env_keys::BOT_TOKEN, "from-env"),
            (env_keys::OPENAI_API_KEY, "sk-env"),
            (env_keys::DATABASE_URL, "postgres://localhost/parley"),
        ]);
        config.apply_env_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.telegram.token, "from-env");
        assert_eq!(config.provider.api_key, "sk-env");
        assert_eq!(config.database.url, "postgres://localhost/parley");
        assert_eq!(config.provider.model, "gpt-3.5-turbo");
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let mut config = Config::default();
        config.provider.api_key = "sk-file".to_string();

        let vars = env(&[(env_keys::OPENAI_API_KEY, "  ")]);
        config.apply_env_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.provider.api_key, "sk-file");
    }

    #[test]
    fn validate_requires_token_and_api_key() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.telegram.token = "123:abc".to_string();
        assert!(config.validate().is_err());

        config.provider.api_key = "sk-test".to_string();
        assert!(config.validate().is_ok());
    }
}
