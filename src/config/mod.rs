//! Application configuration
//!
//! Built-in defaults, then the optional TOML file named by `MOXIE_CONFIG`,
//! then environment variables. Later sources win.

pub mod file;

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use file::ConfigFile;

/// Environment variable naming the optional TOML config file
pub const CONFIG_PATH_ENV: &str = "MOXIE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Validation(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}

/// Settings for the response generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "ollama" or "openai"
    pub provider: String,
    pub model: String,
    /// Overrides the provider's default base URL
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            system_prompt: None,
            timeout_secs: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            storage: StorageBackend::Sqlite,
            data_dir: PathBuf::from("./data"),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment (and the TOML file it names)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            let file = ConfigFile::from_file(&PathBuf::from(path))?;
            config.apply_file(file, &lookup)?;
        }

        config.apply_env(&lookup)?;
        Ok(config)
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("moxie.db")
    }

    fn apply_file(
        &mut self,
        file: ConfigFile,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = file.server.host {
            self.host = host;
        }
        if let Some(port) = file.server.port {
            self.port = port;
        }
        if let Some(backend) = file.storage.backend {
            self.storage = StorageBackend::parse(&backend)?;
        }
        if let Some(dir) = file.storage.data_dir {
            self.data_dir = dir;
        }

        let llm = file.llm;
        if let Some(provider) = llm.provider {
            self.llm.provider = provider;
        }
        if let Some(model) = llm.model {
            self.llm.model = model;
        }
        if llm.endpoint.is_some() {
            self.llm.endpoint = llm.endpoint;
        }
        if let Some(key_env) = llm.api_key_env {
            self.llm.api_key = Some(lookup(&key_env).ok_or_else(|| {
                ConfigError::Validation(format!("API key variable {} is not set", key_env))
            })?);
        }
        if llm.system_prompt.is_some() {
            self.llm.system_prompt = llm.system_prompt;
        }
        if let Some(secs) = llm.timeout_secs {
            self.llm.timeout_secs = secs;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(backend) = lookup("MOXIE_STORE") {
            self.storage = StorageBackend::parse(&backend)?;
        }
        if let Some(dir) = lookup("MOXIE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(provider) = lookup("MOXIE_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("MOXIE_MODEL") {
            self.llm.model = model;
        }

        let endpoint_var = match self.llm.provider.to_lowercase().as_str() {
            "openai" => "OPENAI_BASE_URL",
            _ => "OLLAMA_URL",
        };
        if let Some(url) = lookup(endpoint_var) {
            self.llm.endpoint = Some(url);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(prompt) = lookup("MOXIE_SYSTEM_PROMPT") {
            self.llm.system_prompt = Some(prompt);
        }
        if let Some(secs) = lookup("MOXIE_TIMEOUT_SECS") {
            self.llm.timeout_secs = secs.parse().map_err(|_| {
                ConfigError::Validation(format!("Invalid MOXIE_TIMEOUT_SECS: {}", secs))
            })?;
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
