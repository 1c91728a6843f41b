//! Deployment configuration loaded from a TOML file
//!
//! Every table and key is optional. Anything left out falls back to the
//! environment or the built-in default.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [storage]
//! backend = "sqlite"          # or "memory"
//! data_dir = "/var/lib/moxie"
//!
//! [llm]
//! provider = "openai"
//! model = "llama-3.3-70b-versatile"
//! endpoint = "https://api.groq.com/openai/v1"
//! api_key_env = "GROQ_API_KEY"
//! system_prompt = "You are a friendly assistant."
//! timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ConfigError;

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub llm: LlmSection,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ConfigFile = toml::from_str(content)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    /// "sqlite" or "memory"
    pub backend: Option<String>,

    /// Directory holding `moxie.db`
    pub data_dir: Option<PathBuf>,
}

/// LLM provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmSection {
    /// Provider name: "ollama" or "openai"
    pub provider: Option<String>,

    pub model: Option<String>,

    /// Custom API endpoint, replaces the provider's default base URL
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,

    pub system_prompt: Option<String>,

    pub timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8080

[storage]
backend = "sqlite"
data_dir = "/var/lib/moxie"

[llm]
provider = "openai"
model = "llama-3.3-70b-versatile"
endpoint = "https://api.groq.com/openai/v1"
api_key_env = "GROQ_API_KEY"
timeout_secs = 60
"#;

    #[test]
    fn test_parse_config() {
        let config = ConfigFile::from_str(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.storage.backend.as_deref(), Some("sqlite"));
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/var/lib/moxie"))
        );
        assert_eq!(config.llm.provider.as_deref(), Some("openai"));
        assert_eq!(config.llm.api_key_env.as_deref(), Some("GROQ_API_KEY"));
        assert_eq!(config.llm.timeout_secs, Some(60));
        assert!(config.llm.system_prompt.is_none());
    }

    #[test]
    fn test_minimal_config() {
        let config = ConfigFile::from_str("").unwrap();
        assert!(config.server.port.is_none());
        assert!(config.llm.provider.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ConfigFile::from_str("[server]\nhots = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
