//! Calgen configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main calgen configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Calendar generation defaults
    pub generation: GenerationConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables are set. Call this early
    /// in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .calgen.yml
        let local_config = PathBuf::from(".calgen.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/calgen/calgen.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("calgen").join("calgen.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Calendar generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Platforms to schedule for when the caller names none
    pub platforms: Vec<String>,

    /// Posts per week to ask the model for
    #[serde(rename = "posts-per-week")]
    pub posts_per_week: u32,

    /// Default period length in weeks
    #[serde(rename = "period-weeks")]
    pub period_weeks: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            platforms: vec!["Instagram".to_string(), "Facebook".to_string(), "LinkedIn".to_string()],
            posts_per_week: 3,
            period_weeks: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.generation.posts_per_week, 3);
        assert_eq!(config.generation.period_weeks, 4);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  api-key-env: MY_API_KEY
  base-url: https://llm.internal.example.com
  max-tokens: 4096
  timeout-ms: 60000

generation:
  platforms:
    - Instagram
    - TikTok
  posts-per-week: 5
  period-weeks: 2
"#;

        let config: Config = serde_yaml::from_str(yaml).expect("parse");

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.generation.platforms, vec!["Instagram", "TikTok"]);
        assert_eq!(config.generation.posts_per_week, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4o-mini
"#;

        let config: Config = serde_yaml::from_str(yaml).expect("parse");

        // Specified value
        assert_eq!(config.llm.model, "gpt-4o-mini");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.generation.period_weeks, 4);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("calgen.yml");
        std::fs::write(&path, "llm:\n  model: test-model\n").expect("write");

        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.llm.model, "test-model");
    }

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let path = PathBuf::from("/nonexistent/calgen.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_checks_api_key_env() {
        let mut config = Config::default();

        // PATH is always present
        config.llm.api_key_env = "PATH".to_string();
        assert!(config.validate().is_ok());

        config.llm.api_key_env = "CALGEN_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = config.validate().expect_err("must fail");
        assert!(err.to_string().contains("CALGEN_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
