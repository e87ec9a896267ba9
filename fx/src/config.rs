//! Configuration types and loading
//!
//! The whole configuration is an explicit struct handed to session
//! construction; nothing in the core reads the process environment except
//! through the env-var names recorded here.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// LLM provider configuration (worker and evaluator models)
    pub llm: LlmConfig,

    /// Control-loop bounds and defaults
    pub agent: AgentConfig,

    /// Per-session resources
    pub session: SessionConfig,

    /// Web search provider
    pub search: SearchConfig,

    /// Push notifications
    pub push: PushConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast with a clear message when the API key env var is unset.
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
    ///
    /// Explicit path, then `.factotum.yml` in the working directory, then
    /// `~/.config/factotum/factotum.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".factotum.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("factotum").join("factotum.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

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
#[serde(default, rename_all = "kebab-case")]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Worker model identifier
    pub model: String,

    /// Evaluator model identifier (worker model when unset)
    pub evaluator_model: Option<String>,

    /// Environment variable containing the API key
    pub api_key_env: String,

    /// API base URL (provider default when empty)
    pub base_url: String,

    /// Maximum tokens per response
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Resolve the API key from the configured env var
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .context(format!("API key env var {} is not set", self.api_key_env))
    }

    /// Config for the evaluator client: same provider, possibly a
    /// different model
    pub fn for_evaluator(&self) -> LlmConfig {
        let mut config = self.clone();
        if let Some(model) = &self.evaluator_model {
            config.model = model.clone();
        }
        config
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            evaluator_model: None,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: String::new(),
            max_tokens: 8192,
            timeout_ms: 300_000,
        }
    }
}

/// Control-loop bounds and defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AgentConfig {
    /// Max worker retries after an evaluator rejection before the run
    /// stops and asks the user for guidance
    pub max_cycles: u32,

    /// Max worker->tools round trips within one run
    pub max_tool_turns: u32,

    /// Success criteria used when the user leaves the field empty
    pub default_criteria: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_cycles: 3,
            max_tool_turns: 16,
            default_criteria: "The answer is clear, concise, and accurate.".to_string(),
        }
    }
}

/// Per-session resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Root directory for per-session file sandboxes
    pub sandbox_dir: PathBuf,

    /// Timeout for web page fetches in milliseconds
    pub web_timeout_ms: u64,

    /// Directory for on-disk conversation checkpoints; in-memory when
    /// unset
    pub persist_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let sandbox_dir = dirs::data_dir()
            .map(|d| d.join("factotum").join("sandbox"))
            .unwrap_or_else(|| PathBuf::from("/tmp/factotum/sandbox"));

        Self {
            sandbox_dir,
            web_timeout_ms: 30_000,
            persist_dir: None,
        }
    }
}

/// Web search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Provider name ("serper" or "tavily")
    pub provider: String,

    /// Environment variable containing the search API key
    pub api_key_env: String,
}

impl SearchConfig {
    /// Resolve the search API key, if the env var is set
    pub fn get_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "serper".to_string(),
            api_key_env: "SERPER_API_KEY".to_string(),
        }
    }
}

/// Pushover notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PushConfig {
    /// Environment variable containing the application token
    pub token_env: String,

    /// Environment variable containing the user key
    pub user_env: String,
}

impl PushConfig {
    /// Resolve credentials, if both env vars are set
    pub fn get_credentials(&self) -> Option<(String, String)> {
        let token = std::env::var(&self.token_env).ok()?;
        let user = std::env::var(&self.user_env).ok()?;
        Some((token, user))
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            token_env: "PUSHOVER_TOKEN".to_string(),
            user_env: "PUSHOVER_USER".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.agent.max_cycles, 3);
        assert_eq!(config.agent.max_tool_turns, 16);
        assert_eq!(config.search.provider, "serper");
    }

    #[test]
    fn test_for_evaluator_defaults_to_worker_model() {
        let config = LlmConfig::default();
        assert_eq!(config.for_evaluator().model, config.model);
    }

    #[test]
    fn test_for_evaluator_with_override() {
        let config = LlmConfig {
            evaluator_model: Some("claude-haiku-4".to_string()),
            ..Default::default()
        };

        let evaluator = config.for_evaluator();
        assert_eq!(evaluator.model, "claude-haiku-4");
        assert_eq!(evaluator.provider, "anthropic");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  evaluator-model: gpt-4o
  api-key-env: OPENAI_API_KEY
  max-tokens: 4096

agent:
  max-cycles: 5
  default-criteria: "One sentence."
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.evaluator_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.agent.max_cycles, 5);
        assert_eq!(config.agent.default_criteria, "One sentence.");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: claude-haiku-4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-haiku-4");
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.agent.max_tool_turns, 16);
    }

    #[test]
    #[serial]
    fn test_validate_missing_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "FACTOTUM_NONEXISTENT_KEY_42".to_string();

        let result = config.validate();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("FACTOTUM_NONEXISTENT_KEY_42"));
    }

    #[test]
    #[serial]
    fn test_validate_with_api_key() {
        // SAFETY: serialized test, no concurrent env access
        unsafe {
            std::env::set_var("FACTOTUM_VALIDATE_KEY", "test-key");
        }

        let mut config = Config::default();
        config.llm.api_key_env = "FACTOTUM_VALIDATE_KEY".to_string();
        let result = config.validate();

        // SAFETY: serialized test, no concurrent env access
        unsafe {
            std::env::remove_var("FACTOTUM_VALIDATE_KEY");
        }

        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn test_search_key_absent_is_none() {
        let config = SearchConfig {
            api_key_env: "FACTOTUM_NO_SEARCH_KEY".to_string(),
            ..Default::default()
        };
        assert!(config.get_api_key().is_none());
    }

    #[test]
    #[serial]
    fn test_push_credentials_require_both_vars() {
        // SAFETY: serialized test, no concurrent env access
        unsafe {
            std::env::set_var("FACTOTUM_PUSH_TOKEN_ONLY", "tok");
        }

        let config = PushConfig {
            token_env: "FACTOTUM_PUSH_TOKEN_ONLY".to_string(),
            user_env: "FACTOTUM_PUSH_USER_UNSET".to_string(),
        };
        let creds = config.get_credentials();

        // SAFETY: serialized test, no concurrent env access
        unsafe {
            std::env::remove_var("FACTOTUM_PUSH_TOKEN_ONLY");
        }

        assert!(creds.is_none());
    }
}
