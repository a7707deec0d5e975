//! Configuration for LlmClient.

use chat_core::ChatError;
use std::env;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.llama-api.com";

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama3.2-11b-vision";

/// Configuration for LlmClient.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL; requests go to `{api_url}/chat/completions`.
    pub api_url: String,

    /// API key for bearer authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Temperature for generation.
    pub temperature: f32,

    /// Maximum tokens for a response.
    pub max_tokens: u32,

    /// Longest wait for the next read from the upstream, including each
    /// piece of a streamed body. A long stream that keeps producing deltas
    /// is never cut off.
    pub timeout: Duration,

    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl LlmConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `LLM_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `LLM_API_URL` - API URL (default: https://api.llama-api.com)
    /// - `LLM_MODEL` - Model name (default: llama3.2-11b-vision)
    /// - `LLM_TEMPERATURE` - Temperature (default: 0.5)
    /// - `LLM_MAX_TOKENS` - Max tokens (default: 1000)
    /// - `LLM_TIMEOUT_SECS` - Read timeout in seconds (default: 60)
    /// - `LLM_CONNECT_TIMEOUT_SECS` - Connect timeout in seconds (default: 10)
    pub fn from_env() -> Result<Self, ChatError> {
        let api_key = env::var("LLM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ChatError::Configuration("LLM_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("LLM_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let model = env::var("LLM_MODEL").unwrap_or(defaults.model);

        let temperature = env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.temperature);

        let max_tokens = env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let timeout = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let connect_timeout = env::var("LLM_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        Ok(Self {
            api_url,
            api_key,
            model,
            temperature,
            max_tokens,
            timeout,
            connect_timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> LlmConfigBuilder {
        LlmConfigBuilder::default()
    }

    /// Full URL of the completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for LlmConfig.
#[derive(Debug, Default)]
pub struct LlmConfigBuilder {
    config: LlmConfig,
}

impl LlmConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = temp;
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Set the read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LlmConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();

        assert_eq!(config.api_url, "https://api.llama-api.com");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, "llama3.2-11b-vision");
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_all_options() {
        let config = LlmConfig::builder()
            .api_key("my-key")
            .api_url("http://127.0.0.1:9000/")
            .model("llama-test")
            .temperature(0.2)
            .max_tokens(64)
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.model, "llama-test");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(
            config.completions_url(),
            "http://127.0.0.1:9000/chat/completions"
        );
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_llm_vars() {
            for var in [
                "LLM_API_KEY",
                "LLM_API_URL",
                "LLM_MODEL",
                "LLM_TEMPERATURE",
                "LLM_MAX_TOKENS",
                "LLM_TIMEOUT_SECS",
                "LLM_CONNECT_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // Missing API key should error
        clear_all_llm_vars();
        match LlmConfig::from_env() {
            Err(ChatError::Configuration(msg)) => assert!(msg.contains("LLM_API_KEY")),
            other => panic!("Expected Configuration error, got {other:?}"),
        }

        // Only API key set, defaults used
        clear_all_llm_vars();
        std::env::set_var("LLM_API_KEY", "test-env-key");
        let config = LlmConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-env-key");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 1000);

        // All vars set; unparsable numbers fall back to defaults
        clear_all_llm_vars();
        std::env::set_var("LLM_API_KEY", "full-test-key");
        std::env::set_var("LLM_API_URL", "https://test.api.com/");
        std::env::set_var("LLM_MODEL", "llama-big");
        std::env::set_var("LLM_TEMPERATURE", "0.9");
        std::env::set_var("LLM_MAX_TOKENS", "lots");
        std::env::set_var("LLM_TIMEOUT_SECS", "5");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "3");
        let config = LlmConfig::from_env().unwrap();
        assert_eq!(config.api_url, "https://test.api.com");
        assert_eq!(config.model, "llama-big");
        assert_eq!(config.temperature, 0.9);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));

        clear_all_llm_vars();
    }
}
